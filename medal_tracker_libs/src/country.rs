//! Lookup tables between display names, IOC codes and flag glyphs.
//!
//! Lookups are total: unknown names and codes resolve to `None`.

use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use unicode_normalization::UnicodeNormalization;

/// Display name (as printed on the medal table page) to IOC code.
///
/// Several names may map to the same code (renamed nations, alternate spellings).
const NAME_TO_CODE: &[(&str, &str)] = &[
    ("Afghanistan", "AFG"),
    ("Albania", "ALB"),
    ("Algeria", "ALG"),
    ("Andorra", "AND"),
    ("Angola", "ANG"),
    ("Argentina", "ARG"),
    ("Armenia", "ARM"),
    ("Australia", "AUS"),
    ("Austria", "AUT"),
    ("Azerbaijan", "AZE"),
    ("Belgium", "BEL"),
    ("Bosnia and Herzegovina", "BIH"),
    ("Belarus", "BLR"),
    ("Bolivia", "BOL"),
    ("Brazil", "BRA"),
    ("Bulgaria", "BUL"),
    ("Canada", "CAN"),
    ("Chile", "CHI"),
    ("China", "CHN"),
    ("Colombia", "COL"),
    ("Costa Rica", "CRC"),
    ("Croatia", "CRO"),
    ("Cyprus", "CYP"),
    ("Czech Republic", "CZE"),
    ("Czechia", "CZE"),
    ("Denmark", "DEN"),
    ("Ecuador", "ECU"),
    ("Egypt", "EGY"),
    ("Eritrea", "ERI"),
    ("Spain", "ESP"),
    ("Estonia", "EST"),
    ("Ethiopia", "ETH"),
    ("Finland", "FIN"),
    ("France", "FRA"),
    ("Great Britain", "GBR"),
    ("Georgia", "GEO"),
    ("Germany", "GER"),
    ("Ghana", "GHA"),
    ("Greece", "GRE"),
    ("Hong Kong", "HKG"),
    ("Hungary", "HUN"),
    ("Indonesia", "INA"),
    ("India", "IND"),
    ("Iran", "IRI"),
    ("Ireland", "IRL"),
    ("Iceland", "ISL"),
    ("Israel", "ISR"),
    ("Italy", "ITA"),
    ("Jamaica", "JAM"),
    ("Japan", "JPN"),
    ("Kazakhstan", "KAZ"),
    ("Kenya", "KEN"),
    ("Kyrgyzstan", "KGZ"),
    ("South Korea", "KOR"),
    ("Kuwait", "KUW"),
    ("Latvia", "LAT"),
    ("Lebanon", "LBN"),
    ("Liechtenstein", "LIE"),
    ("Lithuania", "LTU"),
    ("Luxembourg", "LUX"),
    ("Madagascar", "MAD"),
    ("Morocco", "MAR"),
    ("Malaysia", "MAS"),
    ("Moldova", "MDA"),
    ("Mexico", "MEX"),
    ("Mongolia", "MGL"),
    ("North Macedonia", "MKD"),
    ("Malta", "MLT"),
    ("Montenegro", "MNE"),
    ("Monaco", "MON"),
    ("Netherlands", "NED"),
    ("Nigeria", "NGR"),
    ("Norway", "NOR"),
    ("New Zealand", "NZL"),
    ("Pakistan", "PAK"),
    ("Peru", "PER"),
    ("Philippines", "PHI"),
    ("Poland", "POL"),
    ("Portugal", "POR"),
    ("North Korea", "PRK"),
    ("Puerto Rico", "PUR"),
    ("Qatar", "QAT"),
    ("Romania", "ROU"),
    ("South Africa", "RSA"),
    ("Saudi Arabia", "SAU"),
    ("Singapore", "SGP"),
    ("Slovenia", "SLO"),
    ("San Marino", "SMR"),
    ("Serbia", "SRB"),
    ("Switzerland", "SUI"),
    ("Slovakia", "SVK"),
    ("Sweden", "SWE"),
    ("Thailand", "THA"),
    ("Tajikistan", "TJK"),
    ("Turkmenistan", "TKM"),
    ("Chinese Taipei", "TPE"),
    ("Trinidad and Tobago", "TTO"),
    ("Turkey", "TUR"),
    ("T\u{fc}rkiye", "TUR"),
    ("United Arab Emirates", "UAE"),
    ("Ukraine", "UKR"),
    ("United States", "USA"),
    ("Uzbekistan", "UZB"),
    ("Individual Neutral Athletes", "AIN"),
    ("U.S. Virgin Islands", "ISV"),
    ("Virgin Islands", "ISV"),
    ("ROC", "ROC"),
    ("Russian Olympic Committee", "ROC"),
];

/// IOC code to ISO 3166-1 alpha-2 code, from which the regional indicator flag is built.
const CODE_TO_ISO: &[(&str, &str)] = &[
    ("AFG", "AF"),
    ("ALB", "AL"),
    ("ALG", "DZ"),
    ("AND", "AD"),
    ("ANG", "AO"),
    ("ARG", "AR"),
    ("ARM", "AM"),
    ("AUS", "AU"),
    ("AUT", "AT"),
    ("AZE", "AZ"),
    ("BEL", "BE"),
    ("BIH", "BA"),
    ("BLR", "BY"),
    ("BOL", "BO"),
    ("BRA", "BR"),
    ("BUL", "BG"),
    ("CAN", "CA"),
    ("CHI", "CL"),
    ("CHN", "CN"),
    ("COL", "CO"),
    ("CRC", "CR"),
    ("CRO", "HR"),
    ("CYP", "CY"),
    ("CZE", "CZ"),
    ("DEN", "DK"),
    ("ECU", "EC"),
    ("EGY", "EG"),
    ("ERI", "ER"),
    ("ESP", "ES"),
    ("EST", "EE"),
    ("ETH", "ET"),
    ("FIN", "FI"),
    ("FRA", "FR"),
    ("GBR", "GB"),
    ("GEO", "GE"),
    ("GER", "DE"),
    ("GHA", "GH"),
    ("GRE", "GR"),
    ("HKG", "HK"),
    ("HUN", "HU"),
    ("INA", "ID"),
    ("IND", "IN"),
    ("IRI", "IR"),
    ("IRL", "IE"),
    ("ISL", "IS"),
    ("ISR", "IL"),
    ("ITA", "IT"),
    ("JAM", "JM"),
    ("JPN", "JP"),
    ("KAZ", "KZ"),
    ("KEN", "KE"),
    ("KGZ", "KG"),
    ("KOR", "KR"),
    ("KUW", "KW"),
    ("LAT", "LV"),
    ("LBN", "LB"),
    ("LIE", "LI"),
    ("LTU", "LT"),
    ("LUX", "LU"),
    ("MAD", "MG"),
    ("MAR", "MA"),
    ("MAS", "MY"),
    ("MDA", "MD"),
    ("MEX", "MX"),
    ("MGL", "MN"),
    ("MKD", "MK"),
    ("MLT", "MT"),
    ("MNE", "ME"),
    ("MON", "MC"),
    ("NED", "NL"),
    ("NGR", "NG"),
    ("NOR", "NO"),
    ("NZL", "NZ"),
    ("PAK", "PK"),
    ("PER", "PE"),
    ("PHI", "PH"),
    ("POL", "PL"),
    ("POR", "PT"),
    ("PRK", "KP"),
    ("PUR", "PR"),
    ("QAT", "QA"),
    ("ROU", "RO"),
    ("RSA", "ZA"),
    ("SAU", "SA"),
    ("SGP", "SG"),
    ("SLO", "SI"),
    ("SMR", "SM"),
    ("SRB", "RS"),
    ("SUI", "CH"),
    ("SVK", "SK"),
    ("SWE", "SE"),
    ("THA", "TH"),
    ("TJK", "TJ"),
    ("TKM", "TM"),
    ("TPE", "TW"),
    ("TTO", "TT"),
    ("TUR", "TR"),
    ("UAE", "AE"),
    ("UKR", "UA"),
    ("USA", "US"),
    ("UZB", "UZ"),
    ("ISV", "VI"),
];

/// Codes whose flag is not a national regional indicator pair.
const SPECIAL_FLAGS: &[(&str, &str)] = &[
    // Individual Neutral Athletes
    ("AIN", "\u{1f3f3}\u{fe0f}"),
];

/// Every code a team may draft.
const DRAFTABLE_CODES: &[&str] = &[
    "AFG", "ALB", "ALG", "AND", "ANG", "ARG", "ARM", "AUS", "AUT", "AZE", "BEL", "BIH", "BLR",
    "BOL", "BRA", "BUL", "CAN", "CHI", "CHN", "COL", "CRC", "CRO", "CYP", "CZE", "DEN", "ECU",
    "EGY", "ERI", "ESP", "EST", "ETH", "FAR", "FIN", "FRA", "GBR", "GEO", "GER", "GHA", "GRE",
    "HKG", "HUN", "INA", "IND", "IRI", "IRL", "ISL", "ISR", "ISV", "ITA", "JAM", "JPN", "KAZ",
    "KEN", "KGZ", "KOR", "KUW", "LAT", "LBN", "LIE", "LTU", "LUX", "MAD", "MAR", "MAS", "MDA",
    "MEX", "MGL", "MKD", "MLT", "MNE", "MON", "NED", "NGR", "NOR", "NZL", "PAK", "PER", "PHI",
    "POL", "POR", "PRK", "PUR", "QAT", "ROU", "RSA", "SAU", "SGP", "SLO", "SMR", "SRB", "SUI",
    "SVK", "SWE", "THA", "TJK", "TKM", "TPE", "TTO", "TUR", "UAE", "UKR", "USA", "UZB", "AIN",
    "ROC",
];

static STANDARD: Lazy<CountryResolver> = Lazy::new(|| {
    CountryResolver::new(
        NAME_TO_CODE.iter().copied(),
        CODE_TO_ISO
            .iter()
            .map(|(code, iso)| (*code, regional_indicator_flag(iso)))
            .chain(
                SPECIAL_FLAGS
                    .iter()
                    .map(|(code, flag)| (*code, flag.to_string())),
            ),
        DRAFTABLE_CODES.iter().copied(),
    )
});

/// Immutable name/code/flag mapping.
#[derive(Debug, Clone)]
pub struct CountryResolver {
    codes: HashMap<String, &'static str>,
    flags: HashMap<&'static str, String>,
    draftable: HashSet<&'static str>,
}

impl CountryResolver {
    pub fn new(
        names: impl IntoIterator<Item = (&'static str, &'static str)>,
        flags: impl IntoIterator<Item = (&'static str, String)>,
        draftable: impl IntoIterator<Item = &'static str>,
    ) -> Self {
        Self {
            codes: names
                .into_iter()
                .map(|(name, code)| (normalize(name), code))
                .collect(),
            flags: flags.into_iter().collect(),
            draftable: draftable.into_iter().collect(),
        }
    }

    /// The resolver built from the bundled tables.
    pub fn standard() -> &'static CountryResolver {
        &STANDARD
    }

    /// Resolves a display name to its IOC code.
    ///
    /// The name is trimmed and NFC normalized before the lookup; matching is otherwise exact.
    pub fn resolve_code(&self, name: &str) -> Option<&'static str> {
        self.codes.get(&normalize(name)).copied()
    }

    pub fn flag_for(&self, code: &str) -> Option<&str> {
        self.flags.get(code).map(String::as_str)
    }

    pub fn is_draftable(&self, code: &str) -> bool {
        self.draftable.contains(code)
    }
}

fn normalize(name: &str) -> String {
    name.trim().nfc().collect()
}

/// Builds the flag emoji of an ISO 3166-1 alpha-2 code out of two regional indicator symbols.
fn regional_indicator_flag(iso: &str) -> String {
    iso.chars()
        .filter(|c| c.is_ascii_uppercase())
        .filter_map(|c| char::from_u32(0x1F1E6 + (c as u32 - 'A' as u32)))
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn resolve_known_names() {
        let resolver = CountryResolver::standard();
        assert_eq!(resolver.resolve_code("Germany"), Some("GER"));
        assert_eq!(resolver.resolve_code("  Norway "), Some("NOR"));
        assert_eq!(resolver.resolve_code("Individual Neutral Athletes"), Some("AIN"));
    }

    #[test]
    fn renamed_nations_share_a_code() {
        let resolver = CountryResolver::standard();
        assert_eq!(resolver.resolve_code("Czech Republic"), Some("CZE"));
        assert_eq!(resolver.resolve_code("Czechia"), Some("CZE"));
        assert_eq!(resolver.resolve_code("Turkey"), Some("TUR"));
        assert_eq!(resolver.resolve_code("T\u{fc}rkiye"), Some("TUR"));
        // decomposed u + combining diaeresis
        assert_eq!(resolver.resolve_code("Tu\u{308}rkiye"), Some("TUR"));
    }

    #[test]
    fn unknown_names_resolve_to_none() {
        let resolver = CountryResolver::standard();
        assert_eq!(resolver.resolve_code("Atlantis"), None);
        assert_eq!(resolver.resolve_code(""), None);
        // lookups are case sensitive
        assert_eq!(resolver.resolve_code("germany"), None);
    }

    #[test]
    fn flags() {
        let resolver = CountryResolver::standard();
        assert_eq!(resolver.flag_for("GER"), Some("\u{1f1e9}\u{1f1ea}"));
        assert_eq!(resolver.flag_for("SUI"), Some("\u{1f1e8}\u{1f1ed}"));
        assert_eq!(resolver.flag_for("AIN"), Some("\u{1f3f3}\u{fe0f}"));
        assert_eq!(resolver.flag_for("ROC"), None);
        assert_eq!(resolver.flag_for("XYZ"), None);
    }

    #[test]
    fn draftable_codes() {
        let resolver = CountryResolver::standard();
        assert!(resolver.is_draftable("FAR"));
        assert!(resolver.is_draftable("ROC"));
        assert!(!resolver.is_draftable("XYZ"));
    }
}
