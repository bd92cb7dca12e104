use crate::types::tables::MedalRecord;
use medal_tracker_libs::country::CountryResolver;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;
use thiserror::Error;

/// Header texts that identify the medal table among the tables of the page.
const HEADER_MARKERS: [&str; 3] = ["Gold", "Silver", "Bronze"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScrapeError {
    #[error("medal table not found in page")]
    TableNotFound,
    #[error("invalid table selector `{0}`")]
    InvalidSelector(String),
}

/// Why a table row did not produce a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowSkip {
    /// The row has no row-label cell (column headers, group headings).
    NotDataRow,
    /// Totals row or empty label.
    SummaryRow,
    UnknownCountry(String),
    TooFewFigures { country: String, found: usize },
    NegativeFigure { country: String },
}

pub struct MedalTableScraper {
    table: Selector,
    th: Selector,
    tr: Selector,
    row_header: Selector,
    a: Selector,
    td: Selector,
    resolver: &'static CountryResolver,
}

impl MedalTableScraper {
    pub fn new() -> Self {
        Self::with_table_selector("table.wikitable").expect("default table selector is valid")
    }

    /// Builds a scraper whose candidate tables are the ones matching `table_selector`.
    pub fn with_table_selector(table_selector: &str) -> Result<Self, ScrapeError> {
        let table = Selector::parse(table_selector)
            .map_err(|_| ScrapeError::InvalidSelector(table_selector.to_string()))?;
        let th = Selector::parse("th").unwrap();
        let tr = Selector::parse("tr").unwrap();
        let row_header = Selector::parse(r#"th[scope="row"]"#).unwrap();
        let a = Selector::parse("a").unwrap();
        let td = Selector::parse("td").unwrap();

        Ok(Self {
            table,
            th,
            tr,
            row_header,
            a,
            td,
            resolver: CountryResolver::standard(),
        })
    }

    /// Extracts the medal records from a full page, in document order.
    ///
    /// Only a missing medal table fails the extraction; rows that cannot be read are skipped.
    /// When a country appears twice the first row wins.
    pub fn extract_records(&self, html: &str) -> Result<Vec<MedalRecord>, ScrapeError> {
        let document = Html::parse_document(html);
        let table = self.locate_table(&document)?;

        let mut seen: HashSet<String> = HashSet::new();
        let mut records: Vec<MedalRecord> = Vec::with_capacity(100);

        for (i, tr) in table.select(&self.tr).enumerate() {
            match self.parse_row(tr) {
                Ok(record) => {
                    if seen.insert(record.country_code.clone()) {
                        records.push(record);
                    } else {
                        tracing::warn!(
                            "duplicate country code {} at row {}, keeping the first one",
                            record.country_code,
                            i
                        );
                    }
                }
                Err(RowSkip::UnknownCountry(country)) => {
                    tracing::warn!("Unknown country \"{}\" at row {}, skipping", country, i);
                }
                Err(RowSkip::TooFewFigures { country, found }) => {
                    tracing::warn!(
                        "only {} numeric cells for {} at row {}, skipping",
                        found,
                        country,
                        i
                    );
                }
                Err(RowSkip::NegativeFigure { country }) => {
                    tracing::warn!("negative medal count for {} at row {}, skipping", country, i);
                }
                Err(skip) => {
                    tracing::debug!("row {} skipped: {:?}", i, skip);
                }
            }
        }

        Ok(records)
    }

    /// Finds the first candidate table whose header cells mention gold, silver and bronze.
    pub fn locate_table<'a>(&self, document: &'a Html) -> Result<ElementRef<'a>, ScrapeError> {
        document
            .select(&self.table)
            .find(|table| {
                let header_text: String = table.select(&self.th).flat_map(|th| th.text()).collect();
                HEADER_MARKERS
                    .iter()
                    .all(|marker| header_text.contains(marker))
            })
            .ok_or_else(|| {
                tracing::warn!("failed to locate medal table in page html");
                ScrapeError::TableNotFound
            })
    }

    /// Reads one table row into a record.
    ///
    /// The last four numeric data cells are gold, silver, bronze and total, so a leading
    /// rank column may or may not be present.
    pub fn parse_row(&self, tr: ElementRef<'_>) -> Result<MedalRecord, RowSkip> {
        let header = tr.select(&self.row_header).next().ok_or(RowSkip::NotDataRow)?;

        let label: String = header.text().collect();
        let label = label.trim();
        if label.is_empty() || label.to_lowercase().starts_with("total") {
            return Err(RowSkip::SummaryRow);
        }

        let link_text: Option<String> = header
            .select(&self.a)
            .last()
            .map(|a| a.text().collect::<String>().trim().to_string())
            .filter(|text| !text.is_empty());
        let country = clean_country_name(link_text.as_deref().unwrap_or(label));

        let country_code = self
            .resolver
            .resolve_code(&country)
            .ok_or_else(|| RowSkip::UnknownCountry(country.clone()))?;
        let country_flag = self.resolver.flag_for(country_code).map(String::from);

        let figures: Vec<i32> = tr
            .select(&self.td)
            .filter_map(|td| parse_leading_int(&td.text().collect::<String>()))
            .collect();
        if figures.len() < 4 {
            return Err(RowSkip::TooFewFigures {
                country,
                found: figures.len(),
            });
        }

        let [gold, silver, bronze, total] = [
            figures[figures.len() - 4],
            figures[figures.len() - 3],
            figures[figures.len() - 2],
            figures[figures.len() - 1],
        ];
        if [gold, silver, bronze, total].iter().any(|n| *n < 0) {
            return Err(RowSkip::NegativeFigure { country });
        }

        Ok(MedalRecord {
            country,
            country_code: country_code.to_string(),
            country_flag,
            gold,
            silver,
            bronze,
            total,
        })
    }
}

impl Default for MedalTableScraper {
    fn default() -> Self {
        Self::new()
    }
}

/// Drops the host nation marker (trailing `*`) and surrounding whitespace.
pub fn clean_country_name(name: &str) -> String {
    name.trim().trim_end_matches('*').trim().to_string()
}

/// Parses the integer at the start of a cell, ignoring what follows it (footnote marks etc).
///
/// Returns `None` when the cell does not start with a number.
pub fn parse_leading_int(text: &str) -> Option<i32> {
    let text = text.trim();
    let digits_start = if text.starts_with(['-', '+']) { 1 } else { 0 };
    let digits_end = text[digits_start..]
        .find(|c: char| !c.is_ascii_digit())
        .map(|i| i + digits_start)
        .unwrap_or(text.len());
    if digits_end == digits_start {
        return None;
    }

    text[..digits_end].parse::<i32>().ok()
}

#[cfg(test)]
mod test {
    use super::*;

    fn page(rows: &str) -> String {
        format!(
            r#"<html><body>
            <table class="wikitable"><tr><th>Sport</th><th>Events</th></tr>
                <tr><td>Biathlon</td><td>11</td></tr></table>
            <table class="wikitable sortable">
                <tr><th>Rank</th><th>NOC</th><th>Gold</th><th>Silver</th><th>Bronze</th><th>Total</th></tr>
                {}
            </table>
            </body></html>"#,
            rows
        )
    }

    fn row(rank: &str, name: &str, medals: [i32; 4]) -> String {
        format!(
            r#"<tr><td>{}</td><th scope="row"><span class="flagicon"></span><a href="/wiki/{}">{}</a></th><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>"#,
            rank, name, name, medals[0], medals[1], medals[2], medals[3]
        )
    }

    fn first_record(tr: &str) -> Result<MedalRecord, RowSkip> {
        let scraper = MedalTableScraper::new();
        let document = Html::parse_document(&page(tr));
        let table = scraper.locate_table(&document).unwrap();
        let tr = table
            .select(&scraper.tr)
            .nth(1)
            .expect("the data row follows the column headers");
        scraper.parse_row(tr)
    }

    #[test]
    fn extract_records_in_document_order() {
        let rows = [
            row("1", "Norway", [10, 8, 6, 24]),
            row("2", "Germany", [7, 9, 5, 21]),
            row("3", "Italy", [5, 4, 9, 18]),
        ]
        .join("");
        let scraper = MedalTableScraper::new();

        let records = scraper.extract_records(&page(&rows)).unwrap();

        let codes: Vec<&str> = records.iter().map(|r| r.country_code.as_str()).collect();
        assert_eq!(codes, vec!["NOR", "GER", "ITA"]);
        assert_eq!(
            records[0],
            MedalRecord {
                country: String::from("Norway"),
                country_code: String::from("NOR"),
                country_flag: Some(String::from("\u{1f1f3}\u{1f1f4}")),
                gold: 10,
                silver: 8,
                bronze: 6,
                total: 24,
            }
        );
    }

    #[test]
    fn takes_the_last_four_numbers() {
        let tr = r#"<tr><td>12</td><td>5</td><th scope="row"><a>Japan</a></th><td>3</td><td>2</td><td>1</td><td>11</td></tr>"#;

        let record = first_record(tr).unwrap();

        assert_eq!(
            (record.gold, record.silver, record.bronze, record.total),
            (3, 2, 1, 11)
        );
    }

    #[test]
    fn works_without_rank_column() {
        let tr = r#"<tr><th scope="row"><a>Canada</a></th><td>4</td><td>3</td><td>2</td><td>9</td></tr>"#;

        let record = first_record(tr).unwrap();

        assert_eq!(record.country_code, "CAN");
        assert_eq!(
            (record.gold, record.silver, record.bronze, record.total),
            (4, 3, 2, 9)
        );
    }

    #[test]
    fn total_is_taken_as_is() {
        let tr = r#"<tr><td>1</td><th scope="row"><a>Austria</a></th><td>1</td><td>1</td><td>1</td><td>4</td></tr>"#;

        let record = first_record(tr).unwrap();

        assert_eq!(record.total, 4);
    }

    #[test]
    fn non_numeric_cells_are_ignored() {
        let tr = r#"<tr><td>=4</td><th scope="row"><a>Sweden</a></th><td>2</td><td>n/a</td><td>1[a]</td><td>0</td><td>3</td></tr>"#;

        let record = first_record(tr).unwrap();

        assert_eq!(
            (record.gold, record.silver, record.bronze, record.total),
            (2, 1, 0, 3)
        );
    }

    #[test]
    fn total_rows_never_produce_records() {
        for label in ["Total", "TOTAL", "Totals (12 entries)", "total"] {
            let tr = format!(
                r#"<tr><th scope="row" colspan="2">{}</th><td>10</td><td>10</td><td>10</td><td>30</td></tr>"#,
                label
            );
            assert_eq!(first_record(&tr), Err(RowSkip::SummaryRow));
        }
    }

    #[test]
    fn rows_without_row_header_are_not_data_rows() {
        let tr = r#"<tr><td>1</td><td>Norway</td><td>1</td><td>1</td><td>1</td><td>3</td></tr>"#;

        assert_eq!(first_record(tr), Err(RowSkip::NotDataRow));
    }

    #[test]
    fn host_marker_is_stripped() {
        let tr = r#"<tr><td>3</td><th scope="row"><a>Italy</a>*</th><td>5</td><td>4</td><td>9</td><td>18</td></tr>"#;
        assert_eq!(first_record(tr).unwrap().country, "Italy");

        let tr = r#"<tr><td>3</td><th scope="row">Germany*</th><td>5</td><td>4</td><td>9</td><td>18</td></tr>"#;
        let record = first_record(tr).unwrap();
        assert_eq!(record.country, "Germany");
        assert_eq!(record.country_code, "GER");
    }

    #[test]
    fn last_link_names_the_country() {
        let tr = r#"<tr><td>7</td><th scope="row"><a href="/wiki/Note">[n]</a> <a href="/wiki/Czech_Republic">Czech Republic</a></th><td>1</td><td>0</td><td>0</td><td>1</td></tr>"#;

        let record = first_record(tr).unwrap();

        assert_eq!(record.country_code, "CZE");
    }

    #[test]
    fn too_few_numbers_skip_the_row() {
        let tr = r#"<tr><th scope="row"><a>Finland</a></th><td>1</td><td>2</td><td>3</td></tr>"#;

        assert_eq!(
            first_record(tr),
            Err(RowSkip::TooFewFigures {
                country: String::from("Finland"),
                found: 3
            })
        );
    }

    #[test]
    fn unknown_country_does_not_stop_the_rest() {
        let rows = [
            row("1", "Norway", [10, 8, 6, 24]),
            row("2", "Atlantis", [7, 9, 5, 21]),
            row("3", "Italy", [5, 4, 9, 18]),
        ]
        .join("");
        let scraper = MedalTableScraper::new();

        let records = scraper.extract_records(&page(&rows)).unwrap();

        let codes: Vec<&str> = records.iter().map(|r| r.country_code.as_str()).collect();
        assert_eq!(codes, vec!["NOR", "ITA"]);
    }

    #[test]
    fn duplicate_codes_keep_the_first_row() {
        let rows = [
            row("1", "Czech Republic", [1, 0, 0, 1]),
            row("2", "Czechia", [2, 0, 0, 2]),
        ]
        .join("");
        let scraper = MedalTableScraper::new();

        let records = scraper.extract_records(&page(&rows)).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].gold, 1);
    }

    #[test]
    fn table_without_markers_is_not_found() {
        let html = r#"<table class="wikitable"><tr><th>Gold</th><th>Silver</th></tr></table>"#;
        let scraper = MedalTableScraper::new();

        assert_eq!(scraper.extract_records(html), Err(ScrapeError::TableNotFound));
    }

    #[test]
    fn markers_are_case_sensitive() {
        let html = r#"<table class="wikitable"><tr><th>gold</th><th>silver</th><th>bronze</th></tr></table>"#;
        let scraper = MedalTableScraper::new();

        assert_eq!(scraper.extract_records(html), Err(ScrapeError::TableNotFound));
    }

    #[test]
    fn invalid_selector_is_rejected() {
        assert!(matches!(
            MedalTableScraper::with_table_selector("table[["),
            Err(ScrapeError::InvalidSelector(_))
        ));
    }

    #[test]
    fn parse_leading_int_cases() {
        assert_eq!(parse_leading_int(" 12 "), Some(12));
        assert_eq!(parse_leading_int("3[a]"), Some(3));
        assert_eq!(parse_leading_int("-2"), Some(-2));
        assert_eq!(parse_leading_int("=4"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
    }

    #[test]
    fn clean_country_name_cases() {
        assert_eq!(clean_country_name("Germany*"), "Germany");
        assert_eq!(clean_country_name(" Italy** "), "Italy");
        assert_eq!(clean_country_name("Norway"), "Norway");
    }
}
