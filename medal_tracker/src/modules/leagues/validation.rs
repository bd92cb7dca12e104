use medal_tracker_libs::country::CountryResolver;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError, ValidationErrors};

const MAX_NAME_LENGTH: usize = 100;
const MAX_MEMBERS_PER_TEAM: usize = 20;
const MAX_COUNTRIES_PER_TEAM: usize = 30;
const MAX_COUNTRY_NAME_LENGTH: usize = 100;
const MAX_COUNTRY_FLAG_LENGTH: usize = 50;

fn error(code: &'static str, message: String) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn validate_name(value: &str) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(error("blank", String::from("name cannot be empty")))
    } else if trimmed.chars().count() > MAX_NAME_LENGTH {
        Err(error(
            "too_long",
            format!("name must be {} characters or fewer", MAX_NAME_LENGTH),
        ))
    } else {
        Ok(())
    }
}

fn validate_members(members: &Vec<String>) -> Result<(), ValidationError> {
    if members.len() > MAX_MEMBERS_PER_TEAM {
        return Err(error(
            "too_many_members",
            format!("a team can have at most {} members", MAX_MEMBERS_PER_TEAM),
        ));
    }
    for member in members.iter() {
        if member.trim().is_empty() {
            return Err(error(
                "blank_member",
                String::from("member name cannot be empty"),
            ));
        }
        if member.chars().count() > MAX_NAME_LENGTH {
            return Err(error(
                "member_too_long",
                format!("member name must be {} characters or fewer", MAX_NAME_LENGTH),
            ));
        }
    }

    Ok(())
}

fn validate_countries(countries: &Vec<DraftedCountryInput>) -> Result<(), ValidationError> {
    if countries.len() > MAX_COUNTRIES_PER_TEAM {
        return Err(error(
            "too_many_countries",
            format!(
                "a team can draft at most {} countries",
                MAX_COUNTRIES_PER_TEAM
            ),
        ));
    }

    let resolver = CountryResolver::standard();
    for country in countries.iter() {
        if !resolver.is_draftable(&country.country_code) {
            return Err(error(
                "invalid_country_code",
                format!("invalid country code: {}", country.country_code),
            ));
        }
        if country.country_name.chars().count() > MAX_COUNTRY_NAME_LENGTH {
            return Err(error(
                "country_name_too_long",
                String::from("country name too long"),
            ));
        }
        if country.country_flag.chars().count() > MAX_COUNTRY_FLAG_LENGTH {
            return Err(error(
                "country_flag_too_long",
                String::from("country flag too long"),
            ));
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
pub struct LeagueInput {
    #[validate(custom = "validate_name")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DraftedCountryInput {
    pub country_code: String,
    pub country_name: String,
    pub country_flag: String,
}

/// Body of the team create and update requests.
///
/// An update replaces the name, avatar, members and the whole set of drafted countries.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TeamInput {
    #[validate(custom = "validate_name")]
    pub name: String,
    #[validate(length(max = 50))]
    #[serde(default)]
    pub avatar: String,
    #[validate(custom = "validate_members")]
    #[serde(default)]
    pub members: Vec<String>,
    #[validate(custom = "validate_countries")]
    #[serde(default)]
    pub countries: Vec<DraftedCountryInput>,
}

/// Flattens validation errors into one line, e.g. `name: name cannot be empty`.
pub fn describe(errors: &ValidationErrors) -> String {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| match &error.message {
                Some(message) => format!("{}: {}", field, message),
                None => format!("{}: invalid value ({})", field, error.code),
            })
        })
        .collect();
    messages.sort();
    messages.join(", ")
}
