use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static DISALLOWED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9\s-]").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static DASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"-+").unwrap());

/// Slugs that collide with frontend routes.
static RESERVED_SLUGS: Lazy<HashSet<&str>> = Lazy::new(|| {
    HashSet::from([
        "sign-in",
        "sign-up",
        "dashboard",
        "api",
        "admin",
        "settings",
        "auth",
        "login",
        "register",
        "logout",
    ])
});

/// Turns a league name into a URL slug.
///
/// Never returns an empty or reserved slug.
pub fn generate_slug(name: &str) -> String {
    let slug = name.to_lowercase();
    let slug = DISALLOWED.replace_all(slug.trim(), "");
    let slug = WHITESPACE.replace_all(&slug, "-");
    let slug = DASHES.replace_all(&slug, "-");
    let slug = slug.trim_matches('-');

    if slug.is_empty() {
        String::from("league")
    } else if RESERVED_SLUGS.contains(slug) {
        format!("{}-league", slug)
    } else {
        slug.to_string()
    }
}

/// Suffixes a taken slug with the base 36 representation of the current unix milliseconds.
pub fn disambiguate(slug: &str, now: DateTime<Utc>) -> String {
    format!("{}-{}", slug, to_base36(now.timestamp_millis().max(0) as u64))
}

fn to_base36(mut n: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return String::from("0");
    }

    let mut digits = Vec::new();
    while n > 0 {
        digits.push(DIGITS[(n % 36) as usize]);
        n /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}
