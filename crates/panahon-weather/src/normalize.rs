//! Matching key for municipality names.

use regex::Regex;
use std::sync::LazyLock;

static DECORATIONS: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"city of |\(.*\)"));

/// Lowercase, drop every "city of " and any parenthesized part, then trim.
///
/// Only ever used as an equality key; apply it to both sides of a comparison.
pub fn normalize_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let stripped = match DECORATIONS.as_ref() {
        Ok(re) => re.replace_all(&lowered, "").into_owned(),
        Err(e) => {
            tracing::error!("Name normalizer pattern failed to compile: {}", e);
            lowered
        }
    };
    stripped.trim().to_string()
}
