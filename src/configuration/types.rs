use chrono::NaiveDate;
use color_eyre::eyre::{eyre, Result};
use csscolorparser::Color;
use serde::{Deserialize, Serialize};
use std::ops::Deref;
use unix_path::{Path as UnixPath, PathBuf as UnixPathBuf};

// TODO: might want to use the delegate crate for some of these types: https://crates.io/crates/delegate

/// Wrapper type for RelativePathBuf so we can use doku to generate example config files
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct ConfigUrl(UnixPathBuf);

impl ConfigUrl {
    pub fn path_buf(&self) -> &UnixPathBuf {
        &self.0
    }
}

impl Deref for ConfigUrl {
    type Target = UnixPathBuf;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<ConfigUrl> for UnixPathBuf {
    fn from(value: ConfigUrl) -> Self {
        value.0
    }
}

impl From<&str> for ConfigUrl {
    fn from(value: &str) -> Self {
        ConfigUrl(UnixPath::new(value).into())
    }
}

impl doku::Document for ConfigUrl {
    fn ty() -> doku::Type {
        doku::Type::from(doku::TypeKind::String)
    }
}

/// Wrapper type for csscolorparser::Color so we can use doku to generate example config files
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ConfigColor(pub Color);

impl ConfigColor {
    pub fn to_hex_string(&self) -> String {
        self.0.to_hex_string()
    }
}

impl Eq for ConfigColor {}

impl doku::Document for ConfigColor {
    fn ty() -> doku::Type {
        doku::Type::from(doku::TypeKind::String)
    }
}

/// Parse a date the way users write them
///
/// ISO dates are tried first, then [`fuzzydate::parse`] so we can handle
/// human readable dates like "today"
pub fn parse_human_date(input: &str) -> Result<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        return Ok(date);
    }

    fuzzydate::parse(input)
        .map(|d| d.date())
        .map_err(|e| eyre!("could not parse date '{}': {}", input, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn iso_dates_parse_directly() {
        assert_eq!(
            parse_human_date("2024-06-05").unwrap(),
            NaiveDate::from_ymd_opt(2024, 6, 5).unwrap()
        );
    }

    #[test]
    fn nonsense_dates_are_rejected() {
        assert!(parse_human_date("not a date at all").is_err());
    }

    #[test]
    fn config_urls_join_below_the_base() {
        let base: ConfigUrl = "/schedule".into();
        assert_eq!(
            base.join("week").to_str(),
            Some("/schedule/week")
        );
    }
}
