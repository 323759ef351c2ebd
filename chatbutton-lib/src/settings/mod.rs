//! The settings record and the closed vocabularies it is built from.
//!
//! Both the sanitizer and the visibility engine read field names, enum spellings and defaults
//! from here, so a value that passes through one always means the same thing to the other.

use std::{collections::HashSet, hash::Hash};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

pub mod sanitize;

pub use sanitize::{GroupFlags, RawInput, Tab, sanitize};

/// Time window start used when the record is first created.
pub const DEFAULT_TIME_FROM: &str = "09:00";
/// Time window end used when the record is first created.
pub const DEFAULT_TIME_TO: &str = "17:00";
/// Window start applied when a schedule submission carries no start time.
pub const OPEN_TIME_FROM: &str = "00:00";
/// Window end applied when a schedule submission carries no end time.
pub const OPEN_TIME_TO: &str = "23:59";

/// Which corner of the viewport the button is pinned to.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Position {
    Left,
    #[default]
    Right,
}

impl Position {
    /// Exactly `left` or `right`, anything else lands on the right.
    pub fn coerce(raw: &str) -> Self {
        raw.parse().unwrap_or_default()
    }
}

/// Page classifications that can be excluded as a whole, in the order they are checked.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SpecialPage {
    FrontPage,
    PostsPage,
    Archive,
    Search,
    #[serde(rename = "404")]
    #[strum(serialize = "404")]
    NotFound,
}

/// ISO weekday, stored by its code: `"1"` is Monday and `"7"` is Sunday.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
pub enum Weekday {
    #[serde(rename = "1")]
    #[strum(serialize = "1")]
    Monday,
    #[serde(rename = "2")]
    #[strum(serialize = "2")]
    Tuesday,
    #[serde(rename = "3")]
    #[strum(serialize = "3")]
    Wednesday,
    #[serde(rename = "4")]
    #[strum(serialize = "4")]
    Thursday,
    #[serde(rename = "5")]
    #[strum(serialize = "5")]
    Friday,
    #[serde(rename = "6")]
    #[strum(serialize = "6")]
    Saturday,
    #[serde(rename = "7")]
    #[strum(serialize = "7")]
    Sunday,
}

impl From<chrono::Weekday> for Weekday {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

/// The complete button configuration for one site.
///
/// Missing keys in a persisted record are filled from [`Settings::default`], so a record read
/// back from the store is always fully populated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub enabled: bool,
    /// Digits with an optional leading `+`. Empty means the button is not configured.
    pub phone: String,
    pub position: Position,
    pub label: String,
    /// Pre-filled chat text, may span several lines.
    pub default_message: String,
    /// Empty disables the schedule entirely.
    pub active_days: Vec<Weekday>,
    /// Zero-padded `HH:MM`, compared as strings.
    pub time_from: String,
    pub time_to: String,
    pub exclude_post_types: Vec<String>,
    pub exclude_page_ids: Vec<u64>,
    pub exclude_special: Vec<SpecialPage>,
}

impl Settings {
    /// Fixed key the record is stored under.
    pub const OPTION_KEY: &'static str = "wpmu_whatsapp_settings";
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: false,
            phone: String::new(),
            position: Position::Right,
            label: String::new(),
            default_message: String::new(),
            active_days: vec![
                Weekday::Monday,
                Weekday::Tuesday,
                Weekday::Wednesday,
                Weekday::Thursday,
                Weekday::Friday,
            ],
            time_from: DEFAULT_TIME_FROM.to_owned(),
            time_to: DEFAULT_TIME_TO.to_owned(),
            exclude_post_types: Vec::new(),
            exclude_page_ids: Vec::new(),
            exclude_special: Vec::new(),
        }
    }
}

/// Drops repeated values while keeping the first occurrence of each in place.
pub(crate) fn unique<T, I>(values: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|value| seen.insert(value.clone()))
        .collect()
}
