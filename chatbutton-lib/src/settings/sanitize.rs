//! Merging admin submissions into the stored settings record.
//!
//! Each admin tab posts only its own fields, so [`sanitize`] is a merge: a field that is absent
//! from the submission keeps its previous value. Checkbox groups cannot signal "all unchecked"
//! by absence alone, which is what the per-tab sentinel flags in [`GroupFlags`] are for.

use std::sync::LazyLock;

use chrono::NaiveTime;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};
use tracing::debug;

use crate::settings::{OPEN_TIME_FROM, OPEN_TIME_TO, Position, Settings, SpecialPage, unique};

static SCRIPT_OR_STYLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<script[^>]*?>.*?</script>|<style[^>]*?>.*?</style>")
        .expect("static regex must compile")
});
static LESS_THAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^<>]*>?").expect("static regex must compile"));
static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("static regex must compile"));
static LINE_BREAKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\r\n\t ]+").expect("static regex must compile"));
static OCTET: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)%[a-f0-9]{2}").expect("static regex must compile"));
static SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" +").expect("static regex must compile"));

/// A raw settings-form submission. `None` means the field was not part of the payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInput {
    /// Checkbox: any value means checked.
    pub enabled: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub label: Option<String>,
    pub default_message: Option<String>,
    pub active_days: Option<Vec<String>>,
    pub time_from: Option<String>,
    pub time_to: Option<String>,
    pub exclude_post_types: Option<Vec<String>>,
    pub exclude_page_ids: Option<Vec<String>>,
    pub exclude_special: Option<Vec<String>>,
    #[serde(rename = "_schedule_submitted")]
    pub schedule_submitted: Option<String>,
    #[serde(rename = "_visibility_submitted")]
    pub visibility_submitted: Option<String>,
}

impl RawInput {
    /// Reads the hidden sentinels that accompany the schedule and visibility tabs.
    pub fn group_flags(&self) -> GroupFlags {
        GroupFlags {
            schedule_submitted: self.schedule_submitted.is_some(),
            visibility_submitted: self.visibility_submitted.is_some(),
        }
    }
}

/// Which optional field groups are trustworthy in a submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupFlags {
    pub schedule_submitted: bool,
    pub visibility_submitted: bool,
}

/// The settings page tabs. Each one posts its own fields plus the `enabled` toggle.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Display, EnumString, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Tab {
    #[default]
    General,
    Messages,
    Schedule,
    Visibility,
}

impl Tab {
    /// Resolves a requested tab name, falling back to [`Tab::General`] for unknown names.
    pub fn from_query(name: &str) -> Self {
        name.parse().unwrap_or_default()
    }

    /// The sentinel flags a submission of this tab carries.
    pub fn flags(self) -> GroupFlags {
        GroupFlags {
            schedule_submitted: self == Tab::Schedule,
            visibility_submitted: self == Tab::Visibility,
        }
    }
}

/// Merges `incoming` into `previous` (or the defaults when nothing is stored yet).
///
/// Invalid values are coerced or dropped, never reported, so the result is always a complete,
/// well-formed record. Applying the same submission twice yields the same record.
pub fn sanitize(previous: Option<&Settings>, incoming: &RawInput, flags: GroupFlags) -> Settings {
    let mut sanitized = previous.cloned().unwrap_or_default();

    // The toggle is on every tab, so its absence means "unchecked"
    sanitized.enabled = incoming.enabled.is_some();

    if let Some(phone) = &incoming.phone {
        sanitized.phone = sanitize_phone(phone);
    }
    if let Some(position) = &incoming.position {
        sanitized.position = Position::coerce(position);
    }
    if let Some(label) = &incoming.label {
        sanitized.label = sanitize_text_field(label);
    }
    if let Some(message) = &incoming.default_message {
        sanitized.default_message = sanitize_textarea_field(message);
    }

    if flags.schedule_submitted {
        sanitized.active_days = incoming
            .active_days
            .as_deref()
            .map(|days| unique(days.iter().filter_map(|day| day.parse().ok())))
            .unwrap_or_default();
        sanitized.time_from = sanitize_time(incoming.time_from.as_deref(), OPEN_TIME_FROM);
        sanitized.time_to = sanitize_time(incoming.time_to.as_deref(), OPEN_TIME_TO);

        debug!(
            "Merged schedule: days={:?} window={}-{}",
            sanitized.active_days, sanitized.time_from, sanitized.time_to
        );
    }

    if flags.visibility_submitted {
        sanitized.exclude_post_types = incoming
            .exclude_post_types
            .as_deref()
            .map(|types| {
                unique(
                    types
                        .iter()
                        .map(|t| sanitize_key(t))
                        .filter(|t| !t.is_empty()),
                )
            })
            .unwrap_or_default();
        sanitized.exclude_page_ids = incoming
            .exclude_page_ids
            .as_deref()
            .map(|ids| unique(ids.iter().filter_map(|id| parse_page_id(id))))
            .unwrap_or_default();
        sanitized.exclude_special = incoming
            .exclude_special
            .as_deref()
            .map(|pages| unique(pages.iter().filter_map(|p| p.parse::<SpecialPage>().ok())))
            .unwrap_or_default();

        debug!(
            "Merged visibility: types={:?} ids={:?} special={:?}",
            sanitized.exclude_post_types, sanitized.exclude_page_ids, sanitized.exclude_special
        );
    }

    sanitized
}

/// Keeps ASCII digits and a `+` that comes before them.
pub fn sanitize_phone(raw: &str) -> String {
    let mut phone = String::with_capacity(raw.len());
    for c in raw.chars() {
        if c.is_ascii_digit() || (c == '+' && phone.is_empty()) {
            phone.push(c);
        }
    }
    phone
}

/// Single-line plain text: markup removed, whitespace runs collapsed, trimmed.
pub fn sanitize_text_field(raw: &str) -> String {
    sanitize_text(raw, false)
}

/// Multi-line plain text: markup removed, line breaks kept, trimmed.
pub fn sanitize_textarea_field(raw: &str) -> String {
    sanitize_text(raw, true)
}

/// A zero-padded 24 hour `HH:MM`. Missing or unreadable times become `open_bound`.
pub fn sanitize_time(raw: Option<&str>, open_bound: &str) -> String {
    raw.map(sanitize_text_field)
        .and_then(|time| NaiveTime::parse_from_str(&time, "%H:%M").ok())
        .map_or_else(|| open_bound.to_owned(), |time| time.format("%H:%M").to_string())
}

/// Lowercases and keeps only `[a-z0-9_-]`.
pub fn sanitize_key(raw: &str) -> String {
    raw.chars()
        .map(|c| c.to_ascii_lowercase())
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
        .collect()
}

fn sanitize_text(raw: &str, keep_newlines: bool) -> String {
    let mut filtered = raw.to_owned();

    if filtered.contains('<') {
        // A `<` that never closes is text, not markup
        filtered = LESS_THAN
            .replace_all(&filtered, |caps: &Captures| {
                let matched = caps.get(0).map_or("", |m| m.as_str());
                if matched.ends_with('>') {
                    matched.to_owned()
                } else {
                    escape_html(matched)
                }
            })
            .into_owned();
        filtered = SCRIPT_OR_STYLE.replace_all(&filtered, "").into_owned();
        filtered = TAG.replace_all(&filtered, "").into_owned();
    }

    if !keep_newlines {
        filtered = LINE_BREAKS.replace_all(&filtered, " ").into_owned();
    }
    filtered = filtered.trim().to_owned();

    let mut found = false;
    while OCTET.is_match(&filtered) {
        filtered = OCTET.replace_all(&filtered, "").into_owned();
        found = true;
    }
    if found {
        filtered = SPACES.replace_all(&filtered, " ").trim().to_owned();
    }

    filtered
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Integer coercion of a submitted id: leading whitespace and digits are read, anything after
/// them is ignored. Zero, negative and non-numeric entries yield `None`.
fn parse_page_id(raw: &str) -> Option<u64> {
    let trimmed = raw.trim_start();
    let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if unsigned.starts_with('-') {
        return None;
    }

    let digits_end = unsigned
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(unsigned.len());
    unsigned
        .get(..digits_end)
        .and_then(|digits| digits.parse::<u64>().ok())
        .filter(|id| *id > 0)
}
