//! The per-page-view decision: is the button shown, and where does it link to.
//!
//! Checks run in a fixed order and the first failing one hides the button. A disabled toggle or
//! an empty phone number override everything else, and whole-page exclusions (front page,
//! archives, ...) win over post type and post id exclusions.

use chrono::{Datelike, NaiveDateTime};
use strum::IntoEnumIterator;
use tracing::{debug, warn};

use crate::{
    clock::ClockError,
    settings::{OPEN_TIME_FROM, OPEN_TIME_TO, Position, Settings, SpecialPage, Weekday},
};

const WHATSAPP_BASE_URL: &str = "https://wa.me/";

/// How the host classifies the page being viewed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageContext {
    pub is_front_page: bool,
    pub is_posts_index: bool,
    pub is_archive: bool,
    pub is_search: bool,
    pub is_not_found: bool,
    /// Present only when the page shows a single content item.
    pub singular: Option<Singular>,
}

/// The content item behind a singular page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Singular {
    pub post_type: String,
    pub post_id: u64,
}

impl PageContext {
    pub fn is_singular(&self) -> bool {
        self.singular.is_some()
    }

    fn is(&self, page: SpecialPage) -> bool {
        match page {
            SpecialPage::FrontPage => self.is_front_page,
            SpecialPage::PostsPage => self.is_posts_index,
            SpecialPage::Archive => self.is_archive,
            SpecialPage::Search => self.is_search,
            SpecialPage::NotFound => self.is_not_found,
        }
    }
}

/// What the rendering layer gets to draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Hidden,
    Shown {
        link: String,
        label: String,
        position: Position,
    },
}

impl Verdict {
    pub fn is_shown(&self) -> bool {
        matches!(self, Verdict::Shown { .. })
    }

    pub fn link(&self) -> Option<&str> {
        match self {
            Verdict::Shown { link, .. } => Some(link),
            Verdict::Hidden => None,
        }
    }
}

pub fn should_show(
    settings: &Settings,
    now: Result<NaiveDateTime, ClockError>,
    page: &PageContext,
) -> Verdict {
    if !settings.enabled {
        debug!("Hidden: button disabled");
        return Verdict::Hidden;
    }
    if settings.phone.is_empty() {
        debug!("Hidden: no phone number configured");
        return Verdict::Hidden;
    }
    if !is_scheduled(settings, now) {
        return Verdict::Hidden;
    }
    if !is_visible(settings, page) {
        return Verdict::Hidden;
    }

    Verdict::Shown {
        link: build_link(&settings.phone, &settings.default_message),
        label: settings.label.clone(),
        position: settings.position,
    }
}

/// Whether `now` falls inside the active days and the daily time window.
///
/// No active days means no schedule. A clock that cannot resolve the time passes.
pub fn is_scheduled(settings: &Settings, now: Result<NaiveDateTime, ClockError>) -> bool {
    if settings.active_days.is_empty() {
        return true;
    }

    let now = match now {
        Ok(now) => now,
        Err(err) => {
            warn!("Ignoring schedule, could not resolve the current time: {err}");
            return true;
        }
    };

    let day = Weekday::from(now.weekday());
    if !settings.active_days.contains(&day) {
        debug!("Hidden: {day:?} is not an active day");
        return false;
    }

    let from = non_empty_or(&settings.time_from, OPEN_TIME_FROM);
    let to = non_empty_or(&settings.time_to, OPEN_TIME_TO);
    let current = now.format("%H:%M").to_string();

    // Zero-padded 24 hour times order correctly as strings
    let in_window = from <= current.as_str() && current.as_str() <= to;
    if !in_window {
        debug!("Hidden: {current} is outside {from}-{to}");
    }

    in_window
}

/// Whether the page is not excluded by any visibility rule.
pub fn is_visible(settings: &Settings, page: &PageContext) -> bool {
    if let Some(special) = SpecialPage::iter()
        .find(|special| page.is(*special) && settings.exclude_special.contains(special))
    {
        debug!("Hidden: {special} pages are excluded");
        return false;
    }

    let Some(singular) = &page.singular else {
        return true;
    };

    if settings.exclude_post_types.contains(&singular.post_type) {
        debug!("Hidden: post type '{}' is excluded", singular.post_type);
        return false;
    }
    if settings.exclude_page_ids.contains(&singular.post_id) {
        debug!("Hidden: post {} is excluded", singular.post_id);
        return false;
    }

    true
}

/// A WhatsApp deep link to `phone`, pre-filled with `message` when there is one.
pub fn build_link(phone: &str, message: &str) -> String {
    let mut link = format!("{WHATSAPP_BASE_URL}{}", urlencoding::encode(phone));
    if !message.is_empty() {
        link.push_str("?text=");
        link.push_str(&urlencoding::encode(message));
    }
    link
}

fn non_empty_or<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}
