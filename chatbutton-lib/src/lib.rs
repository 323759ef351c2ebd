//! Display logic for a floating WhatsApp chat button.
//!
//! Settings submitted through the admin tabs are merged by [`settings::sanitize`]; on every page
//! view [`visibility::should_show`] decides whether the button is drawn and builds its link.

use thiserror::Error;
use tracing::debug;

use crate::{
    clock::Clock,
    settings::{GroupFlags, RawInput, Settings},
    store::SettingsStore,
    visibility::{PageContext, Verdict},
};

pub mod clock;
pub mod config;
pub mod fs;
pub mod settings;
pub mod store;
pub mod visibility;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Store(#[from] store::Error),
    #[error(transparent)]
    Config(#[from] config::Error),
}

/// Central access point for one site's button.
///
/// Ties the settings store to a clock, so callers only describe the submission or the page
/// being viewed. Settings are read fresh from the store on every call.
#[derive(Debug, Clone)]
pub struct Site<S, C> {
    store: S,
    clock: C,
}

impl<S: SettingsStore, C: Clock> Site<S, C> {
    pub fn new(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// Stores the default settings if the site has none yet.
    pub fn activate(&self) -> Result<Settings> {
        Ok(store::activate(&self.store)?)
    }

    pub fn settings(&self) -> Result<Settings> {
        Ok(store::load_or_default(&self.store)?)
    }

    /// Merges an admin submission into the stored settings and persists the result.
    pub fn submit(&self, input: &RawInput, flags: GroupFlags) -> Result<Settings> {
        let previous = self.store.load()?;
        let settings = settings::sanitize(previous.as_ref(), input, flags);
        self.store.save(&settings)?;

        debug!("Saved submission with {flags:?}");

        Ok(settings)
    }

    /// Decides whether the button is shown on `page` right now.
    pub fn evaluate(&self, page: &PageContext) -> Result<Verdict> {
        let settings = self.settings()?;
        Ok(visibility::should_show(&settings, self.clock.now(), page))
    }
}
