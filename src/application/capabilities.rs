//! Narrow interfaces to platform services the controller consumes.
//!
//! Every capability is optional. An absent capability degrades the feature
//! that needs it to a logged no-op.

use thiserror::Error;

use crate::domain::ResultEntry;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CapabilityError {
    #[error("capability unavailable: {0}")]
    Unavailable(String),
    #[error("capability failed: {0}")]
    Failed(String),
}

/// Analytics collaborator. Fire-and-forget: it has no way to report failure.
pub trait Analytics {
    fn track_event(&mut self, action: &str, category: &str, label: &str);
}

pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> Result<(), CapabilityError>;
}

pub trait PreferenceStore {
    fn get_preference(&self) -> Option<String>;
    fn set_preference(&mut self, value: &str) -> Result<(), CapabilityError>;
}

/// One-time background update registration. Returns a description of the
/// registration on success.
pub trait BackgroundUpdate {
    fn register(&mut self, script: &str) -> Result<String, CapabilityError>;
}

/// A print-formatted rendering of the results region.
#[derive(Debug, Clone, PartialEq)]
pub struct PrintView {
    pub title: String,
    pub heading: String,
    pub entries: Vec<ResultEntry>,
}

pub trait PrintSink {
    fn open(&mut self, view: &PrintView) -> Result<(), CapabilityError>;
}

#[derive(Default)]
pub struct Capabilities {
    pub analytics: Option<Box<dyn Analytics>>,
    pub clipboard: Option<Box<dyn Clipboard>>,
    pub preferences: Option<Box<dyn PreferenceStore>>,
    pub background_update: Option<Box<dyn BackgroundUpdate>>,
    pub print: Option<Box<dyn PrintSink>>,
}

impl std::fmt::Debug for Capabilities {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Capabilities")
            .field("analytics", &self.analytics.is_some())
            .field("clipboard", &self.clipboard.is_some())
            .field("preferences", &self.preferences.is_some())
            .field("background_update", &self.background_update.is_some())
            .field("print", &self.print.is_some())
            .finish()
    }
}
