use crate::application::{CapabilityError, Clipboard};
use tracing::warn;

/// System clipboard backed by `arboard`.
pub struct SystemClipboard {
    inner: arboard::Clipboard,
}

impl SystemClipboard {
    /// Connects to the system clipboard. `None` when no clipboard is reachable,
    /// e.g. on a headless session.
    pub fn connect() -> Option<Self> {
        match arboard::Clipboard::new() {
            Ok(inner) => Some(Self { inner }),
            Err(err) => {
                warn!(error = %err, "system clipboard unavailable");
                None
            }
        }
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&mut self, text: &str) -> Result<(), CapabilityError> {
        self.inner
            .set_text(text.to_string())
            .map_err(|err| CapabilityError::Failed(err.to_string()))
    }
}
