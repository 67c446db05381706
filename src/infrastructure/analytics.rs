use crate::application::Analytics;
use tracing::info;

/// Analytics that records events in the log instead of sending them anywhere.
#[derive(Debug, Default)]
pub struct LogAnalytics;

impl Analytics for LogAnalytics {
    fn track_event(&mut self, action: &str, category: &str, label: &str) {
        info!(target: "vetcheck::analytics", action, category, label, "event");
    }
}
