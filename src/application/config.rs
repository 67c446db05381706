//! Tunable timings and thresholds for the interaction layer.

use serde::{Deserialize, Serialize};

/// Settings shared by every component the controller owns.
///
/// All durations are milliseconds. Distances are page rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InteractionConfig {
    /// Lifetime of a notification that is not dismissed
    pub toast_timeout_ms: u64,
    /// Time a counter takes to reach its target
    pub counter_duration_ms: u64,
    /// Period of one counter animation tick
    pub tick_ms: u64,
    /// Fraction of an element that must be visible to trigger
    pub visibility_threshold: f64,
    /// Rows trimmed off the bottom of the trigger region
    pub visibility_bottom_margin: f64,
    /// Quiet window before cached text input is written
    pub input_debounce_ms: u64,
    /// Minimum spacing between visibility scans while scrolling
    pub scroll_throttle_ms: u64,
    /// Quiet window after scrolling before the navbar state is updated
    pub scroll_debounce_ms: u64,
    /// Scroll offset beyond which the navbar is marked scrolled
    pub navbar_scroll_threshold: f64,
    /// Rows kept clear above an anchor target for the fixed navbar
    pub anchor_offset: f64,
    /// Load time above which a slow-load event is tracked
    pub slow_load_ms: u64,
    /// Script handed to the background-update capability at load
    pub background_update_script: String,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            toast_timeout_ms: 5_000,
            counter_duration_ms: 2_000,
            tick_ms: 16,
            visibility_threshold: 0.1,
            visibility_bottom_margin: 50.0,
            input_debounce_ms: 300,
            scroll_throttle_ms: 100,
            scroll_debounce_ms: 150,
            navbar_scroll_threshold: 50.0,
            anchor_offset: 80.0,
            slow_load_ms: 3_000,
            background_update_script: "/static/js/sw.js".to_string(),
        }
    }
}

impl InteractionConfig {
    /// Number of ticks a counter animation takes.
    pub fn counter_ticks(&self) -> u32 {
        (self.counter_duration_ms / self.tick_ms.max(1)).max(1) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_counter_ticks() {
        let config = InteractionConfig::default();
        assert_eq!(config.counter_ticks(), 125);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: InteractionConfig =
            serde_json::from_str(r#"{ "toast_timeout_ms": 1000 }"#).expect("valid config");
        assert_eq!(config.toast_timeout_ms, 1_000);
        assert_eq!(config.tick_ms, 16);
        assert_eq!(config.visibility_threshold, 0.1);
    }

    #[test]
    fn test_counter_ticks_never_zero() {
        let config = InteractionConfig {
            counter_duration_ms: 5,
            tick_ms: 16,
            ..InteractionConfig::default()
        };
        assert_eq!(config.counter_ticks(), 1);
    }
}
