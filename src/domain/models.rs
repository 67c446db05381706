use serde::{Deserialize, Serialize};
use std::fmt;

use super::validity::Constraints;

/// Identifier of an element on the page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(pub u64);

/// Vertical extent of an element in page rows.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub top: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// The visible window onto the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub scroll_top: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(scroll_top: f64, height: f64) -> Self {
        Self { scroll_top, height }
    }
}

/// Presentational validity marking of a field.
///
/// Once a field has been marked it only toggles between `Valid` and
/// `Invalid`; there is no transition back to `Pristine`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VisualState {
    #[default]
    Pristine,
    Valid,
    Invalid,
}

impl VisualState {
    pub fn from_validity(valid: bool) -> Self {
        if valid { Self::Valid } else { Self::Invalid }
    }

    pub fn class(&self) -> Option<&'static str> {
        match self {
            Self::Pristine => None,
            Self::Valid => Some("is-valid"),
            Self::Invalid => Some("is-invalid"),
        }
    }

    pub fn is_marked(&self) -> bool {
        !matches!(self, Self::Pristine)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldKind {
    Text {
        #[serde(default)]
        placeholder: String,
    },
    Select {
        options: Vec<String>,
    },
}

/// A single input control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Field {
    pub id: ElementId,
    pub name: String,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub constraints: Constraints,
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub bounds: Bounds,
    /// Overrides whether the field counts towards form progress.
    /// Selection-style controls count by default.
    #[serde(default)]
    pub progress: Option<bool>,
    #[serde(skip)]
    pub visual: VisualState,
}

impl Field {
    pub fn is_valid(&self) -> bool {
        self.constraints.check(&self.kind, &self.value)
    }

    pub fn has_value(&self) -> bool {
        !self.value.is_empty()
    }

    pub fn is_select(&self) -> bool {
        matches!(self.kind, FieldKind::Select { .. })
    }

    pub fn tracks_progress(&self) -> bool {
        self.progress.unwrap_or_else(|| self.is_select())
    }

    /// Options of a select field; empty for free-text fields.
    pub fn options(&self) -> &[String] {
        match &self.kind {
            FieldKind::Select { options } => options,
            FieldKind::Text { .. } => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Emphasis {
    Primary,
    #[default]
    Outline,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitState {
    pub emphasis: Emphasis,
    pub disabled: bool,
    pub loading: bool,
}

impl Default for SubmitState {
    fn default() -> Self {
        Self {
            emphasis: Emphasis::Outline,
            disabled: true,
            loading: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitControl {
    pub id: ElementId,
    pub label: String,
    #[serde(skip)]
    pub state: SubmitState,
}

impl SubmitControl {
    pub fn display_label(&self) -> &str {
        if self.state.loading { "Processing..." } else { &self.label }
    }
}

/// Aggregate completion of the progress-tracked fields of a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressState {
    pub filled: usize,
    pub total: usize,
}

impl ProgressState {
    pub fn percentage(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.filled as f64 / self.total as f64 * 100.0
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.filled == self.total
    }
}

/// A validated group of fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Form {
    pub id: ElementId,
    pub title: String,
    pub fields: Vec<ElementId>,
    #[serde(default)]
    pub submit: Option<SubmitControl>,
    #[serde(default)]
    pub progress_bar: bool,
    /// Set on the first submission attempt; enables continuous feedback.
    #[serde(skip)]
    pub was_validated: bool,
    /// Set only after a validity pass allowed the submission through.
    #[serde(skip)]
    pub submitted: bool,
    #[serde(skip)]
    pub progress: ProgressState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    /// Parses a severity name. Anything unrecognized is `Info`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "success" => Self::Success,
            "warning" => Self::Warning,
            "error" | "danger" => Self::Error,
            _ => Self::Info,
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            Self::Info => "alert-info",
            Self::Success => "alert-success",
            Self::Warning => "alert-warning",
            Self::Error => "alert-danger",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            Self::Info => "fa-info-circle",
            Self::Success => "fa-check-circle",
            Self::Warning => "fa-exclamation-triangle",
            Self::Error => "fa-exclamation-circle",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(pub u64);

/// A transient message. Present in the registry means displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    pub icon: &'static str,
    pub created_at: u64,
    pub removal: Option<TimerId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CounterPhase {
    #[default]
    Idle,
    Running {
        timer: TimerId,
        ticks: u32,
    },
    Settled,
}

/// An animated statistic.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CounterWidget {
    pub id: ElementId,
    pub label: String,
    pub target: u64,
    pub bounds: Bounds,
    #[serde(default)]
    pub suffix: String,
    #[serde(skip)]
    pub displayed: u64,
    #[serde(skip)]
    pub phase: CounterPhase,
}

/// An image whose real source is deferred until it is seen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LazyAsset {
    pub id: ElementId,
    pub alt: String,
    pub bounds: Bounds,
    #[serde(default)]
    pub data_src: Option<String>,
    #[serde(default)]
    pub src: Option<String>,
}

impl LazyAsset {
    pub fn is_loaded(&self) -> bool {
        self.src.is_some()
    }
}

/// A feature card; keyboard-activatable like a button.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: ElementId,
    pub title: String,
    #[serde(default)]
    pub body: String,
    pub bounds: Bounds,
    #[serde(default)]
    pub link: Option<ElementId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ButtonAction {
    ThemeToggle,
    Reset { form: ElementId },
    Print,
    Export,
    Copy { text: String },
    Anchor { target: ElementId },
    Plain,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Button {
    pub id: ElementId,
    pub label: String,
    pub action: ButtonAction,
    #[serde(default)]
    pub tracked: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultEntry {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsRegion {
    pub title: String,
    pub entries: Vec<ResultEntry>,
    pub bounds: Bounds,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Reads a stored preference; anything other than "dark" is light.
    pub fn from_preference(preference: Option<&str>) -> Self {
        match preference {
            Some("dark") => Self::Dark,
            _ => Self::Light,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    /// Icon shown on the toggle: the theme a click switches to.
    pub fn toggle_icon(&self) -> &'static str {
        match self {
            Self::Light => "fa-moon",
            Self::Dark => "fa-sun",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_percentage() {
        let empty = ProgressState { filled: 0, total: 0 };
        assert_eq!(empty.percentage(), 0.0);
        assert!(!empty.is_complete());

        let half = ProgressState { filled: 2, total: 4 };
        assert_eq!(half.percentage(), 50.0);

        let full = ProgressState { filled: 3, total: 3 };
        assert_eq!(full.percentage(), 100.0);
        assert!(full.is_complete());
    }

    #[test]
    fn test_severity_fallback() {
        assert_eq!(Severity::from_name("success"), Severity::Success);
        assert_eq!(Severity::from_name("ERROR"), Severity::Error);
        assert_eq!(Severity::from_name("danger"), Severity::Error);
        assert_eq!(Severity::from_name("bogus"), Severity::Info);
        assert_eq!(Severity::from_name(""), Severity::Info);
        assert_eq!(Severity::Warning.icon(), "fa-exclamation-triangle");
    }

    #[test]
    fn test_theme_preference() {
        assert_eq!(Theme::from_preference(None), Theme::Light);
        assert_eq!(Theme::from_preference(Some("dark")), Theme::Dark);
        assert_eq!(Theme::from_preference(Some("sepia")), Theme::Light);
        assert_eq!(Theme::Light.toggled(), Theme::Dark);
        assert_eq!(Theme::Dark.toggle_icon(), "fa-sun");
    }

    #[test]
    fn test_submit_label_while_loading() {
        let mut control = SubmitControl {
            id: "submit".into(),
            label: "Check health".to_string(),
            state: SubmitState::default(),
        };
        assert_eq!(control.display_label(), "Check health");
        control.state.loading = true;
        assert_eq!(control.display_label(), "Processing...");
    }
}
