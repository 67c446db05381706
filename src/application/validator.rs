use crate::domain::{Field, VisualState};

/// Per-field validity evaluation and marking.
///
/// A pristine field is only marked when it loses focus or its form is
/// submitted. Once marked, every value change re-marks it.
pub struct FieldValidator;

impl FieldValidator {
    /// Handles a value change and returns the evaluated validity.
    pub fn on_value_changed(field: &mut Field, form_was_validated: bool) -> bool {
        let valid = field.is_valid();
        if form_was_validated || field.visual.is_marked() {
            Self::mark(field, valid);
        }
        valid
    }

    /// Handles focus leaving the field. Always marks.
    pub fn on_focus_lost(field: &mut Field) -> bool {
        let valid = field.is_valid();
        Self::mark(field, valid);
        valid
    }

    /// Re-evaluates a field that is already marked; pristine fields stay pristine.
    pub fn refresh(field: &mut Field) {
        if field.visual.is_marked() {
            let valid = field.is_valid();
            Self::mark(field, valid);
        }
    }

    pub fn mark(field: &mut Field, valid: bool) {
        field.visual = VisualState::from_validity(valid);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bounds, Constraints, FieldKind};

    fn owner_name() -> Field {
        Field {
            id: "owner".into(),
            name: "owner".to_string(),
            label: "Owner name".to_string(),
            kind: FieldKind::Text {
                placeholder: String::new(),
            },
            constraints: Constraints {
                required: true,
                min_length: Some(2),
                max_length: None,
            },
            value: String::new(),
            bounds: Bounds::default(),
            progress: None,
            visual: VisualState::Pristine,
        }
    }

    #[test]
    fn test_first_interaction_defers_marking_until_blur() {
        let mut field = owner_name();
        field.value = "A".to_string();
        assert!(!FieldValidator::on_value_changed(&mut field, false));
        assert_eq!(field.visual, VisualState::Pristine);

        FieldValidator::on_focus_lost(&mut field);
        assert_eq!(field.visual, VisualState::Invalid);
    }

    #[test]
    fn test_continuous_feedback_after_submission_attempt() {
        let mut field = owner_name();
        field.value = "A".to_string();
        FieldValidator::on_value_changed(&mut field, true);
        assert_eq!(field.visual, VisualState::Invalid);

        field.value = "Ada".to_string();
        FieldValidator::on_value_changed(&mut field, true);
        assert_eq!(field.visual, VisualState::Valid);
    }

    #[test]
    fn test_blurred_field_follows_every_change() {
        let mut field = owner_name();
        field.value = "A".to_string();
        FieldValidator::on_focus_lost(&mut field);
        assert_eq!(field.visual, VisualState::Invalid);

        field.value = "Ada".to_string();
        assert!(FieldValidator::on_value_changed(&mut field, false));
        assert_eq!(field.visual, VisualState::Valid);

        field.value.clear();
        FieldValidator::on_value_changed(&mut field, false);
        assert_eq!(field.visual, VisualState::Invalid);
    }

    #[test]
    fn test_marked_field_never_returns_to_pristine() {
        let mut field = owner_name();
        field.value = "Ada".to_string();
        FieldValidator::on_focus_lost(&mut field);
        field.value.clear();
        FieldValidator::refresh(&mut field);
        assert_eq!(field.visual, VisualState::Invalid);
    }

    #[test]
    fn test_refresh_leaves_pristine_alone() {
        let mut field = owner_name();
        FieldValidator::refresh(&mut field);
        assert_eq!(field.visual, VisualState::Pristine);
    }
}
