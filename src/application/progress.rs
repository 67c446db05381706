//! Form completion tracking and submission gating.

use tracing::debug;

use crate::domain::{DomainError, DomainResult, ElementId, Emphasis, Field, Form, Page, ProgressState};

/// Result of the client-side validity pass on submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Allowed,
    Blocked { first_invalid: ElementId },
}

pub struct ProgressTracker;

impl ProgressTracker {
    /// Counts progress-tracked fields and how many of them have a value.
    pub fn compute<'a>(fields: impl IntoIterator<Item = &'a Field>) -> ProgressState {
        fields
            .into_iter()
            .filter(|field| field.tracks_progress())
            .fold(ProgressState::default(), |mut state, field| {
                state.total += 1;
                if field.has_value() {
                    state.filled += 1;
                }
                state
            })
    }

    /// Stores `progress` on the form and updates the submit control emphasis.
    ///
    /// A control that is already loading keeps its state.
    pub fn apply(form: &mut Form, progress: ProgressState) {
        form.progress = progress;
        if let Some(submit) = form.submit.as_mut() {
            if submit.state.loading {
                return;
            }
            let complete = progress.is_complete();
            submit.state.emphasis = if complete {
                Emphasis::Primary
            } else {
                Emphasis::Outline
            };
            submit.state.disabled = !complete;
        }
    }

    /// Recomputes and applies progress for one form of the page.
    pub fn recompute(page: &mut Page, form_id: &ElementId) -> DomainResult<ProgressState> {
        let form = page
            .form(form_id)
            .ok_or_else(|| DomainError::UnknownForm(form_id.to_string()))?;
        let progress = Self::compute(page.fields_of(form));
        let form = page
            .form_mut(form_id)
            .ok_or_else(|| DomainError::UnknownForm(form_id.to_string()))?;
        Self::apply(form, progress);
        debug!(
            form = %form_id,
            filled = progress.filled,
            total = progress.total,
            percentage = progress.percentage(),
            "progress recomputed"
        );
        Ok(progress)
    }

    /// Runs the native validity check across every field of a form.
    pub fn check_submission<'a>(fields: impl IntoIterator<Item = &'a Field>) -> SubmitOutcome {
        match fields.into_iter().find(|field| !field.is_valid()) {
            Some(field) => SubmitOutcome::Blocked {
                first_invalid: field.id.clone(),
            },
            None => SubmitOutcome::Allowed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Bounds, Constraints, FieldKind, SubmitControl, SubmitState, VisualState};

    fn select(id: &str, value: &str) -> Field {
        Field {
            id: id.into(),
            name: id.to_string(),
            label: id.to_string(),
            kind: FieldKind::Select {
                options: vec!["yes".to_string(), "no".to_string()],
            },
            constraints: Constraints::required(),
            value: value.to_string(),
            bounds: Bounds::default(),
            progress: None,
            visual: VisualState::Pristine,
        }
    }

    fn notes(value: &str) -> Field {
        Field {
            kind: FieldKind::Text {
                placeholder: String::new(),
            },
            constraints: Constraints::default(),
            ..select("notes", value)
        }
    }

    fn form_with_submit() -> Form {
        Form {
            id: "check".into(),
            title: "Check".to_string(),
            fields: Vec::new(),
            submit: Some(SubmitControl {
                id: "submit".into(),
                label: "Submit".to_string(),
                state: SubmitState::default(),
            }),
            progress_bar: true,
            was_validated: false,
            submitted: false,
            progress: ProgressState::default(),
        }
    }

    #[test]
    fn test_compute_counts_only_selects() {
        let fields = [select("a", "yes"), select("b", ""), notes("free text")];
        let progress = ProgressTracker::compute(&fields);
        assert_eq!(progress, ProgressState { filled: 1, total: 2 });
        assert_eq!(progress.percentage(), 50.0);
    }

    #[test]
    fn test_compute_with_no_tracked_fields() {
        let fields = [notes("hello")];
        let progress = ProgressTracker::compute(&fields);
        assert_eq!(progress.total, 0);
        assert_eq!(progress.percentage(), 0.0);

        let mut form = form_with_submit();
        ProgressTracker::apply(&mut form, progress);
        let state = form.submit.as_ref().map(|s| s.state.clone()).unwrap_or_default();
        assert!(state.disabled);
        assert_eq!(state.emphasis, Emphasis::Outline);
    }

    #[test]
    fn test_apply_toggles_submit_emphasis() {
        let mut form = form_with_submit();
        ProgressTracker::apply(&mut form, ProgressState { filled: 2, total: 2 });
        let state = form.submit.as_ref().map(|s| s.state.clone()).unwrap_or_default();
        assert_eq!(state.emphasis, Emphasis::Primary);
        assert!(!state.disabled);

        ProgressTracker::apply(&mut form, ProgressState { filled: 1, total: 2 });
        let state = form.submit.as_ref().map(|s| s.state.clone()).unwrap_or_default();
        assert_eq!(state.emphasis, Emphasis::Outline);
        assert!(state.disabled);
    }

    #[test]
    fn test_check_submission_finds_first_invalid() {
        let fields = [select("a", "yes"), select("b", ""), select("c", "")];
        assert_eq!(
            ProgressTracker::check_submission(&fields),
            SubmitOutcome::Blocked {
                first_invalid: "b".into()
            }
        );

        let fields = [select("a", "yes"), notes("")];
        assert_eq!(ProgressTracker::check_submission(&fields), SubmitOutcome::Allowed);
    }
}
