//! Inbound page events and the reaction registry.
//!
//! The registry maps `(element, event kind)` to the reactions the controller
//! runs, and is built once from the page when the controller is created.

use std::collections::HashMap;

use crate::domain::{ButtonAction, ElementId, Page, Viewport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Enter,
    Space,
    Other,
}

/// Abstract events supplied by whatever drives the page.
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    ViewportScrolled { viewport: Viewport },
    FieldValueChanged { field: ElementId, value: String },
    FieldFocusLost { field: ElementId },
    FormSubmitted { form: ElementId },
    ElementClicked { element: ElementId },
    KeyPressed { element: ElementId, key: Key },
    WindowLoaded { elapsed_ms: u64 },
    RuntimeErrorRaised { detail: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Change,
    Blur,
    Submit,
    Click,
    KeyDown,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reaction {
    ValidateField,
    TrackProgress { form: ElementId },
    MarkHasValue,
    CacheValue,
    SubmitForm,
    ToggleTheme,
    ConfirmReset { form: ElementId },
    PrintResults,
    ExportResults,
    CopyText { text: String },
    ScrollToAnchor { target: ElementId },
    TrackClick { label: String },
    ActivateOnKey,
}

#[derive(Debug, Clone, Default)]
pub struct ReactionRegistry {
    routes: HashMap<(ElementId, EventKind), Vec<Reaction>>,
}

impl ReactionRegistry {
    pub fn build(page: &Page) -> Self {
        let mut registry = Self::default();

        for field in &page.fields {
            let mut on_change = vec![Reaction::ValidateField];
            if let Some(form) = page.form_of(&field.id) {
                on_change.push(Reaction::TrackProgress {
                    form: form.id.clone(),
                });
            }
            if field.is_select() {
                on_change.push(Reaction::MarkHasValue);
            }
            on_change.push(Reaction::CacheValue);

            registry.register(&field.id, EventKind::Change, on_change);
            registry.register(&field.id, EventKind::Blur, vec![Reaction::ValidateField]);
        }

        for form in &page.forms {
            registry.register(&form.id, EventKind::Submit, vec![Reaction::SubmitForm]);
        }

        for button in &page.buttons {
            let mut on_click = match &button.action {
                ButtonAction::ThemeToggle => vec![Reaction::ToggleTheme],
                ButtonAction::Reset { form } => vec![Reaction::ConfirmReset { form: form.clone() }],
                ButtonAction::Print => vec![Reaction::PrintResults],
                ButtonAction::Export => vec![Reaction::ExportResults],
                ButtonAction::Copy { text } => vec![Reaction::CopyText { text: text.clone() }],
                ButtonAction::Anchor { target } => vec![Reaction::ScrollToAnchor {
                    target: target.clone(),
                }],
                ButtonAction::Plain => Vec::new(),
            };
            if button.tracked {
                on_click.push(Reaction::TrackClick {
                    label: button.label.trim().to_string(),
                });
            }
            registry.register(&button.id, EventKind::Click, on_click);
        }

        for card in &page.cards {
            registry.register(&card.id, EventKind::KeyDown, vec![Reaction::ActivateOnKey]);
            if let Some(target) = &card.link {
                registry.register(
                    &card.id,
                    EventKind::Click,
                    vec![Reaction::ScrollToAnchor {
                        target: target.clone(),
                    }],
                );
            }
        }

        registry
    }

    pub fn register(&mut self, element: &ElementId, kind: EventKind, reactions: Vec<Reaction>) {
        if reactions.is_empty() {
            return;
        }
        self.routes
            .entry((element.clone(), kind))
            .or_default()
            .extend(reactions);
    }

    /// Reactions for an element and event kind; empty when nothing is registered.
    pub fn reactions(&self, element: &ElementId, kind: EventKind) -> &[Reaction] {
        self.routes
            .get(&(element.clone(), kind))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
