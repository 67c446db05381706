use crate::application::{InteractionController, Key, PageEvent};
use crate::domain::{ElementId, FieldKind};
use crossterm::event::{KeyCode, KeyModifiers};

use super::view::{FocusTarget, PageView, ViewMode};

pub struct InputHandler;

impl InputHandler {
    pub fn handle_key_event(
        view: &mut PageView,
        controller: &mut InteractionController,
        key: KeyCode,
        modifiers: KeyModifiers,
        now: u64,
    ) {
        match view.mode.clone() {
            ViewMode::Browse => Self::handle_browse_mode(view, controller, key, modifiers, now),
            ViewMode::Confirm { form, .. } => {
                let answer = match key {
                    KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => Some(true),
                    KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => Some(false),
                    _ => None,
                };
                if let Some(accepted) = answer {
                    view.mode = ViewMode::Browse;
                    controller.resolve_reset(&form, accepted, now);
                    view.status_message = Some(if accepted { "Form reset" } else { "Reset cancelled" }.to_string());
                }
            }
            ViewMode::Help => Self::handle_help_mode(view, key),
        }
        view.apply_requests(controller, now);
    }

    fn handle_browse_mode(
        view: &mut PageView,
        controller: &mut InteractionController,
        key: KeyCode,
        modifiers: KeyModifiers,
        now: u64,
    ) {
        if modifiers.contains(KeyModifiers::CONTROL) {
            match key {
                KeyCode::Char('c') | KeyCode::Char('q') => view.should_quit = true,
                KeyCode::Char('d') => {
                    if let Some(newest) = controller.notifications().last().map(|n| n.id) {
                        controller.dismiss_notification(newest);
                    }
                }
                KeyCode::Char('p') => {
                    if !controller.print_results() {
                        view.status_message = Some("Nothing to print".to_string());
                    }
                }
                _ => {}
            }
            return;
        }

        let page_step = (controller.viewport().height - 2.0).max(1.0);
        match key {
            KeyCode::Tab | KeyCode::Down => view.move_focus(controller, 1, now),
            KeyCode::BackTab | KeyCode::Up => view.move_focus(controller, -1, now),
            KeyCode::PageDown => view.scroll_by(controller, page_step, now),
            KeyCode::PageUp => view.scroll_by(controller, -page_step, now),
            KeyCode::F(1) => {
                view.mode = ViewMode::Help;
                view.help_scroll = 0;
            }
            KeyCode::Esc => view.status_message = None,
            _ => {
                if let Some(target) = view.focused().cloned() {
                    Self::handle_focused_key(view, controller, &target, key, now);
                }
            }
        }
    }

    fn handle_focused_key(
        view: &mut PageView,
        controller: &mut InteractionController,
        target: &FocusTarget,
        key: KeyCode,
        now: u64,
    ) {
        match target {
            FocusTarget::Button(id) => {
                if matches!(key, KeyCode::Enter | KeyCode::Char(' ')) {
                    controller.handle(PageEvent::ElementClicked { element: id.clone() }, now);
                }
            }
            FocusTarget::Card(id) => {
                let key = match key {
                    KeyCode::Enter => Key::Enter,
                    KeyCode::Char(' ') => Key::Space,
                    _ => Key::Other,
                };
                controller.handle(PageEvent::KeyPressed { element: id.clone(), key }, now);
            }
            FocusTarget::Submit { form } => {
                if matches!(key, KeyCode::Enter | KeyCode::Char(' ')) {
                    let enabled = controller
                        .page()
                        .form(form)
                        .and_then(|form| form.submit.as_ref())
                        .is_some_and(|submit| !submit.state.loading && !submit.state.disabled);
                    if enabled {
                        controller.handle(PageEvent::FormSubmitted { form: form.clone() }, now);
                    }
                }
            }
            FocusTarget::Field(id) => Self::handle_field_key(view, controller, id, key, now),
        }
    }

    fn handle_field_key(
        view: &mut PageView,
        controller: &mut InteractionController,
        id: &ElementId,
        key: KeyCode,
        now: u64,
    ) {
        let Some(field) = controller.page().field(id) else {
            return;
        };
        let form = controller.page().form_of(id).map(|form| form.id.clone());

        let new_value = match &field.kind {
            FieldKind::Select { options } => match key {
                KeyCode::Right | KeyCode::Char(' ') => Some(cycle_option(options, &field.value, 1)),
                KeyCode::Left => Some(cycle_option(options, &field.value, -1)),
                KeyCode::Backspace | KeyCode::Delete => Some(String::new()),
                _ => None,
            },
            FieldKind::Text { .. } => match key {
                KeyCode::Char(c) => {
                    let mut value = field.value.clone();
                    value.push(c);
                    Some(value)
                }
                KeyCode::Backspace => {
                    let mut value = field.value.clone();
                    value.pop().map(|_| value)
                }
                _ => None,
            },
        };

        if let Some(value) = new_value {
            controller.handle(
                PageEvent::FieldValueChanged {
                    field: id.clone(),
                    value,
                },
                now,
            );
        } else if key == KeyCode::Enter {
            // Enter inside a field submits its form
            if let Some(form) = form {
                view.status_message = None;
                controller.handle(PageEvent::FormSubmitted { form }, now);
            }
        }
    }

    fn handle_help_mode(view: &mut PageView, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q') => {
                view.mode = ViewMode::Browse;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                view.help_scroll = view.help_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                view.help_scroll += 1;
            }
            KeyCode::PageUp => {
                view.help_scroll = view.help_scroll.saturating_sub(5);
            }
            KeyCode::PageDown => {
                view.help_scroll += 5;
            }
            KeyCode::Home => {
                view.help_scroll = 0;
            }
            _ => {}
        }
    }
}

/// Steps through `options` with an empty "nothing selected" slot before the first.
fn cycle_option(options: &[String], current: &str, step: isize) -> String {
    let slots = options.len() as isize + 1;
    let position = options
        .iter()
        .position(|option| option == current)
        .map_or(0, |index| index as isize + 1);
    let next = (position + step).rem_euclid(slots);
    if next == 0 {
        String::new()
    } else {
        options[next as usize - 1].clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{Capabilities, InteractionConfig};
    use crate::domain::Viewport;
    use crate::infrastructure::PageRepository;

    fn setup() -> (PageView, InteractionController) {
        let page = PageRepository::demo_page().expect("demo page");
        let config = InteractionConfig {
            anchor_offset: 3.0,
            ..InteractionConfig::default()
        };
        let mut controller = InteractionController::new(
            page,
            config,
            Capabilities::default(),
            Viewport::new(0.0, 20.0),
        )
        .expect("controller");
        controller.start(0);
        let view = PageView::new(controller.page());
        (view, controller)
    }

    fn focus(view: &mut PageView, target: FocusTarget) {
        view.focus = view
            .focus_order
            .iter()
            .position(|candidate| candidate == &target)
            .expect("target is focusable");
    }

    fn value(controller: &InteractionController, field: &str) -> String {
        controller
            .page()
            .field(&field.into())
            .map(|field| field.value.clone())
            .unwrap_or_default()
    }

    #[test]
    fn test_cycle_option_wraps_through_empty() {
        let options = vec!["Cats".to_string(), "Dogs".to_string()];
        assert_eq!(cycle_option(&options, "", 1), "Cats");
        assert_eq!(cycle_option(&options, "Dogs", 1), "");
        assert_eq!(cycle_option(&options, "", -1), "Dogs");
    }

    #[test]
    fn test_select_cycles_with_arrows() {
        let (mut view, mut controller) = setup();
        focus(&mut view, FocusTarget::Field("animal_name".into()));

        InputHandler::handle_key_event(&mut view, &mut controller, KeyCode::Right, KeyModifiers::NONE, 0);
        assert_eq!(value(&controller, "animal_name"), "Birds");
        InputHandler::handle_key_event(&mut view, &mut controller, KeyCode::Right, KeyModifiers::NONE, 10);
        assert_eq!(value(&controller, "animal_name"), "Cats");
        InputHandler::handle_key_event(&mut view, &mut controller, KeyCode::Left, KeyModifiers::NONE, 20);
        assert_eq!(value(&controller, "animal_name"), "Birds");
        assert!(controller.page().has_class(&"animal_name".into(), "has-value"));
    }

    #[test]
    fn test_typing_into_text_field() {
        let (mut view, mut controller) = setup();
        focus(&mut view, FocusTarget::Field("owner_name".into()));

        for c in "Ann".chars() {
            InputHandler::handle_key_event(&mut view, &mut controller, KeyCode::Char(c), KeyModifiers::NONE, 0);
        }
        InputHandler::handle_key_event(&mut view, &mut controller, KeyCode::Backspace, KeyModifiers::NONE, 0);
        assert_eq!(value(&controller, "owner_name"), "An");
    }

    #[test]
    fn test_enter_in_field_submits_and_focuses_first_invalid() {
        let (mut view, mut controller) = setup();
        focus(&mut view, FocusTarget::Field("owner_name".into()));

        InputHandler::handle_key_event(&mut view, &mut controller, KeyCode::Enter, KeyModifiers::NONE, 0);

        assert_eq!(view.focused(), Some(&FocusTarget::Field("animal_name".into())));
        let form = controller.page().form(&"health-check".into()).expect("form");
        assert!(form.was_validated);
        assert!(!form.submitted);
    }

    #[test]
    fn test_disabled_submit_control_ignores_activation() {
        let (mut view, mut controller) = setup();
        let form: ElementId = "health-check".into();
        focus(&mut view, FocusTarget::Submit { form: form.clone() });

        InputHandler::handle_key_event(&mut view, &mut controller, KeyCode::Enter, KeyModifiers::NONE, 0);
        let state = controller.page().form(&form).expect("form");
        assert!(state.submit.as_ref().is_some_and(|submit| submit.state.disabled));
        assert!(!state.was_validated);
        assert!(view.last_submission.is_none());
        assert_eq!(view.focused(), Some(&FocusTarget::Submit { form }));
    }

    #[test]
    fn test_reset_confirmation_flow() {
        let (mut view, mut controller) = setup();
        focus(&mut view, FocusTarget::Field("animal_name".into()));
        InputHandler::handle_key_event(&mut view, &mut controller, KeyCode::Right, KeyModifiers::NONE, 0);

        focus(&mut view, FocusTarget::Button("reset-form".into()));
        InputHandler::handle_key_event(&mut view, &mut controller, KeyCode::Enter, KeyModifiers::NONE, 10);
        assert!(matches!(view.mode, ViewMode::Confirm { .. }));

        InputHandler::handle_key_event(&mut view, &mut controller, KeyCode::Char('n'), KeyModifiers::NONE, 20);
        assert_eq!(view.mode, ViewMode::Browse);
        assert_eq!(value(&controller, "animal_name"), "Birds");

        InputHandler::handle_key_event(&mut view, &mut controller, KeyCode::Enter, KeyModifiers::NONE, 30);
        InputHandler::handle_key_event(&mut view, &mut controller, KeyCode::Char('y'), KeyModifiers::NONE, 40);
        assert_eq!(value(&controller, "animal_name"), "");
        assert!(controller.cache().is_empty());
    }

    #[test]
    fn test_card_keyboard_activation() {
        let (mut view, mut controller) = setup();
        focus(&mut view, FocusTarget::Card("feature-accuracy".into()));
        InputHandler::handle_key_event(&mut view, &mut controller, KeyCode::Char(' '), KeyModifiers::NONE, 0);
        assert_eq!(controller.viewport().scroll_top, 31.0);
    }

    #[test]
    fn test_ctrl_q_quits_and_help_toggles() {
        let (mut view, mut controller) = setup();
        InputHandler::handle_key_event(&mut view, &mut controller, KeyCode::F(1), KeyModifiers::NONE, 0);
        assert_eq!(view.mode, ViewMode::Help);
        InputHandler::handle_key_event(&mut view, &mut controller, KeyCode::Esc, KeyModifiers::NONE, 0);
        assert_eq!(view.mode, ViewMode::Browse);

        InputHandler::handle_key_event(&mut view, &mut controller, KeyCode::Char('q'), KeyModifiers::CONTROL, 0);
        assert!(view.should_quit);
    }

    #[test]
    fn test_ctrl_d_dismisses_newest_toast() {
        let (mut view, mut controller) = setup();
        controller.show_toast("first", "info", 0);
        controller.show_toast("second", "warning", 0);
        InputHandler::handle_key_event(&mut view, &mut controller, KeyCode::Char('d'), KeyModifiers::CONTROL, 0);
        let remaining: Vec<&str> = controller.notifications().iter().map(|n| n.message.as_str()).collect();
        assert_eq!(remaining, vec!["first"]);
    }
}
