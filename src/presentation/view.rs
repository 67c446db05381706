//! Host-side state of the terminal page: focus, scrolling, modal prompts
//! and the handling of requests the controller raises.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::application::{FormSubmission, HostRequest, InteractionController, PageEvent};
use crate::domain::{Bounds, ElementId, Page, Viewport};
use crate::infrastructure::ResultsExporter;

pub const DEFAULT_EXPORT_FILE: &str = "vetcheck_results.csv";

#[derive(Debug, Clone, PartialEq)]
pub enum ViewMode {
    Browse,
    Confirm { form: ElementId, message: String },
    Help,
}

/// Something keyboard focus can rest on.
#[derive(Debug, Clone, PartialEq)]
pub enum FocusTarget {
    Button(ElementId),
    Card(ElementId),
    Field(ElementId),
    Submit { form: ElementId },
}

impl FocusTarget {
    pub fn element(&self) -> &ElementId {
        match self {
            Self::Button(id) | Self::Card(id) | Self::Field(id) => id,
            Self::Submit { form } => form,
        }
    }
}

#[derive(Debug)]
pub struct PageView {
    pub mode: ViewMode,
    pub focus_order: Vec<FocusTarget>,
    pub focus: usize,
    pub status_message: Option<String>,
    pub last_submission: Option<FormSubmission>,
    pub export_path: PathBuf,
    pub help_scroll: usize,
    pub should_quit: bool,
}

impl PageView {
    pub fn new(page: &Page) -> Self {
        Self {
            mode: ViewMode::Browse,
            focus_order: Self::build_focus_order(page),
            focus: 0,
            status_message: None,
            last_submission: None,
            export_path: PathBuf::from(DEFAULT_EXPORT_FILE),
            help_scroll: 0,
            should_quit: false,
        }
    }

    /// Toolbar buttons first, then page elements top to bottom.
    fn build_focus_order(page: &Page) -> Vec<FocusTarget> {
        let mut positioned: Vec<(f64, FocusTarget)> = Vec::new();
        for card in &page.cards {
            positioned.push((card.bounds.top, FocusTarget::Card(card.id.clone())));
        }
        for form in &page.forms {
            for field in page.fields_of(form) {
                positioned.push((field.bounds.top, FocusTarget::Field(field.id.clone())));
            }
            if form.submit.is_some() {
                if let Some(bounds) = submit_bounds(page, &form.id) {
                    positioned.push((bounds.top, FocusTarget::Submit { form: form.id.clone() }));
                }
            }
        }
        positioned.sort_by(|a, b| a.0.total_cmp(&b.0));

        page.buttons
            .iter()
            .map(|button| FocusTarget::Button(button.id.clone()))
            .chain(positioned.into_iter().map(|(_, target)| target))
            .collect()
    }

    pub fn focused(&self) -> Option<&FocusTarget> {
        self.focus_order.get(self.focus)
    }

    pub fn is_focused(&self, target: &FocusTarget) -> bool {
        self.focused() == Some(target)
    }

    /// Moves focus by `step` places, wrapping. Leaving a field reports a focus loss.
    pub fn move_focus(&mut self, controller: &mut InteractionController, step: isize, now: u64) {
        if self.focus_order.is_empty() {
            return;
        }
        self.leave_focus(controller, now);
        let len = self.focus_order.len() as isize;
        self.focus = (self.focus as isize + step).rem_euclid(len) as usize;
        self.ensure_focus_visible(controller, now);
    }

    fn leave_focus(&mut self, controller: &mut InteractionController, now: u64) {
        if let Some(FocusTarget::Field(field)) = self.focused() {
            controller.handle(PageEvent::FieldFocusLost { field: field.clone() }, now);
        }
    }

    pub fn focus_on(&mut self, controller: &mut InteractionController, element: &ElementId, now: u64) {
        let Some(index) = self
            .focus_order
            .iter()
            .position(|target| matches!(target, FocusTarget::Field(id) if id == element))
        else {
            warn!(element = %element, "focus request for unfocusable element");
            return;
        };
        if index != self.focus {
            self.leave_focus(controller, now);
            self.focus = index;
        }
    }

    /// Scrolls just enough to bring the focused element into view.
    pub fn ensure_focus_visible(&mut self, controller: &mut InteractionController, now: u64) {
        let Some(bounds) = self
            .focused()
            .and_then(|target| focus_bounds(controller.page(), target))
        else {
            return;
        };
        let viewport = controller.viewport();
        if bounds.top < viewport.scroll_top {
            self.scroll_to(controller, bounds.top, now);
        } else if bounds.bottom() > viewport.scroll_top + viewport.height {
            self.scroll_to(controller, bounds.bottom() - viewport.height, now);
        }
    }

    pub fn scroll_by(&mut self, controller: &mut InteractionController, delta: f64, now: u64) {
        let top = controller.viewport().scroll_top + delta;
        self.scroll_to(controller, top, now);
    }

    /// Scrolls to `top`, clamped to the page.
    pub fn scroll_to(&mut self, controller: &mut InteractionController, top: f64, now: u64) {
        let viewport = controller.viewport();
        let max_top = (controller.page().height - viewport.height).max(0.0);
        let top = top.clamp(0.0, max_top);
        if top != viewport.scroll_top {
            controller.handle(
                PageEvent::ViewportScrolled {
                    viewport: Viewport::new(top, viewport.height),
                },
                now,
            );
        }
    }

    pub fn resize(&mut self, controller: &mut InteractionController, height: f64, now: u64) {
        let viewport = controller.viewport();
        controller.handle(
            PageEvent::ViewportScrolled {
                viewport: Viewport::new(viewport.scroll_top, height),
            },
            now,
        );
    }

    /// Carries out every pending controller request.
    pub fn apply_requests(&mut self, controller: &mut InteractionController, now: u64) {
        for request in controller.take_requests() {
            match request {
                HostRequest::ScrollTo { top } => self.scroll_to(controller, top, now),
                HostRequest::Focus { element } => self.focus_on(controller, &element, now),
                HostRequest::ConfirmReset { form, message } => {
                    self.mode = ViewMode::Confirm { form, message };
                }
                HostRequest::Submit(submission) => {
                    info!(form = %submission.form, answers = submission.values.len(), "submission handed off");
                    self.status_message = Some(format!(
                        "Submitted {} answers from {}",
                        submission.values.len(),
                        submission.form
                    ));
                    self.last_submission = Some(submission);
                }
                HostRequest::ExportResults => self.export_results(controller, now),
            }
        }
    }

    fn export_results(&mut self, controller: &mut InteractionController, now: u64) {
        let Some(results) = controller.page().results.as_ref() else {
            return;
        };
        let outcome = ResultsExporter::export_to_path(results, &self.export_path)
            .map_err(|err| err.to_string());
        controller.set_export_result(outcome, now);
    }
}

/// Row occupied by a form's submit control: directly below its last field.
pub fn submit_bounds(page: &Page, form: &ElementId) -> Option<Bounds> {
    let form = page.form(form)?;
    let bottom = page
        .fields_of(form)
        .map(|field| field.bounds.bottom())
        .fold(None, |acc: Option<f64>, bottom| Some(acc.map_or(bottom, |acc| acc.max(bottom))))?;
    Some(Bounds::new(bottom, 1.0))
}

fn focus_bounds(page: &Page, target: &FocusTarget) -> Option<Bounds> {
    match target {
        FocusTarget::Button(_) => None,
        FocusTarget::Submit { form } => submit_bounds(page, form),
        FocusTarget::Card(id) | FocusTarget::Field(id) => page.bounds_of(id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{Capabilities, InteractionConfig};
    use crate::infrastructure::PageRepository;
    use tempfile::tempdir;

    fn demo_controller() -> InteractionController {
        let page = PageRepository::demo_page().expect("demo page");
        let mut controller = InteractionController::new(
            page,
            InteractionConfig::default(),
            Capabilities::default(),
            Viewport::new(0.0, 20.0),
        )
        .expect("controller");
        controller.start(0);
        controller
    }

    #[test]
    fn test_focus_order_starts_with_toolbar() {
        let controller = demo_controller();
        let view = PageView::new(controller.page());
        let buttons = controller.page().buttons.len();
        assert!(view.focus_order[..buttons]
            .iter()
            .all(|target| matches!(target, FocusTarget::Button(_))));
        assert!(view
            .focus_order
            .iter()
            .any(|target| matches!(target, FocusTarget::Submit { .. })));
    }

    #[test]
    fn test_moving_focus_scrolls_field_into_view() {
        let mut controller = demo_controller();
        let mut view = PageView::new(controller.page());
        let owner = view
            .focus_order
            .iter()
            .position(|target| target == &FocusTarget::Field("owner_name".into()))
            .expect("owner field focusable");

        view.focus = owner - 1;
        view.move_focus(&mut controller, 1, 10);
        let viewport = controller.viewport();
        let bounds = controller.page().bounds_of(&"owner_name".into()).expect("bounds");
        assert!(bounds.top >= viewport.scroll_top);
        assert!(bounds.bottom() <= viewport.scroll_top + viewport.height);
    }

    #[test]
    fn test_scroll_is_clamped_to_page() {
        let mut controller = demo_controller();
        let mut view = PageView::new(controller.page());
        view.scroll_by(&mut controller, -10.0, 0);
        assert_eq!(controller.viewport().scroll_top, 0.0);

        view.scroll_to(&mut controller, 10_000.0, 10);
        let max = controller.page().height - controller.viewport().height;
        assert_eq!(controller.viewport().scroll_top, max);
    }

    #[test]
    fn test_export_request_writes_csv() {
        let dir = tempdir().expect("tempdir");
        let mut controller = demo_controller();
        let mut view = PageView::new(controller.page());
        view.export_path = dir.path().join("out.csv");

        controller.handle(
            PageEvent::ElementClicked {
                element: "export-results".into(),
            },
            0,
        );
        view.apply_requests(&mut controller, 0);

        let content = std::fs::read_to_string(&view.export_path).expect("exported");
        assert!(content.contains("Health status"));
        assert!(controller.notifications()[0].message.starts_with("Results exported to"));
    }

    #[test]
    fn test_reset_request_opens_confirmation() {
        let mut controller = demo_controller();
        let mut view = PageView::new(controller.page());
        controller.handle(
            PageEvent::ElementClicked {
                element: "reset-form".into(),
            },
            0,
        );
        view.apply_requests(&mut controller, 0);
        assert!(matches!(view.mode, ViewMode::Confirm { ref form, .. } if form.as_str() == "health-check"));
    }
}
