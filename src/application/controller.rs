//! Root interaction controller.
//!
//! Owns the page and every component for the lifetime of one page view,
//! routes inbound events through the reaction registry, fires timers when
//! the host advances the clock, and collects requests the host must carry
//! out (scrolling, focus, confirmation prompts, submission, export).

use std::any::Any;
use std::collections::{HashMap, VecDeque};
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::{debug, info, warn};

use super::cache::FormCache;
use super::capabilities::{Capabilities, PrintView};
use super::config::InteractionConfig;
use super::counter::CounterAnimator;
use super::events::{EventKind, Key, PageEvent, Reaction, ReactionRegistry};
use super::lazy::LazyMediaLoader;
use super::notify::NotificationManager;
use super::progress::{ProgressTracker, SubmitOutcome};
use super::scheduler::{Debouncer, Throttle, TimerQueue, TimerTask};
use super::validator::FieldValidator;
use super::visibility::{VisibilityObserver, VisibilityOptions, VisibilityTarget};
use crate::domain::{
    CounterPhase, DomainError, DomainResult, ElementId, Notification, NotificationId, Page,
    ProgressState, Theme, Viewport, NAVBAR_ID,
};

pub const COPY_SUCCESS_MESSAGE: &str = "Copied to clipboard!";
pub const COPY_FAILURE_MESSAGE: &str = "Failed to copy to clipboard";
pub const EXPORT_FAILURE_MESSAGE: &str = "Failed to export results";
pub const RESET_CONFIRM_MESSAGE: &str =
    "Are you sure you want to reset the form? All entered data will be lost.";
pub const PRINT_TITLE: &str = "Animal Health Report";

/// Field values handed to the host when a form passes validation.
#[derive(Debug, Clone, PartialEq)]
pub struct FormSubmission {
    pub form: ElementId,
    pub values: Vec<(String, String)>,
}

/// Work the controller asks the host to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum HostRequest {
    ScrollTo { top: f64 },
    Focus { element: ElementId },
    ConfirmReset { form: ElementId, message: String },
    Submit(FormSubmission),
    ExportResults,
}

#[derive(Debug)]
pub struct InteractionController {
    page: Page,
    config: InteractionConfig,
    capabilities: Capabilities,
    registry: ReactionRegistry,
    queue: TimerQueue,
    animation_observer: VisibilityObserver,
    media_observer: VisibilityObserver,
    counters: CounterAnimator,
    notifications: NotificationManager,
    cache: FormCache,
    input_debouncers: HashMap<ElementId, Debouncer>,
    scroll_debouncer: Debouncer,
    scroll_throttle: Throttle,
    viewport: Viewport,
    theme: Theme,
    hero_offset: f64,
    requests: VecDeque<HostRequest>,
    background_registered: bool,
    started: bool,
}

impl InteractionController {
    /// Creates a controller for `page`. Fails if the page declaration is inconsistent.
    pub fn new(
        page: Page,
        config: InteractionConfig,
        capabilities: Capabilities,
        viewport: Viewport,
    ) -> DomainResult<Self> {
        page.validate()?;
        let registry = ReactionRegistry::build(&page);
        debug!(routes = registry.len(), "reaction registry built");

        Ok(Self {
            registry,
            queue: TimerQueue::new(),
            animation_observer: VisibilityObserver::new(VisibilityOptions::from_config(&config)),
            media_observer: VisibilityObserver::new(VisibilityOptions::default()),
            counters: CounterAnimator::new(&config),
            notifications: NotificationManager::new(config.toast_timeout_ms),
            cache: FormCache::default(),
            input_debouncers: HashMap::new(),
            scroll_debouncer: Debouncer::new(config.scroll_debounce_ms),
            scroll_throttle: Throttle::new(config.scroll_throttle_ms),
            viewport,
            theme: Theme::default(),
            hero_offset: 0.0,
            requests: VecDeque::new(),
            background_registered: false,
            started: false,
            page,
            config,
            capabilities,
        })
    }

    /// Applies the stored theme, subscribes visibility consumers, computes
    /// initial progress and reveals whatever is already in view.
    pub fn start(&mut self, now: u64) {
        if self.started {
            return;
        }
        self.started = true;

        let preference = self
            .capabilities
            .preferences
            .as_ref()
            .and_then(|store| store.get_preference());
        self.theme = Theme::from_preference(preference.as_deref());

        for card in &self.page.cards {
            self.animation_observer
                .observe(card.id.clone(), card.bounds, VisibilityTarget::Reveal);
        }
        for counter in &self.page.counters {
            self.animation_observer
                .observe(counter.id.clone(), counter.bounds, VisibilityTarget::Counter);
        }
        for image in self.page.images.iter().filter(|image| image.data_src.is_some()) {
            self.media_observer
                .observe(image.id.clone(), image.bounds, VisibilityTarget::LazyImage);
        }

        let forms: Vec<ElementId> = self.page.forms.iter().map(|form| form.id.clone()).collect();
        for form in &forms {
            if let Err(err) = ProgressTracker::recompute(&mut self.page, form) {
                warn!(form = %form, error = %err, "initial progress failed");
            }
        }

        self.scan_visibility(now);
        info!(
            page = %self.page.title,
            theme = self.theme.as_str(),
            "interaction layer initialized"
        );
    }

    /// Handles one inbound event. Any fault inside a reaction is contained
    /// here and surfaced as the generic error notification.
    pub fn handle(&mut self, event: PageEvent, now: u64) {
        let outcome = match event {
            PageEvent::ViewportScrolled { viewport } => {
                self.on_scroll(viewport, now);
                Ok(())
            }
            PageEvent::FieldValueChanged { field, value } => self.on_field_changed(&field, value, now),
            PageEvent::FieldFocusLost { field } => self.dispatch(&field, EventKind::Blur, now),
            PageEvent::FormSubmitted { form } => self.dispatch(&form, EventKind::Submit, now),
            PageEvent::ElementClicked { element } => self.dispatch(&element, EventKind::Click, now),
            PageEvent::KeyPressed { element, key } => match key {
                Key::Enter | Key::Space => self.dispatch(&element, EventKind::KeyDown, now),
                Key::Other => Ok(()),
            },
            PageEvent::WindowLoaded { elapsed_ms } => {
                self.on_window_loaded(elapsed_ms);
                Ok(())
            }
            PageEvent::RuntimeErrorRaised { detail } => {
                self.notifications
                    .raise_global_error(&mut self.queue, now, &detail);
                Ok(())
            }
        };

        if let Err(err) = outcome {
            self.notifications
                .raise_global_error(&mut self.queue, now, &err.to_string());
        }
    }

    /// Fires every timer due at or before `now`, in due order.
    pub fn advance(&mut self, now: u64) {
        while let Some(fired) = self.queue.pop_due(now) {
            match fired.task {
                TimerTask::CounterTick(id) => match self.page.counter_mut(&id) {
                    Some(counter)
                        if matches!(counter.phase, CounterPhase::Running { timer, .. } if timer == fired.id) =>
                    {
                        self.counters.tick(counter, &mut self.queue);
                    }
                    _ => {
                        self.queue.cancel(fired.id);
                    }
                },
                TimerTask::RemoveNotification(id) => {
                    self.notifications.expire(id);
                }
                TimerTask::InputSettled(field) => {
                    let owned = self
                        .input_debouncers
                        .get_mut(&field)
                        .is_some_and(|debouncer| debouncer.settle(fired.id));
                    if owned {
                        if let Some(field) = self.page.field(&field) {
                            self.cache.store(&field.name, &field.value);
                        }
                    }
                }
                TimerTask::ScrollSettled => {
                    if self.scroll_debouncer.settle(fired.id) {
                        self.settle_scroll();
                    }
                }
            }
        }
    }

    fn on_field_changed(&mut self, id: &ElementId, value: String, now: u64) -> DomainResult<()> {
        let field = self
            .page
            .field_mut(id)
            .ok_or_else(|| DomainError::UnknownField(id.to_string()))?;
        field.value = value;
        self.dispatch(id, EventKind::Change, now)
    }

    fn dispatch(&mut self, element: &ElementId, kind: EventKind, now: u64) -> DomainResult<()> {
        let reactions = self.registry.reactions(element, kind).to_vec();
        for reaction in reactions {
            self.react(element, kind, reaction, now)?;
        }
        Ok(())
    }

    fn react(&mut self, element: &ElementId, kind: EventKind, reaction: Reaction, now: u64) -> DomainResult<()> {
        match reaction {
            Reaction::ValidateField => {
                let was_validated = self
                    .page
                    .form_of(element)
                    .is_some_and(|form| form.was_validated);
                let field = self
                    .page
                    .field_mut(element)
                    .ok_or_else(|| DomainError::UnknownField(element.to_string()))?;
                if kind == EventKind::Blur {
                    FieldValidator::on_focus_lost(field);
                } else {
                    FieldValidator::on_value_changed(field, was_validated);
                }
            }
            Reaction::TrackProgress { form } => {
                ProgressTracker::recompute(&mut self.page, &form)?;
            }
            Reaction::MarkHasValue => {
                let has_value = self
                    .page
                    .field(element)
                    .ok_or_else(|| DomainError::UnknownField(element.to_string()))?
                    .has_value();
                self.page.set_class(element, "has-value", has_value);
            }
            Reaction::CacheValue => {
                let field = self
                    .page
                    .field(element)
                    .ok_or_else(|| DomainError::UnknownField(element.to_string()))?;
                if field.is_select() {
                    self.cache.store(&field.name, &field.value);
                } else {
                    let wait = self.config.input_debounce_ms;
                    self.input_debouncers
                        .entry(element.clone())
                        .or_insert_with(|| Debouncer::new(wait))
                        .call(&mut self.queue, now, TimerTask::InputSettled(element.clone()));
                }
            }
            Reaction::SubmitForm => self.submit_form(element)?,
            Reaction::ToggleTheme => self.toggle_theme(),
            Reaction::ConfirmReset { form } => {
                self.requests.push_back(HostRequest::ConfirmReset {
                    form,
                    message: RESET_CONFIRM_MESSAGE.to_string(),
                });
            }
            Reaction::PrintResults => {
                self.print_results();
            }
            Reaction::ExportResults => {
                if self.page.results.is_some() {
                    self.requests.push_back(HostRequest::ExportResults);
                } else {
                    debug!("no results region to export");
                }
            }
            Reaction::CopyText { text } => {
                self.copy_to_clipboard(&text, now);
            }
            Reaction::ScrollToAnchor { target } => self.scroll_to_anchor(&target),
            Reaction::TrackClick { label } => self.track("button_click", "navigation", &label),
            Reaction::ActivateOnKey => self.dispatch(element, EventKind::Click, now)?,
        }
        Ok(())
    }

    fn submit_form(&mut self, form_id: &ElementId) -> DomainResult<()> {
        let form = self
            .page
            .form(form_id)
            .ok_or_else(|| DomainError::UnknownForm(form_id.to_string()))?;
        let outcome = ProgressTracker::check_submission(self.page.fields_of(form));
        let values: Vec<(String, String)> = self
            .page
            .fields_of(form)
            .map(|field| (field.name.clone(), field.value.clone()))
            .collect();
        let field_ids = form.fields.clone();

        for id in &field_ids {
            if let Some(field) = self.page.field_mut(id) {
                let valid = field.is_valid();
                FieldValidator::mark(field, valid);
            }
        }
        self.page.add_class(form_id, "was-validated");

        match outcome {
            SubmitOutcome::Blocked { first_invalid } => {
                if let Some(form) = self.page.form_mut(form_id) {
                    form.was_validated = true;
                }
                info!(form = %form_id, field = %first_invalid, "submission blocked by invalid field");
                self.focus_and_center(&first_invalid);
            }
            SubmitOutcome::Allowed => {
                self.track("form_submit", "health_check", "animal_classification");
                if let Some(form) = self.page.form_mut(form_id) {
                    form.was_validated = true;
                    form.submitted = true;
                    if let Some(submit) = form.submit.as_mut() {
                        submit.state.loading = true;
                        submit.state.disabled = true;
                    }
                }
                info!(form = %form_id, fields = values.len(), "form submitted");
                self.requests.push_back(HostRequest::Submit(FormSubmission {
                    form: form_id.clone(),
                    values,
                }));
            }
        }
        Ok(())
    }

    fn focus_and_center(&mut self, element: &ElementId) {
        self.requests.push_back(HostRequest::Focus {
            element: element.clone(),
        });
        if let Some(bounds) = self.page.bounds_of(element) {
            let top = bounds.top + bounds.height / 2.0 - self.viewport.height / 2.0;
            self.requests.push_back(HostRequest::ScrollTo { top: top.max(0.0) });
        }
    }

    fn scroll_to_anchor(&mut self, target: &ElementId) {
        match self.page.bounds_of(target) {
            Some(bounds) => {
                let top = (bounds.top - self.config.anchor_offset).max(0.0);
                self.requests.push_back(HostRequest::ScrollTo { top });
            }
            None => debug!(target = %target, "anchor target not found"),
        }
    }

    /// Intersections are checked on every scroll. Only the parallax offset
    /// is throttled and only the navbar marker waits for the scroll to settle.
    fn on_scroll(&mut self, viewport: Viewport, now: u64) {
        self.viewport = viewport;
        self.scan_visibility(now);
        if self.scroll_throttle.admit(now) {
            self.hero_offset = viewport.scroll_top * -0.5;
        }
        self.scroll_debouncer
            .call(&mut self.queue, now, TimerTask::ScrollSettled);
    }

    fn settle_scroll(&mut self) {
        let scroll_top = self.viewport.scroll_top;
        let scrolled = scroll_top > self.config.navbar_scroll_threshold;
        self.page.set_class(&ElementId::from(NAVBAR_ID), "scrolled", scrolled);
        self.hero_offset = scroll_top * -0.5;
    }

    fn scan_visibility(&mut self, now: u64) {
        let viewport = self.viewport;

        for entry in self.animation_observer.scan(viewport) {
            self.animation_observer.unsubscribe(&entry.id);
            self.page.add_class(&entry.id, "animate-in");
            if entry.target == VisibilityTarget::Counter {
                if let Some(counter) = self.page.counter_mut(&entry.id) {
                    self.counters.start(counter, &mut self.queue, now);
                }
            }
        }

        for entry in self.media_observer.scan(viewport) {
            self.media_observer.unsubscribe(&entry.id);
            if let Some(image) = self.page.image_mut(&entry.id) {
                LazyMediaLoader::on_visible(image);
            }
        }
    }

    fn on_window_loaded(&mut self, elapsed_ms: u64) {
        info!(elapsed_ms, "page loaded");
        if elapsed_ms > self.config.slow_load_ms {
            self.track("performance", "slow_load", &format!("{elapsed_ms}ms"));
        }

        if self.background_registered {
            return;
        }
        self.background_registered = true;
        match self.capabilities.background_update.as_mut() {
            Some(updater) => match updater.register(&self.config.background_update_script) {
                Ok(registration) => info!(registration = %registration, "background update registered"),
                Err(err) => warn!(error = %err, "background update registration failed"),
            },
            None => debug!("background update capability unavailable"),
        }
    }

    fn track(&mut self, action: &str, category: &str, label: &str) {
        debug!(action, category, label, "tracking event");
        if let Some(analytics) = self.capabilities.analytics.as_mut() {
            analytics.track_event(action, category, label);
        }
    }

    /// Runs one unit of host work against the controller. A panic inside
    /// `work` is caught and raised as a runtime error; `None` is returned.
    pub fn guarded<T>(&mut self, now: u64, work: impl FnOnce(&mut Self) -> T) -> Option<T> {
        match catch_unwind(AssertUnwindSafe(|| work(&mut *self))) {
            Ok(value) => Some(value),
            Err(payload) => {
                let detail = panic_detail(payload.as_ref());
                self.handle(PageEvent::RuntimeErrorRaised { detail }, now);
                None
            }
        }
    }

    /// Shows a toast. Unknown severity names fall back to info.
    pub fn show_toast(&mut self, message: &str, severity: &str, now: u64) -> NotificationId {
        self.notifications
            .notify_named(&mut self.queue, now, message, severity)
    }

    pub fn dismiss_notification(&mut self, id: NotificationId) -> bool {
        self.notifications.dismiss(&mut self.queue, id)
    }

    /// Copies `text` and reports the outcome as a toast. Without a clipboard
    /// capability nothing happens and `None` is returned.
    pub fn copy_to_clipboard(&mut self, text: &str, now: u64) -> Option<NotificationId> {
        let Some(clipboard) = self.capabilities.clipboard.as_mut() else {
            warn!("clipboard capability unavailable");
            return None;
        };
        let id = match clipboard.write_text(text) {
            Ok(()) => self.show_toast(COPY_SUCCESS_MESSAGE, "success", now),
            Err(err) => {
                warn!(error = %err, "clipboard write failed");
                self.show_toast(COPY_FAILURE_MESSAGE, "error", now)
            }
        };
        Some(id)
    }

    /// Opens a print view of the results region. Returns whether a view was opened.
    pub fn print_results(&mut self) -> bool {
        let Some(results) = self.page.results.as_ref() else {
            debug!("no results region to print");
            return false;
        };
        let view = PrintView {
            title: PRINT_TITLE.to_string(),
            heading: results.title.clone(),
            entries: results.entries.clone(),
        };
        let Some(sink) = self.capabilities.print.as_mut() else {
            warn!("print capability unavailable");
            return false;
        };
        match sink.open(&view) {
            Ok(()) => {
                info!(entries = view.entries.len(), "print view opened");
                true
            }
            Err(err) => {
                warn!(error = %err, "print view failed");
                false
            }
        }
    }

    pub fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        if let Some(store) = self.capabilities.preferences.as_mut() {
            if let Err(err) = store.set_preference(self.theme.as_str()) {
                warn!(error = %err, "theme preference not saved");
            }
        }
        info!(theme = self.theme.as_str(), "theme toggled");
    }

    /// Completes a reset confirmation. Declining changes nothing.
    pub fn resolve_reset(&mut self, form_id: &ElementId, accepted: bool, now: u64) {
        if !accepted {
            debug!(form = %form_id, "reset declined");
            return;
        }
        if let Err(err) = self.reset_form(form_id) {
            self.notifications
                .raise_global_error(&mut self.queue, now, &err.to_string());
        }
    }

    fn reset_form(&mut self, form_id: &ElementId) -> DomainResult<()> {
        let field_ids = self
            .page
            .form(form_id)
            .ok_or_else(|| DomainError::UnknownForm(form_id.to_string()))?
            .fields
            .clone();

        self.cache.clear();
        for id in &field_ids {
            if let Some(debouncer) = self.input_debouncers.get_mut(id) {
                debouncer.cancel(&mut self.queue);
            }
            if let Some(field) = self.page.field_mut(id) {
                field.value.clear();
                FieldValidator::refresh(field);
            }
            self.page.remove_class(id, "has-value");
        }
        if let Some(form) = self.page.form_mut(form_id) {
            form.submitted = false;
            if let Some(submit) = form.submit.as_mut() {
                submit.state.loading = false;
            }
        }
        ProgressTracker::recompute(&mut self.page, form_id)?;
        info!(form = %form_id, "form reset");
        Ok(())
    }

    /// Reports the outcome of a results export the host performed.
    pub fn set_export_result(&mut self, result: Result<String, String>, now: u64) -> NotificationId {
        match result {
            Ok(path) => self.show_toast(&format!("Results exported to {path}"), "success", now),
            Err(err) => {
                warn!(error = %err, "results export failed");
                self.show_toast(EXPORT_FAILURE_MESSAGE, "error", now)
            }
        }
    }

    /// Drains pending host requests in the order they were raised.
    pub fn take_requests(&mut self) -> Vec<HostRequest> {
        self.requests.drain(..).collect()
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn hero_offset(&self) -> f64 {
        self.hero_offset
    }

    pub fn notifications(&self) -> &[Notification] {
        self.notifications.active()
    }

    pub fn progress(&self, form: &ElementId) -> Option<ProgressState> {
        self.page.form(form).map(|form| form.progress)
    }

    pub fn cache(&self) -> &FormCache {
        &self.cache
    }

    pub fn next_timer_due(&self) -> Option<u64> {
        self.queue.next_due()
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
