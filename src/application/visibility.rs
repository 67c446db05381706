//! Viewport intersection tracking.
//!
//! The observer is fed the current viewport by the controller and reports
//! which subscribed elements have entered the trigger region. Each
//! subscription is reported at most once; one-shot consumers unsubscribe in
//! the same reaction that handles the report.

use std::collections::BTreeMap;

use tracing::trace;

use super::config::InteractionConfig;
use crate::domain::{Bounds, ElementId, Viewport};

/// What a subscription is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibilityTarget {
    Reveal,
    Counter,
    LazyImage,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibilityOptions {
    pub threshold: f64,
    pub bottom_margin: f64,
}

impl Default for VisibilityOptions {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            bottom_margin: 0.0,
        }
    }
}

impl VisibilityOptions {
    pub fn from_config(config: &InteractionConfig) -> Self {
        Self {
            threshold: config.visibility_threshold,
            bottom_margin: config.visibility_bottom_margin,
        }
    }

    /// Fraction of `bounds` inside the trigger region, or `None` when
    /// the element does not intersect it at all.
    pub fn intersection_ratio(&self, bounds: Bounds, viewport: Viewport) -> Option<f64> {
        let root_top = viewport.scroll_top;
        let root_bottom = viewport.scroll_top + viewport.height - self.bottom_margin;
        if root_bottom <= root_top {
            return None;
        }

        if bounds.height <= 0.0 {
            return (root_top..=root_bottom).contains(&bounds.top).then_some(1.0);
        }

        let overlap = bounds.bottom().min(root_bottom) - bounds.top.max(root_top);
        (overlap > 0.0).then(|| overlap / bounds.height)
    }

    pub fn is_triggered(&self, bounds: Bounds, viewport: Viewport) -> bool {
        self.intersection_ratio(bounds, viewport)
            .is_some_and(|ratio| ratio >= self.threshold)
    }
}

#[derive(Debug, Clone)]
struct Subscription {
    bounds: Bounds,
    target: VisibilityTarget,
    delivered: bool,
}

/// An "entered" report for one subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisibilityEntry {
    pub id: ElementId,
    pub target: VisibilityTarget,
}

#[derive(Debug, Clone)]
pub struct VisibilityObserver {
    options: VisibilityOptions,
    subscriptions: BTreeMap<ElementId, Subscription>,
}

impl VisibilityObserver {
    pub fn new(options: VisibilityOptions) -> Self {
        Self {
            options,
            subscriptions: BTreeMap::new(),
        }
    }

    pub fn options(&self) -> VisibilityOptions {
        self.options
    }

    /// Starts a fresh subscription, replacing any previous one for `id`.
    pub fn observe(&mut self, id: ElementId, bounds: Bounds, target: VisibilityTarget) {
        self.subscriptions.insert(
            id,
            Subscription {
                bounds,
                target,
                delivered: false,
            },
        );
    }

    pub fn unsubscribe(&mut self, id: &ElementId) -> bool {
        self.subscriptions.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Reports subscriptions that entered the trigger region and were not reported before.
    pub fn scan(&mut self, viewport: Viewport) -> Vec<VisibilityEntry> {
        let options = self.options;
        let mut entered = Vec::new();
        for (id, subscription) in self.subscriptions.iter_mut() {
            if subscription.delivered || !options.is_triggered(subscription.bounds, viewport) {
                continue;
            }
            subscription.delivered = true;
            trace!(element = %id, target = ?subscription.target, "element entered view");
            entered.push(VisibilityEntry {
                id: id.clone(),
                target: subscription.target,
            });
        }
        entered
    }
}
