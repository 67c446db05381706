//! Application layer: the components of the interaction layer and the
//! controller that wires them to page events.
//!
//! Everything here is driven by a host-supplied millisecond clock, so the
//! whole layer runs deterministically under test.

pub mod cache;
pub mod capabilities;
pub mod config;
pub mod controller;
pub mod counter;
pub mod events;
pub mod lazy;
pub mod notify;
pub mod progress;
pub mod scheduler;
pub mod validator;
pub mod visibility;

pub use cache::FormCache;
pub use capabilities::*;
pub use config::InteractionConfig;
pub use controller::*;
pub use counter::CounterAnimator;
pub use events::*;
pub use lazy::LazyMediaLoader;
pub use notify::{NotificationManager, GENERIC_ERROR_MESSAGE};
pub use progress::{ProgressTracker, SubmitOutcome};
pub use scheduler::*;
pub use validator::FieldValidator;
pub use visibility::*;
