//! VetCheck - client-side interaction layer for an animal health check page.
//!
//! Field validation, form progress, animated counters, lazy images,
//! notifications and visibility-driven effects, driven by abstract page
//! events and a host-supplied clock, with a terminal host on top.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
