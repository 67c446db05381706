//! Presentation layer: the terminal host for the interaction layer.
//!
//! Renders the page with ratatui, maps key presses to page events and
//! carries out the requests the controller raises.

pub mod input;
pub mod ui;
pub mod view;

pub use input::*;
pub use ui::*;
pub use view::*;
