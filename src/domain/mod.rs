pub mod models;
pub mod page;
pub mod validity;
pub mod errors;

pub use models::*;
pub use page::*;
pub use validity::*;
pub use errors::*;
