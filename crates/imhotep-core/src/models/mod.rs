//! Domain models for the prescription portal.

mod history;
mod record;

pub use history::*;
pub use record::*;
