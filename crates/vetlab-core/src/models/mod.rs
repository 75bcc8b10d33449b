//! Domain models for the lab workstation.

mod panel;
mod patient;
mod report;

pub use panel::*;
pub use patient::*;
pub use report::*;
