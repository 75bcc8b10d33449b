//! Narrative interpretation of diagnostic reports.
//!
//! The text-generation service is an opaque [`Interpreter`]. Requests run in
//! the background and are bound to the report they were made for, so a
//! result that arrives after the selection moved on is dropped.

pub mod interpreter;
pub mod session;

pub use interpreter::*;
pub use session::*;
