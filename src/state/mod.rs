//! Application state module

pub mod forms;
mod submission;

pub use submission::*;
