//! Build plan output.
//!
//! The plan is the hand-off to an external compiler/linker driver.

pub mod plan;

pub use plan::{BuildPlan, IncludeEntry, LinkEntry, PlannedModule};
