//! Core domain models for tierup
//!
//! This module contains the fundamental types used throughout the application:
//! - Version strings and lookup outcomes
//! - Dependency edges and the update plan

mod plan;
mod version;

pub use plan::{ChangeKind, DependencyEdge, PlanEntry, SkippedEdge, UpdatePlan};
pub use version::{Lookup, Version};
