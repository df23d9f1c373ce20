//! tierup - dependency sync and tiered release orchestrator library
//!
//! This library provides the core functionality for keeping a family of Go
//! repositories on each other's latest releases:
//! - A registry of the repositories and their dependency graph
//! - Release tiers derived from that graph
//! - Version lookups against GitHub releases and local `go.mod` files
//! - Update planning and pull-request based application
//! - A tier-by-tier release sequence with human gates

pub mod applier;
pub mod cli;
pub mod config;
pub mod console;
pub mod domain;
pub mod error;
pub mod manifest;
pub mod oracle;
pub mod output;
pub mod progress;
pub mod registry;
pub mod sequencer;
pub mod tools;
pub mod update;
