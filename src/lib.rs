//! # Daylightr Library
//!
//! Adaptive display brightness engine behind the `daylightr` binary.
//!
//! This library exists to enable testing of the adaptation engine and provide clean separation
//! between CLI dispatch (main.rs) and application logic.
//!
//! ## Architecture
//!
//! The library is organized into several layers:
//!
//! - **Entry Point**: `Daylightr` struct runs the daemon loop with resource management
//! - **Core Logic**: `core` holds the curve model, the solar schedule, the transition stepper
//!   and the `AdaptationController` that ties them together
//! - **Backends**: `backend` module with dry-run and external-command hardware writers
//! - **Configuration**: `config` module for TOML-based settings
//! - **Commands**: `commands` module for CLI subcommands (preview, set, simulate, help)
//! - **Collaborators**: `geo` for sunrise/sunset times, `sensor` for sync-mode readings
//! - **State**: `state` for per-display records and change notifications
//! - **Infrastructure**: Signal handling, logging, injectable time source, and utilities

// Import macros from logger module for use in all submodules
#[macro_use]
pub mod logger;

// Public API modules
pub mod args;
pub mod backend;
pub mod commands;
pub mod common;
pub mod config;
pub mod core;
pub mod geo;
pub mod sensor;
pub mod signals;
pub mod state;
pub mod time_source;

// Internal modules
mod daylightr;

// Re-export for binary and integration tests
pub use crate::core::{AdaptOutcome, AdaptationController, Signal, SkipReason};
pub use crate::core::error::AdaptError;
pub use daylightr::Daylightr;
