//! # Objar Support
//!
//! Shared utilities for the Objar service container.
//!
//! This crate provides:
//! - Text rendering for error messages (dependency chains, suggestions)
//! - Tracing subscriber installation for binaries and demos

pub mod rendering;
pub mod telemetry;
