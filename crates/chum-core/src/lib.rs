//! chum-core library.
//!
//! Rebuilds consumer attacks from fragmented event log records, names the
//! players involved, rates each attack and orders the result for the credits
//! roll. Network access lives behind the [`source::EventLog`] and
//! [`identity::PlayerDirectory`] traits.
//!
//! # Conventions
//!
//! - **Errors**: `thiserror` enums for library failures, `anyhow::Result` for
//!   config loading.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod classify;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod event;
pub mod identity;
pub mod merge;
pub mod outcome;
pub mod pipeline;
pub mod sort;
pub mod source;
