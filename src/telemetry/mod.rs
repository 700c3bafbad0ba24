// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Structured logging setup.
//!
//! Logs go to stderr so that command output on stdout stays machine-readable.
//!
//! ```rust,ignore
//! use maestro::telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(&TelemetryConfig::from_flags(verbose, debug))?;
//! ```
//!
//! Public async operations carry `#[instrument]`. Record ids, counts and
//! roles as fields; never record API keys or prompt bodies.

mod init;

pub use init::{init_telemetry, TelemetryConfig, TelemetryGuard};
