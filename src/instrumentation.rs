// ABOUTME: Per-call timing hook invoked after every capability call made by a slot
// ABOUTME: Reports method, statement, bound values, error and elapsed time
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Instrumentation
//!
//! A [`TimerHook`] is installed on a [`Synthesizer`](crate::Synthesizer) and
//! shared by every slot it builds. It runs synchronously after each call to
//! the execution capability, whether the call succeeded or not.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use sqlmapper_core::SqlValue;
use tracing::{debug, warn};

/// Timing report for one capability call
#[derive(Debug, Clone, Copy)]
pub struct TimerInfo<'a> {
    /// `"query"` or `"exec"`
    pub method: &'static str,
    /// Slot name
    pub slot: &'a str,
    /// Rendered statement text
    pub statement: &'a str,
    /// Bound values in placeholder order
    pub values: &'a [SqlValue],
    /// Capability error, if the call failed
    pub error: Option<&'a (dyn Error + Send + Sync + 'static)>,
    /// Time spent inside the capability
    pub elapsed: Duration,
}

/// Callback receiving a [`TimerInfo`] after each call
pub type TimerHook = Arc<dyn Fn(&TimerInfo<'_>) + Send + Sync>;

/// Hook that reports every call through `tracing`
///
/// Successful calls log at debug level, failed calls at warn level.
#[must_use]
pub fn logging_hook() -> TimerHook {
    Arc::new(|info: &TimerInfo<'_>| {
        let elapsed_us = u64::try_from(info.elapsed.as_micros()).unwrap_or(u64::MAX);
        match info.error {
            None => debug!(
                method = info.method,
                slot = info.slot,
                statement = info.statement,
                values = ?info.values,
                elapsed_us,
                "Statement executed"
            ),
            Some(error) => warn!(
                method = info.method,
                slot = info.slot,
                statement = info.statement,
                values = ?info.values,
                elapsed_us,
                error = %error,
                "Statement failed"
            ),
        }
    })
}
