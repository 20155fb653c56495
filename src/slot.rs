// ABOUTME: Typed query and exec slots produced by synthesis and invoked with a capability
// ABOUTME: Each call renders, executes, times and decodes one statement
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Slots
//!
//! A slot is a named, typed callable bound to one compiled template.
//! [`QuerySlot<A, R>`] runs through a [`Querier`] and [`ExecSlot<A, R>`]
//! through an [`Executor`]; `A` is the argument tuple and `R` the declared
//! result shape. Slots are cheap to clone and safe to share across tasks;
//! they hold no connection or per-call state.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

use sqlmapper_core::{BoxError, DecodeError, MapperError, MapperResult};
use tracing::trace;

use crate::binding::Arguments;
use crate::capability::{CapabilityKind, Executor, Querier};
use crate::decode::{Outcome, ResultShape};
use crate::instrumentation::{TimerHook, TimerInfo};
use crate::translator::{BoundStatement, StatementPlan};

/// Synthesized state shared by every clone of a slot
pub(crate) struct CompiledSlot {
    pub(crate) name: String,
    pub(crate) capability: CapabilityKind,
    pub(crate) plan: StatementPlan,
    pub(crate) hook: Option<TimerHook>,
}

impl CompiledSlot {
    fn render<A: Arguments>(&self, args: &A) -> MapperResult<BoundStatement> {
        self.plan
            .bind(&args.to_bind_values())
            .map_err(|source| MapperError::Resolution {
                slot: self.name.clone(),
                source,
            })
    }

    async fn timed<T, F>(&self, statement: &BoundStatement, call: F) -> MapperResult<T>
    where
        F: Future<Output = Result<T, BoxError>> + Send,
    {
        trace!(slot = %self.name, statement = %statement.sql, "Invoking capability");
        let started = Instant::now();
        let result = call.await;
        let elapsed = started.elapsed();

        if let Some(hook) = &self.hook {
            hook(&TimerInfo {
                method: self.capability.name(),
                slot: &self.name,
                statement: &statement.sql,
                values: &statement.values,
                error: result.as_ref().err().map(|error| &**error),
                elapsed,
            });
        }

        result.map_err(|source| match source.downcast::<DecodeError>() {
            Ok(decode) => MapperError::Decode {
                slot: self.name.clone(),
                source: *decode,
            },
            Err(source) => MapperError::Execution {
                slot: self.name.clone(),
                statement: statement.sql.clone(),
                source,
            },
        })
    }
}

fn compiled<'a>(name: &str, slot: Option<&'a Arc<CompiledSlot>>) -> MapperResult<&'a CompiledSlot> {
    slot.map(AsRef::as_ref)
        .ok_or_else(|| MapperError::Unsynthesized {
            slot: name.to_owned(),
        })
}

macro_rules! slot_common {
    ($slot:ident) => {
        impl<A, R> $slot<A, R> {
            pub(crate) fn new(name: &str, compiled: Option<Arc<CompiledSlot>>) -> Self {
                Self {
                    name: name.to_owned(),
                    compiled,
                    _signature: PhantomData,
                }
            }

            /// Slot name
            #[must_use]
            pub fn name(&self) -> &str {
                &self.name
            }

            /// Whether synthesis produced a runnable slot
            #[must_use]
            pub fn is_ready(&self) -> bool {
                self.compiled.is_some()
            }
        }

        impl<A: Arguments, R> $slot<A, R> {
            /// Render the statement for `args` without executing it
            ///
            /// # Errors
            ///
            /// Returns an error if the slot was not synthesized or an argument
            /// cannot be resolved.
            pub fn render(&self, args: &A) -> MapperResult<BoundStatement> {
                compiled(&self.name, self.compiled.as_ref())?.render(args)
            }
        }

        impl<A, R> Clone for $slot<A, R> {
            fn clone(&self) -> Self {
                Self {
                    name: self.name.clone(),
                    compiled: self.compiled.clone(),
                    _signature: PhantomData,
                }
            }
        }

        impl<A, R> fmt::Debug for $slot<A, R> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($slot))
                    .field("name", &self.name)
                    .field("ready", &self.is_ready())
                    .finish()
            }
        }
    };
}

/// A slot that runs a row-returning statement
pub struct QuerySlot<A, R> {
    name: String,
    compiled: Option<Arc<CompiledSlot>>,
    _signature: PhantomData<fn(A) -> R>,
}

slot_common!(QuerySlot);

impl<A: Arguments, R: ResultShape> QuerySlot<A, R> {
    /// Run the slot through `querier`
    ///
    /// # Errors
    ///
    /// Returns a [`MapperError`] if an argument cannot be resolved, the
    /// capability fails, a single-row result is empty, or a row cannot be
    /// decoded.
    pub async fn call<Q>(&self, querier: &mut Q, args: A) -> MapperResult<R>
    where
        Q: Querier + ?Sized,
    {
        let compiled = compiled(&self.name, self.compiled.as_ref())?;
        let statement = compiled.render(&args)?;
        let rows = compiled
            .timed(&statement, querier.query(&statement))
            .await?;
        R::from_outcome(Outcome::Rows(rows), &compiled.name)
    }
}

/// A slot that runs a data-modifying statement
pub struct ExecSlot<A, R> {
    name: String,
    compiled: Option<Arc<CompiledSlot>>,
    _signature: PhantomData<fn(A) -> R>,
}

slot_common!(ExecSlot);

impl<A: Arguments, R: ResultShape> ExecSlot<A, R> {
    /// Run the slot through `executor`
    ///
    /// # Errors
    ///
    /// Returns a [`MapperError`] if an argument cannot be resolved or the
    /// capability fails.
    pub async fn call<E>(&self, executor: &mut E, args: A) -> MapperResult<R>
    where
        E: Executor + ?Sized,
    {
        let compiled = compiled(&self.name, self.compiled.as_ref())?;
        let statement = compiled.render(&args)?;
        let result = compiled
            .timed(&statement, executor.execute(&statement))
            .await?;
        R::from_outcome(Outcome::Exec(result), &compiled.name)
    }
}
