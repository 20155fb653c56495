// ABOUTME: Slot synthesizer validating templates against declared names and shapes
// ABOUTME: Builds typed slots once per dialect and aggregates every failure into a BuildError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Synthesis
//!
//! A [`Synthesizer`] turns slot declarations (name, template, declared
//! parameter names, argument tuple type, result type) into runnable
//! [`QuerySlot`]s and [`ExecSlot`]s for one [`Dialect`]. Each declaration is
//! checked as follows:
//!
//! 1. the template is parsed (once per distinct template text)
//! 2. named templates: every referenced name must be declared, declared
//!    names must be unique and match the argument count, and unreferenced
//!    declared names are rejected or logged per [`UnusedParameterPolicy`]
//! 3. positional templates: every `:$n:` must fall inside the argument list;
//!    declared names are ignored
//! 4. every dotted path is checked against the static shape of its argument
//! 5. the result shape must suit the slot's capability kind
//!
//! Every problem of every slot is collected. [`Synthesizer::finish`] returns
//! the slot set only when nothing failed; otherwise a [`BuildError`] lists
//! all failures and no slot is exposed.
//!
//! ```text
//! struct ProductDao {
//!     find_by_id: QuerySlot<(i64,), Product>,
//!     update: ExecSlot<(Product,), u64>,
//! }
//!
//! impl SlotSet for ProductDao {
//!     fn declare(s: &mut Synthesizer) -> Self {
//!         Self {
//!             find_by_id: s.query("find_by_id", "select * from product where id = :id:", &["id"]),
//!             update: s.exec("update", "update product set name = :p.name: where id = :p.id:", &["p"]),
//!         }
//!     }
//! }
//!
//! let dao: ProductDao = sqlmapper::build(Dialect::Postgres)?;
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use sqlmapper_core::{BuildError, SlotFailure, SynthesisError};
use tracing::{debug, error, info, warn};

use crate::binding::{ArgShape, Arguments};
use crate::capability::CapabilityKind;
use crate::config::{MapperConfig, UnusedParameterPolicy};
use crate::decode::{ResultShape, ResultShapeKind};
use crate::dialect::Dialect;
use crate::instrumentation::{logging_hook, TimerHook};
use crate::resolver::check_path;
use crate::slot::{CompiledSlot, ExecSlot, QuerySlot};
use crate::template::{ParamRoot, ParsedTemplate, TemplateStyle};
use crate::translator::StatementPlan;

/// A set of slots declared together and synthesized as a unit
pub trait SlotSet: Sized {
    /// Declare every slot of the set on `synthesizer`
    fn declare(synthesizer: &mut Synthesizer) -> Self;
}

/// Synthesize `S` for `dialect` with the default configuration
///
/// # Errors
///
/// Returns a [`BuildError`] listing every failing slot.
pub fn build<S: SlotSet>(dialect: Dialect) -> Result<S, BuildError> {
    Synthesizer::new(dialect).build()
}

/// Everything a slot declaration contributes to synthesis
struct Declaration<'a> {
    name: &'a str,
    capability: CapabilityKind,
    template: &'a str,
    params: &'a [&'a str],
    arity: usize,
    shapes: Vec<ArgShape>,
    result: ResultShapeKind,
}

/// Builds the slots of one dialect
pub struct Synthesizer {
    dialect: Dialect,
    config: MapperConfig,
    hook: Option<TimerHook>,
    templates: HashMap<String, Arc<ParsedTemplate>>,
    failures: Vec<SlotFailure>,
    synthesized: usize,
}

impl Synthesizer {
    /// Create a synthesizer with default configuration
    #[must_use]
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            config: MapperConfig::default(),
            hook: None,
            templates: HashMap::new(),
            failures: Vec::new(),
            synthesized: 0,
        }
    }

    /// Replace the configuration
    ///
    /// With `log_statements` set and no custom hook, slots report through
    /// [`logging_hook`].
    #[must_use]
    pub fn with_config(mut self, config: MapperConfig) -> Self {
        self.config = config;
        self
    }

    /// Install a timer hook on every slot built afterwards
    #[must_use]
    pub fn with_hook(mut self, hook: TimerHook) -> Self {
        self.hook = Some(hook);
        self
    }

    /// Target dialect
    #[must_use]
    pub const fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Number of distinct templates parsed so far
    #[must_use]
    pub fn parsed_templates(&self) -> usize {
        self.templates.len()
    }

    /// Declare a row-returning slot
    ///
    /// `params` names the elements of `A` in order. Failures are recorded and
    /// reported by [`finish`](Self::finish); the returned slot is then never
    /// handed to the caller.
    pub fn query<A, R>(&mut self, name: &str, template: &str, params: &[&str]) -> QuerySlot<A, R>
    where
        A: Arguments,
        R: ResultShape,
    {
        let compiled = self.synthesize(&Declaration {
            name,
            capability: CapabilityKind::Query,
            template,
            params,
            arity: A::ARITY,
            shapes: A::shapes(),
            result: R::kind(),
        });
        QuerySlot::new(name, compiled)
    }

    /// Declare a data-modifying slot
    pub fn exec<A, R>(&mut self, name: &str, template: &str, params: &[&str]) -> ExecSlot<A, R>
    where
        A: Arguments,
        R: ResultShape,
    {
        let compiled = self.synthesize(&Declaration {
            name,
            capability: CapabilityKind::Execute,
            template,
            params,
            arity: A::ARITY,
            shapes: A::shapes(),
            result: R::kind(),
        });
        ExecSlot::new(name, compiled)
    }

    /// Hand out `slots` if every declaration synthesized cleanly
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] with one entry per failing slot.
    pub fn finish<T>(self, slots: T) -> Result<T, BuildError> {
        if self.failures.is_empty() {
            info!(
                dialect = %self.dialect,
                slots = self.synthesized,
                templates = self.templates.len(),
                "Slot synthesis complete"
            );
            return Ok(slots);
        }

        error!(
            dialect = %self.dialect,
            failed = self.failures.len(),
            "Slot synthesis failed"
        );
        Err(BuildError {
            dialect: self.dialect.name().to_owned(),
            failures: self.failures,
        })
    }

    /// Declare and synthesize a whole [`SlotSet`]
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] with one entry per failing slot.
    pub fn build<S: SlotSet>(mut self) -> Result<S, BuildError> {
        let slots = S::declare(&mut self);
        self.finish(slots)
    }

    fn synthesize(&mut self, declaration: &Declaration<'_>) -> Option<Arc<CompiledSlot>> {
        match self.compile(declaration) {
            Ok(plan) => {
                debug!(
                    slot = declaration.name,
                    kind = declaration.capability.name(),
                    dialect = %self.dialect,
                    markers = plan.template().occurrences().len(),
                    "Synthesized slot"
                );
                self.synthesized += 1;
                let hook = self
                    .hook
                    .clone()
                    .or_else(|| self.config.log_statements.then(logging_hook));
                Some(Arc::new(CompiledSlot {
                    name: declaration.name.to_owned(),
                    capability: declaration.capability,
                    plan,
                    hook,
                }))
            }
            Err(errors) => {
                for problem in &errors {
                    debug!(slot = declaration.name, error = %problem, "Slot rejected");
                }
                self.failures.push(SlotFailure {
                    slot: declaration.name.to_owned(),
                    errors,
                });
                None
            }
        }
    }

    fn compile(&mut self, declaration: &Declaration<'_>) -> Result<StatementPlan, Vec<SynthesisError>> {
        let mut errors = Vec::new();

        if declaration.capability.returns_rows() != declaration.result.returns_rows() {
            errors.push(SynthesisError::IncompatibleResultShape {
                capability: declaration.capability.name(),
                shape: declaration.result.name(),
            });
        }

        let template = match self.parse(declaration.template) {
            Ok(template) => template,
            Err(problem) => {
                errors.push(problem);
                return Err(errors);
            }
        };

        let arguments = match template.style() {
            TemplateStyle::Named => self.bind_named(&template, declaration, &mut errors),
            TemplateStyle::Positional => bind_positional(&template, declaration.arity, &mut errors),
        };

        for (spec, argument) in template.occurrences().iter().zip(&arguments) {
            let Some(shape) = argument.and_then(|index| declaration.shapes.get(index)) else {
                continue;
            };
            if let Err(problem) = check_path(&spec.root.to_string(), shape, &spec.path) {
                if !errors.contains(&problem) {
                    errors.push(problem);
                }
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }
        let arguments: Vec<usize> = arguments.into_iter().flatten().collect();
        Ok(StatementPlan::new(template, &arguments, self.dialect))
    }

    fn parse(&mut self, text: &str) -> Result<Arc<ParsedTemplate>, SynthesisError> {
        if let Some(template) = self.templates.get(text) {
            return Ok(Arc::clone(template));
        }
        let template = Arc::new(ParsedTemplate::parse(text)?);
        self.templates.insert(text.to_owned(), Arc::clone(&template));
        Ok(template)
    }

    fn bind_named(
        &self,
        template: &ParsedTemplate,
        declaration: &Declaration<'_>,
        errors: &mut Vec<SynthesisError>,
    ) -> Vec<Option<usize>> {
        let params = declaration.params;

        for (index, name) in params.iter().enumerate() {
            if params[..index].contains(name) {
                let problem = SynthesisError::DuplicateParameter {
                    name: (*name).to_owned(),
                };
                if !errors.contains(&problem) {
                    errors.push(problem);
                }
            }
        }

        if params.len() != declaration.arity {
            errors.push(SynthesisError::ArityMismatch {
                declared: params.len(),
                arguments: declaration.arity,
            });
        }

        let referenced = template.referenced_names();
        for name in &referenced {
            if !params.contains(name) {
                errors.push(SynthesisError::UndeclaredParameter {
                    name: (*name).to_owned(),
                });
            }
        }

        for name in params {
            if referenced.contains(name) {
                continue;
            }
            match self.config.unused_parameters {
                UnusedParameterPolicy::Error => errors.push(SynthesisError::UnusedParameter {
                    name: (*name).to_owned(),
                }),
                UnusedParameterPolicy::Warn => warn!(
                    slot = declaration.name,
                    parameter = *name,
                    "Declared parameter is never referenced by the template"
                ),
            }
        }

        template
            .occurrences()
            .iter()
            .map(|spec| match &spec.root {
                ParamRoot::Named(name) => params.iter().position(|param| param == name),
                ParamRoot::Positional(_) => None,
            })
            .collect()
    }
}

fn bind_positional(
    template: &ParsedTemplate,
    arity: usize,
    errors: &mut Vec<SynthesisError>,
) -> Vec<Option<usize>> {
    template
        .occurrences()
        .iter()
        .map(|spec| match spec.root {
            ParamRoot::Positional(position) if position <= arity => Some(position - 1),
            ParamRoot::Positional(position) => {
                let problem = SynthesisError::PositionOutOfRange {
                    position,
                    arguments: arity,
                };
                if !errors.contains(&problem) {
                    errors.push(problem);
                }
                None
            }
            ParamRoot::Named(_) => None,
        })
        .collect()
}
