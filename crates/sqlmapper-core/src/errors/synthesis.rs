// ABOUTME: Template and shape errors raised while synthesizing slots
// ABOUTME: BuildError aggregates every failing slot of one synthesis run

use std::fmt::{self, Display, Formatter};

use super::ErrorCode;

/// A single reason a slot declaration was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthesisError {
    /// A `:` opened a marker that was never closed
    #[error("unterminated marker starting at offset {offset}")]
    UnterminatedMarker {
        /// Byte offset of the opening `:`
        offset: usize,
    },

    /// A marker contains a character that is not part of an identifier or path
    #[error("invalid character {character:?} at offset {offset} inside marker")]
    InvalidMarkerCharacter {
        /// Byte offset of the offending character
        offset: usize,
        /// The offending character
        character: char,
    },

    /// A marker is syntactically well delimited but structurally wrong
    #[error("malformed marker ':{marker}:': {reason}")]
    MalformedMarker {
        /// Marker body between the delimiters
        marker: String,
        /// What is wrong with it
        reason: &'static str,
    },

    /// Named and positional markers used in one template
    #[error("template mixes named and positional markers")]
    MixedMarkerStyles,

    /// The template references a name missing from the declared parameter list
    #[error("parameter '{name}' is referenced by the template but not declared")]
    UndeclaredParameter {
        /// Referenced name
        name: String,
    },

    /// A declared name is never referenced by a named-style template
    #[error("parameter '{name}' is declared but never referenced by the template")]
    UnusedParameter {
        /// Declared name
        name: String,
    },

    /// The declared parameter list contains the same name twice
    #[error("parameter '{name}' is declared more than once")]
    DuplicateParameter {
        /// Repeated name
        name: String,
    },

    /// Declared name count differs from the slot's argument count
    #[error("{declared} parameter names declared for {arguments} arguments")]
    ArityMismatch {
        /// Number of declared names
        declared: usize,
        /// Number of call arguments
        arguments: usize,
    },

    /// Positional marker outside `1..=arguments`
    #[error("positional marker ${position} is out of range for {arguments} arguments")]
    PositionOutOfRange {
        /// One-based position from the marker
        position: usize,
        /// Number of call arguments
        arguments: usize,
    },

    /// Dotted path names a field the record does not have
    #[error("'{parameter}' has no field '{field}'")]
    UnknownField {
        /// Marker path up to the record
        parameter: String,
        /// Missing field name
        field: String,
    },

    /// Dotted path steps into a value that has no fields
    #[error("'{parameter}' is a {shape} and has no field '{field}'")]
    NotAddressable {
        /// Marker path up to the value
        parameter: String,
        /// Shape of the value
        shape: &'static str,
        /// Segment that could not be applied
        field: String,
    },

    /// A record or map is referenced as a whole, which cannot be bound
    #[error("'{parameter}' is a {shape} and cannot be bound as a value")]
    NotBindable {
        /// Marker path
        parameter: String,
        /// Shape of the value
        shape: &'static str,
    },

    /// Result shape incompatible with the slot's capability kind
    #[error("{capability} slot cannot return {shape}")]
    IncompatibleResultShape {
        /// Capability kind of the slot
        capability: &'static str,
        /// Declared result shape
        shape: &'static str,
    },
}

impl SynthesisError {
    /// Classification of this error
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::UnterminatedMarker { .. }
            | Self::InvalidMarkerCharacter { .. }
            | Self::MalformedMarker { .. }
            | Self::MixedMarkerStyles
            | Self::UndeclaredParameter { .. }
            | Self::UnusedParameter { .. }
            | Self::DuplicateParameter { .. } => ErrorCode::TemplateInvalid,
            Self::ArityMismatch { .. }
            | Self::PositionOutOfRange { .. }
            | Self::UnknownField { .. }
            | Self::NotAddressable { .. }
            | Self::NotBindable { .. }
            | Self::IncompatibleResultShape { .. } => ErrorCode::ShapeInvalid,
        }
    }
}

/// All errors collected for one slot declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotFailure {
    /// Slot name
    pub slot: String,
    /// Every problem found, in detection order
    pub errors: Vec<SynthesisError>,
}

impl Display for SlotFailure {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "slot '{}': ", self.slot)?;
        for (i, error) in self.errors.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{error}")?;
        }
        Ok(())
    }
}

/// Synthesis of a slot set failed; no slot of the set is exposed
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub struct BuildError {
    /// Dialect the set was being built for
    pub dialect: String,
    /// Failing slots in declaration order
    pub failures: Vec<SlotFailure>,
}

impl BuildError {
    /// Failure recorded for `slot`, if any
    #[must_use]
    pub fn failure(&self, slot: &str) -> Option<&SlotFailure> {
        self.failures.iter().find(|failure| failure.slot == slot)
    }

    /// Every individual error across all slots
    pub fn errors(&self) -> impl Iterator<Item = &SynthesisError> {
        self.failures.iter().flat_map(|failure| failure.errors.iter())
    }
}

impl Display for BuildError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "synthesis for {} failed in {} slot(s)",
            self.dialect,
            self.failures.len()
        )?;
        for failure in &self.failures {
            write!(f, "\n  {failure}")?;
        }
        Ok(())
    }
}
