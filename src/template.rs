// ABOUTME: Query template scanner extracting :name: and :$n: parameter markers
// ABOUTME: Produces literal fragments and ordered parameter references for translation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Template parsing
//!
//! A template is SQL text with parameter markers delimited by colons:
//!
//! - `:id:` references the declared parameter `id`
//! - `:p.name:` references field (or key) `name` of parameter `p`
//! - `:$2:` references the second call argument, ignoring declared names
//!
//! Colons inside single-quoted string literals are left alone, and `::` outside
//! a marker is copied through unchanged so `PostgreSQL` casts keep working.
//! Parsing yields `n + 1` literal fragments around `n` marker occurrences; the
//! same parameter may occur any number of times.

use std::fmt::{self, Display, Formatter};

use sqlmapper_core::constants::syntax::{
    MARKER_DELIMITER, PATH_SEPARATOR, POSITIONAL_PREFIX, STRING_QUOTE,
};
use sqlmapper_core::SynthesisError;

/// What a marker's first path segment refers to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParamRoot {
    /// A declared parameter name
    Named(String),
    /// A one-based argument position (`$n`)
    Positional(usize),
}

impl Display for ParamRoot {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Positional(position) => write!(f, "{POSITIONAL_PREFIX}{position}"),
        }
    }
}

/// One marker occurrence: a root plus an optional field/key path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterSpec {
    /// Parameter the marker starts from
    pub root: ParamRoot,
    /// Nested field or key names; empty for a whole-argument reference
    pub path: Vec<String>,
}

impl Display for ParameterSpec {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)?;
        for segment in &self.path {
            write!(f, "{PATH_SEPARATOR}{segment}")?;
        }
        Ok(())
    }
}

/// Whether a template binds by declared name or by argument position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemplateStyle {
    /// `:name:` markers (also used for templates without markers)
    Named,
    /// `:$n:` markers
    Positional,
}

/// A scanned template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTemplate {
    fragments: Vec<String>,
    occurrences: Vec<ParameterSpec>,
    style: TemplateStyle,
}

impl ParsedTemplate {
    /// Scan `template` into fragments and marker occurrences
    ///
    /// # Errors
    ///
    /// Returns an error for an unterminated marker, an invalid character
    /// inside a marker, an empty path segment, a bad positional number, or a
    /// template mixing named and positional markers.
    pub fn parse(template: &str) -> Result<Self, SynthesisError> {
        let mut fragments = Vec::new();
        let mut occurrences = Vec::new();
        let mut literal = String::with_capacity(template.len());
        let mut in_string = false;
        let mut chars = template.char_indices().peekable();

        while let Some((offset, c)) = chars.next() {
            if in_string {
                literal.push(c);
                if c == STRING_QUOTE {
                    in_string = false;
                }
                continue;
            }
            if c == STRING_QUOTE {
                in_string = true;
                literal.push(c);
                continue;
            }
            if c != MARKER_DELIMITER {
                literal.push(c);
                continue;
            }
            // `::` is a cast, not an empty marker
            if let Some(&(_, MARKER_DELIMITER)) = chars.peek() {
                chars.next();
                literal.push(MARKER_DELIMITER);
                literal.push(MARKER_DELIMITER);
                continue;
            }

            let mut body = String::new();
            let mut closed = false;
            for (inner_offset, inner) in chars.by_ref() {
                if inner == MARKER_DELIMITER {
                    closed = true;
                    break;
                }
                if !is_marker_char(inner) {
                    return Err(SynthesisError::InvalidMarkerCharacter {
                        offset: inner_offset,
                        character: inner,
                    });
                }
                body.push(inner);
            }
            if !closed {
                return Err(SynthesisError::UnterminatedMarker { offset });
            }

            occurrences.push(parse_marker(&body)?);
            fragments.push(std::mem::take(&mut literal));
        }
        fragments.push(literal);

        let style = detect_style(&occurrences)?;
        Ok(Self {
            fragments,
            occurrences,
            style,
        })
    }

    /// Literal text around the markers; always one longer than `occurrences`
    #[must_use]
    pub fn fragments(&self) -> &[String] {
        &self.fragments
    }

    /// Marker occurrences in template order, duplicates included
    #[must_use]
    pub fn occurrences(&self) -> &[ParameterSpec] {
        &self.occurrences
    }

    /// Binding style of the template
    #[must_use]
    pub const fn style(&self) -> TemplateStyle {
        self.style
    }

    /// Distinct named roots in order of first appearance
    #[must_use]
    pub fn referenced_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for occurrence in &self.occurrences {
            if let ParamRoot::Named(name) = &occurrence.root {
                if !names.contains(&name.as_str()) {
                    names.push(name);
                }
            }
        }
        names
    }
}

fn is_marker_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == PATH_SEPARATOR || c == POSITIONAL_PREFIX
}

fn parse_marker(body: &str) -> Result<ParameterSpec, SynthesisError> {
    let malformed = |reason| SynthesisError::MalformedMarker {
        marker: body.to_owned(),
        reason,
    };

    let mut segments = body.split(PATH_SEPARATOR);
    let head = segments.next().unwrap_or_default();
    if head.is_empty() {
        return Err(malformed("empty parameter name"));
    }

    let root = if let Some(digits) = head.strip_prefix(POSITIONAL_PREFIX) {
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(malformed("positional marker needs a number after '$'"));
        }
        match digits.parse::<usize>() {
            Ok(0) => return Err(malformed("positions start at 1")),
            Ok(position) => ParamRoot::Positional(position),
            Err(_) => return Err(malformed("position is too large")),
        }
    } else if head.contains(POSITIONAL_PREFIX) {
        return Err(malformed("'$' may only start a positional marker"));
    } else {
        ParamRoot::Named(head.to_owned())
    };

    let mut path = Vec::new();
    for segment in segments {
        if segment.is_empty() {
            return Err(malformed("empty path segment"));
        }
        if segment.contains(POSITIONAL_PREFIX) {
            return Err(malformed("'$' may only start a positional marker"));
        }
        path.push(segment.to_owned());
    }

    Ok(ParameterSpec { root, path })
}

fn detect_style(occurrences: &[ParameterSpec]) -> Result<TemplateStyle, SynthesisError> {
    let positional = occurrences
        .iter()
        .filter(|spec| matches!(spec.root, ParamRoot::Positional(_)))
        .count();
    if positional == 0 {
        Ok(TemplateStyle::Named)
    } else if positional == occurrences.len() {
        Ok(TemplateStyle::Positional)
    } else {
        Err(SynthesisError::MixedMarkerStyles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str, path: &[&str]) -> ParameterSpec {
        ParameterSpec {
            root: ParamRoot::Named(name.to_owned()),
            path: path.iter().map(|s| (*s).to_owned()).collect(),
        }
    }

    #[test]
    fn test_template_without_markers() {
        let parsed = ParsedTemplate::parse("select * from product").unwrap();
        assert_eq!(parsed.fragments(), ["select * from product"]);
        assert!(parsed.occurrences().is_empty());
        assert_eq!(parsed.style(), TemplateStyle::Named);
    }

    #[test]
    fn test_named_and_dotted_markers() {
        let parsed = ParsedTemplate::parse(
            "update product set name = :p.Name:, cost = :p.Cost: where id = :p.Id:",
        )
        .unwrap();

        assert_eq!(
            parsed.occurrences(),
            [
                named("p", &["Name"]),
                named("p", &["Cost"]),
                named("p", &["Id"])
            ]
        );
        assert_eq!(
            parsed.fragments(),
            [
                "update product set name = ",
                ", cost = ",
                " where id = ",
                ""
            ]
        );
        assert_eq!(parsed.referenced_names(), ["p"]);
    }

    #[test]
    fn test_positional_markers() {
        let parsed =
            ParsedTemplate::parse("select * from product where name=:$1: and cost=:$2:").unwrap();

        assert_eq!(parsed.style(), TemplateStyle::Positional);
        assert_eq!(parsed.occurrences()[0].root, ParamRoot::Positional(1));
        assert_eq!(parsed.occurrences()[1].root, ParamRoot::Positional(2));
        assert!(parsed.referenced_names().is_empty());
    }

    #[test]
    fn test_duplicate_occurrences_are_kept() {
        let parsed = ParsedTemplate::parse("select :a: + :a: as twice").unwrap();
        assert_eq!(parsed.occurrences().len(), 2);
        assert_eq!(parsed.referenced_names(), ["a"]);
    }

    #[test]
    fn test_string_literals_and_casts_pass_through() {
        let parsed =
            ParsedTemplate::parse("select '10:30' as t, :id:::bigint as n where x = 'it''s:'")
                .unwrap();

        assert_eq!(parsed.occurrences(), [named("id", &[])]);
        assert_eq!(
            parsed.fragments(),
            ["select '10:30' as t, ", "::bigint as n where x = 'it''s:'"]
        );
    }

    #[test]
    fn test_unterminated_marker() {
        let err = ParsedTemplate::parse("select * from product where id = :id").unwrap_err();
        assert_eq!(err, SynthesisError::UnterminatedMarker { offset: 33 });
    }

    #[test]
    fn test_invalid_character_inside_marker() {
        let err = ParsedTemplate::parse("select :a b:").unwrap_err();
        assert_eq!(
            err,
            SynthesisError::InvalidMarkerCharacter {
                offset: 9,
                character: ' '
            }
        );
    }

    #[test]
    fn test_malformed_markers() {
        for template in [":p.:", ":.x:", ":$:", ":$0:", ":a$b:", ":$1.x$:"] {
            let err = ParsedTemplate::parse(template).unwrap_err();
            assert!(
                matches!(err, SynthesisError::MalformedMarker { .. }),
                "{template} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_mixed_styles_rejected() {
        let err = ParsedTemplate::parse("where a = :$1: and b = :b:").unwrap_err();
        assert_eq!(err, SynthesisError::MixedMarkerStyles);
    }
}
