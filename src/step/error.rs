// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors of registering and looking up steps in a [`Collection`].
//!
//! [`Collection`]: super::Collection

use std::fmt;

use derive_more::{Display, Error, From};

use super::{location::Location, regex::HashableRegex};

/// Error of a step line matching multiple patterns inside a [`Collection`].
///
/// There is no precedence between patterns: any step matched by more than one
/// of them is rejected.
///
/// [`Collection`]: super::Collection
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub struct AmbiguousMatchError {
    /// Step text that was matched.
    pub step: String,

    /// Patterns the step text matches, sorted by their text.
    pub possible_matches: Vec<(HashableRegex, Location)>,
}

impl AmbiguousMatchError {
    /// Returns an iterator over the conflicting pattern texts.
    pub fn patterns(&self) -> impl Iterator<Item = &str> + '_ {
        self.possible_matches.iter().map(|(re, _)| re.as_str())
    }
}

impl fmt::Display for AmbiguousMatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conflicting steps for `{}`:", self.step)?;
        for (re, loc) in &self.possible_matches {
            write!(f, "\n\t{re} --> {loc}")?;
        }
        Ok(())
    }
}

/// Error of registering a pattern whose literal text is already present in a
/// [`Collection`].
///
/// [`Collection`]: super::Collection
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
#[display("step for `{pattern}` already exists at {existing}")]
pub struct DuplicateStepError {
    /// Pattern text registered twice.
    pub pattern: String,

    /// [`Location`] of the first registration.
    pub existing: Location,

    /// [`Location`] of the rejected registration.
    pub duplicate: Location,
}

/// Error of [`Collection::register()`].
///
/// [`Collection::register()`]: super::Collection::register
#[derive(Clone, Debug, Display, Error, From)]
pub enum RegisterError {
    /// Pattern text is already registered.
    #[display("{_0}")]
    Duplicate(DuplicateStepError),

    /// Pattern is not a valid regular expression.
    #[display("invalid step pattern: {_0}")]
    InvalidPattern(regex::Error),
}

/// Error of [`Collection::find()`].
///
/// [`Collection::find()`]: super::Collection::find
#[derive(Clone, Debug, Display, Eq, Error, From, PartialEq)]
pub enum FindError {
    /// No registered pattern matches the step text.
    #[display("no matching step")]
    NotFound,

    /// More than one registered pattern matches the step text.
    #[display("{_0}")]
    Ambiguous(AmbiguousMatchError),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn possible_matches() -> Vec<(HashableRegex, Location)> {
        vec![
            (
                HashableRegex::new(r"I have (\d+) cucumbers").unwrap(),
                Location::new("tests/steps.rs", 10, 5),
            ),
            (
                HashableRegex::new(r"I have .+ cucumbers").unwrap(),
                Location::new("tests/more_steps.rs", 20, 9),
            ),
        ]
    }

    #[test]
    fn ambiguous_display_names_every_conflict() {
        let err = AmbiguousMatchError {
            step: "I have 5 cucumbers".into(),
            possible_matches: possible_matches(),
        };
        let out = err.to_string();

        assert!(out.starts_with("conflicting steps for `I have 5 cucumbers`:"));
        assert!(out.contains(r"I have (\d+) cucumbers --> tests/steps.rs:10:5"));
        assert!(out.contains("I have .+ cucumbers --> tests/more_steps.rs:20:9"));
        assert_eq!(err.patterns().count(), 2);
    }

    #[test]
    fn duplicate_display_points_at_first_registration() {
        let err = DuplicateStepError {
            pattern: "a step".into(),
            existing: Location::new("tests/a.rs", 1, 1),
            duplicate: Location::new("tests/b.rs", 2, 2),
        };

        assert_eq!(
            err.to_string(),
            "step for `a step` already exists at tests/a.rs:1:1",
        );
    }

    #[test]
    fn find_error_sources() {
        use std::error::Error as _;

        assert!(FindError::NotFound.source().is_none());
        let err = FindError::from(AmbiguousMatchError {
            step: "x".into(),
            possible_matches: vec![],
        });
        assert!(err.source().is_some());
    }
}
