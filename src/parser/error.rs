// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors of parsing a feature text.

use std::fmt;

use derive_more::{Display, Error};
use itertools::Itertools as _;

use super::listing::Listing;
use crate::{param, step::AmbiguousMatchError};

/// Step line no registered pattern matches.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
#[display("line {line}: {text}")]
pub struct NoMatchingStep {
    /// 1-based line number.
    pub line: usize,

    /// Step text without its keyword.
    pub text: String,
}

/// Error of parsing a feature text.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum ParseError {
    /// `Feature:` line without a description.
    #[display("please provide a description for this feature")]
    MissingDescription {
        /// 1-based line number.
        line: usize,
    },

    /// Second `Background:` line.
    #[display("multiple backgrounds defined")]
    MultipleBackgrounds {
        /// 1-based line number.
        line: usize,
    },

    /// `Examples:` section or a line inside of it.
    #[display("`{construct}` is not supported")]
    UnsupportedConstruct {
        /// 1-based line number.
        line: usize,

        /// Offending line.
        construct: String,
    },

    /// Line of no known kind.
    #[display("unknown line type: {token}")]
    UnknownLineKind {
        /// 1-based line number.
        line: usize,

        /// First whitespace-delimited token of the line.
        token: String,
    },

    /// `And` line not continuing a `Given`, `When` or `Then` step.
    #[display("`And` may only continue a Given, When or Then step")]
    MisplacedAnd {
        /// 1-based line number.
        line: usize,
    },

    /// Step line matching more than one pattern.
    #[display("{error}")]
    AmbiguousStep {
        /// 1-based line number.
        line: usize,

        /// Conflicting patterns.
        #[error(source)]
        error: AmbiguousMatchError,
    },

    /// Step whose captured groups can't be bound to its handler.
    #[display("{error}")]
    ArityMismatch {
        /// 1-based line number.
        line: usize,

        /// Reconciliation failure.
        #[error(source)]
        error: param::ArityMismatch,
    },

    /// Every step line no pattern matched.
    #[display(
        "please implement {} missing step(s):\n\t{}",
        _0.len(),
        _0.iter().join("\n\t")
    )]
    UnimplementedSteps(#[error(not(source))] Vec<NoMatchingStep>),
}

impl ParseError {
    /// 1-based number of the offending line.
    ///
    /// For [`ParseError::UnimplementedSteps`] it's the first missing step.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::MissingDescription { line }
            | Self::MultipleBackgrounds { line }
            | Self::UnsupportedConstruct { line, .. }
            | Self::UnknownLineKind { line, .. }
            | Self::MisplacedAnd { line }
            | Self::AmbiguousStep { line, .. }
            | Self::ArityMismatch { line, .. } => Some(*line),
            Self::UnimplementedSteps(missing) => {
                missing.first().map(|m| m.line)
            }
        }
    }
}

/// Feature text rejected by the [`Parser`].
///
/// The [`Listing`] is annotated up to the point parsing stopped.
///
/// [`Parser`]: super::Parser
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub struct Rejected {
    /// Cause of the rejection.
    #[error(source)]
    pub error: ParseError,

    /// Annotated listing of the feature text.
    pub listing: Listing,
}

impl fmt::Display for Rejected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.error, self.error.line()) {
            (ParseError::UnimplementedSteps(_), _) | (_, None) => {
                write!(f, "feature rejected: {}", self.error)
            }
            (e, Some(line)) => {
                write!(f, "feature rejected at line {line}: {e}")
            }
        }
    }
}
