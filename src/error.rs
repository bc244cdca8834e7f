// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Errors of running features through [`Cukes`].
//!
//! Failures of individual steps are not errors: they are reported to a
//! [`Writer`] and counted in a [`Summary`].
//!
//! [`Cukes`]: crate::Cukes
//! [`Summary`]: crate::writer::Summary
//! [`Writer`]: crate::Writer

use std::{io, path::PathBuf};

use derive_more::{Display, Error, From};

use crate::parser::Rejected;

/// Error of running a feature text, file or directory.
#[derive(Debug, Display, Error, From)]
pub enum RunError {
    /// Feature text was rejected by the [`Parser`].
    ///
    /// [`Parser`]: crate::Parser
    #[display("{_0}")]
    Parse(Rejected),

    /// Feature file couldn't be read.
    #[display("failed to read `{}`: {source}", path.display())]
    #[from(skip)]
    Io {
        /// Path of the file.
        path: PathBuf,

        /// Underlying I/O error.
        source: io::Error,
    },

    /// Features directory couldn't be walked.
    #[display("failed to walk features directory: {_0}")]
    Walk(globwalk::WalkError),

    /// Glob over a features directory couldn't be built.
    #[display("invalid features glob: {_0}")]
    Glob(globwalk::GlobError),

    /// Directory doesn't contain any `*.feature` file.
    #[display("no `*.feature` files found in `{}`", _0.display())]
    #[from(skip)]
    NoFeatures(#[error(not(source))] PathBuf),
}

impl RunError {
    /// Returns the [`Rejected`] feature, if this is a parsing error.
    #[must_use]
    pub const fn rejected(&self) -> Option<&Rejected> {
        if let Self::Parse(r) = self {
            Some(r)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;
    use crate::parser::{Listing, ParseError};

    #[test]
    fn displays_io_error_with_path() {
        let err = RunError::Io {
            path: PathBuf::from("features/missing.feature"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };

        assert_eq!(
            err.to_string(),
            "failed to read `features/missing.feature`: not found",
        );
        assert!(err.source().is_some());
        assert!(err.rejected().is_none());
    }

    #[test]
    fn displays_missing_features() {
        let err = RunError::NoFeatures(PathBuf::from("empty"));

        assert_eq!(err.to_string(), "no `*.feature` files found in `empty`");
        assert!(err.source().is_none());
    }

    #[test]
    fn wraps_rejected_feature() {
        let err = RunError::from(Rejected {
            error: ParseError::MultipleBackgrounds { line: 4 },
            listing: Listing::default(),
        });

        assert_eq!(
            err.rejected().map(|r| r.error.line()),
            Some(Some(4)),
        );
        assert_eq!(
            err.to_string(),
            "feature rejected at line 4: multiple backgrounds defined",
        );
    }
}
