// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Source location of a registered step handler.
//!
//! [`Location`]s are captured with `#[track_caller]` when a handler is
//! registered in a [`Collection`], and shown next to every matched line of a
//! feature listing.
//!
//! [`Collection`]: super::Collection

use derive_more::Display;

/// Location of a step handler's registration call.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("{path}:{line}:{column}")]
pub struct Location {
    /// Path to the file where the handler was registered.
    pub path: &'static str,

    /// Line of the file where the handler was registered.
    pub line: u32,

    /// Column of the file where the handler was registered.
    pub column: u32,
}

impl Location {
    /// Creates a new [`Location`] with the given path, line, and column.
    #[must_use]
    pub const fn new(path: &'static str, line: u32, column: u32) -> Self {
        Self { path, line, column }
    }

    /// Captures the [`Location`] of the outermost `#[track_caller]` caller.
    #[must_use]
    #[track_caller]
    pub fn caller() -> Self {
        let loc = std::panic::Location::caller();
        Self::new(loc.file(), loc.line(), loc.column())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caller_points_at_the_call_site() {
        let expected_line = line!() + 1;
        let location = Location::caller();

        assert_eq!(location.path, file!());
        assert_eq!(location.line, expected_line);
    }

    #[test]
    fn track_caller_propagates_through_wrappers() {
        #[track_caller]
        fn register() -> Location {
            Location::caller()
        }

        let expected_line = line!() + 1;
        let location = register();

        assert_eq!(location.line, expected_line);
    }

    #[test]
    fn displays_full_path() {
        let location = Location::new("tests/steps.rs", 42, 10);

        assert_eq!(location.to_string(), "tests/steps.rs:42:10");
    }

    #[test]
    fn ordering_is_path_then_line_then_column() {
        let a = Location::new("a.rs", 1, 1);

        assert!(a < Location::new("b.rs", 1, 1));
        assert!(a < Location::new("a.rs", 2, 1));
        assert!(a < Location::new("a.rs", 1, 2));
    }
}
