// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Result of matching a step line against a [`Collection`].
//!
//! [`Collection`]: super::Collection

use super::location::Location;

/// Step text successfully matched by exactly one pattern of a [`Collection`].
///
/// [`Collection`]: super::Collection
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Match {
    /// Position of the matched handler inside its [`Collection`].
    ///
    /// [`Collection`]: super::Collection
    pub handler: usize,

    /// Text of the matched pattern.
    pub pattern: String,

    /// [`Location`] where the matched handler was registered.
    pub location: Location,

    /// Captured groups in left-to-right order, without the whole match.
    ///
    /// Optional groups that didn't participate in the match are empty.
    pub captures: Vec<String>,

    /// Step text that was matched.
    pub text: String,
}
