// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Definitions for a [`Collection`] which is used to store step handlers and
//! their corresponding [`Regex`] patterns.
//!
//! - [`collection`]: registration and matching
//! - [`error`]: registration and matching errors
//! - [`location`]: provenance of registered handlers
//! - [`matched`]: the result of a successful match
//! - [`regex`]: pattern-text keyed [`Regex`] wrapper
//!
//! [`Regex`]: ::regex::Regex

pub mod collection;
pub mod error;
pub mod location;
pub mod matched;
pub mod regex;

pub use self::{
    collection::Collection,
    error::{AmbiguousMatchError, DuplicateStepError, FindError, RegisterError},
    location::Location,
    matched::Match,
    regex::HashableRegex,
};
