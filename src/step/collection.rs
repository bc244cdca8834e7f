// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Step registry: patterns and the handlers bound to them.

use std::fmt;

use itertools::Itertools as _;

use super::{
    error::{AmbiguousMatchError, DuplicateStepError, FindError, RegisterError},
    location::Location,
    matched::Match,
    regex::HashableRegex,
};
use crate::param::{BoxedHandler, Handler, Shape};

/// Collection of step handlers keyed by their patterns.
///
/// There is a single class of steps: `Given`, `When` and `Then` lines are all
/// matched against the same patterns, and [`Collection::given()`],
/// [`Collection::when()`] and [`Collection::then()`] only exist for
/// readability.
///
/// Every step line must be matched by exactly 1 pattern. Pattern identity is
/// its literal text.
pub struct Collection<W> {
    entries: Vec<Entry<W>>,
}

struct Entry<W> {
    regex: HashableRegex,
    location: Location,
    handler: BoxedHandler<W>,
}

impl<W> fmt::Debug for Collection<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(
                self.entries
                    .iter()
                    .map(|e| (e.regex.as_str(), (e.location, &e.handler))),
            )
            .finish()
    }
}

// Implemented manually to omit redundant `W: Default` trait bound, imposed by
// `#[derive(Default)]`.
impl<W> Default for Collection<W> {
    fn default() -> Self {
        Self { entries: Vec::new() }
    }
}

impl<W: 'static> Collection<W> {
    /// Creates a new empty [`Collection`].
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a `handler` for step lines matching the `pattern`.
    ///
    /// The [`Location`] of the caller is recorded as the handler's
    /// provenance.
    ///
    /// # Errors
    ///
    /// - [`RegisterError::Duplicate`] if a pattern with the same text is
    ///   already registered (the [`Collection`] is left unchanged);
    /// - [`RegisterError::InvalidPattern`] if `pattern` doesn't compile.
    #[track_caller]
    pub fn register<Args, H>(
        &mut self,
        pattern: &str,
        handler: H,
    ) -> Result<&mut Self, RegisterError>
    where
        Args: 'static,
        H: Handler<W, Args> + 'static,
    {
        let location = Location::caller();
        if let Some(existing) =
            self.entries.iter().find(|e| e.regex.as_str() == pattern)
        {
            return Err(DuplicateStepError {
                pattern: pattern.to_owned(),
                existing: existing.location,
                duplicate: location,
            }
            .into());
        }

        let regex = HashableRegex::new(pattern)?;
        tracing::trace!(%regex, %location, "registered step");
        self.entries.push(Entry {
            regex,
            location,
            handler: BoxedHandler::new(handler),
        });
        Ok(self)
    }

    /// Alias of [`Collection::register()`] for [Given] steps.
    ///
    /// # Errors
    ///
    /// See [`Collection::register()`].
    ///
    /// [Given]: https://cucumber.io/docs/gherkin/reference#given
    #[track_caller]
    pub fn given<Args, H>(
        &mut self,
        pattern: &str,
        handler: H,
    ) -> Result<&mut Self, RegisterError>
    where
        Args: 'static,
        H: Handler<W, Args> + 'static,
    {
        self.register(pattern, handler)
    }

    /// Alias of [`Collection::register()`] for [When] steps.
    ///
    /// # Errors
    ///
    /// See [`Collection::register()`].
    ///
    /// [When]: https://cucumber.io/docs/gherkin/reference#when
    #[track_caller]
    pub fn when<Args, H>(
        &mut self,
        pattern: &str,
        handler: H,
    ) -> Result<&mut Self, RegisterError>
    where
        Args: 'static,
        H: Handler<W, Args> + 'static,
    {
        self.register(pattern, handler)
    }

    /// Alias of [`Collection::register()`] for [Then] steps.
    ///
    /// # Errors
    ///
    /// See [`Collection::register()`].
    ///
    /// [Then]: https://cucumber.io/docs/gherkin/reference#then
    #[track_caller]
    pub fn then<Args, H>(
        &mut self,
        pattern: &str,
        handler: H,
    ) -> Result<&mut Self, RegisterError>
    where
        Args: 'static,
        H: Handler<W, Args> + 'static,
    {
        self.register(pattern, handler)
    }
}

impl<W> Collection<W> {
    /// Number of registered patterns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Indicates whether no pattern is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the registered pattern texts in registration order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|e| e.regex.as_str())
    }

    /// Matches the step `text` (its keyword already stripped) against every
    /// registered pattern.
    ///
    /// # Errors
    ///
    /// - [`FindError::NotFound`] if no pattern matches;
    /// - [`FindError::Ambiguous`] if more than one pattern matches.
    pub fn find(&self, text: &str) -> Result<Match, FindError> {
        let mut found = self
            .entries
            .iter()
            .enumerate()
            .filter_map(|(i, e)| e.regex.captures(text).map(|c| (i, e, c)))
            .collect::<Vec<_>>();

        let (handler, entry, captures) = match found.len() {
            0 => return Err(FindError::NotFound),
            // Instead of `.unwrap()` to avoid documenting `# Panics`.
            1 => found.pop().unwrap_or_else(|| unreachable!()),
            _ => {
                return Err(AmbiguousMatchError {
                    step: text.to_owned(),
                    possible_matches: found
                        .into_iter()
                        .map(|(_, e, _)| (e.regex.clone(), e.location))
                        .sorted()
                        .collect(),
                }
                .into());
            }
        };

        let captures = captures
            .iter()
            .skip(1)
            .map(|m| m.map_or("", |m| m.as_str()).to_owned())
            .collect();

        Ok(Match {
            handler,
            pattern: entry.regex.as_str().to_owned(),
            location: entry.location,
            captures,
            text: text.to_owned(),
        })
    }

    /// Returns the parameter [`Shape`]s of the `handler` at the given
    /// position.
    #[must_use]
    pub fn shapes(&self, handler: usize) -> Option<&[Shape]> {
        self.entries.get(handler).map(|e| e.handler.shapes())
    }

    pub(crate) fn handler(&self, handler: usize) -> Option<&BoxedHandler<W>> {
        self.entries.get(handler).map(|e| &e.handler)
    }
}
