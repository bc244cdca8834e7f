// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Parsed feature: the ordered step program consumed by the [`Engine`].
//!
//! [`Engine`]: crate::runner::Engine

use derive_more::Display;

use crate::{parser::Listing, step::Match};

/// Class of a step line.
///
/// An `And` line takes the class of the step preceding it.
#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum Keyword {
    /// [Given](https://cucumber.io/docs/gherkin/reference#given) step.
    Given,

    /// [When](https://cucumber.io/docs/gherkin/reference#when) step.
    When,

    /// [Then](https://cucumber.io/docs/gherkin/reference#then) step.
    Then,
}

/// Step line bound to the handler whose pattern matched it.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BoundStep {
    /// Resolved class of the step.
    pub keyword: Keyword,

    /// Whether the line was written with `And`.
    pub conjunction: bool,

    /// 1-based line number in the feature text.
    pub line: usize,

    /// Successful [`Match`] of the step text.
    pub matched: Match,

    /// Arguments for the handler: the captured groups followed by the text
    /// block attached to this step, if any.
    pub args: Vec<String>,

    /// Text block attached to this step, if any.
    pub docstring: Option<String>,
}

impl BoundStep {
    /// Step text without its keyword.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.matched.text
    }

    /// Keyword as written in the feature text.
    #[must_use]
    pub fn written_keyword(&self) -> String {
        if self.conjunction {
            "And".into()
        } else {
            self.keyword.to_string()
        }
    }
}

/// Kind of a structural [`Marker`].
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum MarkerKind {
    /// `Background:` line.
    Background,

    /// `Scenario:` or `Scenario Outline:` line.
    Scenario,
}

/// Structural declaration line delimiting a region of steps.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Marker {
    /// Kind of this [`Marker`].
    pub kind: MarkerKind,

    /// Name following the declaration keyword.
    pub name: String,

    /// 1-based line number in the feature text.
    pub line: usize,
}

/// Element of a [`Program`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Node {
    /// Structural declaration without arguments.
    Marker(Marker),

    /// Step bound to a handler.
    Step(BoundStep),
}

/// Steps re-run before every scenario of a feature.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Background {
    /// Name following `Background:`.
    pub name: String,

    /// 1-based line number of the `Background:` line.
    pub line: usize,

    /// Steps of the background, in order.
    pub steps: Vec<BoundStep>,
}

/// Parsed feature text, ready to be executed once by an [`Engine`].
///
/// [`Engine`]: crate::runner::Engine
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Program {
    /// Description following `Feature:`, if the text declared one.
    pub name: Option<String>,

    /// Free text following the `Feature:` line.
    pub narrative: Vec<String>,

    /// Background of the feature, if declared.
    pub background: Option<Background>,

    /// Scenario markers interleaved with their steps.
    pub nodes: Vec<Node>,

    /// Annotated listing of every line of the feature text.
    pub listing: Listing,
}

impl Program {
    /// Iterates over the scenario [`Marker`]s.
    pub fn scenarios(&self) -> impl Iterator<Item = &Marker> + '_ {
        self.nodes.iter().filter_map(|n| match n {
            Node::Marker(m) if m.kind == MarkerKind::Scenario => Some(m),
            Node::Marker(_) | Node::Step(_) => None,
        })
    }

    /// Iterates over every [`BoundStep`], background ones first.
    pub fn steps(&self) -> impl Iterator<Item = &BoundStep> + '_ {
        self.background
            .iter()
            .flat_map(|bg| bg.steps.iter())
            .chain(self.nodes.iter().filter_map(|n| match n {
                Node::Step(s) => Some(s),
                Node::Marker(_) => None,
            }))
    }
}
