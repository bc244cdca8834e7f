// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tools for executing a parsed [`Program`].
//!
//! # Order guarantees
//!
//! Execution is single-threaded and synchronous, so [`Event`]s reach the
//! [`Writer`] in a [happened-before] order: [`Event::ScenarioStarted`] of a
//! scenario predates its background steps, which predate its own steps in
//! declaration order, and [`Event::ScenarioFinished`] is the last one.
//!
//! [`Event`]: crate::Event
//! [`Event::ScenarioFinished`]: crate::Event::ScenarioFinished
//! [`Event::ScenarioStarted`]: crate::Event::ScenarioStarted
//! [`Program`]: crate::feature::Program
//! [`Writer`]: crate::Writer
//! [happened-before]: https://en.wikipedia.org/wiki/Happened-before

mod engine;

use regex::Regex;

#[doc(inline)]
pub use self::engine::Engine;

/// CLI options of an [`Engine`].
#[derive(Clone, Debug, Default, clap::Args)]
#[group(skip)]
pub struct Cli {
    /// Stop the feature at the first failed scenario.
    #[arg(long, global = true, visible_alias = "ff")]
    pub fail_fast: bool,

    /// Only parse the features and output their annotated listings.
    #[arg(long, global = true)]
    pub lint: bool,
}

/// Options of an [`Engine`] run.
#[derive(Clone, Debug, Default)]
pub struct Options {
    /// Only scenarios whose name matches are run.
    pub name_filter: Option<Regex>,

    /// Whether to stop at the first failed scenario.
    pub fail_fast: bool,
}
