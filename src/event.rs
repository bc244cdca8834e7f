// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Key occurrences in a lifecycle of a feature run.
//!
//! Every [`Event`] is sent to a [`Writer`] as soon as it happens, so the
//! [`Writer`] sees them in execution order.
//!
//! [`Writer`]: crate::Writer

use std::time::Duration;

use derive_more::{Display, Error};
use itertools::Itertools as _;

use crate::{
    feature::{BoundStep, Program},
    param::BindError,
    parser::Rejected,
    writer::Summary,
};

/// Top-level event of a feature run.
#[derive(Clone, Copy, Debug)]
pub enum Event<'a> {
    /// Feature text was parsed and is about to be executed.
    Started(&'a Program),

    /// Feature text was parsed in lint mode, nothing is executed.
    Linted(&'a Program),

    /// Feature text was rejected, nothing is executed.
    ParsingFailed(&'a Rejected),

    /// Scenario started, the background is about to run.
    ///
    /// Steps appearing before any scenario run inside of an unnamed one.
    ScenarioStarted(&'a str),

    /// Step has been executed or skipped.
    Step {
        /// Executed step.
        step: &'a BoundStep,

        /// Whether the step belongs to the background.
        background: bool,

        /// Outcome of the step.
        status: StepStatus<'a>,

        /// Lines logged by the step handler.
        logs: &'a [String],
    },

    /// Scenario finished.
    ScenarioFinished {
        /// Name of the scenario.
        name: &'a str,

        /// Whether none of the scenario steps failed.
        passed: bool,

        /// Time the scenario took.
        elapsed: Duration,
    },

    /// Every scenario of the feature has been run.
    Finished(&'a Summary),
}

/// Outcome of a single step.
#[derive(Clone, Copy, Debug)]
pub enum StepStatus<'a> {
    /// Handler returned successfully.
    Passed,

    /// Step wasn't run because a previous step of its scenario failed.
    Skipped,

    /// Handler failed.
    Failed(&'a StepFailure),
}

/// Failure of a step.
#[derive(Clone, Debug, Display, Eq, Error, PartialEq)]
pub enum StepFailure {
    /// Captured groups couldn't be bound to the handler parameters.
    #[display("{_0}")]
    Bind(BindError),

    /// Handler returned an error.
    #[display("step failed: {_0}")]
    Failed(#[error(not(source))] String),

    /// Handler panicked.
    #[display("step panicked: {_0}")]
    Panicked(#[error(not(source))] String),

    /// Handler reported errors through its [`Reporter`].
    ///
    /// [`Reporter`]: crate::Reporter
    #[display("step reported {} error(s): {}", _0.len(), _0.iter().join("; "))]
    Reported(#[error(not(source))] Vec<String>),
}
