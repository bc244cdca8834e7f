// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Scenario state machine walking a [`Program`].

use std::{
    any::Any,
    mem,
    panic::{self, AssertUnwindSafe},
    time::Instant,
};

use super::Options;
use crate::{
    event::{Event, StepFailure, StepStatus},
    feature::{BoundStep, MarkerKind, Node, Program},
    param::{Isolation, Reporter, Scope},
    step::Collection,
    writer::{Summary, Writer},
};

/// Executor of a [`Program`], sending [`Event`]s to a [`Writer`].
///
/// Every scenario gets a fresh context from the factory passed to
/// [`Engine::run()`] and runs the background against it first. A failed step
/// stops its scenario (the remaining steps are skipped), never the run.
pub struct Engine<'s, 'w, W, Wr: ?Sized> {
    steps: &'s Collection<W>,
    writer: &'w mut Wr,
    options: Options,
}

/// State of the scenario currently being executed.
enum State<'p, W> {
    /// No scenario started yet, or the last one finished.
    AwaitingScenario,

    /// Scenario filtered out by its name, its steps are ignored.
    Filtered,

    /// Scenario is running.
    InScenario(Scenario<'p, W>),
}

struct Scenario<'p, W> {
    name: &'p str,
    isolation: Isolation<W>,
    failed: bool,
    started: Instant,
    _span: tracing::span::EnteredSpan,
}

impl<'s, 'w, W, Wr: Writer + ?Sized> Engine<'s, 'w, W, Wr> {
    /// Creates a new [`Engine`] running handlers of the `steps` and reporting
    /// to the `writer`.
    pub fn new(steps: &'s Collection<W>, writer: &'w mut Wr) -> Self {
        Self { steps, writer, options: Options::default() }
    }

    /// Applies the given [`Options`].
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Runs the `program`, creating a context with the `factory` for every
    /// scenario.
    ///
    /// Steps appearing before any scenario run inside of an unnamed one,
    /// without the background.
    pub fn run(
        &mut self,
        program: &Program,
        factory: impl Fn() -> W,
    ) -> Summary {
        let mut summary = Summary { features: 1, ..Summary::default() };
        self.writer.handle_event(&Event::Started(program));

        let mut state = State::AwaitingScenario;
        for node in &program.nodes {
            match node {
                // Steps of a background are moved out by the parser.
                Node::Marker(m) if m.kind == MarkerKind::Background => {}
                Node::Marker(m) => {
                    let prev =
                        mem::replace(&mut state, State::AwaitingScenario);
                    if self.finish(prev, &mut summary) && self.options.fail_fast
                    {
                        tracing::debug!("stopping after failed scenario");
                        return summary;
                    }
                    state = self.start(&m.name, &factory);
                    if let State::InScenario(sc) = &mut state {
                        self.background(sc, program, &mut summary);
                    }
                }
                Node::Step(step) => {
                    if matches!(state, State::AwaitingScenario) {
                        state = self.start("", &factory);
                    }
                    if let State::InScenario(sc) = &mut state {
                        self.step(sc, step, false, &mut summary);
                    }
                }
            }
        }
        _ = self.finish(state, &mut summary);
        summary
    }

    fn start<'p>(
        &mut self,
        name: &'p str,
        factory: &impl Fn() -> W,
    ) -> State<'p, W> {
        if let Some(re) = &self.options.name_filter {
            if !re.is_match(name) {
                tracing::trace!(name, "scenario filtered out");
                return State::Filtered;
            }
        }

        let span = tracing::info_span!("scenario", name).entered();
        tracing::debug!("scenario started");
        self.writer.handle_event(&Event::ScenarioStarted(name));
        State::InScenario(Scenario {
            name,
            isolation: Isolation::new(factory()),
            failed: false,
            started: Instant::now(),
            _span: span,
        })
    }

    fn background(
        &mut self,
        scenario: &mut Scenario<'_, W>,
        program: &Program,
        summary: &mut Summary,
    ) {
        for step in program.background.iter().flat_map(|bg| &bg.steps) {
            self.step(scenario, step, true, summary);
        }
    }

    /// Finishes the scenario in the given `state`, returning whether it
    /// failed.
    fn finish(&mut self, state: State<'_, W>, summary: &mut Summary) -> bool {
        let State::InScenario(scenario) = state else {
            return false;
        };
        if scenario.failed {
            summary.scenarios.failed += 1;
        } else {
            summary.scenarios.passed += 1;
        }
        let elapsed = scenario.started.elapsed();
        tracing::debug!(
            passed = !scenario.failed,
            elapsed = %humantime::format_duration(elapsed),
            "scenario finished",
        );
        self.writer.handle_event(&Event::ScenarioFinished {
            name: scenario.name,
            passed: !scenario.failed,
            elapsed,
        });
        scenario.failed
    }

    fn step(
        &mut self,
        scenario: &mut Scenario<'_, W>,
        step: &BoundStep,
        background: bool,
        summary: &mut Summary,
    ) {
        if scenario.failed {
            summary.steps.skipped += 1;
            self.writer.handle_event(&Event::Step {
                step,
                background,
                status: StepStatus::Skipped,
                logs: &[],
            });
            return;
        }

        let reporter = Reporter::default();
        let outcome = self.invoke(&scenario.isolation, &reporter, step);
        let (logs, errors) = reporter.take();
        let failure = match outcome {
            Err(e) => Some(e),
            Ok(()) if !errors.is_empty() => Some(StepFailure::Reported(errors)),
            Ok(()) => None,
        };

        let status = if let Some(e) = &failure {
            tracing::debug!(step = step.text(), error = %e, "step failed");
            scenario.failed = true;
            summary.steps.failed += 1;
            StepStatus::Failed(e)
        } else {
            tracing::trace!(step = step.text(), "step passed");
            summary.steps.passed += 1;
            StepStatus::Passed
        };
        self.writer.handle_event(&Event::Step {
            step,
            background,
            status,
            logs: &logs,
        });
    }

    /// Binds the arguments of the `step` and calls its handler, catching
    /// panics.
    fn invoke(
        &self,
        isolation: &Isolation<W>,
        reporter: &Reporter,
        step: &BoundStep,
    ) -> Result<(), StepFailure> {
        let Some(handler) = self.steps.handler(step.matched.handler) else {
            return Err(StepFailure::Failed(format!(
                "no handler registered for `{}`",
                step.matched.pattern,
            )));
        };
        let scope = Scope::new(isolation, reporter, step.text());

        match panic::catch_unwind(AssertUnwindSafe(|| {
            handler.invoke(&scope, &step.args)
        })) {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(msg))) => Err(StepFailure::Failed(msg)),
            Ok(Err(e)) => Err(StepFailure::Bind(e)),
            Err(payload) => Err(StepFailure::Panicked(coerce_error(&*payload))),
        }
    }
}

/// Coerces the given panic payload into a [`String`].
fn coerce_error(err: &(dyn Any + Send + 'static)) -> String {
    if let Some(string) = err.downcast_ref::<String>() {
        string.clone()
    } else if let Some(&string) = err.downcast_ref::<&str>() {
        string.to_owned()
    } else {
        "(Could not resolve panic payload)".to_owned()
    }
}
