// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Default [`Writer`] implementation.

use std::{io, str::FromStr, time::Duration};

use derive_more::Deref;
use smart_default::SmartDefault;

use super::{
    out::{Styles, WriteStrExt as _},
    Summary, Writer,
};
use crate::{
    event::{Event, StepFailure, StepStatus},
    feature::{BoundStep, Program},
    parser::{Listing, Note, Rejected},
};

/// CLI options of a [`Basic`] [`Writer`].
#[derive(Clone, Copy, Debug, SmartDefault, clap::Args)]
#[group(skip)]
pub struct Cli {
    /// Verbosity of an output.
    ///
    /// `-v` additionally outputs lines logged by steps, `-vv` additionally
    /// outputs the annotated feature listing and text blocks of steps.
    #[arg(short, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Coloring policy for a console output.
    #[arg(
        long,
        value_name = "auto|always|never",
        default_value = "auto",
        global = true
    )]
    #[default(Coloring::Auto)]
    pub color: Coloring,
}

/// Possible policies of a [`console`] output coloring.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Coloring {
    /// Letting [`console::colors_enabled()`] to decide, whether output should
    /// be colored.
    Auto,

    /// Forcing of a colored output.
    Always,

    /// Forcing of a non-colored output.
    Never,
}

impl FromStr for Coloring {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "always" => Ok(Self::Always),
            "never" => Ok(Self::Never),
            _ => Err("possible options: auto, always, never"),
        }
    }
}

/// Default [`Writer`] implementation outputting to an [`io::Write`]
/// implementor ([`io::Stdout`] by default).
///
/// Pretty-prints with colors if terminal was successfully detected, otherwise
/// has simple output. Useful for running tests with CI tools.
#[derive(Clone, Debug, Deref)]
pub struct Basic<Out: io::Write = io::Stdout> {
    /// [`io::Write`] implementor to write the output into.
    #[deref]
    output: Out,

    /// [`Styles`] for terminal output.
    styles: Styles,

    /// Verbosity level, as the number of `-v` flags.
    verbose: u8,
}

impl Basic {
    /// Creates a new [`Basic`] [`Writer`] outputting to [`io::Stdout`].
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout(), Coloring::Auto, 0)
    }
}

impl Default for Basic {
    fn default() -> Self {
        Self::stdout()
    }
}

impl<Out: io::Write> Basic<Out> {
    /// Creates a new [`Basic`] [`Writer`] outputting to the given `output`.
    #[must_use]
    pub fn new(output: Out, color: Coloring, verbose: u8) -> Self {
        let mut basic = Self { output, styles: Styles::new(), verbose: 0 };
        basic.apply_cli(Cli { verbose, color });
        basic
    }

    /// Unwraps the underlying output.
    #[must_use]
    pub fn into_inner(self) -> Out {
        self.output
    }

    fn handle(&mut self, ev: &Event<'_>) -> io::Result<()> {
        match *ev {
            Event::Started(program) => self.started(program),
            Event::Linted(program) => self.listing(&program.listing),
            Event::ParsingFailed(rejected) => self.parsing_failed(rejected),
            Event::ScenarioStarted(name) => self.scenario_started(name),
            Event::Step { step, background, status, logs } => {
                self.step(step, background, status, logs)
            }
            Event::ScenarioFinished { name, passed, elapsed } => {
                self.scenario_finished(name, passed, elapsed)
            }
            Event::Finished(summary) => self.finished(summary),
        }
    }

    fn started(&mut self, program: &Program) -> io::Result<()> {
        if self.verbose > 1 {
            self.listing(&program.listing)?;
            self.output.write_line("")?;
        }
        if let Some(name) = &program.name {
            let header = self.styles.ok(format!("Feature: {name}"));
            self.output.write_line(header)?;
        }
        Ok(())
    }

    fn parsing_failed(&mut self, rejected: &Rejected) -> io::Result<()> {
        self.listing(&rejected.listing)?;
        let msg = self.styles.err(format!("Failed to parse: {rejected}"));
        self.output.write_line(msg)
    }

    /// Outputs the `listing` with its notes aligned after the source lines.
    fn listing(&mut self, listing: &Listing) -> io::Result<()> {
        let width = listing.width();
        for line in listing.lines() {
            let source = line.source();
            let rendered = match &line.note {
                None => source.trim_end().to_owned(),
                Some(note @ Note::Matched(_)) => format!(
                    "{source:width$}  {}",
                    self.styles.ok(note.to_string()),
                ),
                Some(note @ Note::Failed(_)) => format!(
                    "{source:width$}  {}",
                    self.styles.err(indent_rest(&note.to_string(), width + 4)),
                ),
            };
            self.output.write_line(rendered)?;
        }
        Ok(())
    }

    fn scenario_started(&mut self, name: &str) -> io::Result<()> {
        if name.is_empty() {
            return Ok(());
        }
        let header = self.styles.ok(format!("  Scenario: {name}"));
        self.output.write_line(header)
    }

    fn step(
        &mut self,
        step: &BoundStep,
        background: bool,
        status: StepStatus<'_>,
        logs: &[String],
    ) -> io::Result<()> {
        let prefix = if background { "> " } else { "" };
        let title = format!(
            "{prefix}{} {}",
            step.written_keyword(),
            step.text(),
        );
        let line = match status {
            StepStatus::Passed => {
                self.styles.ok(format!("    \u{2714}  {title}"))
            }
            StepStatus::Skipped => {
                self.styles.skipped(format!("    ?  {title}"))
            }
            StepStatus::Failed(_) => {
                self.styles.err(format!("    \u{2718}  {title}"))
            }
        };
        self.output.write_line(line)?;

        if self.verbose > 1 {
            if let Some(doc) = &step.docstring {
                let doc = format!(
                    "       \"\"\"\n       {}\n       \"\"\"",
                    indent_rest(doc, 7),
                );
                self.output.write_line(self.styles.skipped(doc))?;
            }
        }
        if self.verbose > 0 {
            for log in logs {
                self.output.write_line(format!("       | {log}"))?;
            }
        }
        if let StepStatus::Failed(failure) = status {
            self.step_failed(failure)?;
        }
        Ok(())
    }

    fn step_failed(&mut self, failure: &StepFailure) -> io::Result<()> {
        let msg = format!("       {}", indent_rest(&failure.to_string(), 7));
        self.output.write_line(self.styles.err(msg))
    }

    fn scenario_finished(
        &mut self,
        name: &str,
        passed: bool,
        elapsed: Duration,
    ) -> io::Result<()> {
        if self.verbose == 0 {
            return Ok(());
        }
        let millis = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        let elapsed =
            humantime::format_duration(Duration::from_millis(millis));
        let msg = format!(
            "  {} in {elapsed}",
            if name.is_empty() { "steps" } else { name },
        );
        let msg = if passed {
            self.styles.ok(msg)
        } else {
            self.styles.err(msg)
        };
        self.output.write_line(msg)
    }

    fn finished(&mut self, summary: &Summary) -> io::Result<()> {
        let summary = self.styles.summary(summary);
        self.output.write_line(summary)
    }
}

impl<Out: io::Write> Writer for Basic<Out> {
    type Cli = Cli;

    fn apply_cli(&mut self, cli: Self::Cli) {
        self.verbose = cli.verbose;
        self.styles.apply_coloring(cli.color);
    }

    fn handle_event(&mut self, ev: &Event<'_>) {
        if let Err(e) = self.handle(ev) {
            tracing::warn!(error = %e, "failed to write event");
        }
    }
}

/// Indents every line of `s` but the first one by `n` spaces.
fn indent_rest(s: &str, n: usize) -> String {
    s.replace('\n', &format!("\n{:n$}", ""))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        feature::Keyword,
        param::ArityMismatch,
        parser::Parser,
        step::{Collection, Location, Match},
        writer::{out::WritableString, Stats},
    };

    fn basic(verbose: u8) -> Basic<WritableString> {
        Basic::new(WritableString::default(), Coloring::Never, verbose)
    }

    fn bound(text: &str, conjunction: bool) -> BoundStep {
        BoundStep {
            keyword: Keyword::Given,
            conjunction,
            line: 3,
            matched: Match {
                handler: 0,
                pattern: text.to_owned(),
                location: Location::new("tests/steps.rs", 1, 1),
                captures: vec![],
                text: text.to_owned(),
            },
            args: vec![],
            docstring: Some("doc\ntext".into()),
        }
    }

    #[test]
    fn coloring_from_str() {
        assert_eq!("Always".parse(), Ok(Coloring::Always));
        assert_eq!("never".parse(), Ok(Coloring::Never));
        assert!("sometimes".parse::<Coloring>().is_err());
    }

    #[test]
    fn outputs_steps_by_status() {
        let mut out = basic(0);
        let step = bound("a value", false);
        let failure = StepFailure::Failed("boom".into());

        out.handle_event(&Event::ScenarioStarted("first"));
        out.handle_event(&Event::Step {
            step: &step,
            background: true,
            status: StepStatus::Passed,
            logs: &[],
        });
        out.handle_event(&Event::Step {
            step: &bound("another", true),
            background: false,
            status: StepStatus::Failed(&failure),
            logs: &["ignored".into()],
        });
        out.handle_event(&Event::Step {
            step: &step,
            background: false,
            status: StepStatus::Skipped,
            logs: &[],
        });

        assert_eq!(
            out.0,
            "  Scenario: first\n\
             \x20   \u{2714}  > Given a value\n\
             \x20   \u{2718}  And another\n\
             \x20      step failed: boom\n\
             \x20   ?  Given a value\n",
        );
    }

    #[test]
    fn verbose_outputs_logs_and_docstrings() {
        let mut out = basic(2);

        out.handle_event(&Event::Step {
            step: &bound("a value", false),
            background: false,
            status: StepStatus::Passed,
            logs: &["hello".into()],
        });
        out.handle_event(&Event::ScenarioFinished {
            name: "first",
            passed: true,
            elapsed: Duration::from_millis(5),
        });

        assert_eq!(
            out.0,
            "    \u{2714}  Given a value\n\
             \x20      \"\"\"\n\
             \x20      doc\n\
             \x20      text\n\
             \x20      \"\"\"\n\
             \x20      | hello\n\
             \x20 first in 5ms\n",
        );
    }

    #[test]
    fn parsing_failure_outputs_listing() {
        let steps = Collection::<()>::new();
        let rejected = Parser::new(&steps)
            .parse("Feature: broken\n\nScenario: x\n  Given nothing\n")
            .unwrap_err();
        let mut out = basic(0);

        out.handle_event(&Event::ParsingFailed(&rejected));

        assert!(out.0.starts_with("Feature: broken\n\nScenario: x\n"));
        assert!(out.0.contains("  Given nothing  \u{2718} no matching step\n"));
        assert!(out.0.ends_with(
            "Failed to parse: feature rejected: please implement 1 missing \
             step(s):\n\tline 4: nothing\n",
        ));
    }

    #[test]
    fn outputs_summary() {
        let mut out = basic(0);
        let summary = Summary {
            features: 1,
            parsing_errors: 0,
            scenarios: Stats { passed: 1, skipped: 0, failed: 0 },
            steps: Stats { passed: 2, skipped: 0, failed: 0 },
        };

        out.handle_event(&Event::Finished(&summary));

        assert_eq!(
            out.into_inner().0,
            "[Summary]\n1 feature\n1 scenario (1 passed)\n2 steps (2 passed)\n",
        );
    }

    #[test]
    fn bind_failures_are_indented() {
        let mut out = basic(0);
        let failure = StepFailure::Bind(
            ArityMismatch { step: "x".into(), groups: 2, required: 1 }.into(),
        );

        out.step_failed(&failure).unwrap();

        assert_eq!(
            out.0,
            "       pattern provided 2 groups, but the step requires 1 \
             arguments:\n       \tx\n",
        );
    }
}
