// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Top-level [Cucumber]-like executor.
//!
//! [Cucumber]: https://cucumber.io

use std::{fmt, fs, path::Path};

use crate::{
    cli::{self, Opts},
    error::RunError,
    event::Event,
    feature::Program,
    parser::{Listing, Parser, Rejected},
    runner::{Engine, Options},
    step::Collection,
    writer::{self, Stats, Summary},
    Writer,
};

/// Top-level executor of feature texts.
///
/// Ties a [`Collection`] of steps, the [`Parser`], the [`Engine`] and a
/// [`Writer`] together: every feature is parsed against the [`Collection`]
/// and, if accepted, executed with a fresh context per scenario.
///
/// # Example
///
/// ```rust
/// # use cukes::{step::Collection, writer, Cukes, Isolation};
/// #
/// #[derive(Debug, Default)]
/// struct Calculator {
///     total: i64,
/// }
///
/// let mut steps = Collection::<Calculator>::new();
/// steps
///     .given(r"^a total of (\d+)$", |c: Isolation<Calculator>, n: i64| {
///         c.borrow_mut().total = n;
///     })
///     .unwrap()
///     .then(r"^the total is (\d+)$", |c: Isolation<Calculator>, n: i64| {
///         if c.borrow().total == n {
///             Ok(())
///         } else {
///             Err(format!("total is {}", c.borrow().total))
///         }
///     })
///     .unwrap();
///
/// let report = Cukes::new(steps)
///     .with_writer(writer::Discard)
///     .run_str(
///         "Feature: calculator\n\
///          \n\
///          Scenario: keeps the total\n\
///          Given a total of 42\n\
///          Then the total is 42\n",
///     )
///     .unwrap();
///
/// assert!(report.passed());
/// assert_eq!(report.steps.passed, 2);
/// ```
pub struct Cukes<W, Wr = writer::Basic> {
    /// Registered steps.
    steps: Collection<W>,

    /// Constructor of a fresh context for every scenario.
    factory: Box<dyn Fn() -> W>,

    /// [`Writer`] receiving every [`Event`].
    writer: Wr,

    /// [`Options`] of the [`Engine`].
    options: Options,

    /// Whether features are only parsed, never executed.
    lint: bool,
}

impl<W, Wr> fmt::Debug for Cukes<W, Wr>
where
    Wr: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cukes")
            .field("steps", &self.steps.len())
            .field("writer", &self.writer)
            .field("options", &self.options)
            .field("lint", &self.lint)
            .finish_non_exhaustive()
    }
}

impl<W: Default + 'static> Cukes<W> {
    /// Creates a new [`Cukes`] executor of the given `steps`, creating
    /// contexts with [`Default`] and outputting to [`writer::Basic`].
    #[must_use]
    pub fn new(steps: Collection<W>) -> Self {
        Self {
            steps,
            factory: Box::new(W::default),
            writer: writer::Basic::stdout(),
            options: Options::default(),
            lint: false,
        }
    }
}

impl<W: 'static, Wr: Writer> Cukes<W, Wr> {
    /// Replaces the constructor of a scenario context.
    #[must_use]
    pub fn with_factory(mut self, factory: impl Fn() -> W + 'static) -> Self {
        self.factory = Box::new(factory);
        self
    }

    /// Replaces the [`Writer`].
    #[must_use]
    pub fn with_writer<NewWr>(self, writer: NewWr) -> Cukes<W, NewWr>
    where
        NewWr: Writer,
    {
        let Self { steps, factory, options, lint, .. } = self;
        Cukes { steps, factory, writer, options, lint }
    }

    /// Replaces the [`Options`] of the [`Engine`].
    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Stops a feature at its first failed scenario.
    #[must_use]
    pub fn fail_fast(mut self) -> Self {
        self.options.fail_fast = true;
        self
    }

    /// Only parses features, outputting their annotated listings.
    #[must_use]
    pub fn lint(mut self) -> Self {
        self.lint = true;
        self
    }

    /// Applies the given [`Opts`] to this executor and its [`Writer`].
    ///
    /// # Example
    ///
    /// ```rust
    /// # use cukes::{cli::{self, Parser as _}, step::Collection, Cukes};
    /// #
    /// # #[derive(Debug, Default)]
    /// # struct World;
    /// #
    /// // Usually `cli::Opts::parsed()`.
    /// let opts = cli::Opts::<cli::BasicCli>::try_parse_from([
    ///     "cukes", "--fail-fast", "--color=never",
    /// ])
    /// .unwrap();
    /// let cukes = Cukes::new(Collection::<World>::new()).with_cli(opts);
    /// ```
    #[must_use]
    pub fn with_cli<Custom: cli::Args>(
        mut self,
        opts: Opts<Wr::Cli, Custom>,
    ) -> Self {
        self.options = opts.runner_options();
        self.lint = opts.runner.lint;
        self.writer.apply_cli(opts.writer);
        self
    }

    /// Returns the [`Writer`].
    #[must_use]
    pub const fn writer(&self) -> &Wr {
        &self.writer
    }

    /// Unwraps the [`Writer`].
    #[must_use]
    pub fn into_writer(self) -> Wr {
        self.writer
    }

    /// Parses and runs the given feature `text`.
    ///
    /// # Errors
    ///
    /// With [`RunError::Parse`] if the `text` is rejected by the [`Parser`].
    /// Failed steps are not errors, check [`RunReport::failed()`] instead.
    pub fn run_str(&mut self, text: &str) -> Result<RunReport, RunError> {
        let outcome = self.feature(text);
        let summary = match &outcome {
            Ok(report) => report.summary(),
            Err(_) => Summary {
                features: 1,
                parsing_errors: 1,
                ..Summary::default()
            },
        };
        self.writer.handle_event(&Event::Finished(&summary));
        outcome.map_err(RunError::Parse)
    }

    /// Reads and runs the feature file at the given `path`.
    ///
    /// # Errors
    ///
    /// - With [`RunError::Io`] if the file cannot be read;
    /// - with [`RunError::Parse`] if its text is rejected by the [`Parser`].
    pub fn run_path(
        &mut self,
        path: impl AsRef<Path>,
    ) -> Result<RunReport, RunError> {
        let text = read(path.as_ref())?;
        self.run_str(&text)
    }

    /// Runs every `*.feature` file located directly inside the `dir`, in the
    /// order of their names.
    ///
    /// Every file is parsed separately, and a rejected one doesn't stop the
    /// others from running: it's counted in [`Summary::parsing_errors`].
    ///
    /// # Errors
    ///
    /// - With [`RunError::NoFeatures`] if the `dir` has no `*.feature` files;
    /// - with [`RunError::Glob`] or [`RunError::Walk`] if the `dir` cannot
    ///   be traversed;
    /// - with [`RunError::Io`] if a file cannot be read.
    pub fn run_dir(
        &mut self,
        dir: impl AsRef<Path>,
    ) -> Result<Summary, RunError> {
        let dir = dir.as_ref();
        let mut paths = globwalk::GlobWalkerBuilder::new(dir, "*.feature")
            .case_insensitive(true)
            .max_depth(1)
            .build()?
            .map(|entry| entry.map(globwalk::DirEntry::into_path))
            .collect::<Result<Vec<_>, _>>()?;
        if paths.is_empty() {
            return Err(RunError::NoFeatures(dir.to_path_buf()));
        }
        paths.sort();

        let mut total = Summary::default();
        for path in paths {
            let _span = tracing::debug_span!("feature", path = %path.display())
                .entered();
            let text = read(&path)?;
            total += match self.feature(&text) {
                Ok(report) => report.summary(),
                Err(_) => Summary {
                    features: 1,
                    parsing_errors: 1,
                    ..Summary::default()
                },
            };
        }
        self.writer.handle_event(&Event::Finished(&total));
        Ok(total)
    }

    /// Runs the feature file or directory of feature files at the given
    /// `input`.
    ///
    /// # Errors
    ///
    /// See [`Cukes::run_path()`] and [`Cukes::run_dir()`]. A rejected feature
    /// file is counted in [`Summary::parsing_errors`] in both cases.
    pub fn run(
        &mut self,
        input: impl AsRef<Path>,
    ) -> Result<Summary, RunError> {
        let input = input.as_ref();
        if input.is_dir() {
            return self.run_dir(input);
        }
        match self.run_path(input) {
            Ok(report) => Ok(report.summary()),
            Err(RunError::Parse(_)) => Ok(Summary {
                features: 1,
                parsing_errors: 1,
                ..Summary::default()
            }),
            Err(e) => Err(e),
        }
    }

    /// Runs the feature file or directory of feature files at the given
    /// `input`, and panics if anything failed.
    ///
    /// Meant to be called from a test harness.
    ///
    /// # Panics
    ///
    /// If the `input` cannot be read, a feature is rejected by the
    /// [`Parser`], or at least one step failed.
    pub fn run_and_exit(mut self, input: impl AsRef<Path>) {
        let summary = match self.run(input) {
            Ok(summary) => summary,
            Err(e) => panic!("{e}"),
        };
        if summary.failed() {
            let failed_steps = summary.steps.failed;
            let parsing_errors = summary.parsing_errors;
            panic!(
                "{} step{} failed, {} parsing error{}",
                failed_steps,
                if failed_steps == 1 { "" } else { "s" },
                parsing_errors,
                if parsing_errors == 1 { "" } else { "s" },
            );
        }
    }

    /// Parses and, unless linting, executes a single feature `text`.
    fn feature(&mut self, text: &str) -> Result<RunReport, Rejected> {
        let program = match Parser::new(&self.steps).parse(text) {
            Ok(program) => program,
            Err(rejected) => {
                tracing::debug!(error = %rejected, "feature rejected");
                self.writer.handle_event(&Event::ParsingFailed(&rejected));
                return Err(rejected);
            }
        };

        if self.lint {
            self.writer.handle_event(&Event::Linted(&program));
            return Ok(RunReport::new(program, Summary {
                features: 1,
                ..Summary::default()
            }));
        }

        let summary = Engine::new(&self.steps, &mut self.writer)
            .with_options(self.options.clone())
            .run(&program, &*self.factory);
        Ok(RunReport::new(program, summary))
    }
}

/// Outcome of running a single feature text.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RunReport {
    /// Annotated listing of the feature text.
    pub listing: Listing,

    /// Free text following the `Feature:` line.
    pub narrative: Vec<String>,

    /// Scenario [`Stats`].
    pub scenarios: Stats,

    /// Step [`Stats`], background steps included.
    pub steps: Stats,
}

impl RunReport {
    fn new(program: Program, summary: Summary) -> Self {
        Self {
            listing: program.listing,
            narrative: program.narrative,
            scenarios: summary.scenarios,
            steps: summary.steps,
        }
    }

    /// Indicates whether no step failed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.steps.failed == 0
    }

    /// Indicates whether at least one step failed.
    #[must_use]
    pub const fn failed(&self) -> bool {
        !self.passed()
    }

    /// Returns the [`Summary`] of this single feature run.
    #[must_use]
    pub const fn summary(&self) -> Summary {
        Summary {
            features: 1,
            parsing_errors: 0,
            scenarios: self.scenarios,
            steps: self.steps,
        }
    }
}

/// Reads the feature file at the given `path`.
fn read(path: &Path) -> Result<String, RunError> {
    fs::read_to_string(path).map_err(|source| RunError::Io {
        path: path.to_path_buf(),
        source,
    })
}
