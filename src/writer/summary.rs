// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Execution statistics of a feature run.

use std::{borrow::Cow, ops::AddAssign};

use itertools::Itertools as _;

use super::out::Styles;

/// Number of passed, skipped and failed steps (or scenarios).
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Stats {
    /// Number of passed steps (or scenarios).
    pub passed: usize,

    /// Number of skipped steps (or scenarios).
    pub skipped: usize,

    /// Number of failed steps (or scenarios).
    pub failed: usize,
}

impl Stats {
    /// Returns the total number of steps (or scenarios) these [`Stats`] have
    /// been collected for.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.passed + self.skipped + self.failed
    }
}

impl AddAssign for Stats {
    fn add_assign(&mut self, rhs: Self) {
        self.passed += rhs.passed;
        self.skipped += rhs.skipped;
        self.failed += rhs.failed;
    }
}

/// Outcome of running one or more features.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Summary {
    /// Number of features run.
    pub features: usize,

    /// Number of features rejected by the parser.
    pub parsing_errors: usize,

    /// Scenario [`Stats`]. A scenario never counts as skipped.
    pub scenarios: Stats,

    /// Step [`Stats`], background steps included.
    pub steps: Stats,
}

impl Summary {
    /// Indicates whether no feature was rejected and no step failed.
    #[must_use]
    pub const fn passed(&self) -> bool {
        self.parsing_errors == 0 && self.steps.failed == 0
    }

    /// Indicates whether anything failed.
    #[must_use]
    pub const fn failed(&self) -> bool {
        !self.passed()
    }
}

impl AddAssign for Summary {
    fn add_assign(&mut self, rhs: Self) {
        self.features += rhs.features;
        self.parsing_errors += rhs.parsing_errors;
        self.scenarios += rhs.scenarios;
        self.steps += rhs.steps;
    }
}

impl Styles {
    /// Renders the given [`Summary`].
    #[must_use]
    pub fn summary(&self, summary: &Summary) -> String {
        let features = self.maybe_plural("feature", summary.features);
        let scenarios =
            self.maybe_plural("scenario", summary.scenarios.total());
        let scenarios_stats = self.format_stats(summary.scenarios);
        let steps = self.maybe_plural("step", summary.steps.total());
        let steps_stats = self.format_stats(summary.steps);
        let parsing_errors = if summary.parsing_errors > 0 {
            self.err(self.maybe_plural("parsing error", summary.parsing_errors))
        } else {
            "".into()
        };

        format!(
            "{header}\n{features}\n{scenarios}{scenarios_stats}\n\
             {steps}{steps_stats}\n{parsing_errors}",
            header = self.bold(self.header("[Summary]")),
        )
        .trim_end_matches('\n')
        .to_owned()
    }

    fn format_stats(&self, stats: Stats) -> Cow<'static, str> {
        let formatted = [
            (stats.passed > 0).then(|| {
                self.bold(self.ok(format!("{} passed", stats.passed)))
            }),
            (stats.skipped > 0).then(|| {
                self.bold(self.skipped(format!("{} skipped", stats.skipped)))
            }),
            (stats.failed > 0).then(|| {
                self.bold(self.err(format!("{} failed", stats.failed)))
            }),
        ]
        .into_iter()
        .flatten()
        .join(&self.bold(", "));

        if formatted.is_empty() {
            "".into()
        } else {
            format!(" {}{formatted}{}", self.bold("("), self.bold(")")).into()
        }
    }

    fn maybe_plural(
        &self,
        singular: impl Into<Cow<'static, str>>,
        num: usize,
    ) -> Cow<'static, str> {
        self.bold(format!(
            "{num} {}{}",
            singular.into(),
            if num == 1 { "" } else { "s" },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::Coloring;

    fn plain() -> Styles {
        let mut styles = Styles::new();
        styles.apply_coloring(Coloring::Never);
        styles
    }

    #[test]
    fn renders_summary() {
        let summary = Summary {
            features: 1,
            parsing_errors: 0,
            scenarios: Stats { passed: 1, skipped: 0, failed: 1 },
            steps: Stats { passed: 4, skipped: 2, failed: 1 },
        };

        assert_eq!(
            plain().summary(&summary),
            "[Summary]\n\
             1 feature\n\
             2 scenarios (1 passed, 1 failed)\n\
             7 steps (4 passed, 2 skipped, 1 failed)",
        );
        assert!(summary.failed());
    }

    #[test]
    fn renders_parsing_errors() {
        let summary = Summary {
            features: 2,
            parsing_errors: 1,
            ..Summary::default()
        };

        assert_eq!(
            plain().summary(&summary),
            "[Summary]\n2 features\n0 scenarios\n0 steps\n1 parsing error",
        );
        assert!(!summary.passed());
    }

    #[test]
    fn summaries_add_up() {
        let mut total = Summary::default();
        total += Summary {
            features: 1,
            parsing_errors: 0,
            scenarios: Stats { passed: 2, skipped: 0, failed: 0 },
            steps: Stats { passed: 5, skipped: 0, failed: 0 },
        };
        total += Summary {
            features: 1,
            parsing_errors: 0,
            scenarios: Stats { passed: 0, skipped: 0, failed: 1 },
            steps: Stats { passed: 1, skipped: 1, failed: 1 },
        };

        assert_eq!(total.features, 2);
        assert_eq!(total.scenarios.total(), 3);
        assert_eq!(total.steps, Stats { passed: 6, skipped: 1, failed: 1 });
        assert!(total.failed());
    }
}
