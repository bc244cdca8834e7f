// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tools for composing CLI options.
//!
//! The main thing in this module is [`Opts`], which composes the strongly
//! typed CLI options of the [`Engine`] and a [`Writer`], and provides
//! filtering of scenarios by a [`Regex`] over their names.
//!
//! If a [`Writer`] doesn't need any CLI options, it may just use the prepared
//! [`cli::Empty`] stub.
//!
//! [`cli::Empty`]: self::Empty
//! [`Engine`]: crate::runner::Engine
//! [`Writer`]: crate::Writer

use regex::Regex;

use crate::{runner, writer};

pub use clap::{Args, Parser};

/// Root CLI (command line interface) of a top-level [`Cukes`] executor.
///
/// May be extended with custom CLI options additionally.
///
/// # Example
///
/// ```rust
/// # use cukes::cli::{self, Parser as _};
/// #
/// #[derive(cli::Args)] // re-export of `clap::Args`
/// struct CustomOpts {
///     /// Name of the fixture to load.
///     #[arg(long)]
///     fixture: Option<String>,
/// }
///
/// let opts = cli::Opts::<cli::BasicCli, CustomOpts>::try_parse_from([
///     "cukes", "--fixture", "calc", "-n", "adds",
/// ])
/// .unwrap();
///
/// assert_eq!(opts.custom.fixture.as_deref(), Some("calc"));
/// assert!(opts.re_filter.is_some());
/// ```
///
/// [`Cukes`]: crate::Cukes
#[derive(clap::Parser, Clone, Debug, Default)]
#[command(
    name = "cukes",
    about = "Run the features, watch the steps go green",
    long_about = "Run the features, watch the steps go green"
)]
pub struct Opts<Writer = BasicCli, Custom = Empty>
where
    Writer: Args,
    Custom: Args,
{
    /// Regex to filter scenarios by their name.
    #[arg(
        id = "name",
        long = "name",
        short = 'n',
        value_name = "regex",
        visible_alias = "scenario-name",
        global = true
    )]
    pub re_filter: Option<Regex>,

    /// [`Engine`] CLI options.
    ///
    /// [`Engine`]: crate::runner::Engine
    #[command(flatten)]
    pub runner: runner::Cli,

    /// [`Writer`] CLI options.
    ///
    /// [`Writer`]: crate::Writer
    #[command(flatten)]
    pub writer: Writer,

    /// Additional custom CLI options.
    #[command(flatten)]
    pub custom: Custom,
}

impl<Writer, Custom> Opts<Writer, Custom>
where
    Writer: Args,
    Custom: Args,
{
    /// Shortcut for [`clap::Parser::parse()`], which doesn't require the trait
    /// being imported.
    #[must_use]
    pub fn parsed() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// Converts these [`Opts`] into the [`runner::Options`] of an [`Engine`].
    ///
    /// [`Engine`]: crate::runner::Engine
    #[must_use]
    pub fn runner_options(&self) -> runner::Options {
        runner::Options {
            name_filter: self.re_filter.clone(),
            fail_fast: self.runner.fail_fast,
        }
    }
}

/// CLI options of a [`writer::Basic`].
pub type BasicCli = writer::basic::Cli;

/// Empty CLI options.
#[derive(Args, Clone, Copy, Debug, Default)]
#[group(skip)]
pub struct Empty;
