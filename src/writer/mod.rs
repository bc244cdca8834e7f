// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Tools for outputting [`Event`]s.

pub mod basic;
pub mod out;
pub mod summary;

use crate::{cli, event::Event};

#[doc(inline)]
pub use self::{
    basic::{Basic, Coloring},
    summary::{Stats, Summary},
};

/// Host reporting API receiving every [`Event`] of a feature run.
pub trait Writer {
    /// CLI options of this [`Writer`]. In case no options should be
    /// introduced, just use [`cli::Empty`].
    ///
    /// These options are merged with the [`Engine`] ones into [`cli::Opts`],
    /// so overlapping arguments will cause a runtime panic.
    ///
    /// [`Engine`]: crate::runner::Engine
    type Cli: clap::Args;

    /// Applies the given [`Writer::Cli`] options to this [`Writer`].
    fn apply_cli(&mut self, _: Self::Cli) {}

    /// Handles the given [`Event`].
    fn handle_event(&mut self, ev: &Event<'_>);
}

impl<T: Writer + ?Sized> Writer for &mut T {
    type Cli = T::Cli;

    fn apply_cli(&mut self, cli: Self::Cli) {
        (**self).apply_cli(cli);
    }

    fn handle_event(&mut self, ev: &Event<'_>) {
        (**self).handle_event(ev);
    }
}

impl<T: Writer + ?Sized> Writer for Box<T> {
    type Cli = T::Cli;

    fn apply_cli(&mut self, cli: Self::Cli) {
        (**self).apply_cli(cli);
    }

    fn handle_event(&mut self, ev: &Event<'_>) {
        (**self).handle_event(ev);
    }
}

/// [`Writer`] ignoring every [`Event`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Discard;

impl Writer for Discard {
    type Cli = cli::Empty;

    fn handle_event(&mut self, _: &Event<'_>) {}
}
