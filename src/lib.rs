// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Line-oriented [Gherkin]-style feature runner.
//!
//! Step handlers are plain Rust closures registered against regular
//! expressions in a [`step::Collection`]. Feature texts are parsed against
//! that [`step::Collection`] into a [`feature::Program`], in which every step
//! line is already bound to exactly one handler, and only then executed by a
//! [`runner::Engine`], reporting [`Event`]s to a [`Writer`].
//!
//! ```rust
//! # use cukes::{step::Collection, writer, Cukes, Isolation, Reporter};
//! #
//! let mut steps = Collection::<Vec<String>>::new();
//! steps
//!     .given(r"^an empty list$", |_: Isolation<Vec<String>>| {})
//!     .unwrap()
//!     .when(r"^I push (\w+)$", |l: Isolation<Vec<String>>, item: String| {
//!         l.borrow_mut().push(item);
//!     })
//!     .unwrap()
//!     .then(
//!         r"^the list has (\d+) items?$",
//!         |l: Isolation<Vec<String>>, n: usize, r: Reporter| {
//!             if l.borrow().len() != n {
//!                 r.error(format!("list is {:?}", l.borrow()));
//!             }
//!         },
//!     )
//!     .unwrap();
//!
//! let report = Cukes::new(steps)
//!     .with_writer(writer::Discard)
//!     .run_str(
//!         "Feature: lists\n\
//!          \n\
//!          Background:\n\
//!          Given an empty list\n\
//!          \n\
//!          Scenario: pushing\n\
//!          When I push apples\n\
//!          And I push pears\n\
//!          Then the list has 2 items\n",
//!     )
//!     .unwrap();
//!
//! assert!(report.passed());
//! ```
//!
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference

#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![deny(nonstandard_style, trivial_casts, trivial_numeric_casts)]
#![forbid(non_ascii_idents, unsafe_code)]
#![warn(
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::expect_used,
    clippy::get_unwrap,
    clippy::unwrap_used,
    missing_debug_implementations,
    missing_docs
)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod cli;
mod cukes;
pub mod error;
pub mod event;
pub mod feature;
pub mod param;
pub mod parser;
pub mod runner;
pub mod step;
pub mod writer;

#[doc(inline)]
pub use self::{
    cukes::{Cukes, RunReport},
    error::RunError,
    event::Event,
    param::{Isolation, Reporter},
    parser::Parser,
    step::Collection,
    writer::Writer,
};
