// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Annotated listing of a parsed feature text.

use std::fmt;

use derive_more::Display;

use crate::step::Location;

/// Annotation of a step line in a [`Listing`].
#[derive(Clone, Debug, Display, Eq, PartialEq)]
pub enum Note {
    /// Line is bound to the handler registered at this [`Location`].
    #[display("\u{2714} {_0}")]
    Matched(Location),

    /// Line failed with this message.
    #[display("\u{2718} {_0}")]
    Failed(String),
}

impl Note {
    /// Indicates whether this [`Note`] is a failure.
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Single line of a [`Listing`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Line {
    /// 1-based line number.
    pub number: usize,

    /// Number of leading whitespace characters of the source line.
    pub indent: usize,

    /// Trimmed source line.
    pub text: String,

    /// Annotation of this line, if it's a step or a failing line.
    pub note: Option<Note>,
}

impl Line {
    /// Source line with its indentation normalized to spaces.
    #[must_use]
    pub fn source(&self) -> String {
        format!("{:indent$}{}", "", self.text, indent = self.indent)
    }

    fn width(&self) -> usize {
        self.indent + self.text.chars().count()
    }
}

/// Every line of a feature text, each with an optional [`Note`].
///
/// Renders as a two-column table: the source lines keep their indentation
/// and the notes are aligned after the longest of them.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Listing {
    lines: Vec<Line>,
}

impl Listing {
    /// Lines of this [`Listing`] in source order.
    #[must_use]
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Returns the [`Line`] with the given 1-based `number`.
    #[must_use]
    pub fn line(&self, number: usize) -> Option<&Line> {
        self.lines.iter().find(|l| l.number == number)
    }

    /// Iterates over the lines annotated with a failure.
    pub fn failures(&self) -> impl Iterator<Item = &Line> + '_ {
        self.lines
            .iter()
            .filter(|l| l.note.as_ref().is_some_and(Note::is_failure))
    }

    /// Column at which the notes start.
    #[must_use]
    pub fn width(&self) -> usize {
        self.lines.iter().map(Line::width).max().unwrap_or(0)
    }

    pub(crate) fn push(
        &mut self,
        number: usize,
        indent: usize,
        text: &str,
        note: Option<Note>,
    ) {
        self.lines.push(Line { number, indent, text: text.to_owned(), note });
    }

    /// Replaces the [`Note`] of the line with the given `number`.
    pub(crate) fn annotate(&mut self, number: usize, note: Note) {
        if let Some(line) = self.lines.iter_mut().find(|l| l.number == number)
        {
            line.note = Some(note);
        }
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.width();
        for (i, line) in self.lines.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            let source = line.source();
            match &line.note {
                None => write!(f, "{}", source.trim_end())?,
                Some(note) => {
                    let note = note.to_string().replace(
                        '\n',
                        &format!("\n{:width$}", "", width = width + 4),
                    );
                    write!(f, "{source:width$}  {note}")?;
                }
            }
        }
        Ok(())
    }
}
