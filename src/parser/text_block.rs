// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Multi-line text argument delimited by `"""` lines.

use super::{line, StepRef};

/// Text block being accumulated.
#[derive(Clone, Debug)]
pub(crate) struct TextBlock {
    /// Indentation column of the opening delimiter.
    column: usize,

    /// Step this block is attached to, if any.
    target: Option<StepRef>,

    lines: Vec<String>,
}

impl TextBlock {
    pub(crate) const fn open(column: usize, target: Option<StepRef>) -> Self {
        Self { column, target, lines: Vec::new() }
    }

    pub(crate) const fn target(&self) -> Option<StepRef> {
        self.target
    }

    /// Adds a raw (untrimmed) line, losing at most the delimiter's column of
    /// leading whitespace. Trailing whitespace is kept.
    pub(crate) fn push(&mut self, raw: &str) {
        let strip = line::indent(raw).min(self.column);
        let rest = raw.char_indices().nth(strip).map_or("", |(i, _)| &raw[i..]);
        self.lines.push(rest.to_owned());
    }

    /// Closes the block, dedenting it by the smallest common indentation of
    /// its non-blank lines.
    pub(crate) fn finish(self) -> String {
        let common = self
            .lines
            .iter()
            .filter(|l| !l.trim().is_empty())
            .map(|l| line::indent(l))
            .min()
            .unwrap_or(0);
        self.lines
            .iter()
            .map(|l| l.char_indices().nth(common).map_or("", |(i, _)| &l[i..]))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_indentation_relative_to_delimiter() {
        let mut block = TextBlock::open(2, Some(StepRef::Node(0)));
        block.push("    line1");
        block.push("    line2");

        assert_eq!(block.target(), Some(StepRef::Node(0)));
        assert_eq!(block.finish(), "line1\nline2");
    }

    #[test]
    fn keeps_relative_indentation() {
        let mut block = TextBlock::open(4, None);
        block.push("      {");
        block.push("        \"a\": 1");
        block.push("      }");

        assert_eq!(block.finish(), "{\n  \"a\": 1\n}");
    }

    #[test]
    fn blank_lines_survive_and_do_not_limit_dedent() {
        let mut block = TextBlock::open(2, None);
        block.push("    first");
        block.push("");
        block.push("    second");

        assert_eq!(block.finish(), "first\n\nsecond");
    }

    #[test]
    fn content_left_of_delimiter_is_kept() {
        let mut block = TextBlock::open(6, None);
        block.push("  shallow");
        block.push("        deep");

        assert_eq!(block.finish(), "shallow\n  deep");
    }

    #[test]
    fn trailing_whitespace_is_kept() {
        let mut block = TextBlock::open(2, None);
        block.push("  keep two  ");
        block.push("      ");
        block.push("  tab\t");

        assert_eq!(block.finish(), "keep two  \n    \ntab\t");
    }

    #[test]
    fn empty_block() {
        assert_eq!(TextBlock::open(0, None).finish(), "");
    }
}
