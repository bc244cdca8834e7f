// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Classification of a single trimmed feature line.

use lazy_regex::regex_captures;

use crate::feature::Keyword;

/// Delimiter opening and closing a text block.
pub(crate) const DELIMITER: &str = "\"\"\"";

/// Kind of a trimmed feature line.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Kind<'l> {
    Blank,
    Comment,
    Delimiter,
    Feature(&'l str),
    Background(&'l str),
    Scenario(&'l str),
    Examples,
    Step(Keyword, &'l str),
    And(&'l str),
    Other(&'l str),
}

/// Classifies the `line`, which must be already trimmed.
pub(crate) fn classify(line: &str) -> Kind<'_> {
    if line.is_empty() {
        return Kind::Blank;
    }
    if line.starts_with(DELIMITER) {
        return Kind::Delimiter;
    }
    if line.starts_with('#') {
        return Kind::Comment;
    }
    if let Some(rest) = line.strip_prefix("Feature:") {
        return Kind::Feature(rest.trim());
    }
    if let Some(rest) = line.strip_prefix("Background:") {
        return Kind::Background(rest.trim());
    }
    if let Some((_, name)) =
        regex_captures!(r"^Scenario(?:\s+Outline)?(?::|\s|$)\s*(.*)$", line)
    {
        return Kind::Scenario(name.trim());
    }
    if line.starts_with("Examples:") {
        return Kind::Examples;
    }
    if let Some((_, keyword, text)) =
        regex_captures!(r"^(Given|When|Then|And)(?:\s+(.*))?$", line)
    {
        return match keyword {
            "Given" => Kind::Step(Keyword::Given, text),
            "When" => Kind::Step(Keyword::When, text),
            "Then" => Kind::Step(Keyword::Then, text),
            _ => Kind::And(text),
        };
    }
    Kind::Other(first_token(line))
}

/// First whitespace-delimited token of the `line`.
pub(crate) fn first_token(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or(line)
}

/// Number of leading whitespace characters of the `line`.
pub(crate) fn indent(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}
