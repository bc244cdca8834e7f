// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Line-oriented parser of [Gherkin]-style feature texts.
//!
//! The [`Parser`] makes a single pass over the text, driven by a stack of
//! [`Mode`]s, and binds every step line to the single pattern of a
//! [`Collection`] matching it.
//!
//! [Gherkin]: https://cucumber.io/docs/gherkin/reference

mod error;
mod line;
mod listing;
mod text_block;

use crate::{
    feature::{
        Background, BoundStep, Keyword, Marker, MarkerKind, Node, Program,
    },
    param,
    step::{AmbiguousMatchError, Collection, FindError},
};

use self::{line::Kind, text_block::TextBlock};

#[doc(inline)]
pub use self::{
    error::{NoMatchingStep, ParseError, Rejected},
    listing::{Line, Listing, Note},
};

/// Position of an already bound step.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum StepRef {
    /// Index in the main node sequence.
    Node(usize),

    /// Index in the steps of the closed `Background:`.
    Background(usize),
}

/// Parsing mode, kept on a stack.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Mode {
    /// Initial mode, also pushed by every `Scenario:` line.
    Declaration,

    /// Free text following a `Feature:` line.
    Narrative,

    /// Inside of a `Background:` region.
    Background,

    /// After a `Given` step.
    Given,

    /// After a `When` step.
    When,

    /// After a `Then` step.
    Then,

    /// Inside of a `"""` text block.
    TextBlock,

    /// Inside of an unsupported `Examples:` section.
    Example,
}

impl Mode {
    const fn is_step(self) -> bool {
        matches!(self, Self::Given | Self::When | Self::Then)
    }

    const fn keyword(self) -> Option<Keyword> {
        match self {
            Self::Given => Some(Keyword::Given),
            Self::When => Some(Keyword::When),
            Self::Then => Some(Keyword::Then),
            Self::Declaration
            | Self::Narrative
            | Self::Background
            | Self::TextBlock
            | Self::Example => None,
        }
    }
}

impl From<Keyword> for Mode {
    fn from(kw: Keyword) -> Self {
        match kw {
            Keyword::Given => Self::Given,
            Keyword::When => Self::When,
            Keyword::Then => Self::Then,
        }
    }
}

/// Parser of feature texts against a [`Collection`] of steps.
///
/// Parsing never mutates the [`Collection`], so the same text always yields
/// the same [`Program`].
#[derive(Debug)]
pub struct Parser<'s, W> {
    steps: &'s Collection<W>,
}

impl<W> Clone for Parser<'_, W> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<W> Copy for Parser<'_, W> {}

impl<'s, W> Parser<'s, W> {
    /// Creates a new [`Parser`] matching step lines against the `steps`.
    #[must_use]
    pub const fn new(steps: &'s Collection<W>) -> Self {
        Self { steps }
    }

    /// Parses the feature `text` into a [`Program`].
    ///
    /// Missing, ambiguous and unbindable steps are collected over the whole
    /// text, so a single pass reports all of them in the [`Listing`].
    ///
    /// # Errors
    ///
    /// If the text is malformed, contains an unsupported construct, or any of
    /// its step lines isn't matched by exactly one bindable pattern.
    pub fn parse(&self, text: &str) -> Result<Program, Rejected> {
        let mut state = State::new(self.steps);
        for (i, raw) in text.lines().enumerate() {
            if let Err(error) = state.line(i + 1, raw) {
                tracing::debug!(%error, "feature rejected");
                return Err(Rejected { error, listing: state.listing });
            }
        }
        state.finish()
    }
}

/// Accumulated state of a single [`Parser::parse()`] call.
struct State<'s, W> {
    steps: &'s Collection<W>,
    modes: Vec<Mode>,
    name: Option<String>,
    narrative: Vec<String>,
    background: Option<Background>,

    /// Index of the open `Background:` marker in `nodes`.
    open_background: Option<usize>,

    nodes: Vec<Node>,
    listing: Listing,
    text_block: Option<TextBlock>,

    /// Step a following text block attaches to.
    last_step: Option<StepRef>,

    missing: Vec<NoMatchingStep>,
    ambiguous: Vec<(usize, AmbiguousMatchError)>,
    unsupported: Option<(usize, String)>,
}

impl<'s, W> State<'s, W> {
    fn new(steps: &'s Collection<W>) -> Self {
        Self {
            steps,
            modes: vec![Mode::Declaration],
            name: None,
            narrative: Vec::new(),
            background: None,
            open_background: None,
            nodes: Vec::new(),
            listing: Listing::default(),
            text_block: None,
            last_step: None,
            missing: Vec::new(),
            ambiguous: Vec::new(),
            unsupported: None,
        }
    }

    fn top(&self) -> Mode {
        self.modes.last().copied().unwrap_or(Mode::Declaration)
    }

    fn line(&mut self, number: usize, raw: &str) -> Result<(), ParseError> {
        let text = raw.trim();
        let indent = line::indent(raw);
        tracing::trace!(line = number, mode = ?self.top(), text, "parsing");
        match self.handle(number, raw, text) {
            Ok(note) => {
                self.listing.push(number, indent, text, note);
                Ok(())
            }
            Err(e) => {
                let note = Note::Failed(e.to_string());
                self.listing.push(number, indent, text, Some(note));
                Err(e)
            }
        }
    }

    fn handle(
        &mut self,
        number: usize,
        raw: &str,
        text: &str,
    ) -> Result<Option<Note>, ParseError> {
        if self.top() == Mode::TextBlock {
            if text.starts_with(line::DELIMITER) {
                self.close_text_block();
            } else if let Some(block) = &mut self.text_block {
                block.push(raw);
            }
            return Ok(None);
        }

        let kind = line::classify(text);
        if self.top() == Mode::Narrative {
            match kind {
                Kind::Other(_) | Kind::And(_) => {
                    self.narrative.push(text.to_owned());
                    return Ok(None);
                }
                Kind::Comment => return Ok(None),
                Kind::Blank
                | Kind::Delimiter
                | Kind::Feature(_)
                | Kind::Background(_)
                | Kind::Scenario(_)
                | Kind::Examples
                | Kind::Step(..) => _ = self.modes.pop(),
            }
        }
        if self.top() == Mode::Example
            && !matches!(
                kind,
                Kind::Blank
                    | Kind::Comment
                    | Kind::Feature(_)
                    | Kind::Background(_)
                    | Kind::Scenario(_),
            )
        {
            return Ok(Some(self.unsupported(number, text)));
        }

        match kind {
            Kind::Blank => {
                self.close_background();
                Ok(None)
            }
            Kind::Comment => Ok(None),
            Kind::Delimiter => {
                self.modes.push(Mode::TextBlock);
                self.text_block =
                    Some(TextBlock::open(line::indent(raw), self.last_step));
                Ok(None)
            }
            Kind::Feature(name) => {
                if name.is_empty() {
                    return Err(ParseError::MissingDescription { line: number });
                }
                if let Some(prev) = self.name.replace(name.to_owned()) {
                    tracing::debug!(%prev, name, "feature renamed");
                }
                self.modes.push(Mode::Narrative);
                Ok(None)
            }
            Kind::Background(name) => {
                if self.background.is_some() || self.open_background.is_some()
                {
                    return Err(ParseError::MultipleBackgrounds { line: number });
                }
                self.modes.push(Mode::Background);
                self.open_background = Some(self.nodes.len());
                self.marker(MarkerKind::Background, name, number);
                Ok(None)
            }
            Kind::Scenario(name) => {
                self.close_background();
                self.modes.push(Mode::Declaration);
                self.marker(MarkerKind::Scenario, name, number);
                Ok(None)
            }
            Kind::Step(keyword, text) => {
                Ok(Some(self.step(number, keyword, false, text)))
            }
            Kind::And(text) => match self.top().keyword() {
                Some(keyword) => {
                    Ok(Some(self.step(number, keyword, true, text)))
                }
                None => Err(ParseError::MisplacedAnd { line: number }),
            },
            Kind::Examples => {
                self.modes.push(Mode::Example);
                Ok(Some(self.unsupported(number, text)))
            }
            Kind::Other(token) => Err(ParseError::UnknownLineKind {
                line: number,
                token: token.to_owned(),
            }),
        }
    }

    fn marker(&mut self, kind: MarkerKind, name: &str, line: usize) {
        self.last_step = None;
        self.nodes.push(Node::Marker(Marker {
            kind,
            name: name.to_owned(),
            line,
        }));
    }

    fn step(
        &mut self,
        number: usize,
        keyword: Keyword,
        conjunction: bool,
        text: &str,
    ) -> Note {
        if self.top().is_step() {
            _ = self.modes.pop();
        }
        self.modes.push(keyword.into());

        match self.steps.find(text) {
            Ok(matched) => {
                let note = Note::Matched(matched.location);
                self.last_step = Some(StepRef::Node(self.nodes.len()));
                self.nodes.push(Node::Step(BoundStep {
                    keyword,
                    conjunction,
                    line: number,
                    args: matched.captures.clone(),
                    matched,
                    docstring: None,
                }));
                note
            }
            Err(e) => {
                self.last_step = None;
                let note = Note::Failed(e.to_string());
                match e {
                    FindError::NotFound => self.missing.push(NoMatchingStep {
                        line: number,
                        text: text.to_owned(),
                    }),
                    FindError::Ambiguous(e) => self.ambiguous.push((number, e)),
                }
                note
            }
        }
    }

    fn unsupported(&mut self, number: usize, text: &str) -> Note {
        let err = ParseError::UnsupportedConstruct {
            line: number,
            construct: text.to_owned(),
        };
        let note = Note::Failed(err.to_string());
        if self.unsupported.is_none() {
            self.unsupported = Some((number, text.to_owned()));
        }
        note
    }

    fn close_text_block(&mut self) {
        if self.top() == Mode::TextBlock {
            _ = self.modes.pop();
        }
        let Some(block) = self.text_block.take() else {
            return;
        };
        let target = block.target();
        let doc = block.finish();
        let step = match target {
            Some(StepRef::Node(i)) => match self.nodes.get_mut(i) {
                Some(Node::Step(step)) => Some(step),
                Some(Node::Marker(_)) | None => None,
            },
            Some(StepRef::Background(i)) => self
                .background
                .as_mut()
                .and_then(|bg| bg.steps.get_mut(i)),
            None => None,
        };
        if let Some(step) = step {
            step.args.push(doc.clone());
            step.docstring = Some(doc);
        } else {
            tracing::debug!("text block without a step is ignored");
        }
        self.last_step = None;
    }

    /// Moves the steps of a still open `Background:` region out of the main
    /// sequence, if the mode stack shows we're inside of it.
    fn close_background(&mut self) {
        let Some(pos) = self
            .modes
            .iter()
            .rposition(|m| matches!(m, Mode::Background | Mode::Declaration))
        else {
            return;
        };
        if self.modes[pos] != Mode::Background {
            return;
        }
        let Some(start) = self.open_background.take() else {
            return;
        };
        self.modes.truncate(pos);

        // A text block may still follow the last background step.
        let last = match self.last_step {
            Some(StepRef::Node(i)) if i > start => self.nodes.get(start..i).map(
                |before| {
                    before.iter().filter(|n| matches!(n, Node::Step(_))).count()
                },
            ),
            Some(StepRef::Node(_) | StepRef::Background(_)) | None => None,
        };

        let mut nodes = self.nodes.split_off(start).into_iter();
        let (name, line) = match nodes.next() {
            Some(Node::Marker(m)) => (m.name, m.line),
            Some(Node::Step(_)) | None => (String::new(), 0),
        };
        let steps = nodes
            .filter_map(|n| match n {
                Node::Step(s) => Some(s),
                Node::Marker(_) => None,
            })
            .collect::<Vec<_>>();
        tracing::debug!(steps = steps.len(), "background closed");
        self.background = Some(Background { name, line, steps });
        self.last_step = last.map(StepRef::Background);
    }

    /// Verifies every bound step can be bound to its handler, annotating the
    /// failing ones.
    fn check_arity(&mut self) -> Vec<(usize, param::ArityMismatch)> {
        let steps = self
            .background
            .iter()
            .flat_map(|bg| bg.steps.iter())
            .chain(self.nodes.iter().filter_map(|n| match n {
                Node::Step(s) => Some(s),
                Node::Marker(_) => None,
            }));

        let mut failed = Vec::new();
        for step in steps {
            let Some(shapes) = self.steps.shapes(step.matched.handler) else {
                continue;
            };
            if let Err(e) =
                param::check_arity(step.text(), shapes, step.args.len())
            {
                self.listing
                    .annotate(step.line, Note::Failed(e.to_string()));
                failed.push((step.line, e));
            }
        }
        failed
    }

    fn finish(mut self) -> Result<Program, Rejected> {
        if self.text_block.is_some() {
            tracing::warn!("unterminated text block closed at end of feature");
            self.close_text_block();
        }
        self.close_background();

        let mut arity = self.check_arity();
        arity.sort_by_key(|(line, _)| *line);

        let error = if let Some((line, construct)) = self.unsupported {
            Some(ParseError::UnsupportedConstruct { line, construct })
        } else if let Some((line, error)) = self.ambiguous.into_iter().next() {
            Some(ParseError::AmbiguousStep { line, error })
        } else if let Some((line, error)) = arity.into_iter().next() {
            Some(ParseError::ArityMismatch { line, error })
        } else if !self.missing.is_empty() {
            Some(ParseError::UnimplementedSteps(self.missing))
        } else {
            None
        };
        if let Some(error) = error {
            tracing::debug!(%error, "feature rejected");
            return Err(Rejected { error, listing: self.listing });
        }

        let program = Program {
            name: self.name,
            narrative: self.narrative,
            background: self.background,
            nodes: self.nodes,
            listing: self.listing,
        };
        tracing::debug!(
            name = program.name.as_deref(),
            scenarios = program.scenarios().count(),
            steps = program.steps().count(),
            "feature parsed",
        );
        Ok(program)
    }
}
