// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Character-stream lexer: turns (potentially multi-line) input into a flat
//! token sequence.
//!
//! Per the single-transition-table redesign direction, the whole machine is
//! one `State` enum driven by one `feed` method, rather than duplicating the
//! `Word`/`Between` branches the original C source carries.

use thiserror::Error;

use crate::env;
use crate::token::{Span, Token, TokenKind};

/// A source of physical input lines. Implemented for anything that is
/// `BufRead` (a locked stdin in production, an in-memory cursor in tests).
/// `read_line` returning `Ok(0)` means true end-of-input.
pub trait LineSource {
    fn read_line(&mut self, buf: &mut String) -> std::io::Result<usize>;
}

impl<R: std::io::BufRead> LineSource for R {
    fn read_line(&mut self, buf: &mut String) -> std::io::Result<usize> {
        std::io::BufRead::read_line(self, buf)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    /// Input ended while a word, quote, escape, or bracketed construct was
    /// still open. The caller drops the whole in-progress line.
    #[error("unexpected end of file")]
    UnexpectedEof,
    /// Reserved for parity with the original's allocation-failure path
    /// (spec.md §7.1); unreachable in safe Rust, where `String`/`Vec` growth
    /// either succeeds or aborts the process.
    #[error("out of memory")]
    OutOfMemory,
}

/// Result of a full `Lexer::tokenize` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexOutcome {
    /// End of input reached with nothing parsed yet.
    Eof,
    /// A complete, newline- or comment-terminated token sequence, along with
    /// the raw text it was read from (used for job display strings and for
    /// the round-trip testable property).
    Tokens(Vec<Token>, String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Between,
    Word,
    Escape,
    Quotes,
    Special,
    Env,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    Word,
    Quotes,
}

enum Feed {
    Continue,
    Done { discard_rest_of_line: bool },
}

/// Classify a character that starts a new non-word token, mirroring the
/// original's `charType(ch, 0)`.
fn classify_start(ch: char) -> Option<TokenKind> {
    match ch {
        '>' => Some(TokenKind::RedirOutTrunc),
        '<' => Some(TokenKind::RedirIn),
        '&' => Some(TokenKind::Background),
        '|' => Some(TokenKind::Pipe),
        '(' => Some(TokenKind::LParen),
        ')' => Some(TokenKind::RParen),
        ';' => Some(TokenKind::Semicolon),
        _ => None,
    }
}

/// Try to promote a pending `Special` token kind given the next character,
/// mirroring the original's double-character promotions.
fn try_promote(pending: &TokenKind, ch: char) -> Option<TokenKind> {
    match (pending, ch) {
        (TokenKind::RedirOutTrunc, '>') => Some(TokenKind::RedirOutAppend),
        (TokenKind::Pipe, '|') => Some(TokenKind::Or),
        (TokenKind::Background, '&') => Some(TokenKind::And),
        _ => None,
    }
}

/// Tokenizes one logical command (possibly spanning several physical input
/// lines) at a time.
pub struct Lexer {
    state: State,
    prev: Prev,
    bracket_depth: i32,
    raw: String,
    tokens: Vec<Token>,
    word_buf: String,
    word_start: usize,
    special_kind: Option<TokenKind>,
    special_start: usize,
    env_name: String,
    line_chars: std::vec::IntoIter<char>,
}

impl Default for Lexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexer {
    pub fn new() -> Self {
        Self {
            state: State::Between,
            prev: Prev::Word,
            bracket_depth: 0,
            raw: String::new(),
            tokens: Vec::new(),
            word_buf: String::new(),
            word_start: 0,
            special_kind: None,
            special_start: 0,
            env_name: String::new(),
            line_chars: Vec::new().into_iter(),
        }
    }

    fn reset(&mut self) {
        self.state = State::Between;
        self.bracket_depth = 0;
        self.raw.clear();
        self.tokens.clear();
        self.word_buf.clear();
        self.env_name.clear();
    }

    /// Read and tokenize one full logical command. `on_continuation` is
    /// invoked exactly at the points the spec's transition table calls for
    /// emitting the `> ` continuation prompt.
    pub fn tokenize(
        &mut self,
        source: &mut dyn LineSource,
        mut on_continuation: impl FnMut(),
    ) -> Result<LexOutcome, LexError> {
        self.reset();
        loop {
            match self.next_physical_char(source).map_err(|_| LexError::UnexpectedEof)? {
                None => {
                    if self.state == State::Between && self.tokens.is_empty() && self.raw.is_empty()
                    {
                        return Ok(LexOutcome::Eof);
                    }
                    return Err(LexError::UnexpectedEof);
                }
                Some(ch) => match self.feed(ch, &mut on_continuation)? {
                    Feed::Continue => {}
                    Feed::Done { discard_rest_of_line } => {
                        if discard_rest_of_line {
                            self.line_chars = Vec::new().into_iter();
                        }
                        return Ok(LexOutcome::Tokens(
                            std::mem::take(&mut self.tokens),
                            std::mem::take(&mut self.raw),
                        ));
                    }
                },
            }
        }
    }

    fn next_physical_char(
        &mut self,
        source: &mut dyn LineSource,
    ) -> std::io::Result<Option<char>> {
        loop {
            if let Some(c) = self.line_chars.next() {
                return Ok(Some(c));
            }
            let mut buf = String::new();
            let n = source.read_line(&mut buf)?;
            if n == 0 {
                return Ok(None);
            }
            self.line_chars = buf.chars().collect::<Vec<_>>().into_iter();
        }
    }

    fn feed(&mut self, first_ch: char, on_cont: &mut impl FnMut()) -> Result<Feed, LexError> {
        self.raw.push(first_ch);
        let mut ch = first_ch;
        loop {
            match self.state {
                State::Special => match self.feed_special(ch) {
                    Some(feed) => return Ok(feed),
                    None => continue,
                },
                State::Between => return Ok(self.feed_between(ch, on_cont)),
                State::Word => return Ok(self.feed_word(ch, on_cont)),
                State::Escape => {
                    self.feed_escape(ch, on_cont);
                    return Ok(Feed::Continue);
                }
                State::Quotes => return Ok(self.feed_quotes(ch, on_cont)),
                State::Env => {
                    if env::is_name_char(ch) {
                        self.env_name.push(ch);
                        return Ok(Feed::Continue);
                    }
                    self.finish_env();
                    self.state = State::Word;
                    continue;
                }
            }
        }
    }

    fn begin_word(&mut self) {
        self.word_buf.clear();
        self.word_start = self.raw.len() - 1;
    }

    fn finish_word(&mut self) {
        let span = Span::new(self.word_start, self.raw.len());
        self.tokens.push(Token::new(TokenKind::Word(std::mem::take(&mut self.word_buf)), span));
    }

    fn finish_env(&mut self) {
        let value = env::process_env_lookup(&self.env_name).unwrap_or_default();
        self.word_buf.push_str(&value);
        self.env_name.clear();
    }

    fn begin_special(&mut self, kind: TokenKind) {
        self.special_start = self.raw.len() - 1;
        self.special_kind = Some(kind);
        self.state = State::Special;
    }

    fn feed_special(&mut self, ch: char) -> Option<Feed> {
        let pending = self.special_kind.clone().expect("Special state always has a pending kind");
        if let Some(promoted) = try_promote(&pending, ch) {
            self.raw.push(ch);
            let span = Span::new(self.special_start, self.raw.len());
            self.tokens.push(Token::new(promoted, span));
            self.special_kind = None;
            self.state = State::Between;
            return Some(Feed::Continue);
        }
        let span = Span::new(self.special_start, self.special_start + 1);
        self.tokens.push(Token::new(pending, span));
        self.special_kind = None;
        self.state = State::Between;
        None
    }

    fn adjust_brackets(&mut self, ch: char) {
        match ch {
            '(' => self.bracket_depth += 1,
            ')' => self.bracket_depth -= 1,
            _ => {}
        }
    }

    fn feed_between(&mut self, ch: char, on_cont: &mut impl FnMut()) -> Feed {
        self.adjust_brackets(ch);
        match ch {
            '\n' if self.bracket_depth > 0 => {
                on_cont();
                Feed::Continue
            }
            '\n' => Feed::Done { discard_rest_of_line: false },
            '\\' => {
                self.prev = Prev::Word;
                self.state = State::Escape;
                self.begin_word();
                Feed::Continue
            }
            '#' => Feed::Done { discard_rest_of_line: true },
            '"' => {
                self.state = State::Quotes;
                self.begin_word();
                Feed::Continue
            }
            c if c.is_whitespace() => Feed::Continue,
            c if classify_start(c).is_some() => {
                let kind = classify_start(c).expect("checked above");
                self.begin_special(kind);
                Feed::Continue
            }
            '$' => {
                self.state = State::Env;
                self.begin_word();
                Feed::Continue
            }
            c => {
                self.state = State::Word;
                self.begin_word();
                self.word_buf.push(c);
                Feed::Continue
            }
        }
    }

    fn feed_word(&mut self, ch: char, on_cont: &mut impl FnMut()) -> Feed {
        self.adjust_brackets(ch);
        match ch {
            '\n' if self.bracket_depth > 0 => {
                on_cont();
                Feed::Continue
            }
            '\n' => {
                self.finish_word();
                Feed::Done { discard_rest_of_line: false }
            }
            '\\' => {
                self.prev = Prev::Word;
                self.state = State::Escape;
                Feed::Continue
            }
            '#' => {
                self.finish_word();
                Feed::Done { discard_rest_of_line: true }
            }
            '"' => {
                self.finish_word();
                self.state = State::Quotes;
                self.begin_word();
                Feed::Continue
            }
            c if c.is_whitespace() => {
                self.finish_word();
                self.state = State::Between;
                Feed::Continue
            }
            c if classify_start(c).is_some() => {
                self.finish_word();
                let kind = classify_start(c).expect("checked above");
                self.begin_special(kind);
                Feed::Continue
            }
            '$' => {
                self.state = State::Env;
                Feed::Continue
            }
            c => {
                self.word_buf.push(c);
                Feed::Continue
            }
        }
    }

    fn feed_escape(&mut self, ch: char, on_cont: &mut impl FnMut()) {
        self.state = match self.prev {
            Prev::Word => State::Word,
            Prev::Quotes => State::Quotes,
        };
        if ch == '\n' {
            on_cont();
        } else {
            self.word_buf.push(ch);
        }
    }

    fn feed_quotes(&mut self, ch: char, on_cont: &mut impl FnMut()) -> Feed {
        if ch == '\n' {
            on_cont();
        }
        match ch {
            '\\' => {
                self.prev = Prev::Quotes;
                self.state = State::Escape;
            }
            '"' => {
                self.finish_word();
                self.state = State::Between;
            }
            c => {
                self.word_buf.push(c);
            }
        }
        Feed::Continue
    }
}

#[cfg(test)]
#[path = "lexer_tests.rs"]
mod tests;
