// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::token::Token;

fn word(s: &str) -> Token {
    Token::new(TokenKind::Word(s.into()), Span::empty(0))
}

fn tok(kind: TokenKind) -> Token {
    Token::new(kind, Span::empty(0))
}

#[test]
fn empty_line_is_valid() {
    assert!(check(&[]).is_ok());
}

#[test]
fn simple_command_is_valid() {
    let tokens = vec![word("echo"), word("hi")];
    assert!(check(&tokens).is_ok());
}

#[test]
fn pipeline_is_valid() {
    let tokens = vec![word("a"), tok(TokenKind::Pipe), word("b")];
    assert!(check(&tokens).is_ok());
}

#[test]
fn trailing_background_is_valid() {
    let tokens = vec![word("sleep"), word("5"), tok(TokenKind::Background)];
    assert!(check(&tokens).is_ok());
}

#[test]
fn trailing_semicolon_is_valid() {
    let tokens = vec![word("echo"), word("hi"), tok(TokenKind::Semicolon)];
    assert!(check(&tokens).is_ok());
}

#[test]
fn leading_pipe_is_a_syntax_error() {
    let tokens = vec![tok(TokenKind::Pipe), word("a")];
    assert_eq!(check(&tokens), Err(SyntaxError::UnexpectedToken {
        index: 0,
        span: Span::empty(0),
        display: TokenKind::Pipe.to_string(),
    }));
}

#[test]
fn trailing_pipe_is_unexpected_end() {
    let tokens = vec![word("a"), tok(TokenKind::Pipe)];
    assert_eq!(check(&tokens), Err(SyntaxError::UnexpectedEnd));
}

#[test]
fn two_words_in_a_row_without_an_operator_is_an_error() {
    // Within this grammar, adjacent WT_WORDs outside of argv-building are
    // only valid as the very first token of a (sub)command; a bare second
    // word right after a completed command is a syntax error.
    let tokens = vec![word("a"), tok(TokenKind::Semicolon), tok(TokenKind::Semicolon)];
    assert!(check(&tokens).is_err());
}

#[test]
fn balanced_parens_are_valid() {
    let tokens =
        vec![tok(TokenKind::LParen), word("a"), tok(TokenKind::RParen), tok(TokenKind::Background)];
    assert!(check(&tokens).is_ok());
}

#[test]
fn unbalanced_open_paren_is_unexpected_end() {
    let tokens = vec![tok(TokenKind::LParen), word("a")];
    assert_eq!(check(&tokens), Err(SyntaxError::UnexpectedEnd));
}

#[test]
fn unmatched_close_paren_is_a_syntax_error() {
    let tokens = vec![word("a"), tok(TokenKind::RParen)];
    assert!(matches!(check(&tokens), Err(SyntaxError::UnexpectedToken { index: 1, .. })));
}

#[test]
fn empty_parens_are_a_syntax_error() {
    // noend is still true immediately after '(', so ')' right away is
    // rejected rather than treated as an empty subshell.
    let tokens = vec![tok(TokenKind::LParen), tok(TokenKind::RParen)];
    assert!(matches!(check(&tokens), Err(SyntaxError::UnexpectedToken { index: 1, .. })));
}

#[test]
fn redirection_requires_a_following_word() {
    let tokens = vec![word("cmd"), tok(TokenKind::RedirOutTrunc), word("out")];
    assert!(check(&tokens).is_ok());
    let bad = vec![word("cmd"), tok(TokenKind::RedirOutTrunc)];
    assert_eq!(check(&bad), Err(SyntaxError::UnexpectedEnd));
}
