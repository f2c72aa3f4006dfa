// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Grammar validation over a flat token slice.
//!
//! Deliberately not an AST walk: the original source validates a flat
//! parameter array with a three-variable automaton (`nospecial`, `noend`,
//! `bracketcnt`), and that's faithfully what this does, rather than building
//! a tree only to immediately discard it.

use thiserror::Error;

use crate::span::Span;
use crate::token::{Token, TokenKind};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error("syntax error near {display}")]
    UnexpectedToken { index: usize, span: Span, display: String },
    #[error("unexpected end of file")]
    UnexpectedEnd,
}

/// Validate a command's token sequence. An empty slice is always valid (a
/// blank line at the prompt).
pub fn check(tokens: &[Token]) -> Result<(), SyntaxError> {
    if tokens.is_empty() {
        return Ok(());
    }

    let mut nospecial = true;
    let mut noend = true;
    let mut bracket_depth: i32 = 0;
    let mut broke_at: Option<usize> = None;

    for (i, tok) in tokens.iter().enumerate() {
        match &tok.kind {
            TokenKind::LParen => {
                bracket_depth += 1;
                nospecial = true;
                noend = true;
            }
            TokenKind::RParen => {
                bracket_depth -= 1;
                if noend || bracket_depth < 0 {
                    broke_at = Some(i);
                    break;
                }
                nospecial = false;
                noend = false;
            }
            _ if nospecial && !tok.kind.is_word() => {
                broke_at = Some(i);
                break;
            }
            TokenKind::Background | TokenKind::Semicolon => {
                nospecial = true;
                noend = false;
            }
            _ if !tok.kind.is_word() => {
                nospecial = true;
                noend = true;
            }
            _ => {
                nospecial = false;
                noend = false;
            }
        }
    }

    if let Some(i) = broke_at {
        return Err(SyntaxError::UnexpectedToken {
            index: i,
            span: tokens[i].span,
            display: tokens[i].kind.to_string(),
        });
    }
    if bracket_depth > 0 || noend {
        return Err(SyntaxError::UnexpectedEnd);
    }
    Ok(())
}

#[cfg(test)]
#[path = "syntax_tests.rs"]
mod tests;
