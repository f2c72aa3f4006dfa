// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level error type for a single pass through the prompt loop.

use thiserror::Error;

use crate::exec::ExecError;
use crate::lexer::LexError;
use crate::syntax::SyntaxError;

#[derive(Debug, Error)]
pub enum ShellError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Exec(#[from] ExecError),
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
