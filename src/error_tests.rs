// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn lex_error_converts_and_displays() {
    let err: ShellError = LexError::UnexpectedEof.into();
    assert_eq!(err.to_string(), "unexpected end of file");
}

#[test]
fn syntax_error_converts_and_displays() {
    let err: ShellError = SyntaxError::UnexpectedEnd.into();
    assert_eq!(err.to_string(), "unexpected end of file");
}
