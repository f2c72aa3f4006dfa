// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Two-pass redirection handling, split the same way the original source
//! splits it: a forward pass builds the argv with every top-level
//! redirection operator+operand pair removed, and an independent backward
//! pass finds the one winning redirection per direction. Both passes track
//! bracket depth so a nested subshell's own redirections are left alone for
//! its own (recursive) pass to handle.

use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::dup2;

use crate::exec::error::ExecError;
use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Redirections {
    pub stdin_path: Option<String>,
    /// `(path, append)` — `append` false means truncate.
    pub stdout: Option<(String, bool)>,
}

fn adjust_depth(kind: &TokenKind, depth: &mut i32) {
    match kind {
        TokenKind::LParen => *depth -= 1,
        TokenKind::RParen => *depth += 1,
        _ => {}
    }
}

/// Build the argv token list with every top-level redirection operator and
/// its operand removed.
pub fn strip_redirections(tokens: &[Token]) -> Vec<Token> {
    let mut depth = 0i32;
    let mut out = Vec::with_capacity(tokens.len());
    let mut i = 0;
    while i < tokens.len() {
        let kind = &tokens[i].kind;
        if depth == 0 && kind.is_redirection() {
            i += 2;
            continue;
        }
        adjust_depth(kind, &mut depth);
        out.push(tokens[i].clone());
        i += 1;
    }
    out
}

/// Scan right-to-left for the single winning redirection per direction. The
/// first (rightmost) `<` wins for stdin; the first (rightmost) `>` or `>>`
/// wins for stdout, whichever kind it is.
pub fn find_redirections(tokens: &[Token]) -> Redirections {
    let mut result = Redirections::default();
    if tokens.len() < 3 {
        return result;
    }
    let mut depth = 0i32;
    let mut i = tokens.len() as isize - 2;
    while i > 0 {
        let idx = i as usize;
        let kind = &tokens[idx].kind;
        if depth == 0 && kind.is_redirection() {
            let operand = tokens.get(idx + 1).and_then(|t| t.kind.as_word()).unwrap_or("").to_string();
            match kind {
                TokenKind::RedirOutTrunc if result.stdout.is_none() => {
                    result.stdout = Some((operand, false));
                }
                TokenKind::RedirOutAppend if result.stdout.is_none() => {
                    result.stdout = Some((operand, true));
                }
                TokenKind::RedirIn if result.stdin_path.is_none() => {
                    result.stdin_path = Some(operand);
                }
                _ => {}
            }
        } else {
            adjust_depth(kind, &mut depth);
        }
        i -= 1;
    }
    result
}

/// Open and `dup2` the winning redirections into the calling process's
/// stdin/stdout. Returns whether any redirection was applied. Must only be
/// called in a process about to exec or exit — it permanently rewires fds
/// 0/1.
pub fn apply_redirections(redirs: &Redirections) -> Result<bool, ExecError> {
    let mut applied = false;

    if let Some(path) = &redirs.stdin_path {
        let fd = open(path.as_str(), OFlag::O_RDONLY, Mode::empty())
            .map_err(|source| ExecError::Redirect { path: path.clone(), source })?;
        dup2(fd, 0).map_err(|source| ExecError::Redirect { path: path.clone(), source })?;
        let _ = nix::unistd::close(fd);
        applied = true;
    }

    if let Some((path, append)) = &redirs.stdout {
        let mut flags = OFlag::O_WRONLY | OFlag::O_CREAT;
        flags |= if *append { OFlag::O_APPEND } else { OFlag::O_TRUNC };
        let fd = open(path.as_str(), flags, Mode::from_bits_truncate(0o644))
            .map_err(|source| ExecError::Redirect { path: path.clone(), source })?;
        dup2(fd, 1).map_err(|source| ExecError::Redirect { path: path.clone(), source })?;
        let _ = nix::unistd::close(fd);
        applied = true;
    }

    Ok(applied)
}

#[cfg(test)]
#[path = "redirect_tests.rs"]
mod tests;
