// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Commands the shell itself recognizes rather than handing to `execvp`.
//!
//! `cd`, `exit`, `jobs`, `fg`, and `bg` are job-control-relevant and get a
//! parent-process fast path when they're the very first pipeline stage of a
//! foreground command (`is_internal`). `pwd` is never eligible for that fast
//! path — it always runs in a forked child, same as any external program,
//! just without an `execvp` call.

use crate::job::JobTable;
use crate::token::{Token, TokenKind};

use super::error::ExecError;

const INTERNAL_NAMES: [&str; 5] = ["cd", "exit", "jobs", "fg", "bg"];

/// Names `executeCommand`'s forked-child path recognizes and never hands to
/// `execvp`, whether or not they took the parent-process fast path.
pub const NEVER_EXECVP_NAMES: [&str; 6] = ["cd", "exit", "jobs", "fg", "bg", "pwd"];

fn command_name(tokens: &[Token]) -> Option<&str> {
    tokens.first().and_then(|t| t.kind.as_word())
}

/// Mirrors `isInternal`: the first word names one of the five job-control
/// builtins, and no `|` appears before the pipeline's last stage divider.
pub fn is_internal(tokens: &[Token]) -> bool {
    let Some(name) = command_name(tokens) else { return false };
    if !INTERNAL_NAMES.contains(&name) {
        return false;
    }
    let n = tokens.len();
    if n < 2 {
        return true;
    }
    !tokens[1..n - 1].iter().any(|t| t.kind == TokenKind::Pipe)
}

/// Parse a job-number argument the way the original's `atoi` does: anything
/// that doesn't fully parse as an integer is treated as zero.
pub fn parse_job_number(word: &str) -> i64 {
    word.parse().unwrap_or(0)
}

pub fn run_cd(tokens: &[Token]) -> Result<i32, ExecError> {
    let target = match tokens.get(1).and_then(|t| t.kind.as_word()) {
        Some(word) => word.to_string(),
        None => std::env::var("HOME").unwrap_or_default(),
    };
    std::env::set_current_dir(&target)
        .map_err(|e| ExecError::Builtin(format!("cd: {e}")))?;
    Ok(0)
}

pub fn run_pwd() -> Result<i32, ExecError> {
    let cwd = std::env::current_dir().map_err(|e| ExecError::Builtin(format!("pwd: {e}")))?;
    println!("{}", cwd.display());
    Ok(0)
}

pub fn run_jobs(jobs: &mut JobTable, is_subshell: bool) -> Result<i32, ExecError> {
    if is_subshell {
        return Err(ExecError::Builtin("jobs: no job control".into()));
    }
    jobs.reconcile();
    for line in jobs.render(true) {
        println!("{line}");
    }
    jobs.prune_done();
    Ok(0)
}

#[cfg(test)]
#[path = "builtins_tests.rs"]
mod tests;
