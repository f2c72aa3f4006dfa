// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExecError {
    #[error("xish: fork failed: {0}")]
    Fork(#[source] nix::Error),

    #[error("xish: {path}: {source}")]
    Redirect { path: String, source: nix::Error },

    #[error("xish: {program}: {source}")]
    Exec { program: String, source: nix::Error },

    #[error("xish: {0}")]
    Builtin(String),

    #[error("xish: pipe failed: {0}")]
    Pipe(#[source] nix::Error),
}
