// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Process-group plumbing: pipelines, conditional chains, and the
//! background/foreground split. This is the one place in the crate where
//! `unsafe` is load-bearing — `fork()` itself is unsafe, and there is no
//! safe way to get real job control (process groups, terminal ownership,
//! stop/continue) without it.

use std::ffi::CString;
use std::os::fd::AsRawFd;

use nix::sys::signal::{kill, signal, SigHandler, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{dup2, execvp, fork, getpid, pipe, setpgid, ForkResult, Pid};
use tracing::{info_span, warn};

use crate::job::{JobStatus, JobTable};
use crate::token::{Token, TokenKind};

use super::builtins::{self, NEVER_EXECVP_NAMES};
use super::error::ExecError;
use super::redirect::{apply_redirections, find_redirections, strip_redirections};

/// Find the first top-level token matching `is_divider`, scanning from
/// `begin`, skipping over any bracketed (subshell) span. Returns
/// `tokens.len()` if none is found before the end.
fn find_divider(tokens: &[Token], begin: usize, is_divider: impl Fn(&TokenKind) -> bool) -> usize {
    let mut depth = 0i32;
    let mut i = begin;
    while i < tokens.len() {
        match &tokens[i].kind {
            TokenKind::LParen => depth += 1,
            TokenKind::RParen => depth -= 1,
            k if depth == 0 && is_divider(k) => break,
            _ => {}
        }
        i += 1;
    }
    i
}

pub struct WaitOutcome {
    pub stopped: bool,
    pub exit_status: i32,
}

/// Bring `pgid` to the foreground and block until every process in it has
/// either exited or (when not running inside a subshell) stopped.
pub fn wait_process_group(lastpid: Pid, pgid: Pid, is_subshell: bool) -> WaitOutcome {
    let flags = if is_subshell { None } else { Some(WaitPidFlag::WUNTRACED) };
    if !is_subshell {
        let _ = nix::unistd::tcsetpgrp(std::io::stdin(), pgid);
    }
    let _ = kill(Pid::from_raw(-pgid.as_raw()), Signal::SIGCONT);

    let mut exit_status = 0i32;
    let mut stopped = false;
    loop {
        match waitpid(Pid::from_raw(-pgid.as_raw()), flags) {
            Ok(WaitStatus::Stopped(_, _)) => {
                stopped = true;
                break;
            }
            Ok(status) => {
                if status.pid() == Some(lastpid) {
                    exit_status = match status {
                        WaitStatus::Exited(_, code) => code,
                        WaitStatus::Signaled(_, sig, _) => 128 + sig as i32,
                        _ => exit_status,
                    };
                }
            }
            Err(_) => break,
        }
    }

    if !is_subshell {
        let _ = nix::unistd::tcsetpgrp(std::io::stdin(), getpid());
    }
    if stopped {
        println!();
    }
    WaitOutcome { stopped, exit_status }
}

/// Never returns: runs inside a freshly forked child, either execing an
/// external program or handling one of the names the shell always
/// intercepts, then exits.
fn run_child_command(argv: &[Token], jobs_snapshot: &JobTable, is_subshell: bool) -> ! {
    unsafe {
        let _ = signal(Signal::SIGINT, SigHandler::SigDfl);
        let _ = signal(Signal::SIGTSTP, SigHandler::SigDfl);
        let _ = signal(Signal::SIGTTOU, SigHandler::SigDfl);
    }

    if matches!(argv.first().map(|t| &t.kind), Some(TokenKind::LParen)) {
        let inner = &argv[1..argv.len().saturating_sub(1)];
        std::process::exit(run_launch_jobs(inner, &mut jobs_snapshot.clone(), true).unwrap_or(-1));
    }

    let name = argv.first().and_then(|t| t.kind.as_word()).unwrap_or("");
    if NEVER_EXECVP_NAMES.contains(&name) {
        let code = match name {
            "jobs" => {
                let mut table = jobs_snapshot.clone();
                match builtins::run_jobs(&mut table, is_subshell) {
                    Ok(code) => code,
                    Err(e) => {
                        eprintln!("{e}");
                        1
                    }
                }
            }
            "pwd" => match builtins::run_pwd() {
                Ok(code) => code,
                Err(e) => {
                    eprintln!("{e}");
                    1
                }
            },
            // cd/exit/fg/bg are meaningless once forked: they can't affect
            // the real shell's state, so they're no-ops here.
            _ => 0,
        };
        std::process::exit(code);
    }

    let program = CString::new(name).unwrap_or_default();
    let args: Vec<CString> = argv
        .iter()
        .filter_map(|t| t.kind.as_word())
        .map(|w| CString::new(w).unwrap_or_default())
        .collect();
    match execvp(program.as_c_str(), &args) {
        Ok(_) => unreachable!("execvp only returns on error"),
        Err(source) => {
            eprintln!("xish: {name}: {source}");
            std::process::exit(255);
        }
    }
}

/// Run one pipe-separated stage group (no `&&`/`||`/`;`/`&` inside it),
/// forking one child per stage and wiring pipes between them. Returns the
/// pid of the last stage and the pipeline's process group id.
fn launch_commands(
    tokens: &[Token],
    jobs_snapshot: &JobTable,
    is_subshell: bool,
) -> Result<(Pid, Pid), ExecError> {
    let _span = info_span!("xish.exec.pipeline", stages = tracing::field::Empty).entered();

    let mut pgid = nix::unistd::getpgid(None).unwrap_or_else(|_| getpid());
    let mut begin = 0usize;
    let mut prev_read: Option<std::os::fd::OwnedFd> = None;
    let mut last_pid: Option<Pid> = None;

    while begin < tokens.len() {
        let divider = find_divider(tokens, begin, |k| matches!(k, TokenKind::Pipe));
        let has_next = divider < tokens.len();

        let (read_end, write_end) = if has_next {
            let (r, w) = pipe().map_err(ExecError::Pipe)?;
            (Some(r), Some(w))
        } else {
            (None, None)
        };

        let segment = tokens[begin..divider].to_vec();
        let is_first = begin == 0;

        match unsafe { fork() }.map_err(ExecError::Fork)? {
            ForkResult::Child => {
                let own_pgid = if is_first && !is_subshell { Pid::from_raw(0) } else { pgid };
                let _ = setpgid(Pid::from_raw(0), own_pgid);

                if let Some(r) = &prev_read {
                    let _ = dup2(r.as_raw_fd(), 0);
                }
                if let Some(w) = &write_end {
                    let _ = dup2(w.as_raw_fd(), 1);
                }
                drop(prev_read);
                drop(read_end);
                drop(write_end);

                let redirs = find_redirections(&segment);
                if apply_redirections(&redirs).is_err() {
                    std::process::exit(1);
                }
                let argv = strip_redirections(&segment);
                run_child_command(&argv, jobs_snapshot, is_subshell);
            }
            ForkResult::Parent { child } => {
                if is_first && !is_subshell {
                    pgid = child;
                }
                let _ = setpgid(child, pgid);
                last_pid = Some(child);
            }
        }

        drop(prev_read);
        drop(write_end);
        prev_read = read_end;
        begin = divider + 1;
    }

    let last_pid = last_pid.ok_or_else(|| ExecError::Builtin("empty command".into()))?;
    Ok((last_pid, pgid))
}

/// Run one `&&`/`||`-separated chain (one call per `;`/`&`-separated job),
/// short-circuiting on the chain operators and taking the internal-command
/// fast path for a lone foreground builtin.
fn control_job(
    tokens: &[Token],
    is_foreground: bool,
    jobs: &mut JobTable,
    is_subshell: bool,
) -> Result<i32, ExecError> {
    let mut begin = 0usize;
    let mut exit_status = 0i32;

    while begin < tokens.len() {
        let divider = find_divider(tokens, begin, |k| matches!(k, TokenKind::And | TokenKind::Or));

        if begin > 0 {
            let prev = &tokens[begin - 1].kind;
            let skip = (*prev == TokenKind::And && exit_status != 0)
                || (*prev == TokenKind::Or && exit_status == 0);
            if skip {
                begin = divider + 1;
                continue;
            }
        }

        let segment = &tokens[begin..divider];

        if is_foreground && builtins::is_internal(segment) {
            exit_status = run_internal_foreground(segment, jobs, is_subshell)?;
            begin = divider + 1;
            continue;
        }

        match launch_commands(segment, jobs, is_subshell) {
            Ok((pid, pgid)) => {
                if is_foreground {
                    let outcome = wait_process_group(pid, pgid, is_subshell);
                    if outcome.stopped {
                        let display = render_segment(segment);
                        jobs.add(display, pgid, JobStatus::JustStopped);
                    }
                    exit_status = outcome.exit_status;
                } else if !is_subshell {
                    let display = render_segment(segment);
                    jobs.add(display, pgid, JobStatus::Running);
                    exit_status = 0;
                }
            }
            Err(e) => {
                warn!(error = %e, "failed to launch command");
                exit_status = -1;
            }
        }

        begin = divider + 1;
    }

    Ok(exit_status)
}

/// Run the fast-path parent-process internal commands (`cd`, `exit`,
/// `jobs`, `fg`, `bg`), the only place these can actually mutate the real
/// shell's cwd or job table.
fn run_internal_foreground(
    tokens: &[Token],
    jobs: &mut JobTable,
    is_subshell: bool,
) -> Result<i32, ExecError> {
    let name = tokens.first().and_then(|t| t.kind.as_word()).unwrap_or("");
    match name {
        "exit" => std::process::exit(0),
        "cd" => builtins::run_cd(tokens),
        "jobs" => builtins::run_jobs(jobs, is_subshell),
        "fg" => run_fg(tokens, jobs, is_subshell),
        "bg" => run_bg(tokens, jobs, is_subshell),
        _ => Ok(0),
    }
}

fn run_fg(tokens: &[Token], jobs: &mut JobTable, is_subshell: bool) -> Result<i32, ExecError> {
    if is_subshell {
        return Err(ExecError::Builtin("fg: no job control".into()));
    }
    let number = if tokens.len() == 1 {
        jobs.most_recent().ok_or_else(|| ExecError::Builtin("no such job".into()))?
    } else {
        let arg = tokens[1].kind.as_word().unwrap_or("");
        builtins::parse_job_number(arg).max(0) as usize
    };
    let job = jobs.get(number).ok_or_else(|| ExecError::Builtin("no such job".into()))?;
    let pgid = job.pgid;
    let outcome = wait_process_group(Pid::from_raw(0), pgid, false);
    if outcome.stopped {
        jobs.set_status(number, JobStatus::JustStopped);
    } else {
        jobs.remove(number);
    }
    Ok(0)
}

fn run_bg(tokens: &[Token], jobs: &mut JobTable, is_subshell: bool) -> Result<i32, ExecError> {
    if is_subshell {
        return Err(ExecError::Builtin("bg: no job control".into()));
    }
    let number = if tokens.len() == 1 {
        jobs.most_recent_stopped().ok_or_else(|| ExecError::Builtin("no such job".into()))?
    } else {
        let arg = tokens[1].kind.as_word().unwrap_or("");
        builtins::parse_job_number(arg).max(0) as usize
    };
    let job = jobs.get(number).ok_or_else(|| ExecError::Builtin("no such job".into()))?;
    let pgid = job.pgid;
    let _ = kill(Pid::from_raw(-pgid.as_raw()), Signal::SIGCONT);
    println!("[{number}] {}", job.display);
    jobs.set_status(number, JobStatus::Running);
    Ok(0)
}

fn render_segment(tokens: &[Token]) -> String {
    tokens.iter().map(|t| t.kind.glyph()).collect::<Vec<_>>().join(" ")
}

/// Top-level entry point: runs every `;`/`&`-separated job in `tokens` in
/// order, forking a detached subshell for an `&`-backgrounded job that
/// itself contains `&&`/`||` (so the chain's short-circuiting happens in
/// its own process, not the interactive shell).
pub fn run_launch_jobs(tokens: &[Token], jobs: &mut JobTable, is_subshell: bool) -> Result<i32, ExecError> {
    if is_subshell {
        unsafe {
            let _ = signal(Signal::SIGTTOU, SigHandler::SigIgn);
        }
    }

    let mut begin = 0usize;
    let mut exit_status = 0i32;

    while begin < tokens.len() {
        let divider = find_divider(tokens, begin, |k| matches!(k, TokenKind::Background | TokenKind::Semicolon));
        let is_foreground = divider == tokens.len() || tokens[divider].kind == TokenKind::Semicolon;
        let segment = &tokens[begin..divider];
        let needs_control_subshell = !is_foreground
            && find_divider(segment, 0, |k| matches!(k, TokenKind::And | TokenKind::Or)) < segment.len();

        if needs_control_subshell {
            match unsafe { fork() }.map_err(ExecError::Fork)? {
                ForkResult::Child => {
                    let _ = setpgid(Pid::from_raw(0), Pid::from_raw(0));
                    let inner = segment.to_vec();
                    let mut child_jobs = jobs.clone();
                    std::process::exit(run_launch_jobs(&inner, &mut child_jobs, true).unwrap_or(-1));
                }
                ForkResult::Parent { child } => {
                    let _ = setpgid(child, child);
                    let display = render_segment(segment);
                    jobs.add(display, child, JobStatus::Running);
                }
            }
        } else {
            exit_status = control_job(segment, is_foreground, jobs, is_subshell)?;
        }

        begin = divider + 1;
    }

    Ok(exit_status)
}

#[cfg(test)]
#[path = "launch_tests.rs"]
mod tests;
