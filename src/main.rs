// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The interactive REPL binary: read a command, validate it, launch it,
//! reconcile the job table, print the prompt, repeat.

use std::io::Write;

use nix::sys::signal::{signal, SigHandler, Signal};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use xish::exec::run_launch_jobs;
use xish::job::JobTable;
use xish::lexer::{LexOutcome, Lexer};
use xish::syntax;

const CONT_PROMPT: &str = "> ";
const DFL_PROMPT: &str = "$ ";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = fmt::layer().with_writer(std::io::stderr).with_target(false);
    let _ = tracing_subscriber::registry().with(filter).with(subscriber).try_init();
}

/// Mirrors `setEnvVars`: publish `SHELL`, `EUID`, and `USER` for child
/// processes to inherit, best-effort (a failure here is never fatal).
fn set_env_vars() {
    if let Ok(exe) = std::fs::read_link("/proc/self/exe") {
        std::env::set_var("SHELL", exe);
    }
    std::env::set_var("EUID", nix::unistd::Uid::effective().to_string());
    match nix::unistd::User::from_uid(nix::unistd::Uid::effective()) {
        Ok(Some(user)) => std::env::set_var("USER", user.name),
        // No passwd entry for this uid (common in containers/sandboxes): keep
        // whatever USER/LOGNAME the login session already set instead of
        // failing initialisation the way the original's getlogin_r does.
        _ => {
            if let Ok(name) = std::env::var("USER").or_else(|_| std::env::var("LOGNAME")) {
                std::env::set_var("USER", name);
            }
        }
    }
}

fn show_prompt() {
    let login = std::env::var("USER").ok();
    let hostname = nix::unistd::gethostname().ok().and_then(|h| h.into_string().ok());
    let cwd = std::env::current_dir().ok();
    match (login, hostname, cwd) {
        (Some(login), Some(hostname), Some(cwd)) => {
            print!("{login}@{hostname} {} $ ", cwd.display())
        }
        _ => print!("{DFL_PROMPT}"),
    }
    let _ = std::io::stdout().flush();
}

fn main() {
    init_tracing();

    unsafe {
        let _ = signal(Signal::SIGINT, SigHandler::SigIgn);
        let _ = signal(Signal::SIGTSTP, SigHandler::SigIgn);
        let _ = signal(Signal::SIGTTOU, SigHandler::SigIgn);
    }

    set_env_vars();

    let mut lexer = Lexer::new();
    let mut jobs = JobTable::new();
    let stdin = std::io::stdin();
    let mut stdin = stdin.lock();

    show_prompt();
    loop {
        let outcome = lexer.tokenize(&mut stdin, || {
            print!("{CONT_PROMPT}");
            let _ = std::io::stdout().flush();
        });

        match outcome {
            Ok(LexOutcome::Eof) => {
                println!();
                break;
            }
            Ok(LexOutcome::Tokens(tokens, _raw)) => match syntax::check(&tokens) {
                Ok(()) => {
                    if let Err(e) = run_launch_jobs(&tokens, &mut jobs, false) {
                        eprintln!("{e}");
                    }
                }
                Err(e) => eprintln!("xish: {e}"),
            },
            Err(e) => eprintln!("xish: {e}"),
        }

        jobs.reconcile();
        for line in jobs.render(false) {
            println!("{line}");
        }
        jobs.prune_done();
        show_prompt();
    }

    std::process::exit(0);
}
