// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::span::Span;

fn word(s: &str) -> Token {
    Token::new(TokenKind::Word(s.into()), Span::empty(0))
}

fn tok(kind: TokenKind) -> Token {
    Token::new(kind, Span::empty(0))
}

#[test]
fn strip_removes_operator_and_operand() {
    let tokens = vec![word("cat"), tok(TokenKind::RedirOutTrunc), word("out.txt")];
    let stripped = strip_redirections(&tokens);
    assert_eq!(stripped, vec![word("cat")]);
}

#[test]
fn strip_leaves_plain_words_alone() {
    let tokens = vec![word("echo"), word("hi")];
    assert_eq!(strip_redirections(&tokens), tokens);
}

#[test]
fn strip_leaves_nested_subshell_redirections_for_its_own_pass() {
    let tokens = vec![
        tok(TokenKind::LParen),
        word("cat"),
        tok(TokenKind::RedirIn),
        word("in.txt"),
        tok(TokenKind::RParen),
        tok(TokenKind::RedirOutTrunc),
        word("out.txt"),
    ];
    let stripped = strip_redirections(&tokens);
    assert_eq!(
        stripped,
        vec![
            tok(TokenKind::LParen),
            word("cat"),
            tok(TokenKind::RedirIn),
            word("in.txt"),
            tok(TokenKind::RParen),
        ]
    );
}

#[test]
fn find_picks_rightmost_stdout_redirection() {
    let tokens =
        vec![word("cmd"), tok(TokenKind::RedirOutTrunc), word("a"), tok(TokenKind::RedirOutTrunc), word("b")];
    let redirs = find_redirections(&tokens);
    assert_eq!(redirs.stdout, Some(("b".to_string(), false)));
}

#[test]
fn find_distinguishes_truncate_and_append() {
    let tokens = vec![word("cmd"), tok(TokenKind::RedirOutAppend), word("log")];
    let redirs = find_redirections(&tokens);
    assert_eq!(redirs.stdout, Some(("log".to_string(), true)));
}

#[test]
fn find_handles_both_directions_independently() {
    let tokens = vec![
        word("tr"),
        tok(TokenKind::RedirIn),
        word("in.txt"),
        tok(TokenKind::RedirOutTrunc),
        word("out.txt"),
    ];
    let redirs = find_redirections(&tokens);
    assert_eq!(redirs.stdin_path, Some("in.txt".to_string()));
    assert_eq!(redirs.stdout, Some(("out.txt".to_string(), false)));
}

#[test]
fn find_ignores_redirections_inside_a_nested_subshell() {
    let tokens = vec![
        tok(TokenKind::LParen),
        word("cat"),
        tok(TokenKind::RedirIn),
        word("inner.txt"),
        tok(TokenKind::RParen),
        tok(TokenKind::RedirOutTrunc),
        word("outer.txt"),
    ];
    let redirs = find_redirections(&tokens);
    assert_eq!(redirs.stdin_path, None);
    assert_eq!(redirs.stdout, Some(("outer.txt".to_string(), false)));
}

#[test]
fn no_redirection_tokens_yields_empty_result() {
    let tokens = vec![word("echo"), word("hi")];
    assert_eq!(find_redirections(&tokens), Redirections::default());
}

#[test]
fn apply_redirections_rewires_stdout_to_a_real_file() {
    use std::io::Read;

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("out.txt");

    // Run the fd rewiring in a forked child so the test process's own
    // stdout is never touched.
    match unsafe { nix::unistd::fork() }.expect("fork") {
        nix::unistd::ForkResult::Child => {
            let redirs = Redirections { stdin_path: None, stdout: Some((path.to_str().unwrap().to_string(), false)) };
            if apply_redirections(&redirs).is_err() {
                std::process::exit(1);
            }
            println!("hello from child");
            std::process::exit(0);
        }
        nix::unistd::ForkResult::Parent { child } => {
            let status = nix::sys::wait::waitpid(child, None).expect("waitpid");
            assert_eq!(status, nix::sys::wait::WaitStatus::Exited(child, 0));
        }
    }

    let mut contents = String::new();
    std::fs::File::open(&path).unwrap().read_to_string(&mut contents).unwrap();
    assert_eq!(contents, "hello from child\n");
}
