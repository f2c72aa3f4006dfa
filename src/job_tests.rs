// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use yare::parameterized;

use super::*;

fn pid(n: i32) -> Pid {
    Pid::from_raw(n)
}

#[test]
fn adding_a_job_returns_a_one_based_number() {
    let mut table = JobTable::new();
    let n1 = table.add("sleep 5".into(), pid(100), JobStatus::Running);
    let n2 = table.add("sleep 6".into(), pid(101), JobStatus::Running);
    assert_eq!(n1, 1);
    assert_eq!(n2, 2);
}

#[test]
fn removing_the_last_job_shrinks_the_table() {
    let mut table = JobTable::new();
    table.add("a".into(), pid(1), JobStatus::Running);
    table.add("b".into(), pid(2), JobStatus::Running);
    table.remove(2);
    assert_eq!(table.most_recent(), Some(1));
}

#[test]
fn removing_a_middle_job_leaves_a_hole_not_a_shift() {
    let mut table = JobTable::new();
    table.add("a".into(), pid(1), JobStatus::Running);
    table.add("b".into(), pid(2), JobStatus::Running);
    table.add("c".into(), pid(3), JobStatus::Running);
    table.remove(2);
    assert!(table.get(2).is_none());
    // job 3 keeps its number, it isn't shifted down to slot 2.
    assert_eq!(table.get(3).unwrap().display, "c");
    assert_eq!(table.most_recent(), Some(3));
}

#[parameterized(
    running = { JobStatus::Running, true, false },
    stopped = { JobStatus::Stopped, true, false },
    done = { JobStatus::Done, true, true },
)]
fn render_visibility_by_status(status: JobStatus, visible_full: bool, visible_nonfull: bool) {
    let mut full_table = JobTable::new();
    full_table.add("a".into(), pid(1), status);
    assert_eq!(!full_table.render(true).is_empty(), visible_full, "full render for {status:?}");

    let mut nonfull_table = JobTable::new();
    nonfull_table.add("a".into(), pid(1), status);
    assert_eq!(
        !nonfull_table.render(false).is_empty(),
        visible_nonfull,
        "non-full render for {status:?}"
    );
}

#[test]
fn render_non_full_shows_just_stopped_once_then_folds_to_stopped() {
    let mut table = JobTable::new();
    table.add("a".into(), pid(1), JobStatus::JustStopped);
    let first = table.render(false);
    assert_eq!(first.len(), 1);
    assert!(first[0].contains("Stopped"));
    assert_eq!(table.get(1).unwrap().status, JobStatus::Stopped);

    // second call sees Stopped, which a non-full render always skips.
    let second = table.render(false);
    assert!(second.is_empty());
}

#[test]
fn prune_done_removes_only_done_jobs() {
    let mut table = JobTable::new();
    table.add("a".into(), pid(1), JobStatus::Running);
    table.add("b".into(), pid(2), JobStatus::Done);
    table.prune_done();
    assert!(table.get(2).is_none());
    assert!(table.get(1).is_some());
}

#[test]
fn most_recent_stopped_finds_the_highest_numbered_stopped_job() {
    let mut table = JobTable::new();
    table.add("a".into(), pid(1), JobStatus::Stopped);
    table.add("b".into(), pid(2), JobStatus::Running);
    table.add("c".into(), pid(3), JobStatus::Stopped);
    assert_eq!(table.most_recent_stopped(), Some(3));
}

#[test]
fn empty_table_reports_is_empty() {
    let table = JobTable::new();
    assert!(table.is_empty());
}
