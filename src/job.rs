// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The background/stopped job table.
//!
//! Job numbers are 1-based and stable: a finished job's slot is nulled out
//! rather than shifted, so live job numbers never change under a user who
//! hasn't yet run `jobs`/had the done job reaped out. Holes are only
//! reclaimed from the tail, mirroring the original's `deleteJob`, which
//! shrinks the backing array only when the freed slot is the last one.

use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::Pid;
use tracing::{debug, info_span};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    None,
    Running,
    Done,
    Stopped,
    /// Transient: set the instant `reconcile` observes a stop, and folded
    /// into `Stopped` the next time the job is rendered — this is what lets
    /// a freshly-stopped job get one "Stopped" announcement instead of one
    /// per prompt loop.
    JustStopped,
}

#[derive(Debug, Clone)]
pub struct Job {
    pub display: String,
    pub pgid: Pid,
    pub status: JobStatus,
}

#[derive(Debug, Default, Clone)]
pub struct JobTable {
    jobs: Vec<Option<Job>>,
}

impl JobTable {
    pub fn new() -> Self {
        Self { jobs: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.iter().all(|j| j.is_none())
    }

    /// Register a new job, returning its 1-based job number. When `status`
    /// is `Running`, announces `[n] pgid` on stdout, matching a backgrounded
    /// job's launch notification.
    pub fn add(&mut self, display: String, pgid: Pid, status: JobStatus) -> usize {
        self.jobs.push(Some(Job { display, pgid, status }));
        let number = self.jobs.len();
        if status == JobStatus::Running {
            println!("[{number}] {pgid}");
        }
        debug!(number, %pgid, ?status, "job registered");
        number
    }

    pub fn get(&self, number: usize) -> Option<&Job> {
        number.checked_sub(1).and_then(|i| self.jobs.get(i)).and_then(|j| j.as_ref())
    }

    pub fn set_status(&mut self, number: usize, status: JobStatus) {
        if let Some(slot) = number.checked_sub(1).and_then(|i| self.jobs.get_mut(i)) {
            if let Some(job) = slot {
                job.status = status;
            }
        }
    }

    /// The highest-numbered job currently `Stopped`, used by `bg` with no
    /// argument.
    pub fn most_recent_stopped(&self) -> Option<usize> {
        self.jobs
            .iter()
            .enumerate()
            .rev()
            .find(|(_, j)| matches!(j, Some(job) if job.status == JobStatus::Stopped))
            .map(|(i, _)| i + 1)
    }

    /// The highest-numbered live job, used by `fg` with no argument.
    pub fn most_recent(&self) -> Option<usize> {
        self.jobs.iter().rposition(|j| j.is_some()).map(|i| i + 1)
    }

    /// Remove job `number`, shrinking the backing store if it was the last
    /// live slot (matching the original's tail-only reclamation).
    pub fn remove(&mut self, number: usize) {
        let Some(index) = number.checked_sub(1) else { return };
        if index >= self.jobs.len() {
            return;
        }
        self.jobs[index] = None;
        if index == self.jobs.len() - 1 {
            while matches!(self.jobs.last(), Some(None)) {
                self.jobs.pop();
            }
        }
    }

    /// Poll every live job's process group for state changes, non-blocking.
    pub fn reconcile(&mut self) {
        let _span = info_span!("xish.job.reconcile").entered();
        for slot in self.jobs.iter_mut() {
            let Some(job) = slot else { continue };
            if job.status == JobStatus::None {
                continue;
            }
            loop {
                let flags = WaitPidFlag::WNOHANG | WaitPidFlag::WUNTRACED | WaitPidFlag::WCONTINUED;
                match waitpid(Pid::from_raw(-job.pgid.as_raw()), Some(flags)) {
                    Ok(WaitStatus::StillAlive) => break,
                    Ok(WaitStatus::Stopped(_, _)) => job.status = JobStatus::JustStopped,
                    Ok(WaitStatus::Continued(_)) => job.status = JobStatus::Running,
                    Ok(_) => continue,
                    Err(_) => {
                        job.status = JobStatus::Done;
                        break;
                    }
                }
            }
        }
    }

    /// Render the status lines a prompt loop should print. `full` selects
    /// between `jobs`'s exhaustive listing and the automatic one-shot
    /// notification shown after every command (done and freshly-stopped
    /// jobs only).
    pub fn render(&mut self, full: bool) -> Vec<String> {
        let mut lines = Vec::new();
        for (i, slot) in self.jobs.iter_mut().enumerate() {
            let Some(job) = slot else { continue };
            if job.status == JobStatus::None {
                continue;
            }
            if !full && matches!(job.status, JobStatus::Running | JobStatus::Stopped) {
                continue;
            }
            let label = match job.status {
                JobStatus::None => continue,
                JobStatus::Done => "Done",
                JobStatus::Running => "Running",
                JobStatus::JustStopped => {
                    job.status = JobStatus::Stopped;
                    "Stopped"
                }
                JobStatus::Stopped => "Stopped",
            };
            lines.push(format!("[{}] {}\t\t{}", i + 1, label, job.display));
        }
        lines
    }

    /// Drop every job marked `Done`, called once per prompt loop after
    /// rendering.
    pub fn prune_done(&mut self) {
        let done: Vec<usize> = self
            .jobs
            .iter()
            .enumerate()
            .filter(|(_, j)| matches!(j, Some(job) if job.status == JobStatus::Done))
            .map(|(i, _)| i + 1)
            .collect();
        for number in done {
            self.remove(number);
        }
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
