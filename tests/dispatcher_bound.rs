//! Concurrency bound of the job dispatcher, observed from the processes
//! themselves.
//!
//! Each job drops a marker file while it runs and samples how many markers
//! exist. A marker only exists while its process is alive, so any sample is a
//! lower bound on real concurrency at that moment and must stay within the
//! limit.

#![cfg(unix)]

use smake::build::{Dispatcher, Job};
use std::fs;
use tempfile::TempDir;

fn sampling_job(dir: &std::path::Path) -> Job {
    let script = format!(
        "m='{dir}/running'; touch \"$m/$$\"; ls \"$m\" | wc -l >> '{dir}/samples'; sleep 0.05; rm \"$m/$$\"",
        dir = dir.display()
    );
    Job::new("sh").arg("-c").arg(script)
}

fn max_sample(dir: &std::path::Path) -> usize {
    fs::read_to_string(dir.join("samples"))
        .unwrap()
        .lines()
        .map(|l| l.trim().parse::<usize>().unwrap())
        .max()
        .unwrap()
}

#[test]
fn test_running_processes_never_exceed_limit() {
    for limit in [1, 2, 3] {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("running")).unwrap();

        let mut dispatcher = Dispatcher::new(limit);
        for _ in 0..12 {
            dispatcher.submit(sampling_job(tmp.path())).unwrap();
        }
        dispatcher.wait_all().unwrap();

        let peak = max_sample(tmp.path());
        assert!(peak >= 1);
        assert!(peak <= limit, "saw {} running with limit {}", peak, limit);
        assert!(dispatcher.peak_in_flight() <= limit);
        assert_eq!(dispatcher.launched(), 12);
    }
}

#[test]
fn test_limit_allows_real_parallelism() {
    let mut dispatcher = Dispatcher::new(4);
    for _ in 0..4 {
        dispatcher
            .submit(Job::new("sh").arg("-c").arg("sleep 0.1"))
            .unwrap();
    }
    assert_eq!(dispatcher.peak_in_flight(), 4);
    dispatcher.wait_all().unwrap();
}
