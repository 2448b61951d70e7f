//! Integration tests for several appenders targeting the same file

use shared_append_core::appender::{AppendError, RetryingMultiProcessAppender, SingleProcessAppender};
use shared_append_core::io::ErrorClass;
use shared_append_core::{AcquireError, CreationPolicy, FileAppender, open_appender};
use std::fs;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn multi_process_policy() -> CreationPolicy {
    CreationPolicy {
        concurrent_writes: true,
        keep_file_open: false,
        concurrent_write_attempts: 20,
        concurrent_write_attempt_delay_ms: 2,
        ..Default::default()
    }
}

#[test]
fn test_parallel_writers_keep_records_whole() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("shared/app.log");

    let writers: Vec<_> = (0..4)
        .map(|w| {
            let path = path.clone();
            thread::spawn(move || {
                let mut appender = open_appender(&path, multi_process_policy()).unwrap();
                for i in 0..50 {
                    let line = format!("writer={w} seq={i:03} payload=abcdefghijklmnopqrstuvwxyz\n");
                    appender.write(line.as_bytes()).unwrap();
                }
            })
        })
        .collect();
    for handle in writers {
        handle.join().unwrap();
    }

    let content = fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 200);
    for line in &lines {
        assert!(line.starts_with("writer="), "corrupted line: {line}");
        assert!(line.ends_with("payload=abcdefghijklmnopqrstuvwxyz"), "corrupted line: {line}");
    }
    for w in 0..4 {
        let prefix = format!("writer={w} ");
        assert_eq!(lines.iter().filter(|l| l.starts_with(&prefix)).count(), 50);
    }
}

#[test]
fn test_missing_directory_without_create_dirs() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("no/such/dir/app.log");
    let policy = CreationPolicy {
        create_dirs: false,
        ..Default::default()
    };
    let mut appender = open_appender(&path, policy).unwrap();

    match appender.write(b"x\n") {
        Err(AppendError::Acquire(err)) => {
            assert_eq!(err.class(), ErrorClass::ParentDirectoryMissing);
        }
        other => panic!("expected missing parent, got {other:?}"),
    }
    assert!(!temp_dir.path().join("no").exists());
}

#[test]
fn test_missing_directory_created_with_single_attempt_budget() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("a/b/c/app.log");
    let policy = CreationPolicy {
        concurrent_write_attempts: 1,
        ..Default::default()
    };
    let mut appender = open_appender(&path, policy).unwrap();
    appender.write(b"created\n").unwrap();
    appender.close().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "created\n");
}

#[test]
fn test_open_time_stable_across_failed_writes() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing/app.log");
    let policy = CreationPolicy {
        create_dirs: false,
        ..Default::default()
    };
    let mut appender = open_appender(&path, policy).unwrap();
    let opened = appender.open_time();

    for _ in 0..3 {
        assert!(appender.write(b"x").is_err());
    }
    assert_eq!(appender.open_time(), opened);
    assert!(appender.last_write_time().is_none());
    assert!(appender.file_info().is_none());
}

#[cfg(unix)]
#[test]
fn test_exclusive_holder_makes_shared_writer_give_up() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("app.log");

    let exclusive = CreationPolicy {
        concurrent_writes: false,
        ..Default::default()
    };
    let mut holder = SingleProcessAppender::new(&path, exclusive).unwrap();
    holder.write(b"held\n").unwrap();

    let contender_policy = CreationPolicy {
        concurrent_write_attempts: 3,
        concurrent_write_attempt_delay_ms: 1,
        ..multi_process_policy()
    };
    let mut contender = RetryingMultiProcessAppender::new(&path, contender_policy).unwrap();
    match contender.write(b"blocked\n") {
        Err(AppendError::Acquire(AcquireError::SharingContention { attempts, .. })) => {
            assert_eq!(attempts, 3);
        }
        other => panic!("expected contention, got {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn test_exclusive_writer_gives_up_on_first_contention() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("app.log");

    let mut shared = SingleProcessAppender::new(&path, CreationPolicy::default()).unwrap();
    shared.write(b"shared\n").unwrap();

    let exclusive = CreationPolicy {
        concurrent_writes: false,
        concurrent_write_attempts: 50,
        ..Default::default()
    };
    let mut second = SingleProcessAppender::new(&path, exclusive).unwrap();
    match second.write(b"x\n") {
        Err(AppendError::Acquire(AcquireError::SharingContention { attempts, .. })) => {
            assert_eq!(attempts, 1);
        }
        other => panic!("expected contention, got {other:?}"),
    }
}

#[cfg(unix)]
#[test]
fn test_contender_succeeds_after_holder_releases() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("app.log");
    let (acquired_tx, acquired_rx) = mpsc::channel();

    let holder_path = path.clone();
    let holder = thread::spawn(move || {
        let exclusive = CreationPolicy {
            concurrent_writes: false,
            ..Default::default()
        };
        let mut appender = SingleProcessAppender::new(&holder_path, exclusive).unwrap();
        appender.write(b"first\n").unwrap();
        acquired_tx.send(()).unwrap();
        thread::sleep(Duration::from_millis(100));
        appender.close().unwrap();
    });

    acquired_rx.recv().unwrap();
    let contender_policy = CreationPolicy {
        concurrent_write_attempts: 12,
        concurrent_write_attempt_delay_ms: 20,
        ..multi_process_policy()
    };
    let mut contender = RetryingMultiProcessAppender::new(&path, contender_policy).unwrap();
    contender.write(b"second\n").unwrap();
    holder.join().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "first\nsecond\n");
}

#[test]
fn test_file_info_tracks_growth() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("app.log");
    let mut appender = open_appender(&path, multi_process_policy()).unwrap();

    appender.write(b"12345").unwrap();
    let first = appender.file_info().unwrap();
    appender.write(b"67890").unwrap();
    let second = appender.file_info().unwrap();

    assert_eq!(first.length, 5);
    assert_eq!(second.length, 10);
    assert!(second.last_write_time >= first.last_write_time);
}
