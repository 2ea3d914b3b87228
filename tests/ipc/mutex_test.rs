/*!
 * Named Mutex Tests
 * Critical sections shared across spawned processes
 */

use crate::support::{fork_child, reap};
use pretty_assertions::assert_eq;
use procsync::{NamedMutex, SysError, WaitOutcome};
use serial_test::serial;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

const WORKERS: usize = 4;
const ROUNDS: usize = 10;

fn append(path: &Path, line: &str) -> std::io::Result<()> {
    let mut file = OpenOptions::new().append(true).open(path)?;
    file.write_all(line.as_bytes())
}

#[test]
#[serial]
fn test_critical_sections_never_interleave() {
    let mutex = NamedMutex::create().unwrap();
    let log = tempfile::NamedTempFile::new().unwrap();
    let path = log.path().to_path_buf();
    let mutex = &mutex;

    let mut workers: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let path = path.clone();
            fork_child(move || {
                for _ in 0..ROUNDS {
                    let outcome = mutex.with_lock(|| {
                        append(&path, &format!("{} begin\n", worker))?;
                        std::thread::sleep(Duration::from_millis(1));
                        append(&path, &format!("{} end\n", worker))?;
                        Ok::<_, SysError>(())
                    });
                    if outcome.is_err() {
                        return 1;
                    }
                }
                0
            })
        })
        .collect();
    for worker in workers.iter_mut() {
        assert_eq!(reap(worker), WaitOutcome::Exited(0));
    }

    let contents = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), WORKERS * ROUNDS * 2);
    for pair in lines.chunks_exact(2) {
        let (owner, state) = pair[0].split_once(' ').unwrap();
        assert_eq!(state, "begin");
        assert_eq!(pair[1], format!("{} end", owner));
    }
}

#[test]
#[serial]
fn test_child_failure_inside_lock_releases_it() {
    let mutex = NamedMutex::create().unwrap();

    let mut child = fork_child(|| {
        let result = mutex.with_lock(|| {
            Err::<(), _>(SysError::InvalidArgument("refused".to_string()))
        });
        match result {
            Err(SysError::InvalidArgument(message)) if message == "refused" => 0,
            _ => 1,
        }
    });
    assert_eq!(reap(&mut child), WaitOutcome::Exited(0));

    // Deadlocks if the child left the semaphore held
    assert_eq!(mutex.with_lock(|| Ok::<_, SysError>("free")).unwrap(), "free");
    mutex.close().unwrap();
}

#[test]
#[serial]
fn test_values_cross_the_lock_unchanged() {
    let mutex = NamedMutex::create().unwrap();
    let mut child = fork_child(|| match mutex.with_lock(|| Ok::<_, SysError>((7, "seven"))) {
        Ok((7, "seven")) => 0,
        _ => 1,
    });
    assert_eq!(reap(&mut child), WaitOutcome::Exited(0));
}
