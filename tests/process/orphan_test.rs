/*!
 * Orphan Race Tests
 * Parent verification after spawn and parent-death supervision
 */

use crate::support::{fork_child, reap};
use pretty_assertions::assert_eq;
use procsync::process::{exit_immediately, spawn_watched, ParentWatch};
use procsync::{make_pipe, pid, read, spawn, write, Pid, Result, Spawned, SysError, WaitOutcome};
use serial_test::serial;

/// Reports a parent other than the one that spawned us, as after a lost race
struct Reparented {
    to: Pid,
}

impl ParentWatch for Reparented {
    fn arm(&self) -> Result<()> {
        Ok(())
    }

    fn parent_pid(&self) -> Result<Pid> {
        Ok(self.to)
    }
}

const DETECTED: i32 = 42;

#[test]
#[serial]
fn test_reparented_child_reports_orphan_race() {
    let spawner = pid();
    let watch = Reparented { to: i32::MAX };

    let spawned = match spawn_watched(&watch) {
        Ok(spawned) => spawned,
        Err(SysError::OrphanRace { expected, observed })
            if expected == spawner && observed == i32::MAX =>
        {
            exit_immediately(DETECTED)
        }
        Err(_) if pid() != spawner => exit_immediately(1),
        Err(e) => panic!("spawn failed in parent: {}", e),
    };

    match spawned {
        Spawned::Child => exit_immediately(0),
        Spawned::Parent(mut child) => {
            assert_eq!(reap(&mut child), WaitOutcome::Exited(DETECTED as u8));
        }
    }
}

#[test]
#[serial]
fn test_orphan_race_error_shape() {
    let err = SysError::OrphanRace {
        expected: 100,
        observed: 1,
    };
    assert!(err.to_string().contains("100"));
    assert_eq!(err.errno(), None);
}

/// A grandchild whose parent dies is terminated by the parent-death signal.
///
/// The test process becomes a child subreaper so the orphaned grandchild is
/// re-parented to it and can be reaped here.
#[cfg(target_os = "linux")]
#[test]
#[serial]
fn test_parent_death_signals_grandchild() {
    use procsync::wait;

    nix::sys::prctl::set_child_subreaper(true).unwrap();
    let ready = make_pipe().unwrap();
    let report = make_pipe().unwrap();

    let mut middle = fork_child(|| {
        let grandchild = match spawn() {
            Ok(Spawned::Parent(handle)) => handle,
            Ok(Spawned::Child) => {
                // Guard is armed: tell the middle process it may exit.
                let _ = write(ready.writer(), b"!");
                let _ = procsync::exec("sleep", &["30"]);
                exit_immediately(127)
            }
            Err(_) => exit_immediately(2),
        };

        match read(ready.reader(), 1) {
            Ok(byte) if byte == b"!" => {}
            _ => return 3,
        }
        match write(report.writer(), &grandchild.pid().to_ne_bytes()) {
            Ok(4) => 0,
            _ => 4,
        }
    });
    assert_eq!(reap(&mut middle), WaitOutcome::Exited(0));

    let bytes = read(report.reader(), 4).unwrap();
    let grandchild = Pid::from_ne_bytes(bytes.as_slice().try_into().unwrap());
    let (_, outcome) = wait(grandchild).unwrap();
    assert_eq!(outcome, WaitOutcome::Signaled(libc::SIGHUP));
}
