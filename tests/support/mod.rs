/*!
 * Shared helpers for tests that fork
 */

use procsync::process::exit_immediately;
use procsync::{read, spawn, ProcessHandle, Spawned, WaitOutcome};

/// Exit code of a child whose body panicked
pub const CHILD_PANICKED: i32 = 101;

/// Run `body` in a spawned child and exit with its return value
///
/// Children leave through `_exit`, so the test harness never runs twice.
pub fn fork_child<F: FnOnce() -> i32>(body: F) -> ProcessHandle {
    match spawn().expect("spawn failed") {
        Spawned::Parent(handle) => handle,
        Spawned::Child => {
            let code = std::panic::catch_unwind(std::panic::AssertUnwindSafe(body))
                .unwrap_or(CHILD_PANICKED);
            exit_immediately(code)
        }
    }
}

/// Reap `handle` and return how it ended
pub fn reap(handle: &mut ProcessHandle) -> WaitOutcome {
    let (pid, outcome) = handle.wait().expect("wait failed");
    assert_eq!(pid, handle.pid());
    outcome
}

/// Read from `fd` until end-of-stream
pub fn read_to_end(fd: procsync::Fd) -> Vec<u8> {
    let mut out = Vec::new();
    loop {
        let chunk = read(fd, procsync::BUFSIZ).expect("read failed");
        if chunk.is_empty() {
            return out;
        }
        out.extend_from_slice(&chunk);
    }
}
