/*!
 * Descriptor Utility Tests
 * Rewiring a child's streams and environment before exec
 */

use crate::support::{fork_child, read_to_end, reap};
use pretty_assertions::assert_eq;
use procsync::fd::{STDERR, STDOUT};
use procsync::{close, duplicate, exec, make_pipe, read, set_env, write, SysError, WaitOutcome};
use serial_test::serial;
use std::os::fd::AsRawFd;

#[test]
#[serial]
fn test_child_stdout_redirected_into_pipe() {
    let (reader, writer) = make_pipe().unwrap().split();

    let mut child = fork_child(|| {
        if duplicate(writer.as_raw_fd(), STDOUT).is_err() {
            return 126;
        }
        let _ = exec("echo", &["hello", "pipe"]);
        127
    });
    drop(writer);

    let output = read_to_end(reader.as_raw_fd());
    assert_eq!(reap(&mut child), WaitOutcome::Exited(0));
    assert_eq!(String::from_utf8(output).unwrap(), "hello pipe\n");
}

#[test]
#[serial]
fn test_stderr_and_stdout_share_one_pipe() {
    let (reader, writer) = make_pipe().unwrap().split();

    let mut child = fork_child(|| {
        let fd = writer.as_raw_fd();
        if duplicate(fd, STDOUT).and(duplicate(fd, STDERR)).is_err() {
            return 126;
        }
        let _ = exec("sh", &["-c", "echo out; echo err 1>&2"]);
        127
    });
    drop(writer);

    let output = String::from_utf8(read_to_end(reader.as_raw_fd())).unwrap();
    assert_eq!(reap(&mut child), WaitOutcome::Exited(0));
    assert_eq!(output, "out\nerr\n");
}

#[test]
#[serial]
fn test_environment_set_before_exec_reaches_program() {
    let mut child = fork_child(|| {
        if set_env("PROCSYNC_EXIT_WITH", "42").is_err() {
            return 126;
        }
        let _ = exec("sh", &["-c", "exit $PROCSYNC_EXIT_WITH"]);
        127
    });
    assert_eq!(reap(&mut child), WaitOutcome::Exited(42));
    assert!(std::env::var("PROCSYNC_EXIT_WITH").is_err());
}

#[test]
fn test_closing_duplicate_leaves_original_usable() {
    let pipe = make_pipe().unwrap();
    // Well above anything this test binary opens, below the usual soft limit
    let fixed = 1000;

    duplicate(pipe.reader(), fixed).unwrap();
    close(fixed).unwrap();

    assert_eq!(write(pipe.writer(), b"still open").unwrap(), 10);
    assert_eq!(read(pipe.reader(), 64).unwrap(), b"still open");
}

#[test]
fn test_duplicate_reads_from_same_pipe() {
    let pipe = make_pipe().unwrap();
    let fixed = 1001;
    duplicate(pipe.reader(), fixed).unwrap();

    write(pipe.writer(), b"shared").unwrap();
    assert_eq!(read(fixed, 64).unwrap(), b"shared");
    close(fixed).unwrap();
}

#[test]
fn test_closing_writer_ends_stream_but_not_reader() {
    let (reader, writer) = make_pipe().unwrap().into_raw();
    assert_eq!(write(writer, b"last").unwrap(), 4);
    close(writer).unwrap();

    assert_eq!(read(reader, 16).unwrap(), b"last");
    assert_eq!(read(reader, 16).unwrap(), Vec::<u8>::new());
    close(reader).unwrap();
}

#[test]
fn test_write_to_negative_descriptor_fails() {
    let err = write(-1, b"x").unwrap_err();
    assert_eq!(err.errno(), Some(libc::EBADF));
    assert!(matches!(err, SysError::Io { .. }));
}
