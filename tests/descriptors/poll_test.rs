/*!
 * Poll Tests
 * Readiness of pipe ends shared with child processes
 */

use crate::support::{fork_child, reap};
use pretty_assertions::assert_eq;
use procsync::{make_pipe, poll, read, write, PollEntry, PollEvents, PollSet, WaitOutcome};
use serial_test::serial;
use std::os::fd::AsRawFd;
use std::time::{Duration, Instant};

#[test]
fn test_idle_pipe_times_out_with_empty_results() {
    let pipe = make_pipe().unwrap();
    let mut entries = [PollEntry::new(pipe.reader(), PollEvents::READABLE)];

    let start = Instant::now();
    assert_eq!(poll(&mut entries, 100).unwrap(), 0);
    assert!(start.elapsed() >= Duration::from_millis(95));
    assert_eq!(entries[0].revents, None);
}

#[test]
fn test_written_byte_makes_reader_readable() {
    let pipe = make_pipe().unwrap();
    write(pipe.writer(), b"!").unwrap();

    let mut entries = [PollEntry::new(pipe.reader(), PollEvents::READABLE)];
    assert_eq!(poll(&mut entries, 100).unwrap(), 1);
    assert_eq!(entries[0].revents, Some(PollEvents::READABLE));
}

#[test]
fn test_closed_writer_reports_hang_up() {
    let (reader, writer) = make_pipe().unwrap().split();
    drop(writer);

    let mut entries = [PollEntry::new(reader.as_raw_fd(), PollEvents::READABLE)];
    assert_eq!(poll(&mut entries, 0).unwrap(), 1);
    assert!(entries[0].has(PollEvents::HANG_UP));
    assert_eq!(read(reader.as_raw_fd(), 8).unwrap(), Vec::<u8>::new());
}

#[test]
#[serial]
fn test_poll_wakes_when_child_writes() {
    let (reader, writer) = make_pipe().unwrap().split();

    let mut child = fork_child(|| {
        std::thread::sleep(Duration::from_millis(50));
        match write(writer.as_raw_fd(), b"ping") {
            Ok(4) => 0,
            _ => 1,
        }
    });
    drop(writer);

    let mut set = PollSet::new();
    set.add(reader.as_raw_fd(), PollEvents::READABLE);
    assert_eq!(set.poll(5_000).unwrap(), 1);
    assert!(set.get(reader.as_raw_fd()).unwrap().has(PollEvents::READABLE));
    assert_eq!(read(reader.as_raw_fd(), 16).unwrap(), b"ping");
    assert_eq!(reap(&mut child), WaitOutcome::Exited(0));
}

#[test]
fn test_only_requested_and_error_conditions_reported() {
    let pipe = make_pipe().unwrap();
    let mut set = PollSet::new();
    set.add(pipe.reader(), PollEvents::READABLE)
        .add(pipe.writer(), PollEvents::READABLE);

    // A writable end polled only for readability has nothing to report
    assert_eq!(set.poll(0).unwrap(), 0);
    assert_eq!(set.ready().count(), 0);
}
