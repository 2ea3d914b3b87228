/*!
 * procsync - Main Entry Point
 *
 * Small front end over the library:
 * - run: spawn a program, relay its output through a pipe, report how it ended
 * - cores: print the number of online processors
 */

use clap::{Parser, Subcommand};
use miette::Result;
use nix::sys::signal::{kill, Signal};
use procsync::fd::{STDERR, STDOUT};
use procsync::process::exit_immediately;
use procsync::{
    duplicate, exec, init_tracing, make_pipe, num_cores, pid, read, spawn, write, PollEvents,
    PollSet, ProcessHandle, Spawned, SysError, WaitOutcome, BUFSIZ,
};
use serde_json::json;
use std::convert::Infallible;
use std::io::Write;
use std::os::fd::{AsRawFd, OwnedFd};
use tracing::{info, warn};

/// Exit code of a child that could not exec its program
const EXEC_FAILED: i32 = 127;

/// Exit code of a child that failed before reaching exec
const SETUP_FAILED: i32 = 126;

#[derive(Parser)]
#[command(name = "procsync")]
#[command(about = "Process control and cross-process synchronization utilities")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program, relaying its stdout and stderr, and exit with its status
    Run {
        /// Kill the program if it produces no output for this long; negative waits forever
        #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
        timeout_ms: i32,

        /// Maximum bytes taken from the pipe per read
        #[arg(long, default_value_t = BUFSIZ as u64, value_parser = clap::value_parser!(u64).range(1..))]
        read_size: u64,

        /// Program followed by its arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// Print the number of online processors
    Cores,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            timeout_ms,
            read_size,
            command,
        } => {
            let read_size = usize::try_from(read_size)
                .map_err(|_| SysError::InvalidArgument(format!("read size {}", read_size)))?;
            let code = run(&command, timeout_ms, read_size, cli.json)?;
            std::process::exit(code);
        }
        Commands::Cores => {
            let cores = num_cores()?;
            if cli.json {
                println!("{}", json!({ "cores": cores }));
            } else {
                println!("{}", cores);
            }
        }
    }
    Ok(())
}

fn run(command: &[String], timeout_ms: i32, read_size: usize, as_json: bool) -> Result<i32> {
    let (program, args) = command
        .split_first()
        .ok_or_else(|| SysError::InvalidArgument("no program given".to_string()))?;
    let (reader, writer) = make_pipe()?.split();

    let origin = pid();
    let spawned = match spawn() {
        Ok(spawned) => spawned,
        Err(_) if pid() != origin => exit_immediately(SETUP_FAILED),
        Err(e) => return Err(e.into()),
    };

    match spawned {
        Spawned::Child => {
            drop(reader);
            let code = match redirect_and_exec(writer, program, args) {
                Err(SysError::Io { description, .. }) => {
                    let message = format!("procsync: cannot run {}: {}\n", program, description);
                    let _ = write(STDERR, message.as_bytes());
                    EXEC_FAILED
                }
                Err(_) => SETUP_FAILED,
                Ok(never) => match never {},
            };
            exit_immediately(code)
        }
        Spawned::Parent(mut child) => {
            drop(writer);
            info!(child = child.pid(), program = %program, "relaying child output");

            let relayed = relay(&reader, &child, timeout_ms, read_size);
            let (_, outcome) = child.wait()?;
            relayed?;
            report(child.pid(), outcome, as_json);
            Ok(outcome.shell_code().unwrap_or(1))
        }
    }
}

/// Point our stdout and stderr at the pipe, then become `program`
fn redirect_and_exec(
    writer: OwnedFd,
    program: &str,
    args: &[String],
) -> procsync::Result<Infallible> {
    duplicate(writer.as_raw_fd(), STDOUT)?;
    duplicate(writer.as_raw_fd(), STDERR)?;
    drop(writer);
    exec(program, args)
}

/// Copy the pipe to our stdout until end-of-stream, killing the child on idle timeout
fn relay(
    reader: &OwnedFd,
    child: &ProcessHandle,
    timeout_ms: i32,
    read_size: usize,
) -> procsync::Result<()> {
    let fd = reader.as_raw_fd();
    let mut set = PollSet::with_capacity(1);
    set.add(fd, PollEvents::READABLE);
    let mut stdout = std::io::stdout().lock();

    loop {
        let ready = match set.poll(timeout_ms) {
            Ok(ready) => ready,
            Err(e) if e.is_interrupted() => continue,
            Err(e) => return Err(e),
        };
        if ready == 0 {
            warn!(child = child.pid(), timeout_ms, "no output before timeout, killing child");
            kill(nix::unistd::Pid::from_raw(child.pid()), Signal::SIGKILL)?;
            return Ok(());
        }

        // Hang-up still leaves buffered bytes to drain; an empty read marks the end.
        let data = read(fd, read_size)?;
        if data.is_empty() {
            return Ok(());
        }
        stdout.write_all(&data)?;
        stdout.flush()?;
    }
}

fn report(child: procsync::Pid, outcome: WaitOutcome, as_json: bool) {
    if !outcome.is_terminal() {
        warn!(child, outcome = ?outcome, "child changed state without ending");
    }
    if as_json {
        println!("{}", json!({ "pid": child, "outcome": outcome }));
    } else {
        println!("process {} {}", child, outcome);
    }
}
