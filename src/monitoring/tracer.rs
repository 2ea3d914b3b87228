/*!
 * Tracing
 * Structured tracing bootstrap and spans around blocking system calls
 *
 * Environment variables:
 * - RUST_LOG: log level filter (default: info)
 * - PROCSYNC_TRACE_JSON: JSON output when "1" or "true" (default: false)
 */

use crate::core::limits::SLOW_SYSCALL_THRESHOLD;
use crate::core::types::Pid;
use std::time::Instant;
use tracing::{debug, span, warn, Level};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable switching the subscriber to JSON output
pub const TRACE_JSON_ENV: &str = "PROCSYNC_TRACE_JSON";

/// Initialize structured tracing
///
/// Safe to call more than once; only the first call installs a subscriber.
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let use_json = std::env::var(TRACE_JSON_ENV)
        .map(|v| v == "1" || v == "true")
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(env_filter);

    let installed = if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_current_span(true)
                    .with_span_list(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .try_init()
    };

    if installed.is_ok() {
        debug!(json = use_json, "structured tracing initialized");
    }
}

/// Span around a single system call, reporting its duration on drop
pub struct SyscallSpan {
    span: tracing::Span,
    start: Instant,
    syscall: &'static str,
    blocking: bool,
}

impl SyscallSpan {
    /// Span for a call expected to return promptly; slow completions are warned about
    pub fn new(syscall: &'static str, pid: Pid) -> Self {
        Self::build(syscall, pid, false)
    }

    /// Span for a call whose purpose is to block (waitpid, poll)
    pub fn blocking(syscall: &'static str, pid: Pid) -> Self {
        Self::build(syscall, pid, true)
    }

    fn build(syscall: &'static str, pid: Pid, blocking: bool) -> Self {
        let span = span!(
            Level::DEBUG,
            "syscall",
            syscall = syscall,
            pid = pid,
            duration_us = tracing::field::Empty,
            result = tracing::field::Empty,
        );
        Self {
            span,
            start: Instant::now(),
            syscall,
            blocking,
        }
    }

    /// Record whether the call succeeded
    pub fn record_result(&self, success: bool) {
        self.span
            .record("result", if success { "success" } else { "error" });
    }
}

impl Drop for SyscallSpan {
    fn drop(&mut self) {
        let duration = self.start.elapsed();
        self.span.record("duration_us", duration.as_micros() as u64);
        let _entered = self.span.enter();

        if !self.blocking && duration > SLOW_SYSCALL_THRESHOLD {
            warn!(
                syscall = self.syscall,
                duration_ms = duration.as_millis() as u64,
                slow = true,
                "slow syscall detected"
            );
        } else {
            debug!(
                syscall = self.syscall,
                duration_us = duration.as_micros() as u64,
                "syscall completed"
            );
        }
    }
}
