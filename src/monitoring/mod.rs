/*!
 * Monitoring
 * Structured tracing for system calls
 */

mod tracer;

pub use tracer::{init_tracing, SyscallSpan, TRACE_JSON_ENV};
