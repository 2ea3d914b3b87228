/*!
 * Exec
 * Replace the current process image
 */

use crate::core::errors::{Result, SysError};
use std::convert::Infallible;
use std::ffi::CString;

fn to_cstring(arg: &str) -> Result<CString> {
    CString::new(arg)
        .map_err(|_| SysError::InvalidArgument(format!("argument {:?} contains a NUL byte", arg)))
}

/// Run `path` with `args`, searching `PATH` when `path` has no slash
///
/// `args` excludes the program name; `path` is passed as `argv[0]`.
/// Never returns on success. On failure the process is unchanged and the OS error
/// is returned; callers in a spawned child should treat it as fatal. Nothing is
/// logged, since the caller is normally a freshly spawned child.
pub fn exec<S: AsRef<str>>(path: &str, args: &[S]) -> Result<Infallible> {
    let program = to_cstring(path)?;
    let mut argv = Vec::with_capacity(args.len() + 1);
    argv.push(program.clone());
    for arg in args {
        argv.push(to_cstring(arg.as_ref())?);
    }

    let never = nix::unistd::execvp(&program, &argv)?;
    match never {}
}
