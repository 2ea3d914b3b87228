/*!
 * Environment
 * Process environment overrides applied before exec
 */

use crate::core::errors::{Result, SysError};

/// Set `key` to `value` in the process environment, overwriting any existing value
///
/// Typically called in a freshly spawned child, before exec, while it is still
/// single-threaded. It never logs.
pub fn set_env(key: &str, value: &str) -> Result<()> {
    if key.is_empty() {
        return Err(SysError::InvalidArgument(
            "environment key is empty".to_string(),
        ));
    }
    if key.contains('=') {
        return Err(SysError::InvalidArgument(format!(
            "environment key {:?} contains '='",
            key
        )));
    }
    if key.contains('\0') || value.contains('\0') {
        return Err(SysError::InvalidArgument(format!(
            "environment entry {:?} contains a NUL byte",
            key
        )));
    }

    std::env::set_var(key, value);
    Ok(())
}
