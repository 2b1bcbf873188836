use crate::boundary::ReleaseWarning;
use crate::error::{ReleaseError, Result};
use crate::hooks::HookContext;
use std::path::Path;
use std::process::Command;
use tracing::{info, warn};

/// Executes release hook scripts
pub struct HookExecutor;

impl HookExecutor {
    /// Execute a hook script with the given context
    ///
    /// The script is executed with environment variables set from the context.
    /// Exit code 0 is success; anything else is a failure.
    ///
    /// # Returns
    /// * `Ok(())` if hook succeeds (exit code 0)
    /// * `Err` if script not found, not executable, or returns non-zero exit code
    pub fn execute(script_path: &str, context: &HookContext) -> Result<()> {
        let path = Path::new(script_path);

        if !path.exists() {
            return Err(ReleaseError::hook(format!(
                "Hook script not found: {}",
                script_path
            )));
        }

        if !path.is_file() {
            return Err(ReleaseError::hook(format!(
                "Hook path is not a file: {}",
                script_path
            )));
        }

        let output = Command::new(script_path)
            .envs(context.to_env_vars())
            .output()
            .map_err(|e| {
                ReleaseError::hook(format!("Failed to execute hook {}: {}", script_path, e))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            return Err(ReleaseError::hook(format!(
                "Hook {} failed with exit code {}\nStdout: {}\nStderr: {}",
                script_path,
                output.status.code().unwrap_or(-1),
                stdout.trim_end(),
                stderr.trim_end()
            )));
        }

        info!(hook = context.hook_type.name(), script = script_path, "hook succeeded");
        Ok(())
    }

    /// Try to execute a hook, logging errors but not failing
    ///
    /// Used after the tag exists: a hook failure must not undo a release that
    /// already happened. The failure is returned as a warning for the report.
    pub fn execute_permissive(script_path: &str, context: &HookContext) -> Option<ReleaseWarning> {
        match Self::execute(script_path, context) {
            Ok(()) => None,
            Err(e) => {
                warn!(hook = context.hook_type.name(), error = %e, "hook failed");
                Some(ReleaseWarning::HookFailed {
                    hook: context.hook_type.name().to_string(),
                    message: e.to_string(),
                })
            }
        }
    }
}
