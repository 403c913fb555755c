use std::path::Path;
use std::process::{Command, Output};
use tracing::debug;
use anyhow::Result;

/// Execute a command inside `dir` with debug logging
pub fn execute_command(cmd: &str, dir: &Path, args: &[&str]) -> Result<Output> {
    execute_command_with_env(cmd, dir, args, &[])
}

/// Same as [`execute_command`], with extra environment variables for the child.
///
/// Variable values are never logged, only their names.
pub fn execute_command_with_env(
    cmd: &str,
    dir: &Path,
    args: &[&str],
    envs: &[(&str, &str)],
) -> Result<Output> {
    debug!("Executing command in {}: {} {}", dir.display(), cmd, args.join(" "));
    if !envs.is_empty() {
        let names: Vec<&str> = envs.iter().map(|(name, _)| *name).collect();
        debug!("with environment: {}", names.join(", "));
    }

    let output = Command::new(cmd)
        .args(args)
        .current_dir(dir)
        .envs(envs.iter().copied())
        .output()?;

    if output.status.success() {
        debug!("Command succeeded: {} {}", cmd, args.join(" "));
    } else {
        debug!("Command failed: {} {} (exit code: {:?})", cmd, args.join(" "), output.status.code());
    }
    if !output.stdout.is_empty() {
        debug!("stdout: {}", String::from_utf8_lossy(&output.stdout).trim());
    }
    if !output.stderr.is_empty() {
        debug!("stderr: {}", String::from_utf8_lossy(&output.stderr).trim());
    }

    Ok(output)
}
