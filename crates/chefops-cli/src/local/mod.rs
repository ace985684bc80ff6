//! Running local programs (`ps`, `pwdx`, `git`, `cloc`).

use chefops_core::shell::ShellCommand;
use chefops_core::{ChefopsError, Result};
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Run `command` in `dir` (or the current directory) and return its stdout.
///
/// A non-zero exit is an error carrying the program's stderr.
pub fn run(command: &ShellCommand, dir: Option<&Path>) -> Result<String> {
    let rendered = command.render();
    debug!(command = %rendered, dir = ?dir, "running local command");

    let mut process = Command::new(command.program());
    process.args(command.arguments());
    if let Some(dir) = dir {
        process.current_dir(dir);
    }

    let output = process.output().map_err(|e| {
        let message = if e.kind() == ErrorKind::NotFound {
            format!("{} not found, please install it", command.program())
        } else {
            e.to_string()
        };
        ChefopsError::command(&rendered, message)
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(ChefopsError::command(
            rendered,
            format!("exited with {}: {stderr}", output.status),
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Returns true if `program` can be started at all.
pub fn is_available(program: &str) -> bool {
    Command::new(program)
        .arg("--version")
        .output()
        .is_ok()
}
