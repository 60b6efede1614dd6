//! Running external command-line tools.

use std::ffi::OsStr;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::{Command, Output};

use crate::error::{OcrError, Result};

/// Resolve `program` the way the shell would: a bare name through PATH, a
/// path with separators as an executable file.
///
/// # Errors
///
/// Returns [`OcrError::ToolNotFound`] if it does not resolve.
pub fn check_tool_available(program: impl AsRef<OsStr>) -> Result<PathBuf> {
    let program = program.as_ref();
    which::which(program)
        .map_err(|_| OcrError::ToolNotFound(program.to_string_lossy().into_owned()))
}

/// Run a prepared command to completion and return its output.
///
/// A program that does not resolve or cannot be spawned maps to
/// [`OcrError::ToolNotFound`]; a non-zero exit maps to
/// [`OcrError::ToolFailed`] with stderr attached.
pub(crate) fn run_tool(command: &mut Command, tool: &str) -> Result<Output> {
    let resolved = check_tool_available(command.get_program())
        .map_err(|_| OcrError::ToolNotFound(tool.to_string()))?;
    log::debug!("running {command:?} ({})", resolved.display());

    let output = command.output().map_err(|e| match e.kind() {
        ErrorKind::NotFound => OcrError::ToolNotFound(tool.to_string()),
        _ => OcrError::IoError(e),
    })?;

    if !output.status.success() {
        return Err(OcrError::ToolFailed {
            tool: tool.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }
    Ok(output)
}
