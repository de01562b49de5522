// Standard library
use std::ffi::OsStr;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

// External crates
use crate::error::{DeployError, Result};
use duct::cmd;
use tracing::info;
use which::which;

/// Number of trailing output lines carried inside a `Command` error.
const TAIL_LINES: usize = 20;

/// Checks if a command-line tool is available in the system's PATH.
pub fn is_tool_installed(tool_name: &str) -> bool {
    which(tool_name).is_ok()
}

fn render_command<A: AsRef<OsStr>>(command: &str, args: &[A]) -> String {
    let mut rendered = command.to_string();
    for arg in args {
        rendered.push(' ');
        rendered.push_str(&arg.as_ref().to_string_lossy());
    }
    rendered
}

fn tail_of(lines: &[String]) -> String {
    let start = lines.len().saturating_sub(TAIL_LINES);
    lines[start..].join("\n")
}

/// Runs an external tool in `dir`, merging stderr into stdout and echoing
/// every line as it arrives. Returns the captured lines so callers can
/// inspect what was streamed.
///
/// A non-zero exit status becomes `DeployError::Command` carrying the exit
/// code and the tail of the combined output.
pub fn stream_command<A: AsRef<OsStr>>(command: &str, args: &[A], dir: &Path) -> Result<Vec<String>> {
    if !is_tool_installed(command) {
        return Err(DeployError::ToolNotFound(command.to_string()));
    }

    let full_command = render_command(command, args);
    info!("> {}", full_command);

    let reader = cmd(command, args)
        .dir(dir)
        .stderr_to_stdout()
        .unchecked()
        .reader()?;

    let mut captured = Vec::new();
    let mut buffered = BufReader::new(reader);
    for line in buffered.by_ref().lines() {
        let line = line?;
        info!("{}", line);
        captured.push(line);
    }

    // Reading to EOF means the child has exited; try_wait is non-blocking here.
    let status = match buffered.get_ref().try_wait()? {
        Some(output) => output.status,
        None => {
            return Err(DeployError::Internal(format!(
                "Command finished without reporting a status: {}",
                full_command
            )))
        }
    };

    if !status.success() {
        return Err(DeployError::Command {
            command: full_command,
            status: status.code().unwrap_or(-1),
            tail: tail_of(&captured),
        });
    }

    Ok(captured)
}

/// Runs an external tool silently and returns its stdout for structured
/// consumption (e.g. `terraform output -json`). Stderr is captured and only
/// surfaced through the error path.
pub fn capture_command<A: AsRef<OsStr>>(command: &str, args: &[A], dir: &Path) -> Result<String> {
    if !is_tool_installed(command) {
        return Err(DeployError::ToolNotFound(command.to_string()));
    }

    let full_command = render_command(command, args);
    let output = cmd(command, args)
        .dir(dir)
        .stdout_capture()
        .stderr_capture()
        .unchecked()
        .run()?;

    if !output.status.success() {
        let stderr: Vec<String> = String::from_utf8_lossy(&output.stderr)
            .lines()
            .map(str::to_string)
            .collect();
        return Err(DeployError::Command {
            command: full_command,
            status: output.status.code().unwrap_or(-1),
            tail: tail_of(&stderr),
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn cwd() -> PathBuf {
        std::env::current_dir().expect("current dir")
    }

    #[test]
    fn stream_command_returns_all_captured_lines() {
        let lines = stream_command("sh", &["-c", "echo one; echo two"], &cwd())
            .expect("command should succeed");
        assert_eq!(lines, vec!["one".to_string(), "two".to_string()]);
    }

    #[test]
    fn stream_command_merges_stderr_into_stdout() {
        let lines =
            stream_command("sh", &["-c", "echo out; echo err 1>&2"], &cwd()).expect("success");
        assert!(lines.contains(&"out".to_string()));
        assert!(lines.contains(&"err".to_string()));
    }

    #[test]
    fn stream_command_reports_exact_exit_status() {
        let err = stream_command("sh", &["-c", "echo boom; exit 7"], &cwd())
            .expect_err("command should fail");
        match err {
            DeployError::Command { status, tail, .. } => {
                assert_eq!(status, 7);
                assert!(tail.contains("boom"));
            }
            other => panic!("expected Command error, got: {}", other),
        }
    }

    #[test]
    fn missing_tool_is_a_tool_not_found_error() {
        let err = stream_command("definitely-not-a-real-tool-xyz", &[""; 0], &cwd())
            .expect_err("tool should be absent");
        assert!(matches!(err, DeployError::ToolNotFound(_)));
    }

    #[test]
    fn capture_command_is_silent_and_returns_stdout() {
        let out = capture_command("sh", &["-c", "echo value"], &cwd()).expect("success");
        assert_eq!(out.trim(), "value");
    }

    #[test]
    fn capture_command_carries_stderr_tail_on_failure() {
        let err = capture_command("sh", &["-c", "echo broken 1>&2; exit 3"], &cwd())
            .expect_err("should fail");
        match err {
            DeployError::Command { status, tail, .. } => {
                assert_eq!(status, 3);
                assert!(tail.contains("broken"));
            }
            other => panic!("expected Command error, got: {}", other),
        }
    }
}
