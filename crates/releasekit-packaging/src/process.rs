//! Running external tools.

use releasekit_core::{Error, Outcome};
use std::ffi::OsStr;
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, warn};

/// Lines of tool output kept in failure messages.
const OUTPUT_TAIL_LINES: usize = 20;

/// Run `program` to completion and map a non-zero exit to [`Error::ExternalTool`].
///
/// Every string in `secrets` is replaced with `[REDACTED]` in the failure
/// message, since tools echo their arguments on error.
pub(crate) async fn run_tool<I, S>(
    tool: &str,
    mut command: Command,
    args: I,
    secrets: &[&str],
) -> Outcome<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = command
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await
        .map_err(|e| Error::ToolLaunch {
            tool: tool.to_string(),
            message: e.to_string(),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();

    if output.status.success() {
        debug!(tool = %tool, "Tool completed");
        return Ok(stdout);
    }

    // Build tools report most errors on stdout, so keep both streams.
    let stderr = String::from_utf8_lossy(&output.stderr);
    let combined = format!("{}\n{}", stdout.trim_end(), stderr.trim_end());
    let message = redact(&tail(combined.trim(), OUTPUT_TAIL_LINES), secrets);

    warn!(tool = %tool, status = ?output.status.code(), "Tool failed");
    Err(Error::ExternalTool {
        tool: tool.to_string(),
        status: output.status.code(),
        stderr: message,
    })
}

/// Last `lines` lines of `text`.
pub(crate) fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}

pub(crate) fn redact(text: &str, secrets: &[&str]) -> String {
    secrets
        .iter()
        .filter(|s| !s.is_empty())
        .fold(text.to_string(), |acc, secret| acc.replace(secret, "[REDACTED]"))
}
