use std::process::Command;

use crate::error::{ProcessError, Result};

/// Build a command with the session environment patched up. Desktop tools
/// (xfconf-query, gsettings, xprop) fail in odd ways when launched from an
/// autostart context with an incomplete environment, so missing variables
/// get sensible fallbacks.
pub fn session_command(program: &str) -> Command {
    let mut cmd = Command::new(program);

    if std::env::var_os("DISPLAY").is_none() {
        cmd.env("DISPLAY", ":0");
    }

    if std::env::var_os("XDG_RUNTIME_DIR").is_none() {
        let uid = unsafe { libc::getuid() };
        cmd.env("XDG_RUNTIME_DIR", format!("/run/user/{}", uid));
    }

    cmd
}

/// Run a command to completion; non-zero exit is an error.
pub fn run(program: &str, args: &[&str]) -> Result<()> {
    let mut cmd = session_command(program);
    cmd.args(args);

    let output = cmd.output().map_err(|e| ProcessError::Execution {
        command: program.to_string(),
        source: e,
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProcessError::NonZeroExit {
            command: program.to_string(),
            code: output.status.code().unwrap_or(-1),
            stderr: stderr.to_string(),
        }
        .into());
    }

    Ok(())
}

/// Run a command and capture its stdout.
pub fn output(program: &str, args: &[&str]) -> Result<String> {
    let mut cmd = session_command(program);
    cmd.args(args);

    let output = cmd.output().map_err(|e| ProcessError::Execution {
        command: program.to_string(),
        source: e,
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ProcessError::NonZeroExit {
            command: program.to_string(),
            code: output.status.code().unwrap_or(-1),
            stderr: stderr.to_string(),
        }
        .into());
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

/// Run a command purely for its exit status. Used to probe whether an
/// xfconf property already exists.
pub fn status_ok(program: &str, args: &[&str]) -> Result<bool> {
    let mut cmd = session_command(program);
    cmd.args(args);

    let output = cmd.output().map_err(|e| ProcessError::Execution {
        command: program.to_string(),
        source: e,
    })?;

    Ok(output.status.success())
}

/// Run a command where failure is expected and uninteresting (e.g.
/// `killall` on a process that may not be running).
pub fn run_unchecked(program: &str, args: &[&str]) {
    if let Err(e) = run(program, args) {
        log::debug!("{} {:?} failed (ignored): {}", program, args, e);
    }
}
