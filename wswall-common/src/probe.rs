use crate::command;
use crate::error::{ProbeError, Result, WswallError};

/// Queries the window-management layer for the active workspace number.
///
/// `xprop -root _NET_CURRENT_DESKTOP` prints a line like
/// `_NET_CURRENT_DESKTOP(CARDINAL) = 2`; the last whitespace-separated
/// token is the 0-based workspace number.
#[derive(Debug, Default, Clone)]
pub struct DesktopProbe;

impl DesktopProbe {
    pub fn new() -> Self {
        Self
    }

    pub fn current_workspace(&self) -> Result<usize> {
        let out = command::output("xprop", &["-root", "_NET_CURRENT_DESKTOP"]).map_err(|e| {
            match e {
                WswallError::Process(crate::error::ProcessError::Execution { source, .. }) => {
                    WswallError::Probe(ProbeError::Command { source })
                }
                WswallError::Process(crate::error::ProcessError::NonZeroExit {
                    code, stderr, ..
                }) => WswallError::Probe(ProbeError::NonZeroExit { code, stderr }),
                other => other,
            }
        })?;

        parse_workspace_number(&out).map_err(Into::into)
    }
}

fn parse_workspace_number(output: &str) -> std::result::Result<usize, ProbeError> {
    output
        .split_whitespace()
        .last()
        .and_then(|token| token.parse().ok())
        .ok_or_else(|| ProbeError::Parse {
            output: output.trim().to_string(),
        })
}
