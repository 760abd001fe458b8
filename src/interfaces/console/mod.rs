//! Console operator interface
//!
//! 按键 → 操作员指令：P 打印、R 立即上报、Esc 退出（raw mode 下 Ctrl+C 也视为退出）。

#[cfg(feature = "console")]
mod terminal;

use std::io::{BufRead, Write};
use std::time::Duration;

use colored::Colorize;
use tokio::runtime::Handle;
use tracing::debug;

use crate::errors::{Result, SamplerError};
use crate::runtime::{ControlSurface, DispatchOutcome, OperatorTrigger};

#[cfg(feature = "console")]
pub use terminal::TerminalKeys;

const SEPARATOR: &str =
    "--------------------------------------------------------------------------------";

/// A key press, reduced to what the operator loop cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    Char(char),
    Esc,
    CtrlC,
    Other,
}

/// Blocking source of key presses.
pub trait KeySource {
    fn next_key(&mut self) -> Result<KeyInput>;
}

/// Map a key to an operator trigger; unknown keys map to `None`.
pub fn trigger_for(key: KeyInput) -> Option<OperatorTrigger> {
    match key {
        KeyInput::Char(c) => match c.to_ascii_lowercase() {
            'p' => Some(OperatorTrigger::PrintNow),
            'r' => Some(OperatorTrigger::ReportNow),
            _ => None,
        },
        KeyInput::Esc | KeyInput::CtrlC => Some(OperatorTrigger::Exit),
        KeyInput::Other => None,
    }
}

fn format_secs(d: Duration) -> String {
    format!("{}s", d.as_secs_f64())
}

pub fn help_banner(record_every: Duration, report_every: Duration) -> String {
    [
        SEPARATOR.to_string(),
        "Use following keys to:".to_string(),
        "P     -> print current metrics to console".to_string(),
        "R     -> immediately report current metrics".to_string(),
        "<Esc> -> exit".to_string(),
        SEPARATOR.to_string(),
        format!(
            "New metrics are being created every {} and reported every {}.",
            format_secs(record_every),
            format_secs(report_every)
        ),
        SEPARATOR.to_string(),
    ]
    .join("\n")
}

/// Line-based key source for terminals without raw mode (and for piped stdin).
///
/// Each line counts as one key: its first character, or `Esc` on an empty
/// line or end of input.
pub struct LineKeys<R> {
    reader: R,
}

impl<R: BufRead> LineKeys<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> KeySource for LineKeys<R> {
    fn next_key(&mut self) -> Result<KeyInput> {
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .map_err(|e| SamplerError::terminal(format!("Failed to read input: {}", e)))?;
        if read == 0 {
            return Ok(KeyInput::Esc);
        }
        Ok(match line.trim().chars().next() {
            Some(c) => KeyInput::Char(c),
            None => KeyInput::Other,
        })
    }
}

/// Read keys until the operator asks to exit, dispatching each trigger on
/// the runtime behind `handle`. Must not be called from inside that runtime.
///
/// Returns once an exit key is read; shutting down is left to the caller.
pub fn run_input_loop(
    surface: &ControlSurface,
    handle: &Handle,
    keys: &mut dyn KeySource,
    out: &mut dyn Write,
) -> Result<()> {
    loop {
        let key = keys.next_key()?;
        let Some(trigger) = trigger_for(key) else {
            debug!("Ignoring key {:?}", key);
            continue;
        };

        match handle.block_on(surface.dispatch_to(trigger, &mut *out))? {
            DispatchOutcome::ExitRequested => return Ok(()),
            DispatchOutcome::Printed { .. } => {}
            DispatchOutcome::Reported(outcome) => {
                let _ = writeln!(
                    out,
                    "\nReported {} metrics to {} target(s).",
                    outcome.entries, outcome.targets
                );
            }
            DispatchOutcome::ReportFailed(e) | DispatchOutcome::PrintFailed(e) => {
                let _ = writeln!(out, "\n{}", e.format_colored());
            }
        }
        let _ = out.flush();
    }
}

/// Print the closing summary line.
pub fn print_summary(out: &mut dyn Write, summary: &crate::runtime::RunSummary) -> Result<()> {
    writeln!(out)
        .and_then(|_| writeln!(out, "{}", summary))
        .map_err(|e| SamplerError::terminal(format!("Failed to write summary: {}", e)))?;
    if summary.timed_out {
        let _ = writeln!(
            out,
            "{}",
            "Some background tasks did not stop in time and were aborted.".yellow()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(trigger_for(KeyInput::Char('p')), Some(OperatorTrigger::PrintNow));
        assert_eq!(trigger_for(KeyInput::Char('P')), Some(OperatorTrigger::PrintNow));
        assert_eq!(trigger_for(KeyInput::Char('r')), Some(OperatorTrigger::ReportNow));
        assert_eq!(trigger_for(KeyInput::Esc), Some(OperatorTrigger::Exit));
        assert_eq!(trigger_for(KeyInput::CtrlC), Some(OperatorTrigger::Exit));
        assert_eq!(trigger_for(KeyInput::Char('x')), None);
        assert_eq!(trigger_for(KeyInput::Other), None);
    }

    #[test]
    fn test_help_banner_cadence_line() {
        let banner = help_banner(Duration::from_secs(2), Duration::from_secs(60));
        assert!(banner.contains("New metrics are being created every 2s and reported every 60s."));
        assert!(banner.contains("<Esc> -> exit"));

        let banner = help_banner(Duration::from_millis(500), Duration::from_secs(5));
        assert!(banner.contains("every 0.5s and reported every 5s."));
    }

    #[test]
    fn test_line_keys() {
        let mut keys = LineKeys::new("p\n\nR\n".as_bytes());
        assert_eq!(keys.next_key().unwrap(), KeyInput::Char('p'));
        assert_eq!(keys.next_key().unwrap(), KeyInput::Other);
        assert_eq!(keys.next_key().unwrap(), KeyInput::Char('R'));
        assert_eq!(keys.next_key().unwrap(), KeyInput::Esc);
    }
}
