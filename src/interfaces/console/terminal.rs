use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use super::{KeyInput, KeySource};
use crate::errors::{Result, SamplerError};

/// Reads single key presses from the terminal.
///
/// Raw mode is only enabled for the duration of one read, so progress ticks
/// and printed snapshots render normally in between.
pub struct TerminalKeys;

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> Result<Self> {
        terminal::enable_raw_mode()
            .map_err(|e| SamplerError::terminal(format!("Failed to enable raw mode: {}", e)))?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

impl KeySource for TerminalKeys {
    fn next_key(&mut self) -> Result<KeyInput> {
        let _raw = RawModeGuard::enable()?;
        loop {
            let ev = event::read()
                .map_err(|e| SamplerError::terminal(format!("Failed to read key: {}", e)))?;
            // Windows 会同时上报按下和释放
            if let Event::Key(key) = ev
                && key.kind == KeyEventKind::Press
            {
                return Ok(match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        KeyInput::CtrlC
                    }
                    KeyCode::Char(c) => KeyInput::Char(c),
                    KeyCode::Esc => KeyInput::Esc,
                    _ => KeyInput::Other,
                });
            }
        }
    }
}
