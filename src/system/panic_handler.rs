//! Panic handler module
//!
//! 崩溃时先恢复终端（退出 raw mode），再把堆栈写入 crash.log，最后打印简要提示。

use std::any::Any;
use std::fs::OpenOptions;
use std::io::Write;
use std::panic;
use std::path::{Path, PathBuf};

use chrono::Utc;

pub const CRASH_LOG: &str = "crash.log";

/// Install custom panic hook
pub fn install_panic_hook() {
    install_panic_hook_at(PathBuf::from(CRASH_LOG));
}

pub fn install_panic_hook_at(crash_log: PathBuf) {
    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();

        let message = panic_message(panic_info.payload());
        let location = panic_info
            .location()
            .map(|loc| format!("{}:{}:{}", loc.file(), loc.line(), loc.column()))
            .unwrap_or_else(|| "Unknown location".to_string());

        let backtrace = std::backtrace::Backtrace::force_capture();
        let timestamp = Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string();

        if let Err(e) = write_crash_log(&crash_log, &timestamp, &message, &location, &backtrace) {
            eprintln!("Failed to write crash log: {}", e);
        }

        display_panic(&message, &location, &crash_log);
    }));
}

/// 崩溃发生在按键读取期间时，终端仍处于 raw mode
fn restore_terminal() {
    #[cfg(feature = "console")]
    {
        let _ = crossterm::terminal::disable_raw_mode();
    }
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

fn display_panic(message: &str, location: &str, crash_log: &Path) {
    use colored::Colorize;

    eprintln!();
    eprintln!("{} {}", "Program panicked:".red().bold(), message.white());
    eprintln!("{} {}", "Location:".yellow().bold(), location);
    eprintln!(
        "{}",
        format!("Details saved to {}", crash_log.display()).cyan()
    );
    eprintln!();
}

/// Write crash log
pub(crate) fn write_crash_log(
    path: &Path,
    timestamp: &str,
    message: &str,
    location: &str,
    backtrace: &dyn std::fmt::Debug,
) -> std::io::Result<()> {
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;

    writeln!(file, "==========================================")?;
    writeln!(file, "Crash Report - {}", timestamp)?;
    writeln!(file, "==========================================")?;
    writeln!(file, "Message: {}", message)?;
    writeln!(file, "Location: {}", location)?;
    writeln!(file, "\nBacktrace:")?;
    writeln!(file, "{:?}", backtrace)?;
    writeln!(file, "==========================================\n")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_from_payload() {
        let s: Box<dyn Any + Send> = Box::new("static str");
        assert_eq!(panic_message(s.as_ref()), "static str");

        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(owned.as_ref()), "owned");

        let other: Box<dyn Any + Send> = Box::new(42u8);
        assert_eq!(panic_message(other.as_ref()), "Unknown panic");
    }

    #[test]
    fn test_crash_log_appends() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crash.log");

        write_crash_log(&path, "t1", "first", "a.rs:1:1", &"bt").unwrap();
        write_crash_log(&path, "t2", "second", "b.rs:2:2", &"bt").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("Message: first"));
        assert!(content.contains("Message: second"));
        assert_eq!(content.matches("Crash Report").count(), 2);
    }
}
