#![forbid(unsafe_code)]

use std::process::Command;

use time::{OffsetDateTime, UtcOffset};

use lazzaran_contracts::command::ActionId;
use lazzaran_contracts::handler::{HandlerAck, InvokeSystemActions, SystemError};

/// The assistant targets tr-TR; when the platform cannot report its local
/// offset the clock falls back to Turkey time.
const FALLBACK_UTC_OFFSET_HOURS: i8 = 3;

/// System-control handler: shutdown, restart, local clock. Power commands
/// are spawned and never awaited; the dispatcher already guarantees they
/// run at most once.
#[derive(Debug, Clone, Default)]
pub struct SystemControl;

impl SystemControl {
    pub fn new() -> Self {
        Self
    }

    fn run_power_command(&self, program: &str, args: &[&str]) -> Result<(), SystemError> {
        Command::new(program)
            .args(args)
            .spawn()
            .map(|_| ())
            .map_err(|e| SystemError::CommandFailed(format!("{program}: {e}")))
    }
}

impl InvokeSystemActions for SystemControl {
    fn invoke_system_action(&self, action_id: &ActionId) -> Result<HandlerAck, SystemError> {
        match action_id.as_str() {
            "current_time" => Ok(HandlerAck::new(format_clock(local_now()?))),
            "shutdown_computer" => {
                let (program, args) = shutdown_command();
                self.run_power_command(program, args)?;
                Ok(HandlerAck::new("Bilgisayar kapatılıyor"))
            }
            "restart_computer" => {
                let (program, args) = restart_command();
                self.run_power_command(program, args)?;
                Ok(HandlerAck::new("Bilgisayar yeniden başlatılıyor"))
            }
            other => Err(SystemError::UnknownAction(other.to_string())),
        }
    }
}

fn local_now() -> Result<OffsetDateTime, SystemError> {
    if let Ok(now) = OffsetDateTime::now_local() {
        return Ok(now);
    }
    let fallback = UtcOffset::from_hms(FALLBACK_UTC_OFFSET_HOURS, 0, 0)
        .map_err(|_| SystemError::ClockUnavailable)?;
    Ok(OffsetDateTime::now_utc().to_offset(fallback))
}

fn format_clock(now: OffsetDateTime) -> String {
    format!("Şu anki saat: {:02}:{:02}", now.hour(), now.minute())
}

#[cfg(target_os = "windows")]
fn shutdown_command() -> (&'static str, &'static [&'static str]) {
    ("shutdown", &["/s", "/t", "1"])
}

#[cfg(target_os = "windows")]
fn restart_command() -> (&'static str, &'static [&'static str]) {
    ("shutdown", &["/r", "/t", "1"])
}

#[cfg(not(target_os = "windows"))]
fn shutdown_command() -> (&'static str, &'static [&'static str]) {
    ("shutdown", &["-h", "now"])
}

#[cfg(not(target_os = "windows"))]
fn restart_command() -> (&'static str, &'static [&'static str]) {
    ("shutdown", &["-r", "now"])
}
