#![forbid(unsafe_code)]

use std::collections::BTreeMap;
use std::process::Command;

use lazzaran_contracts::handler::{HandlerAck, LaunchApplications, LaunchError};
use lazzaran_contracts::settings::EngineSettings;

/// Launches local applications from the configured target -> executable
/// table. Processes are spawned detached; the assistant never waits on or
/// manages them afterwards.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    app_paths: BTreeMap<String, String>,
}

impl ProcessLauncher {
    pub fn new(app_paths: BTreeMap<String, String>) -> Self {
        Self { app_paths }
    }

    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self::new(settings.app_paths.clone())
    }

    fn resolve(&self, target: &str) -> Option<&str> {
        self.app_paths.get(target).map(String::as_str)
    }
}

impl LaunchApplications for ProcessLauncher {
    fn launch_application(&self, target: &str) -> Result<HandlerAck, LaunchError> {
        let path = self
            .resolve(target)
            .ok_or_else(|| LaunchError::UnknownTarget(target.to_string()))?;

        Command::new(path)
            .spawn()
            .map_err(|e| LaunchError::SpawnFailed(format!("{target}: {e}")))?;

        Ok(HandlerAck::new(format!("{target} açılıyor")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_launcher_01_unconfigured_target_is_an_error() {
        let launcher = ProcessLauncher::new(BTreeMap::new());
        let err = launcher.launch_application("calculator").unwrap_err();
        assert_eq!(err, LaunchError::UnknownTarget("calculator".to_string()));
    }

    #[test]
    fn at_launcher_02_missing_executable_reports_spawn_failure() {
        let mut paths = BTreeMap::new();
        paths.insert(
            "calculator".to_string(),
            "/nonexistent/lazzaran/calc".to_string(),
        );
        let launcher = ProcessLauncher::new(paths);
        match launcher.launch_application("calculator") {
            Err(LaunchError::SpawnFailed(detail)) => assert!(detail.contains("calculator")),
            other => panic!("expected spawn failure, got {other:?}"),
        }
    }
}
