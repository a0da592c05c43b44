#![forbid(unsafe_code)]

use std::path::PathBuf;

use lazzaran_contracts::dispatch::DispatchOutcome;
use lazzaran_engine::normalize::turkish_lowercase;

pub const USAGE: &str = "usage: lazzaran [--settings <path>] [--catalog <path>]";

/// Utterances that end the read loop instead of being dispatched.
const EXIT_WORDS: &[&str] = &["çıkış", "cikis", "exit", "quit"];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub settings_path: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
}

pub fn parse_args(args: &[String]) -> Result<CliOptions, String> {
    let mut options = CliOptions::default();
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--settings" => {
                let path = iter.next().ok_or_else(|| USAGE.to_string())?;
                options.settings_path = Some(PathBuf::from(path));
            }
            "--catalog" => {
                let path = iter.next().ok_or_else(|| USAGE.to_string())?;
                options.catalog_path = Some(PathBuf::from(path));
            }
            _ => return Err(USAGE.to_string()),
        }
    }
    Ok(options)
}

pub fn is_exit_word(line: &str) -> bool {
    // The default Unicode fold sends 'I' to 'i', which would miss "ÇIKIŞ".
    EXIT_WORDS.contains(&turkish_lowercase(line.trim()).as_str())
}

/// One line per dispatch, status first so transcripts stay greppable.
pub fn format_outcome_line(outcome: &DispatchOutcome) -> String {
    if outcome.retry_count > 0 {
        format!(
            "[{} retries={}] {}",
            outcome.status.as_str(),
            outcome.retry_count,
            outcome.message
        )
    } else {
        format!("[{}] {}", outcome.status.as_str(), outcome.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lazzaran_contracts::dispatch::DispatchStatus;
    use lazzaran_contracts::ReasonCodeId;

    #[test]
    fn at_cli_01_args_parse_both_paths() {
        let args = vec![
            "--settings".to_string(),
            "settings.json".to_string(),
            "--catalog".to_string(),
            "catalog.json".to_string(),
        ];
        let options = parse_args(&args).unwrap();
        assert_eq!(options.settings_path, Some(PathBuf::from("settings.json")));
        assert_eq!(options.catalog_path, Some(PathBuf::from("catalog.json")));
    }

    #[test]
    fn at_cli_02_unknown_flag_reports_usage() {
        let args = vec!["--verbose".to_string()];
        assert_eq!(parse_args(&args).unwrap_err(), USAGE);
    }

    #[test]
    fn at_cli_03_outcome_line_carries_status_and_retries() {
        let outcome = DispatchOutcome::v1(
            DispatchStatus::HandlerFailed,
            "Komut çalıştırılamadı: servis hatası".to_string(),
            3,
            ReasonCodeId(0x4C5A_00F4),
        )
        .unwrap();
        assert_eq!(
            format_outcome_line(&outcome),
            "[handler_failed retries=3] Komut çalıştırılamadı: servis hatası"
        );
    }

    #[test]
    fn at_cli_04_exit_words() {
        assert!(is_exit_word("  Çıkış "));
        assert!(is_exit_word("ÇIKIŞ"));
        assert!(is_exit_word("exit"));
        assert!(!is_exit_word("google'da ara exit stratejisi"));
    }
}
