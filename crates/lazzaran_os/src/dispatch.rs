#![forbid(unsafe_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lazzaran_contracts::command::{CommandCategory, CommandDefinition};
use lazzaran_contracts::dispatch::{
    DispatchOutcome, DispatchStatus, DISPATCH_CONTRACT_VERSION, MAX_OUTCOME_MESSAGE_CHARS,
};
use lazzaran_contracts::handler::{CallWebServices, InvokeSystemActions, LaunchApplications};
use lazzaran_contracts::matching::{MatchCandidate, MatcherVerdict};
use lazzaran_contracts::settings::EngineSettings;
use lazzaran_contracts::{ReasonCodeId, Validate};
use lazzaran_engine::catalog::Catalog;

pub mod reason_codes {
    use lazzaran_contracts::ReasonCodeId;

    // LZ.DISPATCH reason-code namespace.
    pub const DISPATCH_OK_EXECUTED: ReasonCodeId = ReasonCodeId(0x4C5A_0001);

    pub const DISPATCH_NOT_FOUND: ReasonCodeId = ReasonCodeId(0x4C5A_00F1);
    pub const DISPATCH_AMBIGUOUS: ReasonCodeId = ReasonCodeId(0x4C5A_00F2);
    pub const DISPATCH_ARGUMENT_MISSING: ReasonCodeId = ReasonCodeId(0x4C5A_00F3);
    pub const DISPATCH_HANDLER_FAILED: ReasonCodeId = ReasonCodeId(0x4C5A_00F4);
    pub const DISPATCH_CANCELLED: ReasonCodeId = ReasonCodeId(0x4C5A_00F5);
    pub const DISPATCH_CATALOG_DESYNC: ReasonCodeId = ReasonCodeId(0x4C5A_00FE);
}

/// Handler bindings, one per command category. Built once at startup; the
/// closed `CommandCategory` enum is the only routing key, never a string
/// lookup at dispatch time.
pub struct HandlerTable {
    pub launcher: Box<dyn LaunchApplications>,
    pub web: Box<dyn CallWebServices>,
    pub system: Box<dyn InvokeSystemActions>,
}

impl HandlerTable {
    pub fn new(
        launcher: Box<dyn LaunchApplications>,
        web: Box<dyn CallWebServices>,
        system: Box<dyn InvokeSystemActions>,
    ) -> Self {
        Self {
            launcher,
            web,
            system,
        }
    }
}

/// Seam between the retry state machine and real time. Production sleeps;
/// tests observe the wait without blocking.
pub trait RetryScheduler: Send + Sync {
    fn wait(&self, attempt: u32, backoff: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BlockingScheduler;

impl RetryScheduler for BlockingScheduler {
    fn wait(&self, _attempt: u32, backoff: Duration) {
        std::thread::sleep(backoff);
    }
}

/// Cooperative cancellation, checked between retry attempts. A new wake
/// word from the user cancels the dispatch still backing off.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DispatcherConfig {
    pub retry_count: u32,
    pub retry_backoff: Duration,
}

impl DispatcherConfig {
    pub fn default_v1() -> Self {
        Self {
            retry_count: 3,
            retry_backoff: Duration::from_secs(1),
        }
    }

    pub fn from_settings(settings: &EngineSettings) -> Self {
        Self {
            retry_count: settings.retry_count,
            retry_backoff: settings.retry_backoff(),
        }
    }
}

/// Per-invocation dispatch state machine:
/// `Invoking -> {Succeeded, Failed, Retrying}`, `Retrying -> Invoking`
/// until the attempt budget is spent or the dispatch is cancelled.
enum DispatchPhase {
    Invoking,
    Retrying,
    Succeeded(String),
    Failed,
    Cancelled,
}

pub struct DispatcherRuntime {
    config: DispatcherConfig,
    scheduler: Box<dyn RetryScheduler>,
}

impl DispatcherRuntime {
    pub fn new(config: DispatcherConfig, scheduler: Box<dyn RetryScheduler>) -> Self {
        Self { config, scheduler }
    }

    /// Exactly one handler invocation per attempt; zero invocations on
    /// no-match, ambiguity and missing argument.
    pub fn run(
        &self,
        verdict: &MatcherVerdict,
        argument: Option<&str>,
        catalog: &Catalog,
        handlers: &HandlerTable,
        cancel: &CancelFlag,
    ) -> DispatchOutcome {
        let result = match verdict {
            MatcherVerdict::NoMatch => {
                return outcome(
                    DispatchStatus::NotFound,
                    "Komutu anlayamadım, lütfen tekrar eder misiniz?".to_string(),
                    0,
                    reason_codes::DISPATCH_NOT_FOUND,
                );
            }
            MatcherVerdict::Ambiguous(candidates) => {
                return outcome(
                    DispatchStatus::Ambiguous,
                    ambiguity_prompt(candidates),
                    0,
                    reason_codes::DISPATCH_AMBIGUOUS,
                );
            }
            MatcherVerdict::Matched(result) => result,
        };

        let Some(definition) = catalog.get(&result.action_id) else {
            // The catalog is immutable during matching, so this only fires
            // when a caller pairs a verdict with the wrong catalog value.
            return outcome(
                DispatchStatus::HandlerFailed,
                "Komut kataloğu ile eşleşme tutarsız".to_string(),
                0,
                reason_codes::DISPATCH_CATALOG_DESYNC,
            );
        };

        let argument = argument.map(str::trim).filter(|a| !a.is_empty());
        if definition.requires_argument && argument.is_none() {
            return outcome(
                DispatchStatus::ArgumentMissing,
                "Bu komut için bir ifade belirtmelisiniz".to_string(),
                0,
                reason_codes::DISPATCH_ARGUMENT_MISSING,
            );
        }

        let attempts_allowed = if definition.category.is_retryable() {
            self.config.retry_count + 1
        } else {
            1
        };

        let mut attempt: u32 = 0;
        let mut last_failure = String::new();
        let mut phase = DispatchPhase::Invoking;

        loop {
            phase = match phase {
                DispatchPhase::Invoking => {
                    match invoke_once(definition, argument, handlers) {
                        Ok(message) => DispatchPhase::Succeeded(message),
                        Err(detail) => {
                            last_failure = detail;
                            if attempt + 1 < attempts_allowed {
                                DispatchPhase::Retrying
                            } else {
                                DispatchPhase::Failed
                            }
                        }
                    }
                }
                DispatchPhase::Retrying => {
                    self.scheduler.wait(attempt + 1, self.config.retry_backoff);
                    if cancel.is_cancelled() {
                        DispatchPhase::Cancelled
                    } else {
                        attempt += 1;
                        DispatchPhase::Invoking
                    }
                }
                DispatchPhase::Succeeded(message) => {
                    return outcome(
                        DispatchStatus::Executed,
                        message,
                        attempt,
                        reason_codes::DISPATCH_OK_EXECUTED,
                    );
                }
                DispatchPhase::Failed => {
                    return outcome(
                        DispatchStatus::HandlerFailed,
                        format!("Komut çalıştırılamadı: {last_failure}"),
                        attempt,
                        reason_codes::DISPATCH_HANDLER_FAILED,
                    );
                }
                DispatchPhase::Cancelled => {
                    return outcome(
                        DispatchStatus::Cancelled,
                        "Komut iptal edildi".to_string(),
                        attempt,
                        reason_codes::DISPATCH_CANCELLED,
                    );
                }
            };
        }
    }
}

fn invoke_once(
    definition: &CommandDefinition,
    argument: Option<&str>,
    handlers: &HandlerTable,
) -> Result<String, String> {
    match definition.category {
        CommandCategory::Application => {
            let target = if definition.requires_argument {
                argument
            } else {
                definition.target.as_deref()
            };
            let Some(target) = target else {
                return Err("başlatılacak uygulama belirlenemedi".to_string());
            };
            handlers
                .launcher
                .launch_application(target)
                .map(|ack| ack.message)
                .map_err(|e| e.to_string())
        }
        CommandCategory::WebService => handlers
            .web
            .call_web_service(&definition.action_id, argument)
            .map_err(|e| e.to_string()),
        CommandCategory::System => handlers
            .system
            .invoke_system_action(&definition.action_id)
            .map(|ack| ack.message)
            .map_err(|e| e.to_string()),
    }
}

fn ambiguity_prompt(candidates: &[MatchCandidate]) -> String {
    let phrases: Vec<&str> = candidates
        .iter()
        .map(|c| c.trigger_phrase.as_str())
        .collect();
    format!(
        "Birden fazla komut eşleşti: {}. Hangisini istediniz?",
        phrases.join(", ")
    )
}

/// Outcomes are always well formed: handler text is sanitized into the
/// message contract instead of failing the dispatch after the fact.
fn outcome(
    status: DispatchStatus,
    message: String,
    retry_count: u32,
    reason_code: ReasonCodeId,
) -> DispatchOutcome {
    let outcome = DispatchOutcome {
        schema_version: DISPATCH_CONTRACT_VERSION,
        status,
        message: sanitize_message(message, status),
        retry_count,
        reason_code,
    };
    debug_assert!(outcome.validate().is_ok());
    outcome
}

fn sanitize_message(message: String, status: DispatchStatus) -> String {
    let cleaned: String = message
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return fallback_message(status).to_string();
    }
    cleaned.chars().take(MAX_OUTCOME_MESSAGE_CHARS).collect()
}

fn fallback_message(status: DispatchStatus) -> &'static str {
    match status {
        DispatchStatus::Executed => "Komut tamamlandı",
        DispatchStatus::NotFound => "Komut bulunamadı",
        DispatchStatus::Ambiguous => "Birden fazla komut eşleşti",
        DispatchStatus::ArgumentMissing => "Bu komut için bir ifade gerekli",
        DispatchStatus::HandlerFailed => "Komut çalıştırılamadı",
        DispatchStatus::Cancelled => "Komut iptal edildi",
    }
}
