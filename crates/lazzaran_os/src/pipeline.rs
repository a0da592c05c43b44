#![forbid(unsafe_code)]

use lazzaran_contracts::dispatch::DispatchOutcome;
use lazzaran_contracts::matching::MatcherVerdict;
use lazzaran_contracts::settings::EngineSettings;
use lazzaran_contracts::{ContractViolation, Validate};
use lazzaran_engine::catalog::Catalog;
use lazzaran_engine::extract::extract_argument;
use lazzaran_engine::matcher::{MatcherConfig, MatcherRuntime};
use lazzaran_engine::normalize::NormalizerRuntime;

use crate::dispatch::{
    CancelFlag, DispatcherConfig, DispatcherRuntime, HandlerTable, RetryScheduler,
};

/// One utterance, one straight pass: normalize -> match -> extract ->
/// dispatch. No internal suspension points; the only shared state between
/// concurrent callers is the read-only catalog, so the pipeline is safe to
/// drive from a queue consumer or from parallel dispatches alike.
pub struct AssistantPipeline {
    normalizer: NormalizerRuntime,
    matcher: MatcherRuntime,
    catalog: Catalog,
    dispatcher: DispatcherRuntime,
    handlers: HandlerTable,
}

impl AssistantPipeline {
    pub fn new(
        settings: &EngineSettings,
        catalog: Catalog,
        handlers: HandlerTable,
        scheduler: Box<dyn RetryScheduler>,
    ) -> Result<Self, ContractViolation> {
        settings.validate()?;
        Ok(Self {
            normalizer: NormalizerRuntime::new(&settings.wake_phrases),
            matcher: MatcherRuntime::new(MatcherConfig::with_threshold(
                settings.match_threshold,
            )?),
            catalog,
            dispatcher: DispatcherRuntime::new(
                DispatcherConfig::from_settings(settings),
                scheduler,
            ),
            handlers,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn handle_utterance(&self, raw: &str, cancel: &CancelFlag) -> DispatchOutcome {
        let utterance = self.normalizer.normalize(raw);
        let verdict = self.matcher.run(&utterance, &self.catalog);

        // The extractor only runs for commands that declare an argument
        // slot; everything else dispatches argument-free.
        let argument = match &verdict {
            MatcherVerdict::Matched(result) => self
                .catalog
                .get(&result.action_id)
                .filter(|definition| definition.requires_argument)
                .and_then(|_| extract_argument(&utterance, result)),
            _ => None,
        };

        self.dispatcher.run(
            &verdict,
            argument.as_deref(),
            &self.catalog,
            &self.handlers,
            cancel,
        )
    }
}
