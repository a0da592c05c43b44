#![forbid(unsafe_code)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use lazzaran_contracts::command::ActionId;
use lazzaran_contracts::dispatch::DispatchStatus;
use lazzaran_contracts::handler::{
    CallWebServices, HandlerAck, InvokeSystemActions, LaunchApplications, LaunchError,
    ServiceError, SystemError,
};
use lazzaran_contracts::settings::EngineSettings;
use lazzaran_engine::catalog::Catalog;
use lazzaran_os::dispatch::{CancelFlag, HandlerTable, RetryScheduler};
use lazzaran_os::pipeline::AssistantPipeline;

#[derive(Default)]
struct FakeLauncher {
    calls: AtomicU32,
    targets: Mutex<Vec<String>>,
}

impl LaunchApplications for FakeLauncher {
    fn launch_application(&self, target: &str) -> Result<HandlerAck, LaunchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.targets.lock().unwrap().push(target.to_string());
        Ok(HandlerAck::new(format!("{target} açılıyor")))
    }
}

#[derive(Default)]
struct FakeWeb {
    calls: AtomicU32,
    requests: Mutex<Vec<(String, Option<String>)>>,
}

impl CallWebServices for FakeWeb {
    fn call_web_service(
        &self,
        action_id: &ActionId,
        argument: Option<&str>,
    ) -> Result<String, ServiceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .unwrap()
            .push((action_id.as_str().to_string(), argument.map(String::from)));
        Ok("tamam".to_string())
    }
}

#[derive(Default)]
struct FakeSystem {
    calls: AtomicU32,
    actions: Mutex<Vec<String>>,
}

impl InvokeSystemActions for FakeSystem {
    fn invoke_system_action(&self, action_id: &ActionId) -> Result<HandlerAck, SystemError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.actions
            .lock()
            .unwrap()
            .push(action_id.as_str().to_string());
        Ok(HandlerAck::new("tamam"))
    }
}

struct NoWaitScheduler;

impl RetryScheduler for NoWaitScheduler {
    fn wait(&self, _attempt: u32, _backoff: Duration) {}
}

struct Fakes {
    launcher: Arc<FakeLauncher>,
    web: Arc<FakeWeb>,
    system: Arc<FakeSystem>,
}

struct SharedLauncher(Arc<FakeLauncher>);
impl LaunchApplications for SharedLauncher {
    fn launch_application(&self, target: &str) -> Result<HandlerAck, LaunchError> {
        self.0.launch_application(target)
    }
}

struct SharedWeb(Arc<FakeWeb>);
impl CallWebServices for SharedWeb {
    fn call_web_service(
        &self,
        action_id: &ActionId,
        argument: Option<&str>,
    ) -> Result<String, ServiceError> {
        self.0.call_web_service(action_id, argument)
    }
}

struct SharedSystem(Arc<FakeSystem>);
impl InvokeSystemActions for SharedSystem {
    fn invoke_system_action(&self, action_id: &ActionId) -> Result<HandlerAck, SystemError> {
        self.0.invoke_system_action(action_id)
    }
}

fn pipeline() -> (AssistantPipeline, Fakes) {
    let fakes = Fakes {
        launcher: Arc::new(FakeLauncher::default()),
        web: Arc::new(FakeWeb::default()),
        system: Arc::new(FakeSystem::default()),
    };
    let handlers = HandlerTable::new(
        Box::new(SharedLauncher(fakes.launcher.clone())),
        Box::new(SharedWeb(fakes.web.clone())),
        Box::new(SharedSystem(fakes.system.clone())),
    );
    let pipeline = AssistantPipeline::new(
        &EngineSettings::default_v1(),
        Catalog::builtin_turkish(),
        handlers,
        Box::new(NoWaitScheduler),
    )
    .unwrap();
    (pipeline, fakes)
}

#[test]
fn scenario_calculator_launch() {
    let (pipeline, fakes) = pipeline();
    let out = pipeline.handle_utterance("hesap makinesini aç", &CancelFlag::new());

    assert_eq!(out.status, DispatchStatus::Executed);
    assert_eq!(fakes.launcher.calls.load(Ordering::SeqCst), 1);
    assert_eq!(
        fakes.launcher.targets.lock().unwrap().as_slice(),
        ["calculator"]
    );
    assert_eq!(fakes.web.calls.load(Ordering::SeqCst), 0);
    assert_eq!(fakes.system.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn scenario_google_search_with_argument() {
    let (pipeline, fakes) = pipeline();
    let out = pipeline.handle_utterance("google'da ara istanbul hava durumu", &CancelFlag::new());

    assert_eq!(out.status, DispatchStatus::Executed);
    let requests = fakes.web.requests.lock().unwrap();
    assert_eq!(
        requests.as_slice(),
        [(
            "search_google".to_string(),
            Some("istanbul hava durumu".to_string())
        )]
    );
}

#[test]
fn scenario_unrecognized_utterance_is_not_found() {
    let (pipeline, fakes) = pipeline();
    let out = pipeline.handle_utterance("merhaba", &CancelFlag::new());

    assert_eq!(out.status, DispatchStatus::NotFound);
    assert_eq!(fakes.launcher.calls.load(Ordering::SeqCst), 0);
    assert_eq!(fakes.web.calls.load(Ordering::SeqCst), 0);
    assert_eq!(fakes.system.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn scenario_specific_trigger_beats_generic_open() {
    let (pipeline, fakes) = pipeline();
    let out = pipeline.handle_utterance("chrome'u aç", &CancelFlag::new());

    assert_eq!(out.status, DispatchStatus::Executed);
    assert_eq!(fakes.launcher.targets.lock().unwrap().as_slice(), ["chrome"]);
}

#[test]
fn scenario_wake_phrase_prefix_is_ignored() {
    let (pipeline, fakes) = pipeline();
    let out = pipeline.handle_utterance("Merhaba Lazzaran, saat kaç?", &CancelFlag::new());

    assert_eq!(out.status, DispatchStatus::Executed);
    assert_eq!(
        fakes.system.actions.lock().unwrap().as_slice(),
        ["current_time"]
    );
}

#[test]
fn scenario_search_without_query_prompts_for_argument() {
    let (pipeline, fakes) = pipeline();
    let out = pipeline.handle_utterance("google'da ara", &CancelFlag::new());

    assert_eq!(out.status, DispatchStatus::ArgumentMissing);
    assert_eq!(fakes.web.calls.load(Ordering::SeqCst), 0);
}

#[test]
fn scenario_shutdown_routes_to_system_handler() {
    let (pipeline, fakes) = pipeline();
    let out = pipeline.handle_utterance("bilgisayarı kapat", &CancelFlag::new());

    assert_eq!(out.status, DispatchStatus::Executed);
    assert_eq!(
        fakes.system.actions.lock().unwrap().as_slice(),
        ["shutdown_computer"]
    );
}
