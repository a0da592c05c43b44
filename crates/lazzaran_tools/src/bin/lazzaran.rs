#![forbid(unsafe_code)]

use std::env;
use std::fs;
use std::io::{self, BufRead, Write};

use lazzaran_contracts::settings::EngineSettings;
use lazzaran_engine::catalog::Catalog;
use lazzaran_engine::launcher::ProcessLauncher;
use lazzaran_engine::system::SystemControl;
use lazzaran_engine::webservices::WebServiceRouter;
use lazzaran_os::dispatch::{BlockingScheduler, CancelFlag, HandlerTable};
use lazzaran_os::pipeline::AssistantPipeline;
use lazzaran_os::settings::load_settings;
use lazzaran_tools::cli::{format_outcome_line, is_exit_word, parse_args};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(2);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = env::args().skip(1).collect();
    let options = parse_args(&args)?;

    let settings = match &options.settings_path {
        Some(path) => load_settings(path).map_err(|e| e.to_string())?,
        None => EngineSettings::default_v1(),
    };

    let catalog = match &options.catalog_path {
        Some(path) => {
            let raw = fs::read_to_string(path).map_err(|e| e.to_string())?;
            Catalog::from_json_str(&raw).map_err(|e| e.to_string())?
        }
        None => Catalog::builtin_turkish(),
    };

    let handlers = HandlerTable::new(
        Box::new(ProcessLauncher::from_settings(&settings)),
        Box::new(WebServiceRouter::from_settings(&settings)),
        Box::new(SystemControl::new()),
    );

    let pipeline = AssistantPipeline::new(
        &settings,
        catalog,
        handlers,
        Box::new(BlockingScheduler),
    )
    .map_err(|violation| format!("invalid settings: {violation:?}"))?;

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    for line in stdin.lock().lines() {
        let line = line.map_err(|e| e.to_string())?;
        let utterance = line.trim();
        if utterance.is_empty() {
            continue;
        }
        if is_exit_word(utterance) {
            break;
        }
        let outcome = pipeline.handle_utterance(utterance, &CancelFlag::new());
        writeln!(stdout, "{}", format_outcome_line(&outcome)).map_err(|e| e.to_string())?;
    }
    Ok(())
}
