//! Interactive console for the role-play trainer.
//!
//! Reads commands from stdin. Plain text is sent as a `speak` action to the
//! active session; lines starting with `/` are commands (see `/help`).

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use roleplay_trainer::adapters::scenarios::builtin_store;
use roleplay_trainer::adapters::{
    FileKeyValueStore, InMemoryKeyValueStore, InMemoryScenarioStore, LocalEventBus,
    YamlScenarioStore,
};
use roleplay_trainer::application::{ActionOutcome, SessionManager};
use roleplay_trainer::config::{AppConfig, LoggingConfig, StorageBackend};
use roleplay_trainer::domain::foundation::{DomainError, ErrorCode, EventEnvelope, ScenarioId};
use roleplay_trainer::domain::simulation::events::SESSION_COMPLETED;
use roleplay_trainer::domain::simulation::{
    ActionPayload, ActionType, SessionCompleted, SessionOptions, SessionResult,
};
use roleplay_trainer::ports::{EventHandler, EventSubscriber, KeyValueStore};

const HELP: &str = "\
Commands:
  /scenarios          list available scenarios
  /start <id>         start a session
  /do <type> [text]   submit a non-speak action
  /status             show the active session
  /complete           finish and grade the active session
  /history            list completed sessions
  /help               show this help
  /quit               exit
Anything else is said to the counterpart.";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.logging);
    config.validate()?;

    let scenarios = load_catalog(&config).await?;
    info!(scenarios = scenarios.len(), "Scenario catalog loaded");

    let storage: Arc<dyn KeyValueStore> = match config.storage.backend {
        StorageBackend::Memory => Arc::new(InMemoryKeyValueStore::new()),
        StorageBackend::File => Arc::new(FileKeyValueStore::new(&config.storage.data_dir)),
    };

    let bus = Arc::new(LocalEventBus::with_capture_limit(0));
    bus.subscribe(SESSION_COMPLETED, Arc::new(ResultPrinter));

    let manager = SessionManager::new(
        Arc::new(scenarios),
        storage,
        bus,
        config.session_manager_config(),
    );
    if manager.restore_progress().await {
        let metrics = manager.metrics().await;
        println!(
            "Welcome back: {} sessions completed, best {}",
            metrics.sessions_completed, metrics.best_percentage
        );
    }

    println!("{}", HELP);
    run_console(&manager).await?;
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.to_ascii_lowercase()));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn load_catalog(config: &AppConfig) -> Result<InMemoryScenarioStore, Box<dyn std::error::Error>> {
    let builtin = builtin_store()?;
    let Some(dir) = &config.scenarios.dir else {
        return Ok(builtin);
    };
    let custom = YamlScenarioStore::load_dir(dir).await?.into_inner();
    info!(dir = %dir.display(), scenarios = custom.len(), "Loaded scenario directory");
    Ok(builtin.merge(custom))
}

async fn run_console(manager: &SessionManager) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let Some(command) = line.strip_prefix('/') else {
            submit(manager, ActionType::Speak, ActionPayload::text(line)).await;
            continue;
        };

        let (name, rest) = command
            .split_once(char::is_whitespace)
            .map(|(n, r)| (n, r.trim()))
            .unwrap_or((command, ""));

        match name {
            "quit" | "exit" => break,
            "help" => println!("{}", HELP),
            "scenarios" => {
                for id in manager.available_scenarios().await {
                    println!("  {}", id);
                }
            }
            "start" => start(manager, rest).await,
            "do" => {
                let (kind, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                if kind.is_empty() {
                    println!("usage: /do <type> [text]");
                    continue;
                }
                let payload = match text.trim() {
                    "" => ActionPayload::default(),
                    text => ActionPayload::text(text),
                };
                submit(manager, ActionType::from(kind), payload).await;
            }
            "status" => match manager.get_active_session().await {
                Some(session) => println!(
                    "[{}] stage {} | progress {} | score {} | {}s left",
                    session.scenario_id(),
                    session.current_stage(),
                    session.progress(),
                    session.performance().score(),
                    session.time_remaining()
                ),
                None => println!("No active session."),
            },
            "complete" => {
                // The result is printed by the completion subscriber.
                if let Err(e) = manager.complete_session().await {
                    println!("error: {}", e);
                }
            }
            "history" => {
                let history = manager.get_session_history().await;
                if history.is_empty() {
                    println!("No completed sessions yet.");
                }
                for (i, result) in history.iter().enumerate() {
                    println!(
                        "  {}. {} {} ({})",
                        i + 1,
                        result.scenario_id,
                        result.percentage,
                        result.certification.level
                    );
                }
            }
            other => println!("unknown command /{} (try /help)", other),
        }
    }

    if manager.get_active_session().await.is_some() {
        warn!("Exiting with an unfinished session");
    }
    Ok(())
}

async fn start(manager: &SessionManager, raw_id: &str) {
    let id = match ScenarioId::new(raw_id) {
        Ok(id) => id,
        Err(e) => {
            println!("error: {}", e);
            return;
        }
    };
    match manager.start_session(&id, SessionOptions::default()).await {
        Ok(session) => println!(
            "Session started at stage {} with {}s on the clock.",
            session.current_stage(),
            session.time_remaining()
        ),
        Err(e) => println!("error: {}", e),
    }
}

async fn submit(manager: &SessionManager, action_type: ActionType, payload: ActionPayload) {
    match manager.execute_action(action_type, payload).await {
        Ok(outcome) => print_outcome(&outcome),
        Err(e) => println!("error: {}", e),
    }
}

fn print_outcome(outcome: &ActionOutcome) {
    let response = &outcome.response;
    println!("{}: {}", response.speaker, response.content);
    if let Some(feedback) = &response.feedback {
        println!("  > {}", feedback);
    }
    for id in &outcome.newly_completed {
        println!("  + {}", id);
    }
    println!(
        "  stage {} | progress {} | score {} | {}s left",
        outcome.stage,
        outcome.progress,
        outcome.performance.score(),
        outcome.time_remaining
    );
}

fn print_result(result: &SessionResult) {
    println!(
        "Session complete: {}/{} ({}), {}",
        result.final_score, result.max_score, result.percentage, result.certification.level
    );
    for rec in &result.recommendations {
        println!("  - [{:?}] {}", rec.priority, rec.suggestion);
    }
    for step in &result.next_steps {
        println!("  > {}", step);
    }
}

/// Prints results however the session ended, including timer expiry.
struct ResultPrinter;

#[async_trait]
impl EventHandler for ResultPrinter {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let completed: SessionCompleted = event
            .payload_as()
            .map_err(|e| DomainError::new(ErrorCode::InternalError, e.to_string()))?;
        print_result(&completed.result);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "ResultPrinter"
    }
}
