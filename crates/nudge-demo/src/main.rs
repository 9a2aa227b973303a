//! nudge-demo - terminal rendition of the lock-screen notification demo.
//!
//! Every typed line is a message arriving in the main conversation; `/`
//! commands open conversations, press the power button and edit conditions.
//! Banners are printed as the engine shows them.
//!
//! # Configuration
//!
//! - `NUDGE_DEMO_CLASSIFIER` - `http` (default) calls a running nudge-server,
//!   `direct` calls the LLM provider in-process
//! - `NUDGE_CLASSIFIER_URL` and friends, for `http`
//! - `GEMINI_API_KEY` or `ANTHROPIC_API_KEY`, for `direct`
//! - `NUDGE_*` engine settings, see `EngineConfig::from_env`

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nudge_client::HttpClassifier;
use nudge_core::{Classifier, ConditionScope, EngineConfig, EngineHandle, LlmClassifier, NotificationEngine};
use nudge_llm::LlmFactory;

mod commands;
mod render;

use commands::{parse_line, ConditionOp, DemoCommand, HELP, ROOMS};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // stdout belongs to the demo; logs go to stderr
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()))
        .init();

    let config = EngineConfig::from_env();
    let classifier = build_classifier()?;
    tracing::info!(classifier = classifier.name(), "Starting nudge demo");

    let (engine, task) = NotificationEngine::spawn(config, classifier)?;
    for (id, name) in ROOMS {
        engine.register_conversation(id, name).await?;
    }
    engine.power_on().await?;

    let mut events = engine.subscribe();
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            if let Some(line) = render::event_line(&event) {
                println!("{}", line);
            }
        }
    });

    println!("nudge demo. Type a message, or /help.");
    let mut surface_on = true;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("! {}", e);
                continue;
            }
        };
        if command == DemoCommand::Quit {
            break;
        }
        if let Err(e) = run(&engine, command, &mut surface_on).await {
            println!("! {:#}", e);
        }
    }

    engine.shutdown().await?;
    task.await.context("engine task failed")?;
    Ok(())
}

fn build_classifier() -> Result<Arc<dyn Classifier>> {
    let mode = std::env::var("NUDGE_DEMO_CLASSIFIER").unwrap_or_else(|_| "http".to_string());
    match mode.as_str() {
        "http" => Ok(Arc::new(HttpClassifier::from_env()?)),
        "direct" => Ok(Arc::new(LlmClassifier::new(LlmFactory::from_env()?))),
        other => bail!("NUDGE_DEMO_CLASSIFIER must be http or direct, got '{}'", other),
    }
}

async fn run(engine: &EngineHandle, command: DemoCommand, surface_on: &mut bool) -> Result<()> {
    match command {
        DemoCommand::Send { room, text } => {
            engine.receive_message(room, text).await?;
        }
        DemoCommand::Open(room) => {
            let read = engine.open_conversation(room.as_str()).await?;
            println!("opened {} ({} read)", room, read);
        }
        DemoCommand::Recheck(room) => {
            let dispatch = engine.reevaluate_conversation(room.as_str()).await?;
            println!("recheck {}: {:?}", room, dispatch);
        }
        DemoCommand::Power => {
            if *surface_on {
                let cleared = engine.power_off().await?;
                println!("screen off ({} notifications cleared)", cleared);
            } else {
                engine.power_on().await?;
                println!("screen on");
            }
            *surface_on = !*surface_on;
        }
        DemoCommand::Activate(n) => {
            let id = visible(engine, n).await?;
            let room = engine.activate_notification(id).await?;
            println!("opened {}", room);
        }
        DemoCommand::Dismiss(n) => {
            let id = visible(engine, n).await?;
            engine.dismiss_notification(id).await?;
        }
        DemoCommand::Condition { scope, op } => condition(engine, scope, op).await?,
        DemoCommand::Sensitivity { scope, value } => {
            let sensitivity = engine.set_sensitivity(scope, value).await?;
            println!("sensitivity {}", sensitivity);
        }
        DemoCommand::General(enabled) => {
            engine.set_general_enabled(commands::MAIN_ROOM, enabled).await?;
        }
        DemoCommand::Matching { scope, enabled } => {
            engine.set_condition_matching(scope, enabled).await?;
        }
        DemoCommand::Status(room) => {
            let s = engine.conversation_snapshot(room).await?;
            println!(
                "{} ({}): {} unread, last {:?}, general {}, matching {}, sensitivity {}, {} conditions, notified {:?}, {} in flight",
                s.name,
                s.id,
                s.unread_count,
                s.last_message.unwrap_or_default(),
                s.general_enabled,
                s.condition_matching_enabled,
                s.sensitivity,
                s.conditions.len(),
                s.notified_topics,
                s.classifications_in_flight,
            );
            for (i, n) in engine.active_notifications().await?.iter().enumerate() {
                println!("  [{}] {}", i + 1, render::banner(n));
            }
        }
        DemoCommand::Rooms => {
            for (id, name) in ROOMS {
                println!("  {:8} {}", id, name);
            }
        }
        DemoCommand::Help => println!("{}", HELP),
        DemoCommand::Quit => {}
    }
    Ok(())
}

async fn condition(engine: &EngineHandle, scope: ConditionScope, op: ConditionOp) -> Result<()> {
    match op {
        ConditionOp::Add(text) => {
            let condition = engine.add_condition(scope, text).await?;
            println!("added '{}'", condition.text());
        }
        ConditionOp::Remove(n) => {
            let id = condition_at(engine, &scope, n).await?;
            let removed = engine.remove_condition(scope, id).await?;
            println!("removed '{}'", removed.text());
        }
        ConditionOp::Edit(n, text) => {
            let id = condition_at(engine, &scope, n).await?;
            let condition = engine.replace_condition(scope, id, text).await?;
            println!("now '{}'", condition.text());
        }
        ConditionOp::List => {
            for (i, c) in engine.list_conditions(scope).await?.iter().enumerate() {
                println!("  [{}] {}", i + 1, c.text());
            }
        }
    }
    Ok(())
}

async fn condition_at(
    engine: &EngineHandle,
    scope: &ConditionScope,
    n: usize,
) -> Result<nudge_core::ConditionId> {
    let conditions = engine.list_conditions(scope.clone()).await?;
    conditions
        .get(n - 1)
        .map(|c| c.id.clone())
        .with_context(|| format!("no condition at position {}", n))
}

async fn visible(engine: &EngineHandle, n: usize) -> Result<nudge_core::NotificationId> {
    let active = engine.active_notifications().await?;
    active
        .get(n - 1)
        .map(|notification| notification.id)
        .with_context(|| format!("no notification at position {}", n))
}
