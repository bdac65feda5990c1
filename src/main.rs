//! keyaction - load key-action bindings and replay input traces against them.

use anyhow::{Context, Result};
use clap::{Arg, ArgAction, Command};
use keyaction::config::{ActionLoader, Settings};
use keyaction::engine::{ActionContext, ActionExecutor, ExecutionRequest, NoTargets};
use keyaction::input::{parse_script, ScriptStep};
use keyaction::session::{feed_script, spawn_session, spawn_ticker, SessionEvent};
use keyaction::FormRef;
use log::info;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> Result<()> {
    let matches = Command::new("keyaction")
        .version(keyaction::VERSION)
        .about("Hold-duration key bindings for game actions and idles")
        .long_about(
            "keyaction loads key-action bindings from a directory of JSON files, \
             lists the resulting priority order and optionally replays a scripted \
             input trace through the dispatcher.",
        )
        .arg(
            Arg::new("settings")
                .long("settings")
                .value_name("FILE")
                .help("Settings file (defaults to <config dir>/keyaction/settings.toml)"),
        )
        .arg(
            Arg::new("actions-dir")
                .long("actions-dir")
                .value_name("DIR")
                .help("Directory of JSON action files, overriding the settings"),
        )
        .arg(
            Arg::new("forms")
                .long("forms")
                .value_name("FILE")
                .help("TOML form table, overriding the settings"),
        )
        .arg(
            Arg::new("script")
                .long("script")
                .value_name("FILE")
                .help("Input trace to replay"),
        )
        .arg(
            Arg::new("playback-ms")
                .long("playback-ms")
                .value_name("MS")
                .default_value("300")
                .value_parser(clap::value_parser!(u64))
                .help("Simulated time an action takes to complete"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .get_matches();

    let default_level = if matches.get_flag("verbose") {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    // paths inside the settings file are relative to it, command-line paths to the cwd
    let settings_path = matches.get_one::<String>("settings").map(PathBuf::from);
    let mut settings = Settings::load_or_default(settings_path.as_deref())
        .context("Failed to load settings")?;
    if let Some(dir) = matches.get_one::<String>("actions-dir") {
        settings.actions_dir = PathBuf::from(dir);
    }
    if let Some(forms) = matches.get_one::<String>("forms") {
        settings.forms_file = Some(PathBuf::from(forms));
    }

    let forms = settings.load_forms().context("Failed to load form table")?;

    let mut context = ActionContext::new().with_keyword_policy(settings.keyword_policy);
    let report = ActionLoader::new(&forms)
        .with_idle_table(settings.default_idle(), settings.default_object_count)
        .load_into(&settings.actions_dir, context.registry_mut())
        .with_context(|| format!("Failed to load {}", settings.actions_dir.display()))?;
    info!(
        "Loaded {} files, {} entries: {} added, {} rejected",
        report.files, report.entries, report.added, report.rejected
    );

    for (rank, action) in context.registry().iter().enumerate() {
        let form = action
            .action_or_idle
            .map(|form| form.to_string())
            .unwrap_or_default();
        println!(
            "{:>3}. priority {:>4}  keys {:?} pad {:?}  hold {:.2}s{}  -> {}",
            rank + 1,
            action.priority,
            action.keys,
            action.gamepad_keys,
            action.press_duration,
            if action.triggers_on_release {
                " on release"
            } else {
                ""
            },
            form
        );
    }

    let Some(script_path) = matches.get_one::<String>("script") else {
        return Ok(());
    };
    let script_path = PathBuf::from(script_path);
    let text = std::fs::read_to_string(&script_path)
        .with_context(|| format!("Failed to read {}", script_path.display()))?;
    let steps = parse_script(&text, &script_path)?;
    let playback = Duration::from_millis(*matches.get_one::<u64>("playback-ms").unwrap_or(&300));

    let context = replay(context, steps, settings.tick_interval(), playback).await?;
    info!(
        "Replay finished, {} keys still held",
        context.tracker().unfiltered_pressed_keys().len()
    );
    Ok(())
}

/// Pretends to play the requested form, completing after `playback`.
struct ReplayExecutor {
    completions: mpsc::UnboundedSender<FormRef>,
    playback: Duration,
}

impl ActionExecutor for ReplayExecutor {
    fn perform(&mut self, request: &ExecutionRequest) -> keyaction::Result<()> {
        let completions = self.completions.clone();
        let form = request.form;
        let playback = self.playback;
        tokio::spawn(async move {
            tokio::time::sleep(playback).await;
            let _ = completions.send(form);
        });
        Ok(())
    }
}

async fn replay(
    context: ActionContext,
    steps: Vec<ScriptStep>,
    tick_rate: Duration,
    playback: Duration,
) -> Result<ActionContext> {
    let (completions_tx, mut completions) = mpsc::unbounded_channel();
    let executor = ReplayExecutor {
        completions: completions_tx,
        playback,
    };
    let (handle, mut events, worker) = spawn_session(context, NoTargets, executor, 256);
    let ticker = spawn_ticker(handle.clone(), tick_rate);
    let feeder_handle = handle.clone();
    let mut feeder =
        tokio::spawn(async move { feed_script(&feeder_handle, steps, tick_rate).await });
    let mut feeding = true;

    loop {
        tokio::select! {
            Some(event) = events.recv() => report_event(&event),
            Some(form) = completions.recv() => {
                info!("{} completed", form);
                let _ = handle.action_completed().await;
            }
            fed = &mut feeder, if feeding => {
                feeding = false;
                fed.context("Input feeder panicked")??;
                ticker.abort();
                handle.shutdown().await?;
            }
            else => break,
        }
    }

    worker.await.context("Session worker panicked")
}

fn report_event(event: &SessionEvent) {
    match event {
        SessionEvent::Fired(fired) => println!(
            "fired {} via key {} after {:.2}s ({:?})",
            fired.request.form, fired.trigger, fired.held_for, fired.request.target
        ),
        SessionEvent::ExecutionFailed { fired, error } => {
            println!("failed {}: {}", fired.request.form, error)
        }
        SessionEvent::Reloaded { added } => println!("reloaded {} actions", added),
    }
}
