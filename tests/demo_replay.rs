#![cfg(feature = "config")]

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};

use keyaction::action::{AssociatedIdle, FormRef};
use keyaction::config::{ActionLoader, Settings};
use keyaction::engine::{
    ActionContext, ActionExecutor, ExecutionRequest, FiredAction, NoTargets, PairedTarget,
};
use keyaction::input::parse_script;
use keyaction::session::{feed_script, spawn_session, spawn_ticker, SessionEvent};
use keyaction::Result;

const EVENT_TIMEOUT: Duration = Duration::from_secs(2);
const TICK: Duration = Duration::from_millis(10);

#[derive(Clone, Default)]
struct RecordingExecutor {
    performed: Arc<Mutex<Vec<ExecutionRequest>>>,
}

impl ActionExecutor for RecordingExecutor {
    fn perform(&mut self, request: &ExecutionRequest) -> Result<()> {
        self.performed.lock().unwrap().push(*request);
        Ok(())
    }
}

fn demo_settings_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("demos")
        .join("settings.toml")
}

fn demo_context() -> ActionContext {
    let settings = Settings::load(&demo_settings_path()).unwrap();
    let forms = settings.load_forms().unwrap();
    let mut context = ActionContext::new().with_keyword_policy(settings.keyword_policy);
    let report = ActionLoader::new(&forms)
        .with_idle_table(settings.default_idle(), settings.default_object_count)
        .load_into(&settings.actions_dir, context.registry_mut())
        .unwrap();
    assert_eq!(report.added, 3);
    context
}

async fn next_fired(rx: &mut mpsc::Receiver<SessionEvent>) -> FiredAction {
    match timeout(EVENT_TIMEOUT, rx.recv())
        .await
        .expect("session event timed out")
        .expect("session channel closed unexpectedly")
    {
        SessionEvent::Fired(fired) => fired,
        other => panic!("unexpected event: {other:?}"),
    }
}

#[test]
fn demo_settings_resolve_next_to_the_settings_file() {
    let settings = Settings::load(&demo_settings_path()).unwrap();
    let demos = demo_settings_path().parent().unwrap().to_path_buf();

    assert_eq!(settings.actions_dir, demos.join("actions"));
    assert_eq!(settings.forms_file, Some(demos.join("forms.toml")));
    assert_eq!(settings.load_forms().unwrap().len(), 4);
}

#[test]
fn demo_actions_load_in_priority_order() {
    let context = demo_context();
    let priorities: Vec<_> = context.registry().iter().map(|a| a.priority).collect();
    assert_eq!(priorities, vec![5, 1, 0]);
}

#[tokio::test]
async fn trace_drives_release_and_held_actions() {
    let executor = RecordingExecutor::default();
    let (handle, mut events, worker) =
        spawn_session(demo_context(), NoTargets, executor.clone(), 64);
    let ticker = spawn_ticker(handle.clone(), TICK);

    let tap = parse_script("down 34\nwait 50\nup 34\n", Path::new("tap.txt")).unwrap();
    feed_script(&handle, tap, TICK).await.unwrap();

    let wave = next_fired(&mut events).await;
    assert_eq!(wave.request.form, FormRef::idle(0x1A8F2));
    assert_eq!(wave.trigger, 34);
    assert!(wave.action.triggers_on_release);

    handle.action_completed().await.unwrap();

    let hold = parse_script("down 35\nwait 300\nup 35\n", Path::new("hold.txt")).unwrap();
    feed_script(&handle, hold, TICK).await.unwrap();

    let hug = next_fired(&mut events).await;
    assert_eq!(hug.request.form, FormRef::action(0x13005));
    assert_eq!(hug.request.assoc_idle, Some(AssociatedIdle::ACTION_IDLE));
    assert_eq!(hug.request.target, PairedTarget::NotFound);
    assert!(hug.held_for >= 0.2);

    ticker.abort();
    handle.shutdown().await.unwrap();
    let context = worker.await.unwrap();
    assert!(context.tracker().unfiltered_pressed_keys().is_empty());
    assert_eq!(executor.performed.lock().unwrap().len(), 2);
}
