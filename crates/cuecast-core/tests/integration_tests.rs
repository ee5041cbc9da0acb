//! Integration tests for Cuecast Core

use cuecast_core::{
    Error, LifecycleState, MetadataEntry, MetadataLog, MetadataView, PlaybackErrorInfo,
    PlayerConfig, PlayerEvent, PlayerEventKind, PlayerLifecycleManager, PlayerSdk, Result,
    ScriptLoader, ScriptedLoader, ScriptedSdk, SdkLoader, VisibilityGate,
};
use std::cell::RefCell;
use std::rc::Rc;
use tokio::sync::oneshot;
use tokio_test::{assert_pending, assert_ready};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

fn recording_manager(config: PlayerConfig) -> (PlayerLifecycleManager, Rc<RefCell<Vec<String>>>) {
    let ids = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&ids);
    let manager =
        PlayerLifecycleManager::new(config, move |id| sink.borrow_mut().push(id.to_string()))
            .expect("valid config");
    (manager, ids)
}

// =============================================================================
// Initialization
// =============================================================================

#[tokio::test]
async fn test_initialize_reaches_playing() {
    init_tracing();
    let sdk = ScriptedSdk::new();
    let loader = SdkLoader::new(ScriptedLoader::new(sdk.clone()));
    let config = PlayerConfig::default()
        .with_stream_url("https://cdn.example.com/channel.m3u8")
        .unwrap();
    let (manager, _) = recording_manager(config);

    manager.initialize(&loader).await.unwrap();

    assert_eq!(manager.state(), LifecycleState::Playing);
    assert!(manager.player_created());
    let player = sdk.last_player().unwrap();
    for kind in PlayerEventKind::ALL {
        assert_eq!(player.listener_count(kind), 1, "listener for {kind}");
    }
    assert_eq!(
        player.record().loaded[0].as_str(),
        "https://cdn.example.com/channel.m3u8"
    );
}

#[tokio::test]
async fn test_initialize_twice_creates_one_player() {
    let sdk = ScriptedSdk::new();
    let scripted = ScriptedLoader::new(sdk.clone());
    let loads = scripted.load_count();
    let loader = SdkLoader::new(scripted);
    let (manager, _) = recording_manager(PlayerConfig::default());

    manager.initialize(&loader).await.unwrap();
    manager.initialize(&loader).await.unwrap();
    manager.initialize_with_sdk(&sdk).unwrap();

    assert_eq!(sdk.created(), 1);
    assert_eq!(loads.get(), 1);
    assert_eq!(manager.state(), LifecycleState::Playing);
}

#[tokio::test]
async fn test_unsupported_environment() {
    let sdk = ScriptedSdk::unsupported();
    let loader = SdkLoader::new(ScriptedLoader::new(sdk.clone()));
    let (manager, ids) = recording_manager(PlayerConfig::default());

    assert!(manager.initialize(&loader).await.is_ok());

    assert_eq!(manager.state(), LifecycleState::Unsupported);
    assert_eq!(sdk.created(), 0);
    assert!(!manager.player_created());

    // No player, so nothing can ever reach the log through events
    assert!(manager.snapshot().is_empty());
    assert!(ids.borrow().is_empty());
}

#[tokio::test]
async fn test_load_failure_is_explicit_state() {
    let loader = SdkLoader::new(ScriptedLoader::failing("script blocked"));
    let (manager, _) = recording_manager(PlayerConfig::default());

    let result = manager.initialize(&loader).await;

    assert!(matches!(result, Err(Error::LoadFailure(ref reason)) if reason == "script blocked"));
    assert_eq!(manager.state(), LifecycleState::LoadFailed);
    assert!(!manager.player_created());
}

#[test]
fn test_sdk_command_failure_keeps_player_for_release() {
    let sdk = ScriptedSdk::new().with_failing_load();
    let (manager, _) = recording_manager(PlayerConfig::default());

    assert!(matches!(manager.initialize_with_sdk(&sdk), Err(Error::Sdk(_))));
    assert_eq!(manager.state(), LifecycleState::Bound);
    assert!(manager.player_created());

    manager.teardown();
    assert!(sdk.last_player().unwrap().record().deleted);
}

/// Loader that stays pending until released
struct GatedLoader {
    gate: RefCell<Option<oneshot::Receiver<()>>>,
    sdk: ScriptedSdk,
}

#[async_trait::async_trait(?Send)]
impl ScriptLoader for GatedLoader {
    async fn load(&self) -> Result<Rc<dyn PlayerSdk>> {
        let gate = self.gate.borrow_mut().take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }
        Ok(Rc::new(self.sdk.clone()))
    }
}

#[test]
fn test_teardown_while_loading_skips_player() {
    let (release, gate) = oneshot::channel();
    let sdk = ScriptedSdk::new();
    let loader = SdkLoader::new(GatedLoader {
        gate: RefCell::new(Some(gate)),
        sdk: sdk.clone(),
    });
    let (manager, _) = recording_manager(PlayerConfig::default());

    let mut init = tokio_test::task::spawn(manager.initialize(&loader));
    assert_pending!(init.poll());
    assert_eq!(manager.state(), LifecycleState::Unloaded);

    manager.teardown();
    release.send(()).unwrap();

    assert!(init.is_woken());
    let result = assert_ready!(init.poll());
    assert!(result.is_ok());
    assert_eq!(sdk.created(), 0);
    assert_eq!(manager.state(), LifecycleState::TornDown);
}

// =============================================================================
// Metadata cues
// =============================================================================

#[test]
fn test_cue_scenario_with_capacity_three() {
    let sdk = ScriptedSdk::new();
    let (manager, ids) = recording_manager(PlayerConfig::default().with_metadata_capacity(3));
    manager.initialize_with_sdk(&sdk).unwrap();
    let player = sdk.last_player().unwrap();

    for (id, at) in [("A", 1.00), ("B", 2.50), ("C", 4.00), ("D", 5.25)] {
        player.set_position(at);
        player.emit(PlayerEvent::cue(format!(r#"{{"productId":"{id}"}}"#)));
    }

    assert_eq!(
        manager.snapshot(),
        vec![
            MetadataEntry::new("D", 5.25),
            MetadataEntry::new("C", 4.00),
            MetadataEntry::new("B", 2.50),
        ]
    );
    assert_eq!(*ids.borrow(), vec!["A", "B", "C", "D"]);
}

#[test]
fn test_default_capacity_is_ten() {
    let sdk = ScriptedSdk::new();
    let (manager, _) = recording_manager(PlayerConfig::default());
    manager.initialize_with_sdk(&sdk).unwrap();
    let player = sdk.last_player().unwrap();

    for n in 0..12 {
        player.set_position(n as f64);
        player.emit(PlayerEvent::cue(format!(r#"{{"productId":"p{n}"}}"#)));
    }

    let snapshot = manager.snapshot();
    assert_eq!(snapshot.len(), 10);
    assert_eq!(snapshot[0].product_id, "p11");
    assert_eq!(snapshot[9].product_id, "p2");
}

#[test]
fn test_malformed_payload_changes_nothing() {
    let sdk = ScriptedSdk::new();
    let (manager, ids) = recording_manager(PlayerConfig::default());
    manager.initialize_with_sdk(&sdk).unwrap();
    let player = sdk.last_player().unwrap();

    player.emit(PlayerEvent::cue(r#"{"productId":"ok"}"#));
    player.emit(PlayerEvent::cue("<xml/>"));
    player.emit(PlayerEvent::cue(r#"{"productId":null}"#));

    assert_eq!(manager.snapshot().len(), 1);
    assert_eq!(*ids.borrow(), vec!["ok"]);
    assert_eq!(manager.stats().cues_rejected, 2);
    assert_eq!(manager.state(), LifecycleState::Playing);
}

#[test]
fn test_callback_runs_before_buffering() {
    let sdk = ScriptedSdk::new();
    let seen_len = Rc::new(RefCell::new(Vec::new()));
    let manager_slot: Rc<RefCell<Option<Rc<PlayerLifecycleManager>>>> =
        Rc::new(RefCell::new(None));

    let slot = Rc::clone(&manager_slot);
    let lens = Rc::clone(&seen_len);
    let manager = Rc::new(
        PlayerLifecycleManager::new(PlayerConfig::default(), move |_| {
            if let Some(manager) = slot.borrow().as_ref() {
                lens.borrow_mut().push(manager.snapshot().len());
            }
        })
        .unwrap(),
    );
    *manager_slot.borrow_mut() = Some(Rc::clone(&manager));

    manager.initialize_with_sdk(&sdk).unwrap();
    let player = sdk.last_player().unwrap();
    player.emit(PlayerEvent::cue(r#"{"productId":"1"}"#));
    player.emit(PlayerEvent::cue(r#"{"productId":"2"}"#));

    assert_eq!(*seen_len.borrow(), vec![0, 1]);
    assert_eq!(manager.snapshot().len(), 2);

    manager_slot.borrow_mut().take();
}

#[test]
fn test_error_events_do_not_transition() {
    let sdk = ScriptedSdk::new();
    let (manager, _) = recording_manager(PlayerConfig::default());
    manager.initialize_with_sdk(&sdk).unwrap();
    let player = sdk.last_player().unwrap();

    for _ in 0..3 {
        player.emit(PlayerEvent::Error(PlaybackErrorInfo {
            code: Some(-1),
            kind: None,
            message: "decode".into(),
        }));
    }
    player.emit(PlayerEvent::cue(r#"{"productId":"still-works"}"#));

    assert_eq!(manager.stats().errors, 3);
    assert_eq!(manager.state(), LifecycleState::Playing);
    assert_eq!(manager.snapshot()[0].product_id, "still-works");
}

// =============================================================================
// Teardown
// =============================================================================

#[test]
fn test_late_events_after_teardown_are_noops() {
    let sdk = ScriptedSdk::new();
    let (manager, ids) = recording_manager(PlayerConfig::default());
    manager.initialize_with_sdk(&sdk).unwrap();
    let player = sdk.last_player().unwrap();
    player.emit(PlayerEvent::cue(r#"{"productId":"before"}"#));

    manager.teardown();

    // Direct calls on the manager after unmount are rejected as well
    assert!(matches!(
        manager.on_metadata_cue(r#"{"productId":"after"}"#),
        Err(Error::NotMounted)
    ));
    manager.handle_event(PlayerEvent::Ready);

    assert_eq!(*ids.borrow(), vec!["before"]);
    assert!(manager.snapshot().is_empty());
    assert_eq!(manager.stats().late_events, 2);
    assert!(player.record().deleted);
}

#[test]
fn test_handlers_outliving_manager_are_inert() {
    let sdk = ScriptedSdk::new();
    let ids = Rc::new(RefCell::new(Vec::<String>::new()));
    let sink = Rc::clone(&ids);
    let manager = PlayerLifecycleManager::new(PlayerConfig::default(), move |id| {
        sink.borrow_mut().push(id.to_string())
    })
    .unwrap();
    manager.initialize_with_sdk(&sdk).unwrap();
    let player = sdk.last_player().unwrap();

    drop(manager);
    player.emit(PlayerEvent::cue(r#"{"productId":"ghost"}"#));

    assert!(ids.borrow().is_empty());
    assert!(player.record().deleted);
}

// =============================================================================
// Hover gating
// =============================================================================

#[test]
fn test_hover_gates_rendering_only() {
    let sdk = ScriptedSdk::new();
    let (manager, _) = recording_manager(PlayerConfig::default());
    manager.initialize_with_sdk(&sdk).unwrap();
    let player = sdk.last_player().unwrap();
    player.set_position(1.0);
    player.emit(PlayerEvent::cue(r#"{"productId":"A"}"#));
    player.set_position(2.0);
    player.emit(PlayerEvent::cue(r#"{"productId":"B"}"#));

    let mut gate = VisibilityGate::new();
    let render = |gate: &VisibilityGate| {
        manager
            .with_log(|log: &MetadataLog| MetadataView::render(gate, log))
            .unwrap_or_default()
    };

    assert!(render(&gate).is_empty());
    gate.activate();
    assert_eq!(
        render(&gate),
        vec!["productId: B (2.00s)", "productId: A (1.00s)"]
    );
    gate.deactivate();
    assert!(render(&gate).is_empty());

    assert_eq!(manager.snapshot().len(), 2);
}
