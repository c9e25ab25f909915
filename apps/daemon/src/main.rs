//! keyshift daemon.
//!
//! Wires the platform trackers, the punctuation engine and the shortcut
//! listener into one switching service, then runs until Ctrl-C. The main
//! thread owns the input source API and the system notification observers;
//! the service and signal handling run on a tokio runtime.

mod config;
mod main_loop;

use anyhow::Context;
use config::DaemonConfig;
use keyshift_context::platform::{PlatformProvider, SystemObserver};
use keyshift_context::{ContextEvent, ContextPoller, ContextTracker, SystemNotification};
use keyshift_events::{EventBusRef, TracingEventBus};
use keyshift_input::platform::{PlatformPermissionProbe, PlatformTapBackend};
use keyshift_input::{PermissionProbe, PunctuationEngine};
use keyshift_input_source::platform::PlatformTracker;
use keyshift_input_source::{
    shared_input_sources, InputSource, InputSourcePoller, InputSourceTracker, SharedInputSources,
};
use keyshift_rules::{PreferenceRepository, PreferenceWatcher, Preferences, Resolver};
use keyshift_shortcuts::{ChordListenerHandle, ShortcutDispatcher};
use keyshift_storage::Database;
use keyshift_switcher::{
    Action, ActionSender, Command, PunctuationControl, SwitchingService, SystemEvent,
};
use main_loop::MainLoop;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How long to wait for the service to drain its queue on shutdown.
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,keyshift=debug")),
        )
        .init();

    let config = DaemonConfig::load()?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("keyshift-worker")
        .build()
        .context("building async runtime")?;

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let db = Arc::new(Database::open(&config.database_path).context("opening database")?);
    let preferences = match db.load_preferences() {
        Ok(preferences) => preferences,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load preferences, using defaults");
            Preferences::default()
        }
    };
    tracing::info!(strategy = ?preferences.restore_strategy, "Preferences loaded");

    let (pump, shared) = shared_input_sources(platform_tracker());
    let main_loop = MainLoop::start(pump, config.input_source_pump_interval());
    let input_sources: Arc<dyn InputSourceTracker> = shared.clone();
    let context: Arc<dyn ContextTracker> = Arc::new(PlatformProvider::new());

    let probe: Arc<dyn PermissionProbe> = Arc::new(PlatformPermissionProbe::default());
    if config.prompt_for_permissions {
        let listen = probe.check_input_monitoring(true);
        let accessibility = probe.check_accessibility(true);
        tracing::info!(listen, accessibility, "Permission check");
    }

    let engine = Arc::new(PunctuationEngine::new(
        Box::new(PlatformTapBackend::default()),
        probe,
        Arc::clone(&input_sources),
    ));
    let punctuation: Arc<dyn PunctuationControl> = engine.clone();
    let bus: EventBusRef = Arc::new(TracingEventBus);

    let (service, sender) = SwitchingService::new(
        Resolver::new(db.clone(), preferences.clone()),
        Arc::clone(&input_sources),
        Arc::clone(&context),
        punctuation,
        bus,
        config.action_queue_capacity,
    )
    .context("starting switching service")?;
    let service = runtime.spawn(service.run());

    forward(&sender, Action::Start.into());

    let mut context_poller = ContextPoller::new();
    {
        let sender = sender.clone();
        context_poller.start_with_interval(
            Arc::clone(&context),
            Arc::new(move |event: ContextEvent| forward(&sender, Command::from(event))),
            config.context_poll_interval(),
        );
    }

    let mut input_source_poller = InputSourcePoller::new();
    {
        let sender = sender.clone();
        input_source_poller.start_with_interval(
            Arc::clone(&input_sources),
            Arc::new(move |source: InputSource| {
                forward(&sender, Action::InputSourceChanged(source).into())
            }),
            config.input_source_poll_interval(),
        );
    }

    let mut preference_watcher = PreferenceWatcher::new();
    {
        let sender = sender.clone();
        preference_watcher.start_with_interval(
            db.clone(),
            preferences,
            Arc::new(move |preferences: Preferences| {
                forward(&sender, SystemEvent::PreferencesChanged(preferences).into())
            }),
            config.preferences_poll_interval(),
        );
    }

    let observer = observe_system(&shared, &sender);
    let chords = start_shortcuts(&config, &input_sources, &sender);

    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = Arc::clone(&interrupted);
        runtime.spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for Ctrl-C");
            }
            interrupted.store(true, Ordering::SeqCst);
        });
    }

    tracing::info!("keyshift running, press Ctrl-C to quit");
    main_loop.run_until(&interrupted, None);
    tracing::info!("Shutting down");

    drop(observer);
    if let Some(chords) = &chords {
        chords.stop();
    }
    preference_watcher.stop();
    context_poller.stop();
    input_source_poller.stop();
    engine.disable();
    drop(chords);
    drop(sender);

    // Keep serving selections while the service drains its queue
    let stopped = Arc::new(AtomicBool::new(false));
    {
        let stopped = Arc::clone(&stopped);
        runtime.spawn(async move {
            if let Err(e) = service.await {
                tracing::warn!(error = %e, "Switching service task failed");
            }
            stopped.store(true, Ordering::SeqCst);
        });
    }
    if !main_loop.run_until(&stopped, Some(SHUTDOWN_TIMEOUT)) {
        tracing::warn!("Switching service did not stop in time");
    }

    runtime.shutdown_timeout(SHUTDOWN_TIMEOUT);
    Ok(())
}

/// Queue a command from a poller or listener thread.
fn forward(sender: &ActionSender, command: Command) {
    if let Err(e) = sender.blocking_send(command) {
        tracing::debug!(error = %e, "Dropping command");
    }
}

/// Forward unlock, session and input source notifications to the service.
///
/// Delivered on the main thread, which must never wait on the queue.
fn observe_system(shared: &Arc<SharedInputSources>, sender: &ActionSender) -> SystemObserver {
    let shared = Arc::clone(shared);
    let sender = sender.clone();
    SystemObserver::register(Arc::new(move |notification: SystemNotification| {
        tracing::debug!(?notification, "System notification");
        if notification == SystemNotification::InputSourcesChanged {
            shared.request_refresh();
        }
        if let Err(e) = sender.try_send(notification) {
            tracing::warn!(?notification, error = %e, "Dropping system notification");
        }
    }))
}

fn start_shortcuts(
    config: &DaemonConfig,
    input_sources: &Arc<dyn InputSourceTracker>,
    sender: &ActionSender,
) -> Option<ChordListenerHandle> {
    let mut dispatcher = ShortcutDispatcher::new(Arc::clone(input_sources));
    for group in &config.groups {
        dispatcher.add_group(group.clone());
    }
    for binding in &config.shortcuts {
        if let Err(e) = dispatcher.bind_config(binding) {
            tracing::warn!(keys = ?binding.keys, error = %e, "Ignoring shortcut");
        }
    }
    if dispatcher.bindings().is_empty() {
        return None;
    }

    let sender = sender.clone();
    Some(Arc::new(dispatcher).start(Arc::new(move |source: InputSource| {
        forward(&sender, Action::SwitchByShortcut(source).into())
    })))
}

#[cfg(target_os = "macos")]
fn platform_tracker() -> PlatformTracker {
    PlatformTracker::new()
}

#[cfg(not(target_os = "macos"))]
fn platform_tracker() -> PlatformTracker {
    tracing::warn!("No native input source backend, running against a fixed layout");
    PlatformTracker::new(vec![InputSource::new(
        "com.apple.keylayout.ABC",
        "ABC",
        false,
    )])
}
