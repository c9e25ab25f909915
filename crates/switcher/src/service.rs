//! Single-writer switching service.
//!
//! Every context change, input source change, shortcut and system event is
//! funneled through one bounded queue and applied in order by
//! [`SwitchingService::handle`]. Nothing else mutates the state.

use crate::action::{Action, Command, SystemEvent};
use crate::error::{Result, SwitcherError};
use crate::punctuation::PunctuationControl;
use crate::reducer::{reduce, Resolved};
use crate::sender::ActionSender;
use crate::state::{ChangeReason, State};
use keyshift_context::{AppKind, ContextTracker};
use keyshift_events::{
    emit_event, event_names, EventBusRef, PermissionDeniedEvent, PunctuationStatusEvent,
    StateChangedEvent,
};
use keyshift_input::{should_enable_for_app, InputError};
use keyshift_input_source::InputSourceTracker;
use keyshift_rules::Resolver;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Default capacity of the action queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

pub struct SwitchingService {
    state: State,
    last_published: Option<State>,
    resolver: Resolver,
    input_sources: Arc<dyn InputSourceTracker>,
    context: Arc<dyn ContextTracker>,
    punctuation: Arc<dyn PunctuationControl>,
    bus: EventBusRef,
    rx: mpsc::Receiver<Command>,
}

impl SwitchingService {
    /// Build the service and the sender that feeds it.
    ///
    /// The initial state is the tracker's current input source, or the
    /// first installed one if it cannot be read.
    pub fn new(
        resolver: Resolver,
        input_sources: Arc<dyn InputSourceTracker>,
        context: Arc<dyn ContextTracker>,
        punctuation: Arc<dyn PunctuationControl>,
        bus: EventBusRef,
        capacity: usize,
    ) -> Result<(Self, ActionSender)> {
        let current = match input_sources.current() {
            Ok(source) => source,
            Err(e) => {
                tracing::warn!(error = %e, "Cannot read current input source");
                input_sources
                    .list()
                    .into_iter()
                    .next()
                    .ok_or(SwitcherError::NoInputSource)?
            }
        };

        let (tx, rx) = mpsc::channel(capacity.max(1));
        let service = Self {
            state: State::initial(current),
            last_published: None,
            resolver,
            input_sources,
            context,
            punctuation,
            bus,
            rx,
        };
        Ok((service, ActionSender::new(tx)))
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Process commands until every sender is dropped.
    ///
    /// Handling a command blocks on input source selection and tap
    /// installation, so the loop runs on the blocking pool.
    pub async fn run(self) {
        if let Err(e) = tokio::task::spawn_blocking(move || self.run_blocking()).await {
            tracing::error!(error = %e, "Switching service panicked");
        }
    }

    /// Process commands on the calling thread until every sender is dropped.
    ///
    /// Must not be called from inside the async runtime.
    pub fn run_blocking(mut self) {
        tracing::info!(source = %self.state.input_source.id, "Switching service started");
        while let Some(command) = self.rx.blocking_recv() {
            self.handle(command);
        }
        self.punctuation.disable();
        tracing::info!("Switching service stopped");
    }

    /// Apply one command. Returns the state published for it, if any.
    pub fn handle(&mut self, command: Command) -> Option<State> {
        match command {
            Command::Action(action) => self.apply(action),
            Command::System(event) => self.dispatch_system(event),
        }
    }

    fn apply(&mut self, action: Action) -> Option<State> {
        tracing::debug!(?action, "Applying action");

        if action == Action::Start {
            // Baseline for deduplication; nothing is published
            self.last_published.get_or_insert_with(|| self.state.clone());
            return None;
        }

        let resolved = match &action {
            Action::AppChanged(kind) => self.resolve(kind),
            _ => None,
        };

        let mut reduction = reduce(&self.state, &action, resolved);

        if let Some(target) = reduction.select.take() {
            if let Err(e) = self.input_sources.select(&target) {
                tracing::warn!(source = %target.id, error = %e, "Failed to select input source");
                reduction = match &action {
                    // Fall back to "no override" for the app
                    Action::AppChanged(_) => reduce(&self.state, &action, None),
                    _ => return None,
                };
            }
        }

        let next = reduction.next?;
        self.state = next.clone();
        self.publish(next)
    }

    /// Rule/cache/default answer for `kind`, if the source is installed.
    fn resolve(&self, kind: &AppKind) -> Option<Resolved> {
        let resolution = self.resolver.resolve(kind)?;
        match self.input_sources.find(&resolution.input_source_id) {
            Some(input_source) => Some(Resolved {
                input_source,
                source: resolution.source,
            }),
            None => {
                tracing::debug!(
                    app = %kind.bundle_id(),
                    source = %resolution.input_source_id,
                    "Resolved input source not installed"
                );
                None
            }
        }
    }

    fn publish(&mut self, state: State) -> Option<State> {
        let duplicate = self
            .last_published
            .as_ref()
            .is_some_and(|last| last.is_same(&state));

        if duplicate && state.reason != ChangeReason::Shortcut {
            tracing::trace!("State unchanged, not publishing");
            return None;
        }

        let rule = state
            .app
            .as_ref()
            .and_then(|kind| self.resolver.rule_for(kind.bundle_id()));

        // A re-asserted shortcut is still published but has nothing new to record
        if !duplicate {
            if let Some(kind) = &state.app {
                self.resolver.cache_mut().write(kind, &state.input_source);
            }
            self.toggle_punctuation(&state, should_enable_for_app(rule.as_ref()));
        }

        let event = StateChangedEvent {
            app: state.app.as_ref().map(|k| k.bundle_id().to_string()),
            website: state.app.as_ref().and_then(|k| k.host.clone()),
            input_source_id: state.input_source.id.clone(),
            input_source_name: state.input_source.name.clone(),
            is_cjkv: state.input_source.is_cjkv,
            reason: state.reason.as_str().to_string(),
            hide_indicator: rule.is_some_and(|r| r.hide_indicator),
            ts_ms: chrono::Utc::now().timestamp_millis(),
        };
        emit_event(self.bus.as_ref(), event_names::STATE_CHANGED, &event);

        tracing::debug!(
            app = ?event.app,
            source = %state.input_source.id,
            reason = state.reason.as_str(),
            "Published state"
        );
        self.last_published = Some(state.clone());
        Some(state)
    }

    fn toggle_punctuation(&self, state: &State, enable: bool) {
        let was_active = self.punctuation.is_active();

        if enable {
            if let Err(e) = self.punctuation.enable() {
                tracing::warn!(error = %e, "Punctuation substitution unavailable");
                if matches!(e, InputError::PermissionDenied | InputError::TapCreation(_)) {
                    emit_event(
                        self.bus.as_ref(),
                        event_names::PERMISSION_DENIED,
                        &PermissionDeniedEvent {
                            permission: "input_monitoring".to_string(),
                            message: e.to_string(),
                        },
                    );
                }
            }
        } else {
            self.punctuation.disable();
        }

        let active = self.punctuation.is_active();
        if active != was_active {
            emit_event(
                self.bus.as_ref(),
                event_names::PUNCTUATION_STATUS,
                &PunctuationStatusEvent {
                    active,
                    app: state.app.as_ref().map(|k| k.bundle_id().to_string()),
                },
            );
        }
    }

    fn dispatch_system(&mut self, event: SystemEvent) -> Option<State> {
        match event {
            SystemEvent::AppTerminated(bundle_id) => {
                let removed = self.resolver.cache_mut().remove(&bundle_id);
                tracing::debug!(app = %bundle_id, removed, "App terminated, cache pruned");
                None
            }
            SystemEvent::PreferencesChanged(preferences) => {
                if self.resolver.set_preferences(preferences) {
                    tracing::info!("Restore previous disabled, app cache cleared");
                }
                None
            }
            SystemEvent::ScreenUnlocked | SystemEvent::SessionActivated => {
                let kind = self.context.current()?;
                tracing::debug!(app = %kind.bundle_id(), ?event, "Re-asserting focused app");
                self.apply(Action::AppChanged(kind))
            }
            SystemEvent::InputSourcesChanged => {
                tracing::info!(
                    installed = self.input_sources.list().len(),
                    "Installed input sources changed"
                );
                None
            }
        }
    }
}
