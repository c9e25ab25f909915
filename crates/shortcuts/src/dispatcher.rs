//! Maps triggered shortcuts to the input source they select.

use crate::chord::Shortcut;
use crate::error::{Result, ShortcutError};
use crate::group::InputSourceGroup;
use crate::listener::{start_chord_listener, ChordListenerHandle};
use keyshift_input_source::{InputSource, InputSourceTracker};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// What a shortcut switches to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShortcutTarget {
    InputSource { id: String },
    Group { name: String },
}

/// Shortcut as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutBinding {
    pub keys: Vec<String>,
    pub target: ShortcutTarget,
}

/// Callback receiving the input source a shortcut resolved to.
pub type TriggerCallback = Arc<dyn Fn(InputSource) + Send + Sync>;

pub struct ShortcutDispatcher {
    tracker: Arc<dyn InputSourceTracker>,
    groups: HashMap<String, InputSourceGroup>,
    bindings: Vec<(Shortcut, ShortcutTarget)>,
}

impl ShortcutDispatcher {
    pub fn new(tracker: Arc<dyn InputSourceTracker>) -> Self {
        Self {
            tracker,
            groups: HashMap::new(),
            bindings: Vec::new(),
        }
    }

    pub fn add_group(&mut self, group: InputSourceGroup) {
        self.groups.insert(group.name.clone(), group);
    }

    pub fn bind(&mut self, shortcut: Shortcut, target: ShortcutTarget) {
        self.bindings.push((shortcut, target));
    }

    /// Parse and add a configured binding.
    pub fn bind_config(&mut self, binding: &ShortcutBinding) -> Result<()> {
        let shortcut = Shortcut::from_names(&binding.keys)?;
        if let ShortcutTarget::Group { name } = &binding.target {
            if !self.groups.contains_key(name) {
                return Err(ShortcutError::UnknownGroup(name.clone()));
            }
        }
        self.bind(shortcut, binding.target.clone());
        Ok(())
    }

    pub fn bindings(&self) -> &[(Shortcut, ShortcutTarget)] {
        &self.bindings
    }

    /// The input source a trigger of `target` selects right now.
    pub fn resolve(&self, target: &ShortcutTarget) -> Result<InputSource> {
        match target {
            ShortcutTarget::InputSource { id } => self
                .tracker
                .find(id)
                .ok_or_else(|| ShortcutError::NotInstalled(id.clone())),
            ShortcutTarget::Group { name } => {
                let group = self
                    .groups
                    .get(name)
                    .ok_or_else(|| ShortcutError::UnknownGroup(name.clone()))?;
                let installed = self.tracker.list();
                let current = self.tracker.current().ok();
                let next = group
                    .next_after(current.as_ref().map(|s| s.id.as_str()), |id| {
                        installed.iter().any(|s| s.id == id)
                    })
                    .ok_or_else(|| ShortcutError::EmptyGroup(name.clone()))?;
                installed
                    .into_iter()
                    .find(|s| s.id == next)
                    .ok_or_else(|| ShortcutError::NotInstalled(next.to_string()))
            }
        }
    }

    /// Resolve binding `index` and hand the result to `on_trigger`.
    pub fn trigger(&self, index: usize, on_trigger: &TriggerCallback) {
        let Some((shortcut, target)) = self.bindings.get(index) else {
            return;
        };
        match self.resolve(target) {
            Ok(source) => {
                tracing::debug!(%shortcut, source = %source.id, "Shortcut triggered");
                on_trigger(source);
            }
            Err(e) => tracing::warn!(%shortcut, error = %e, "Shortcut target unavailable"),
        }
    }

    /// Listen for every bound chord and forward triggered input sources.
    pub fn start(self: Arc<Self>, on_trigger: TriggerCallback) -> ChordListenerHandle {
        let shortcuts: Vec<Shortcut> = self.bindings.iter().map(|(s, _)| s.clone()).collect();
        tracing::info!(count = shortcuts.len(), "Starting shortcut listener");
        start_chord_listener(shortcuts, move |index| self.trigger(index, &on_trigger))
    }
}
