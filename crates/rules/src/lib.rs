//! Per-app switching rules for keyshift.
//!
//! Holds the domain types the switching service consults when focus moves:
//! user-defined [`AppRule`]s, global [`Preferences`], the ephemeral per-app
//! [`AppCache`], and the [`Resolver`] that folds them into one answer.
//! [`PreferenceWatcher`] picks up preferences saved by another process.

mod cache;
mod preferences;
mod resolver;
mod rule;
mod watcher;

pub use cache::{AppCache, CacheEntry};
pub use preferences::{PreferenceRepository, Preferences, RestoreStrategy};
pub use resolver::{Resolution, ResolutionSource, Resolver};
pub use rule::{AppRule, AppRuleStore, MemoryRuleStore, Result, RuleError};
pub use watcher::{PreferenceWatcher, PreferencesCallback, DEFAULT_WATCH_INTERVAL};
