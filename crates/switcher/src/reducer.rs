//! Pure transition function of the switching state machine.

use crate::action::Action;
use crate::state::{ChangeReason, State};
use keyshift_input_source::InputSource;
use keyshift_rules::ResolutionSource;

/// Effective input source resolved for an app, already checked as installed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub input_source: InputSource,
    pub source: ResolutionSource,
}

/// Outcome of one reduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reduction {
    /// Next state, or `None` when the action is a no-op.
    pub next: Option<State>,
    /// Input source the tracker must be told to select.
    pub select: Option<InputSource>,
}

impl Reduction {
    fn noop() -> Self {
        Self {
            next: None,
            select: None,
        }
    }
}

/// Apply `action` to `state`.
///
/// `resolved` is the rule/cache answer for the app of an `AppChanged`
/// action and is ignored for every other action.
pub fn reduce(state: &State, action: &Action, resolved: Option<Resolved>) -> Reduction {
    match action {
        Action::Start => Reduction::noop(),

        Action::AppChanged(kind) => match resolved {
            Some(resolved) => Reduction {
                next: Some(State {
                    app: Some(kind.clone()),
                    input_source: resolved.input_source.clone(),
                    reason: ChangeReason::AppSpecified(resolved.source),
                }),
                select: Some(resolved.input_source),
            },
            None => Reduction {
                next: Some(State {
                    app: Some(kind.clone()),
                    input_source: state.input_source.clone(),
                    reason: ChangeReason::NoChange,
                }),
                select: None,
            },
        },

        // Echo of our own select, or a repeat notification
        Action::InputSourceChanged(source) if source.id == state.input_source.id => {
            Reduction::noop()
        }
        Action::InputSourceChanged(source) => Reduction {
            next: Some(State {
                app: state.app.clone(),
                input_source: source.clone(),
                reason: ChangeReason::System,
            }),
            select: None,
        },

        Action::SwitchByShortcut(source) => Reduction {
            next: Some(State {
                app: state.app.clone(),
                input_source: source.clone(),
                reason: ChangeReason::Shortcut,
            }),
            select: Some(source.clone()),
        },
    }
}
