use keyshift_context::{AppKind, ContextEvent, SystemNotification};
use keyshift_input_source::InputSource;
use keyshift_rules::Preferences;

/// Inputs to the switching reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Start,
    AppChanged(AppKind),
    InputSourceChanged(InputSource),
    SwitchByShortcut(InputSource),
}

/// OS and preference notifications that do not go through the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SystemEvent {
    AppTerminated(String),
    PreferencesChanged(Preferences),
    ScreenUnlocked,
    SessionActivated,
    /// The set of installed input sources changed.
    InputSourcesChanged,
}

/// Everything the single-writer queue carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Action(Action),
    System(SystemEvent),
}

impl From<Action> for Command {
    fn from(action: Action) -> Self {
        Command::Action(action)
    }
}

impl From<SystemEvent> for Command {
    fn from(event: SystemEvent) -> Self {
        Command::System(event)
    }
}

impl From<ContextEvent> for Command {
    fn from(event: ContextEvent) -> Self {
        match event {
            ContextEvent::Focused(kind) => Command::Action(Action::AppChanged(kind)),
            ContextEvent::Terminated(bundle_id) => {
                Command::System(SystemEvent::AppTerminated(bundle_id))
            }
        }
    }
}

impl From<SystemNotification> for Command {
    fn from(notification: SystemNotification) -> Self {
        Command::System(match notification {
            SystemNotification::ScreenUnlocked => SystemEvent::ScreenUnlocked,
            SystemNotification::SessionActivated => SystemEvent::SessionActivated,
            SystemNotification::InputSourcesChanged => SystemEvent::InputSourcesChanged,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyshift_context::AppInfo;

    #[test]
    fn test_context_events_become_commands() {
        let kind = AppKind::app(AppInfo::new("com.apple.Notes"));
        assert_eq!(
            Command::from(ContextEvent::Focused(kind.clone())),
            Command::Action(Action::AppChanged(kind))
        );
        assert_eq!(
            Command::from(ContextEvent::Terminated("com.apple.Notes".to_string())),
            Command::System(SystemEvent::AppTerminated("com.apple.Notes".to_string()))
        );
    }

    #[test]
    fn test_system_notifications_become_system_events() {
        assert_eq!(
            Command::from(SystemNotification::ScreenUnlocked),
            Command::System(SystemEvent::ScreenUnlocked)
        );
        assert_eq!(
            Command::from(SystemNotification::SessionActivated),
            Command::System(SystemEvent::SessionActivated)
        );
        assert_eq!(
            Command::from(SystemNotification::InputSourcesChanged),
            Command::System(SystemEvent::InputSourcesChanged)
        );
    }
}
