//! Integration tests for the storage crate.
//!
//! Uses in-memory SQLite for fast, isolated tests.

use keyshift_rules::{
    AppRule, AppRuleStore, PreferenceRepository, Preferences, RestoreStrategy,
};
use keyshift_storage::{Database, StorageError};

fn create_test_db() -> Database {
    Database::open_in_memory().expect("Failed to create in-memory database")
}

fn terminal_rule() -> AppRule {
    let mut rule = AppRule::new("com.apple.Terminal").forcing("com.apple.keylayout.ABC");
    rule.hide_indicator = true;
    rule
}

// =============================================================================
// Database Initialization Tests
// =============================================================================

mod initialization {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory();
        assert!(db.is_ok(), "Should create in-memory database");
    }

    #[test]
    fn test_open_file_database() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("keyshift.db");

        let db = Database::open(&db_path);
        assert!(db.is_ok(), "Should create file-based database");
        assert!(db_path.exists(), "Database file should exist");
    }

    #[test]
    fn test_reopen_preserves_rules() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("keyshift.db");

        {
            let db = Database::open(&db_path).unwrap();
            db.save_rule(&terminal_rule()).unwrap();
        }

        let db = Database::open(&db_path).unwrap();
        assert_eq!(
            db.rule_for("com.apple.Terminal").unwrap(),
            Some(terminal_rule())
        );
    }

    #[test]
    fn test_open_invalid_path_fails() {
        let result = Database::open(std::path::Path::new("/nonexistent/dir/keyshift.db"));
        assert!(matches!(result, Err(StorageError::DatabaseError(_))));
    }
}

// =============================================================================
// Rule Store Tests
// =============================================================================

mod rules {
    use super::*;

    #[test]
    fn test_missing_rule_is_none() {
        let db = create_test_db();
        assert_eq!(db.rule_for("com.apple.Notes").unwrap(), None);
    }

    #[test]
    fn test_save_and_get_rule() {
        let db = create_test_db();
        db.save_rule(&terminal_rule()).unwrap();

        let rule = db.rule_for("com.apple.Terminal").unwrap().unwrap();
        assert_eq!(rule.forced_input_source_id.as_deref(), Some("com.apple.keylayout.ABC"));
        assert!(rule.hide_indicator);
        assert!(!rule.force_english_punctuation);
    }

    #[test]
    fn test_save_replaces_rule() {
        let db = create_test_db();
        db.save_rule(&terminal_rule()).unwrap();
        db.save_rule(&AppRule::new("com.apple.Terminal").with_english_punctuation())
            .unwrap();

        let rule = db.rule_for("com.apple.Terminal").unwrap().unwrap();
        assert_eq!(rule.forced_input_source_id, None);
        assert!(rule.force_english_punctuation);
        assert_eq!(db.list_rules().unwrap().len(), 1);
    }

    #[test]
    fn test_list_rules_sorted_by_bundle() {
        let db = create_test_db();
        db.save_rule(&AppRule::new("com.tinyspeck.slackmacgap")).unwrap();
        db.save_rule(&AppRule::new("com.apple.Notes")).unwrap();

        let ids: Vec<String> = db
            .list_rules()
            .unwrap()
            .into_iter()
            .map(|r| r.bundle_id)
            .collect();
        assert_eq!(ids, vec!["com.apple.Notes", "com.tinyspeck.slackmacgap"]);
    }

    #[test]
    fn test_delete_rule() {
        let db = create_test_db();
        db.save_rule(&terminal_rule()).unwrap();
        db.delete_rule("com.apple.Terminal").unwrap();
        assert_eq!(db.rule_for("com.apple.Terminal").unwrap(), None);
    }

    #[test]
    fn test_delete_missing_rule_is_ok_through_store() {
        let db = create_test_db();
        assert!(db.delete_rule("com.apple.Notes").is_ok());
        assert!(matches!(
            db.remove_rule("com.apple.Notes"),
            Err(StorageError::NotFound(_))
        ));
    }
}

// =============================================================================
// Preferences Tests
// =============================================================================

mod preferences {
    use super::*;

    #[test]
    fn test_defaults_when_unset() {
        let db = create_test_db();
        assert_eq!(db.load_preferences().unwrap(), Preferences::default());
    }

    #[test]
    fn test_save_and_load() {
        let db = create_test_db();
        let prefs = Preferences {
            restore_strategy: RestoreStrategy::UseDefault,
            default_input_source_id: Some("com.apple.keylayout.ABC".to_string()),
        };

        db.save_preferences(&prefs).unwrap();
        assert_eq!(db.load_preferences().unwrap(), prefs);
    }

    #[test]
    fn test_malformed_preferences_fall_back() {
        let db = create_test_db();
        db.set_setting("preferences", "{not json").unwrap();
        assert_eq!(db.load_preferences().unwrap(), Preferences::default());
    }

    #[test]
    fn test_settings_roundtrip() {
        let db = create_test_db();
        assert_eq!(db.get_setting("missing").unwrap(), None);
        db.set_setting("k", "v1").unwrap();
        db.set_setting("k", "v2").unwrap();
        assert_eq!(db.get_setting("k").unwrap().as_deref(), Some("v2"));
    }
}
