use keyshift_rules::{AppRule, AppRuleStore, PreferenceRepository, Preferences, RuleError};
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Mutex;

const PREFERENCES_KEY: &str = "preferences";

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),
    #[error("serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("not found: {0}")]
    NotFound(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl From<StorageError> for RuleError {
    fn from(e: StorageError) -> Self {
        RuleError::Backend(Box::new(e))
    }
}

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        tracing::debug!(path = %path.display(), "Opened rule database");
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Mutex::new(conn),
        };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS app_rules (
                bundle_id TEXT PRIMARY KEY,
                forced_input_source_id TEXT,
                do_restore_keyboard INTEGER NOT NULL DEFAULT 0,
                do_not_restore_keyboard INTEGER NOT NULL DEFAULT 0,
                hide_indicator INTEGER NOT NULL DEFAULT 0,
                force_english_punctuation INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS settings (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    pub fn get_rule(&self, bundle_id: &str) -> Result<Option<AppRule>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let rule = conn
            .query_row(
                "SELECT bundle_id, forced_input_source_id, do_restore_keyboard, do_not_restore_keyboard, hide_indicator, force_english_punctuation FROM app_rules WHERE bundle_id = ?1",
                [bundle_id],
                row_to_rule,
            )
            .optional()?;
        Ok(rule)
    }

    pub fn put_rule(&self, rule: &AppRule) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO app_rules (bundle_id, forced_input_source_id, do_restore_keyboard, do_not_restore_keyboard, hide_indicator, force_english_punctuation) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            (
                &rule.bundle_id,
                &rule.forced_input_source_id,
                rule.do_restore_keyboard,
                rule.do_not_restore_keyboard,
                rule.hide_indicator,
                rule.force_english_punctuation,
            ),
        )?;
        Ok(())
    }

    pub fn remove_rule(&self, bundle_id: &str) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let affected = conn.execute("DELETE FROM app_rules WHERE bundle_id = ?1", [bundle_id])?;
        if affected == 0 {
            return Err(StorageError::NotFound(format!("rule {bundle_id}")));
        }
        Ok(())
    }

    pub fn all_rules(&self) -> Result<Vec<AppRule>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let mut stmt = conn.prepare(
            "SELECT bundle_id, forced_input_source_id, do_restore_keyboard, do_not_restore_keyboard, hide_indicator, force_english_punctuation FROM app_rules ORDER BY bundle_id",
        )?;
        let rows = stmt.query_map([], row_to_rule)?;

        let mut rules = Vec::new();
        for row in rows {
            rules.push(row?);
        }
        Ok(rules)
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        let value = conn
            .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().expect("database mutex poisoned");
        conn.execute(
            "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
            (key, value),
        )?;
        Ok(())
    }
}

fn row_to_rule(row: &rusqlite::Row<'_>) -> rusqlite::Result<AppRule> {
    Ok(AppRule {
        bundle_id: row.get(0)?,
        forced_input_source_id: row.get(1)?,
        do_restore_keyboard: row.get(2)?,
        do_not_restore_keyboard: row.get(3)?,
        hide_indicator: row.get(4)?,
        force_english_punctuation: row.get(5)?,
    })
}

impl AppRuleStore for Database {
    fn rule_for(&self, bundle_id: &str) -> keyshift_rules::Result<Option<AppRule>> {
        Ok(self.get_rule(bundle_id)?)
    }

    fn save_rule(&self, rule: &AppRule) -> keyshift_rules::Result<()> {
        Ok(self.put_rule(rule)?)
    }

    fn delete_rule(&self, bundle_id: &str) -> keyshift_rules::Result<()> {
        match self.remove_rule(bundle_id) {
            Ok(()) | Err(StorageError::NotFound(_)) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn list_rules(&self) -> keyshift_rules::Result<Vec<AppRule>> {
        Ok(self.all_rules()?)
    }
}

impl PreferenceRepository for Database {
    /// Missing or unreadable preferences fall back to defaults.
    fn load_preferences(&self) -> keyshift_rules::Result<Preferences> {
        let Some(json) = self.get_setting(PREFERENCES_KEY)? else {
            return Ok(Preferences::default());
        };
        match serde_json::from_str(&json) {
            Ok(preferences) => Ok(preferences),
            Err(e) => {
                tracing::warn!(error = %e, "Stored preferences are malformed, using defaults");
                Ok(Preferences::default())
            }
        }
    }

    fn save_preferences(&self, preferences: &Preferences) -> keyshift_rules::Result<()> {
        let json = serde_json::to_string(preferences).map_err(StorageError::from)?;
        Ok(self.set_setting(PREFERENCES_KEY, &json)?)
    }
}
