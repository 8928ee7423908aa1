// src/settings.rs
// Operator settings persisted in the key-value store, one key per setting
// under "setting:<slug>:<name>". block_enabled is stored only as the literal
// "0" or "1"; allowed_bots as a JSON string array. Reads never fail: corrupt
// or missing values normalize to the documented defaults.

use crate::store::{KeyValueStore, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cell::RefCell;

pub const SETTINGS_SLUG: &str = "bot-blocker";

const KEY_BLOCK_ENABLED: &str = "block_enabled";
const KEY_ALLOWED_BOTS: &str = "allowed_bots";

/// In-memory settings as the classifier consumes them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    pub block_enabled: bool,
    pub allowed_bots: Vec<String>,
}

/// Wire shape of the settings surface: block_enabled travels as "0"/"1".
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct SettingsWire {
    pub block_enabled: String,
    pub allowed_bots: Vec<String>,
}

impl From<&Settings> for SettingsWire {
    fn from(s: &Settings) -> Self {
        SettingsWire {
            block_enabled: if s.block_enabled { "1" } else { "0" }.to_string(),
            allowed_bots: s.allowed_bots.clone(),
        }
    }
}

/// Normalize any stored/submitted representation of block_enabled to "0"/"1".
/// Only an exact "1" (or true / numeric 1 / "true" on writes) enables.
pub fn normalize_block_enabled(value: &Value) -> &'static str {
    let enabled = match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_i64() == Some(1),
        Value::String(s) => {
            let t = s.trim();
            t == "1" || t.eq_ignore_ascii_case("true")
        }
        _ => false,
    };
    if enabled {
        "1"
    } else {
        "0"
    }
}

fn parse_stored_flag(raw: Option<Vec<u8>>) -> bool {
    raw.and_then(|v| String::from_utf8(v).ok())
        .map(|s| s.trim() == "1")
        .unwrap_or(false)
}

fn parse_stored_list(raw: Option<Vec<u8>>) -> Vec<String> {
    raw.and_then(|v| serde_json::from_slice::<Vec<String>>(&v).ok())
        .unwrap_or_default()
}

/// Read-through settings access with an explicit invalidate/reload contract.
/// One instance lives for one request; the cache only spares repeated KV
/// reads within that request.
pub struct SettingsStore<'a, S: KeyValueStore> {
    store: &'a S,
    slug: String,
    cache: RefCell<Option<Settings>>,
}

impl<'a, S: KeyValueStore> SettingsStore<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self::with_slug(store, SETTINGS_SLUG)
    }

    pub fn with_slug(store: &'a S, slug: &str) -> Self {
        SettingsStore {
            store,
            slug: slug.to_string(),
            cache: RefCell::new(None),
        }
    }

    fn key(&self, name: &str) -> String {
        format!("setting:{}:{}", self.slug, name)
    }

    /// Loads settings, normalizing anything malformed to defaults.
    /// Store failures degrade to defaults (blocking disabled) rather than
    /// erroring: the request path must stay fail-open.
    pub fn load(&self) -> Settings {
        if let Some(cached) = self.cache.borrow().as_ref() {
            return cached.clone();
        }
        let block_enabled = match self.store.get(&self.key(KEY_BLOCK_ENABLED)) {
            Ok(raw) => parse_stored_flag(raw),
            Err(e) => {
                crate::log_line(&format!("[settings] load failed, using defaults: {}", e));
                false
            }
        };
        let allowed_bots = match self.store.get(&self.key(KEY_ALLOWED_BOTS)) {
            Ok(raw) => parse_stored_list(raw),
            Err(_) => Vec::new(),
        };
        let settings = Settings {
            block_enabled,
            allowed_bots,
        };
        *self.cache.borrow_mut() = Some(settings.clone());
        settings
    }

    /// Drops the read-through cache so the next load observes stored values.
    pub fn invalidate(&self) {
        *self.cache.borrow_mut() = None;
    }

    /// Persists settings key by key. Each key is an independent upsert: a
    /// failure on one leaves any key already written intact, and the error
    /// reports which key failed. The cache is invalidated on both success
    /// and failure so later loads see whatever actually landed.
    pub fn save(&self, wire: &SettingsWire) -> Result<(), StoreError> {
        let result = self.save_keys(wire);
        self.invalidate();
        result
    }

    fn save_keys(&self, wire: &SettingsWire) -> Result<(), StoreError> {
        let flag = normalize_block_enabled(&Value::String(wire.block_enabled.clone()));
        self.store
            .set(&self.key(KEY_BLOCK_ENABLED), flag.as_bytes())?;

        let list = serde_json::to_vec(&wire.allowed_bots)
            .map_err(|e| StoreError::Serialize(e.to_string()))?;
        self.store.set(&self.key(KEY_ALLOWED_BOTS), &list)?;
        Ok(())
    }

    /// Current settings in wire shape, forced past the cache. Used by the
    /// admin surface, which must reflect the latest persisted state.
    pub fn load_wire(&self) -> SettingsWire {
        self.invalidate();
        SettingsWire::from(&self.load())
    }
}
