//! Typed schema of persisted values
//!
//! Every slot is written as an envelope `{"version": N, "data": ...}`.
//! Values written before the envelope existed (bare JSON lists and objects,
//! raw draft and theme text) are treated as version 0 and migrated on read.

use std::fmt;
use std::str::FromStr;

use mastercalc_calc::{CalcError, HistoryRecord};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::keyspace::StoreKey;

/// Version written by this build
pub const SCHEMA_VERSION: u32 = 1;

/// Most recent entries kept in history
pub const HISTORY_LIMIT: usize = 20;

pub const DEFAULT_TEMPLATE_DESCRIPTION: &str = "Сохраненный расчет";
pub const DEFAULT_TEMPLATE_DATA: &str = "Данные расчета";

// ============================================================================
// Entities
// ============================================================================

/// One completed calculation, newest first in the list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub result: String,
    pub timestamp: String,
}

impl HistoryEntry {
    pub fn from_record(record: HistoryRecord, id: i64, timestamp: String) -> Self {
        Self {
            id,
            name: record.name,
            description: record.description,
            result: record.result,
            timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FavoriteEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub screen: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateEntry {
    pub name: String,
    pub description: String,
    pub data: String,
    /// RFC 3339, UTC
    pub timestamp: String,
}

/// Launch counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageStats {
    #[serde(default)]
    pub first_launch: Option<String>,
    #[serde(default)]
    pub launch_count: u64,
    #[serde(default)]
    pub last_launch: Option<String>,
}

/// Color scheme preference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(CalcError::invalid_input(
                "theme",
                format!("expected light or dark, got '{other}'"),
            )),
        }
    }
}

// ============================================================================
// Slots
// ============================================================================

/// Binding between a store key and the type persisted under it
pub trait Slot {
    const KEY: StoreKey;
    type Value: Serialize + DeserializeOwned + Default;

    /// Decode a value stored without an envelope
    fn decode_legacy(raw: &str) -> Result<Self::Value, String> {
        serde_json::from_str(raw).map_err(|e| e.to_string())
    }
}

pub struct FavoritesSlot;
pub struct HistorySlot;
pub struct TemplatesSlot;
pub struct DraftSlot;
pub struct StatsSlot;
pub struct ThemeSlot;

impl Slot for FavoritesSlot {
    const KEY: StoreKey = StoreKey::Favorites;
    type Value = Vec<FavoriteEntry>;
}

impl Slot for HistorySlot {
    const KEY: StoreKey = StoreKey::History;
    type Value = Vec<HistoryEntry>;
}

impl Slot for TemplatesSlot {
    const KEY: StoreKey = StoreKey::Templates;
    type Value = Vec<TemplateEntry>;
}

impl Slot for DraftSlot {
    const KEY: StoreKey = StoreKey::Draft;
    type Value = String;

    // Raw text
    fn decode_legacy(raw: &str) -> Result<Self::Value, String> {
        Ok(raw.to_string())
    }
}

impl Slot for StatsSlot {
    const KEY: StoreKey = StoreKey::Stats;
    type Value = UsageStats;
}

impl Slot for ThemeSlot {
    const KEY: StoreKey = StoreKey::Theme;
    type Value = Theme;

    fn decode_legacy(raw: &str) -> Result<Self::Value, String> {
        raw.trim_matches('"')
            .parse()
            .map_err(|e: CalcError| e.to_string())
    }
}

// ============================================================================
// Envelope codec
// ============================================================================

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    version: u32,
    data: &'a T,
}

/// Result of reading a stored value
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded<T> {
    /// Stored with the current envelope version
    Current(T),
    /// Stored in an older layout; should be rewritten
    Migrated { value: T, from: u32 },
}

impl<T> Decoded<T> {
    pub fn into_value(self) -> T {
        match self {
            Decoded::Current(value) | Decoded::Migrated { value, .. } => value,
        }
    }

    pub fn version(&self) -> u32 {
        match self {
            Decoded::Current(_) => SCHEMA_VERSION,
            Decoded::Migrated { from, .. } => *from,
        }
    }
}

/// Serialize a slot value inside the current envelope
pub fn encode<S: Slot>(value: &S::Value) -> serde_json::Result<String> {
    serde_json::to_string(&EnvelopeRef {
        version: SCHEMA_VERSION,
        data: value,
    })
}

/// Decode a raw stored string; `Err` carries the corruption reason
pub fn decode<S: Slot>(raw: &str) -> Result<Decoded<S::Value>, String> {
    if let Some((version, data)) = split_envelope(raw) {
        if version > SCHEMA_VERSION {
            return Err(format!(
                "written by schema version {version}, newest known is {SCHEMA_VERSION}"
            ));
        }
        let value = serde_json::from_value(data).map_err(|e| e.to_string())?;
        return Ok(if version == SCHEMA_VERSION {
            Decoded::Current(value)
        } else {
            Decoded::Migrated {
                value,
                from: version,
            }
        });
    }

    S::decode_legacy(raw).map(|value| Decoded::Migrated { value, from: 0 })
}

/// Returns `(version, data)` when `raw` is an envelope object
fn split_envelope(raw: &str) -> Option<(u32, Value)> {
    let Ok(Value::Object(mut map)) = serde_json::from_str::<Value>(raw) else {
        return None;
    };
    if map.len() != 2 {
        return None;
    }
    let version = map.get("version")?.as_u64()?;
    let data = map.remove("data")?;
    Some((u32::try_from(version).unwrap_or(u32::MAX), data))
}
