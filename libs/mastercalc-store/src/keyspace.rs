//! Persisted key names

use std::fmt;
use std::str::FromStr;

use mastercalc_calc::CalcError;

/// Prefix shared by every persisted key
pub const KEY_PREFIX: &str = "mastercalc_";

/// One of the fixed slots of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Favorites,
    History,
    Templates,
    Draft,
    Stats,
    Theme,
}

impl StoreKey {
    pub const ALL: [StoreKey; 6] = [
        StoreKey::Favorites,
        StoreKey::History,
        StoreKey::Templates,
        StoreKey::Draft,
        StoreKey::Stats,
        StoreKey::Theme,
    ];

    /// Short name without prefix
    pub fn name(self) -> &'static str {
        match self {
            StoreKey::Favorites => "favorites",
            StoreKey::History => "history",
            StoreKey::Templates => "templates",
            StoreKey::Draft => "draft",
            StoreKey::Stats => "stats",
            StoreKey::Theme => "theme",
        }
    }

    /// Full backend key, e.g. `mastercalc_history`
    pub fn key(self) -> &'static str {
        match self {
            StoreKey::Favorites => "mastercalc_favorites",
            StoreKey::History => "mastercalc_history",
            StoreKey::Templates => "mastercalc_templates",
            StoreKey::Draft => "mastercalc_draft",
            StoreKey::Stats => "mastercalc_stats",
            StoreKey::Theme => "mastercalc_theme",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StoreKey {
    type Err = CalcError;

    /// Accepts both the short and the prefixed form
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().to_ascii_lowercase();
        let short = trimmed.strip_prefix(KEY_PREFIX).unwrap_or(&trimmed);
        StoreKey::ALL
            .into_iter()
            .find(|k| k.name() == short)
            .ok_or_else(|| CalcError::invalid_input("key", format!("unknown store key '{s}'")))
    }
}
