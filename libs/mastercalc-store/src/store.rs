//! Typed persistence over a key-value backend
//!
//! No in-memory cache: every operation reads the full value, mutates it and
//! writes it back. Missing keys read as empty or default. Corrupt values are
//! logged at WARN and read as default.

use mastercalc_calc::{Calculation, CalculatorId, HistoryRecord};
use tracing::{debug, info, warn};

use crate::clock::{history_timestamp, iso_timestamp, Clock, SystemClock};
use crate::error::{Result, StoreError};
use crate::keyspace::StoreKey;
use crate::schema::{
    self, Decoded, DraftSlot, FavoriteEntry, FavoritesSlot, HistoryEntry, HistorySlot, Slot,
    StatsSlot, TemplateEntry, TemplatesSlot, Theme, ThemeSlot, UsageStats,
    DEFAULT_TEMPLATE_DATA, DEFAULT_TEMPLATE_DESCRIPTION, HISTORY_LIMIT,
};
use crate::traits::KvStore;

/// State of one slot as seen by [`PersistenceStore::inspect`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotStatus {
    /// Never written
    Missing,
    /// Readable; `version` 0 means the pre-envelope layout
    Present { version: u32 },
    /// Unreadable; regular reads fall back to the default
    Recovered { reason: String },
}

/// Persistence store for favorites, history, templates, draft, stats and theme
pub struct PersistenceStore<S: KvStore, C: Clock = SystemClock> {
    backend: S,
    clock: C,
}

impl<S: KvStore> PersistenceStore<S> {
    pub fn new(backend: S) -> Self {
        Self::with_clock(backend, SystemClock)
    }
}

impl<S: KvStore, C: Clock> PersistenceStore<S, C> {
    pub fn with_clock(backend: S, clock: C) -> Self {
        Self { backend, clock }
    }

    pub fn backend(&self) -> &S {
        &self.backend
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    // ------------------------------------------------------------------
    // Slot codec
    // ------------------------------------------------------------------

    async fn load<T: Slot>(&self) -> Result<T::Value> {
        let key = T::KEY.key();
        let Some(raw) = self.backend.get(key).await? else {
            return Ok(Default::default());
        };

        match schema::decode::<T>(&raw) {
            Ok(Decoded::Current(value)) => Ok(value),
            Ok(Decoded::Migrated { value, from }) => {
                info!(key, from, "Migrating stored value to current schema");
                self.save::<T>(&value).await?;
                Ok(value)
            },
            Err(reason) => {
                warn!(key, %reason, "Stored value is corrupt, using default");
                Ok(Default::default())
            },
        }
    }

    async fn save<T: Slot>(&self, value: &T::Value) -> Result<()> {
        let key = T::KEY.key();
        let encoded = schema::encode::<T>(value).map_err(|e| StoreError::serialization(key, e))?;
        self.backend.set(key, &encoded).await
    }

    async fn inspect_slot<T: Slot>(&self) -> Result<SlotStatus> {
        let Some(raw) = self.backend.get(T::KEY.key()).await? else {
            return Ok(SlotStatus::Missing);
        };
        Ok(match schema::decode::<T>(&raw) {
            Ok(decoded) => SlotStatus::Present {
                version: decoded.version(),
            },
            Err(reason) => SlotStatus::Recovered { reason },
        })
    }

    /// Report whether a slot is missing, readable or corrupt
    pub async fn inspect(&self, key: StoreKey) -> Result<SlotStatus> {
        match key {
            StoreKey::Favorites => self.inspect_slot::<FavoritesSlot>().await,
            StoreKey::History => self.inspect_slot::<HistorySlot>().await,
            StoreKey::Templates => self.inspect_slot::<TemplatesSlot>().await,
            StoreKey::Draft => self.inspect_slot::<DraftSlot>().await,
            StoreKey::Stats => self.inspect_slot::<StatsSlot>().await,
            StoreKey::Theme => self.inspect_slot::<ThemeSlot>().await,
        }
    }

    /// Like [`inspect`](Self::inspect), but corrupt slots become `StoreError::Corrupt`
    pub async fn verify(&self, key: StoreKey) -> Result<SlotStatus> {
        match self.inspect(key).await? {
            SlotStatus::Recovered { reason } => Err(StoreError::Corrupt {
                key: key.key().to_string(),
                reason,
            }),
            status => Ok(status),
        }
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    /// History, newest first
    pub async fn history(&self) -> Result<Vec<HistoryEntry>> {
        self.load::<HistorySlot>().await
    }

    /// Insert at head and keep the newest [`HISTORY_LIMIT`] entries
    pub async fn append_history(&self, record: HistoryRecord) -> Result<HistoryEntry> {
        let mut history = self.history().await?;
        let now = self.clock.now();

        // Creation millis, bumped past any existing id so ids stay unique
        let now_ms = now.timestamp_millis();
        let id = match history.iter().map(|e| e.id).max() {
            Some(max) if max >= now_ms => max + 1,
            _ => now_ms,
        };

        let entry = HistoryEntry::from_record(record, id, history_timestamp(now));
        history.insert(0, entry.clone());
        history.truncate(HISTORY_LIMIT);
        self.save::<HistorySlot>(&history).await?;

        debug!(id, name = %entry.name, len = history.len(), "History appended");
        Ok(entry)
    }

    /// Delete one entry, returns whether it existed
    pub async fn delete_history(&self, id: i64) -> Result<bool> {
        let mut history = self.history().await?;
        let before = history.len();
        history.retain(|e| e.id != id);
        if history.len() == before {
            return Ok(false);
        }
        self.save::<HistorySlot>(&history).await?;
        debug!(id, "History entry deleted");
        Ok(true)
    }

    pub async fn clear_history(&self) -> Result<()> {
        self.backend.delete(StoreKey::History.key()).await?;
        debug!("History cleared");
        Ok(())
    }

    /// Run a calculation and append its record only when it succeeds
    pub async fn record_calculation<T, F>(&self, calculate: F) -> Result<Calculation<T>>
    where
        F: FnOnce() -> mastercalc_calc::Result<Calculation<T>>,
    {
        let calculation = calculate()?;
        self.append_history(calculation.record.clone()).await?;
        Ok(calculation)
    }

    // ------------------------------------------------------------------
    // Favorites
    // ------------------------------------------------------------------

    pub async fn favorites(&self) -> Result<Vec<FavoriteEntry>> {
        self.load::<FavoritesSlot>().await
    }

    /// Append a favorite; returns `false` when the id is already present
    pub async fn add_favorite(&self, entry: FavoriteEntry) -> Result<bool> {
        let mut favorites = self.favorites().await?;
        if favorites.iter().any(|f| f.id == entry.id) {
            return Ok(false);
        }
        debug!(id = %entry.id, "Favorite added");
        favorites.push(entry);
        self.save::<FavoritesSlot>(&favorites).await?;
        Ok(true)
    }

    /// Favorite built from the calculator catalog
    pub async fn add_calculator_favorite(&self, calculator: CalculatorId) -> Result<bool> {
        self.add_favorite(favorite_for(calculator)).await
    }

    pub async fn remove_favorite_at(&self, index: usize) -> Result<FavoriteEntry> {
        let mut favorites = self.favorites().await?;
        if index >= favorites.len() {
            return Err(StoreError::IndexOutOfRange {
                list: "favorites",
                index,
                len: favorites.len(),
            });
        }
        let removed = favorites.remove(index);
        self.save::<FavoritesSlot>(&favorites).await?;
        debug!(id = %removed.id, index, "Favorite removed");
        Ok(removed)
    }

    /// Remove by id, returns whether it was present
    pub async fn remove_favorite(&self, id: &str) -> Result<bool> {
        let mut favorites = self.favorites().await?;
        let before = favorites.len();
        favorites.retain(|f| f.id != id);
        if favorites.len() == before {
            return Ok(false);
        }
        self.save::<FavoritesSlot>(&favorites).await?;
        debug!(id, "Favorite removed");
        Ok(true)
    }

    /// Add or remove; returns whether the calculator is a favorite afterwards
    pub async fn toggle_favorite(&self, calculator: CalculatorId) -> Result<bool> {
        if self.remove_favorite(calculator.id()).await? {
            Ok(false)
        } else {
            self.add_calculator_favorite(calculator).await?;
            Ok(true)
        }
    }

    pub async fn is_favorite(&self, id: &str) -> Result<bool> {
        Ok(self.favorites().await?.iter().any(|f| f.id == id))
    }

    // ------------------------------------------------------------------
    // Templates
    // ------------------------------------------------------------------

    pub async fn templates(&self) -> Result<Vec<TemplateEntry>> {
        self.load::<TemplatesSlot>().await
    }

    /// Save a template with the default description and data
    pub async fn save_template(&self, name: &str) -> Result<TemplateEntry> {
        self.save_template_with(name, DEFAULT_TEMPLATE_DESCRIPTION, DEFAULT_TEMPLATE_DATA)
            .await
    }

    pub async fn save_template_with(
        &self,
        name: &str,
        description: &str,
        data: &str,
    ) -> Result<TemplateEntry> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::EmptyTemplateName);
        }

        let entry = TemplateEntry {
            name: name.to_string(),
            description: description.to_string(),
            data: data.to_string(),
            timestamp: iso_timestamp(self.clock.now()),
        };
        let mut templates = self.templates().await?;
        templates.push(entry.clone());
        self.save::<TemplatesSlot>(&templates).await?;

        debug!(name, len = templates.len(), "Template saved");
        Ok(entry)
    }

    pub async fn template(&self, index: usize) -> Result<TemplateEntry> {
        let templates = self.templates().await?;
        let len = templates.len();
        templates
            .into_iter()
            .nth(index)
            .ok_or(StoreError::IndexOutOfRange {
                list: "templates",
                index,
                len,
            })
    }

    pub async fn delete_template(&self, index: usize) -> Result<TemplateEntry> {
        let mut templates = self.templates().await?;
        if index >= templates.len() {
            return Err(StoreError::IndexOutOfRange {
                list: "templates",
                index,
                len: templates.len(),
            });
        }
        let removed = templates.remove(index);
        self.save::<TemplatesSlot>(&templates).await?;
        debug!(name = %removed.name, index, "Template deleted");
        Ok(removed)
    }

    pub async fn clear_templates(&self) -> Result<()> {
        self.backend.delete(StoreKey::Templates.key()).await?;
        debug!("Templates cleared");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Draft
    // ------------------------------------------------------------------

    pub async fn draft(&self) -> Result<String> {
        self.load::<DraftSlot>().await
    }

    pub async fn save_draft(&self, text: &str) -> Result<()> {
        self.save::<DraftSlot>(&text.to_string()).await?;
        debug!(chars = text.chars().count(), "Draft saved");
        Ok(())
    }

    pub async fn clear_draft(&self) -> Result<()> {
        self.backend.delete(StoreKey::Draft.key()).await?;
        debug!("Draft cleared");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Usage stats
    // ------------------------------------------------------------------

    /// Count one application launch
    pub async fn record_launch(&self) -> Result<UsageStats> {
        let mut stats = self.stats().await?;
        let now = iso_timestamp(self.clock.now());

        if stats.first_launch.is_none() {
            stats.first_launch = Some(now.clone());
        }
        stats.launch_count += 1;
        stats.last_launch = Some(now);
        self.save::<StatsSlot>(&stats).await?;

        info!(
            launch = stats.launch_count,
            first = stats.first_launch.as_deref().unwrap_or_default(),
            "Launch recorded"
        );
        Ok(stats)
    }

    pub async fn stats(&self) -> Result<UsageStats> {
        self.load::<StatsSlot>().await
    }

    // ------------------------------------------------------------------
    // Theme
    // ------------------------------------------------------------------

    pub async fn theme(&self) -> Result<Theme> {
        self.load::<ThemeSlot>().await
    }

    pub async fn set_theme(&self, theme: Theme) -> Result<()> {
        self.save::<ThemeSlot>(&theme).await?;
        debug!(%theme, "Theme set");
        Ok(())
    }

    /// Switch light/dark, returns the new theme
    pub async fn toggle_theme(&self) -> Result<Theme> {
        let theme = self.theme().await?.toggled();
        self.set_theme(theme).await?;
        Ok(theme)
    }
}

/// Catalog entry for a calculator favorite
pub fn favorite_for(calculator: CalculatorId) -> FavoriteEntry {
    FavoriteEntry {
        id: calculator.id().to_string(),
        name: calculator.title().to_string(),
        description: calculator.description().to_string(),
        screen: calculator.screen().id().to_string(),
    }
}
