//! The entry store.
//!
//! `EntryStore` owns every entry ever created, in creation order. It is
//! loaded once from a [`Storage`] slot and written back whole after each
//! change. Entries are only ever appended.

use crate::{
    DisplaySurface, Entry, EntryId, EntryView, LedgerError, LogNotifier, ResultLedger,
    SaveNotifier, Storage,
};

/// Slot holding the serialized entry list.
pub const ENTRIES_KEY: &str = "entries";

pub struct EntryStore {
    entries: Vec<Entry>,
    storage: Box<dyn Storage>,
    notifier: Box<dyn SaveNotifier>,
    dirty: bool,
}

impl std::fmt::Debug for EntryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntryStore")
            .field("entries", &self.entries.len())
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl EntryStore {
    /// Return a builder for `EntryStore`. Help to build the struct.
    pub fn builder() -> EntryStoreBuilder {
        EntryStoreBuilder::default()
    }

    /// Loads the entries saved under [`ENTRIES_KEY`].
    ///
    /// A missing slot yields an empty store. A slot that does not parse fails
    /// with [`LedgerError::CorruptStore`] and is left untouched.
    pub fn load(
        storage: Box<dyn Storage>,
        notifier: Box<dyn SaveNotifier>,
    ) -> ResultLedger<Self> {
        let entries = match storage.read(ENTRIES_KEY)? {
            Some(raw) => {
                serde_json::from_str(&raw).map_err(|source| LedgerError::CorruptStore {
                    key: ENTRIES_KEY.to_string(),
                    source,
                })?
            }
            None => Vec::new(),
        };
        tracing::debug!(entries = entries.len(), "entry store loaded");

        Ok(Self {
            entries,
            storage,
            notifier,
            dirty: false,
        })
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// `true` when memory holds entries the last write did not store.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Adds `entry` at the end of the in-memory list.
    pub fn append(&mut self, entry: Entry) -> ResultLedger<()> {
        if self.contains(entry.id) {
            return Err(LedgerError::DuplicateEntry(entry.id.to_string()));
        }
        tracing::debug!(id = %entry.id, client = %entry.client, "entry appended");
        self.entries.push(entry);
        self.dirty = true;
        Ok(())
    }

    /// Writes the whole list to storage, replacing the previous value.
    ///
    /// The save notifier runs first. On failure the entries stay in memory and
    /// the store remains dirty, so the next call writes them again.
    pub fn persist(&mut self) -> ResultLedger<()> {
        self.notifier.before_save(self.entries.len());

        let payload = serde_json::to_string_pretty(&self.entries)?;
        if let Err(err) = self.storage.write(ENTRIES_KEY, &payload) {
            tracing::warn!("failed to persist {} entries: {err}", self.entries.len());
            self.dirty = true;
            return Err(err);
        }

        tracing::info!(entries = self.entries.len(), "entries persisted");
        self.dirty = false;
        Ok(())
    }

    /// Appends `entry` and persists the store.
    ///
    /// When the append is refused nothing changes. When only the write fails
    /// the entry is kept in memory and the error is returned.
    pub fn save_entry(&mut self, entry: Entry) -> ResultLedger<()> {
        self.append(entry)?;
        self.persist()
    }

    /// Computes the display model of every entry, in insertion order.
    pub fn render(&self) -> Vec<EntryView> {
        self.entries.iter().map(EntryView::from_entry).collect()
    }

    /// Replaces the content of `surface` with every entry.
    pub fn render_to(&self, surface: &mut dyn DisplaySurface) {
        surface.replace(&self.render());
    }

    /// Final write at teardown, skipped when nothing is pending.
    pub fn close(mut self) -> ResultLedger<()> {
        if self.dirty {
            self.persist()?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct EntryStoreBuilder {
    storage: Option<Box<dyn Storage>>,
    notifier: Option<Box<dyn SaveNotifier>>,
}

impl EntryStoreBuilder {
    /// Pass the storage backend.
    pub fn storage(mut self, storage: impl Storage + 'static) -> EntryStoreBuilder {
        self.storage = Some(Box::new(storage));
        self
    }

    /// Pass the hook run before every save. Defaults to [`LogNotifier`].
    pub fn notifier(mut self, notifier: impl SaveNotifier + 'static) -> EntryStoreBuilder {
        self.notifier = Some(Box::new(notifier));
        self
    }

    /// Load the store from the configured storage.
    pub fn load(self) -> ResultLedger<EntryStore> {
        let storage = self
            .storage
            .ok_or_else(|| LedgerError::Storage("missing storage".to_string()))?;
        let notifier = self.notifier.unwrap_or_else(|| Box::new(LogNotifier));
        EntryStore::load(storage, notifier)
    }
}
