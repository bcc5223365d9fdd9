//! Turns the form the user filled in into a new [`Entry`].
//!
//! The builder only reads a [`Form`] snapshot, so it works the same behind
//! any front end. Saving goes through these states:
//!
//! ```text
//! Idle -> Collecting -> [AwaitingImageRead ->] Appended -> Persisted -> Rendered -> Idle
//! ```
//!
//! Reading the receipt image is the only step that suspends.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use crate::{DisplaySurface, Entry, EntryId, EntryStore, Money, Payment, ResultLedger, image};

/// One session row of the form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionRow {
    pub date: String,
    pub amount: String,
}

/// Current state of the entry form, fields kept exactly as typed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Form {
    pub visible: bool,
    pub date: String,
    pub client: String,
    pub total: String,
    pub deposit: String,
    pub sessions: Vec<SessionRow>,
    pub image: Option<PathBuf>,
}

impl Form {
    /// Shows a blank form dated `today`.
    pub fn open(&mut self, today: NaiveDate) {
        *self = Self {
            visible: true,
            date: iso_date(today),
            ..Self::default()
        };
    }

    pub fn add_session(&mut self, today: NaiveDate) {
        self.sessions.push(SessionRow {
            date: iso_date(today),
            amount: String::new(),
        });
    }

    pub fn remove_session(&mut self, index: usize) -> Option<SessionRow> {
        (index < self.sessions.len()).then(|| self.sessions.remove(index))
    }

    /// Clears every session row and hides the form.
    pub fn reset(&mut self) {
        self.sessions.clear();
        self.visible = false;
    }
}

/// A built entry, possibly still waiting for its receipt.
#[derive(Debug)]
pub enum Candidate {
    Ready(Entry),
    AwaitingImage(PendingImage),
}

impl Candidate {
    pub fn entry_id(&self) -> EntryId {
        match self {
            Self::Ready(entry) => entry.id,
            Self::AwaitingImage(pending) => pending.entry.id,
        }
    }

    /// Waits for the receipt, if any, and returns the finished entry.
    pub async fn resolve(self) -> ResultLedger<Entry> {
        match self {
            Self::Ready(entry) => Ok(entry),
            Self::AwaitingImage(pending) => pending.read().await,
        }
    }
}

/// Entry whose receipt file has not been read yet.
#[derive(Debug)]
pub struct PendingImage {
    entry: Entry,
    path: PathBuf,
}

impl PendingImage {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the receipt into the entry. On failure the entry is dropped.
    pub async fn read(self) -> ResultLedger<Entry> {
        let Self { mut entry, path } = self;
        entry.image = Some(image::read_data_uri(&path).await?);
        Ok(entry)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct EntryBuilder {
    today: NaiveDate,
}

impl Default for EntryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryBuilder {
    /// Builder dated with the local calendar day.
    pub fn new() -> Self {
        Self::with_today(Local::now().date_naive())
    }

    pub fn with_today(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Deposit first, then one payment per session row, skipping every amount
    /// that is not strictly positive.
    pub fn collect_payments(&self, form: &Form) -> Vec<Payment> {
        let deposit = Payment::deposit(Money::coerce(&form.deposit)).ok();
        let sessions = form.sessions.iter().filter_map(|row| {
            let date = Some(row.date.trim())
                .filter(|date| !date.is_empty())
                .map(str::to_string);
            Payment::session(Money::coerce(&row.amount), date).ok()
        });
        deposit.into_iter().chain(sessions).collect()
    }

    /// Reads the form into a new entry with a fresh id and no image.
    pub fn build_entry(&self, form: &Form) -> Entry {
        let date = match form.date.trim() {
            "" => iso_date(self.today),
            typed => typed.to_string(),
        };
        Entry::new(
            date,
            form.client.clone(),
            Money::coerce_non_negative(&form.total),
            self.collect_payments(form),
        )
    }

    /// Pairs `entry` with the receipt to read, if one was picked.
    pub fn attach_image_if_present(entry: Entry, image: Option<&Path>) -> Candidate {
        match image {
            Some(path) => Candidate::AwaitingImage(PendingImage {
                entry,
                path: path.to_path_buf(),
            }),
            None => Candidate::Ready(entry),
        }
    }

    /// Builds the entry for `form` and attaches the receipt, if any.
    pub fn prepare(&self, form: &Form) -> Candidate {
        Self::attach_image_if_present(self.build_entry(form), form.image.as_deref())
    }

    /// Runs a whole save: build, read the receipt, append and persist, render
    /// and reset the form.
    ///
    /// The form is reset as soon as the store holds the entry, even when the
    /// write that follows fails; that error is still returned.
    pub async fn submit(
        &self,
        form: &mut Form,
        store: &mut EntryStore,
        surface: &mut dyn DisplaySurface,
    ) -> ResultLedger<EntryId> {
        let entry = self.prepare(form).resolve().await?;
        let id = entry.id;

        let saved = store.save_entry(entry);
        if store.contains(id) {
            store.render_to(surface);
            form.reset();
        }
        saved.map(|()| id)
    }
}

fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
