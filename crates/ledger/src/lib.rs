//! Client payment ledger.
//!
//! Each [`Entry`] records what a client owes and the [`Payment`]s received:
//! an optional deposit plus one payment per session. The [`EntryBuilder`]
//! assembles entries from a [`Form`], the [`EntryStore`] keeps them in order,
//! mirrors them into a [`Storage`] slot and renders them for display.

pub use builder::{Candidate, EntryBuilder, Form, PendingImage, SessionRow};
pub use entry::{Entry, EntryId, Payment, PaymentKind};
pub use error::LedgerError;
pub use money::Money;
pub use notify::{LogNotifier, SaveNotifier};
pub use render::{DisplaySurface, EntryView, HtmlSurface, THUMBNAIL_WIDTH, Thumbnail};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{ENTRIES_KEY, EntryStore, EntryStoreBuilder};

mod builder;
mod entry;
mod error;
mod image;
mod money;
mod notify;
mod render;
mod storage;
mod store;

pub type ResultLedger<T> = Result<T, LedgerError>;
