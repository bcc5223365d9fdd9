//! Hook run right before the store writes itself out.

/// Called synchronously by [`EntryStore::persist`](crate::EntryStore::persist)
/// before the write starts. `entries` is the number of entries about to be
/// written.
pub trait SaveNotifier {
    fn before_save(&mut self, entries: usize);
}

/// Default notifier: a log line per save.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl SaveNotifier for LogNotifier {
    fn before_save(&mut self, entries: usize) {
        tracing::info!(entries, "saving entries");
    }
}

impl<F> SaveNotifier for F
where
    F: FnMut(usize),
{
    fn before_save(&mut self, entries: usize) {
        self(entries)
    }
}
