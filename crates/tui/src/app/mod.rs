use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use crossterm::event::{self, Event, KeyEvent};
use ledger::{
    Candidate, DisplaySurface, Entry, EntryBuilder, EntryStore, EntryView, FileStorage, Form,
    ResultLedger, SaveNotifier,
};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::{
    config::AppConfig,
    error::{AppError, Result},
    ui::{
        self,
        keymap::{AppAction, map_key},
    },
};

const TOAST_TTL: Duration = Duration::from_secs(3);

/// Messages coming back to the event loop from hooks and background reads.
#[derive(Debug)]
pub enum AppEvent {
    Notice(String),
    ImageRead(ResultLedger<Entry>),
    /// Outcome of a save, queued behind the notice the save hook posted.
    Saved(ResultLedger<()>),
}

/// Posts the save notice to the event loop instead of blocking on it.
struct ChannelNotifier {
    sender: UnboundedSender<AppEvent>,
}

impl SaveNotifier for ChannelNotifier {
    fn before_save(&mut self, entries: usize) {
        let _ = self
            .sender
            .send(AppEvent::Notice(format!("Saving {entries} entries…")));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone)]
pub struct ToastState {
    pub message: String,
    pub level: ToastLevel,
    pub shown_at: Instant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Date,
    Client,
    Total,
    Deposit,
    SessionDate(usize),
    SessionAmount(usize),
    Receipt,
}

#[derive(Debug, Default)]
pub struct EntriesState {
    pub items: Vec<EntryView>,
    pub selected: usize,
}

impl EntriesState {
    fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = (self.selected + 1).min(self.items.len() - 1);
    }

    fn select_prev(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.selected = self.selected.saturating_sub(1);
    }

    fn select_last(&mut self) {
        self.selected = self.items.len().saturating_sub(1);
    }
}

impl DisplaySurface for EntriesState {
    fn replace(&mut self, views: &[EntryView]) {
        self.items = views.to_vec();
        self.selected = self.selected.min(self.items.len().saturating_sub(1));
    }
}

#[derive(Debug)]
pub struct FormState {
    pub form: Form,
    /// Receipt path as typed; copied into `form.image` on submit.
    pub receipt: String,
    pub focus: FormField,
    /// A receipt is being read in the background.
    pub pending: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            form: Form::default(),
            receipt: String::new(),
            focus: FormField::Client,
            pending: false,
        }
    }
}

impl FormState {
    /// Focus order: fixed fields, then every session row, then the receipt.
    pub fn fields(&self) -> Vec<FormField> {
        let mut fields = vec![
            FormField::Date,
            FormField::Client,
            FormField::Total,
            FormField::Deposit,
        ];
        for index in 0..self.form.sessions.len() {
            fields.push(FormField::SessionDate(index));
            fields.push(FormField::SessionAmount(index));
        }
        fields.push(FormField::Receipt);
        fields
    }

    fn open(&mut self, builder: &EntryBuilder) {
        self.form.open(builder.today());
        self.receipt.clear();
        self.focus = FormField::Client;
    }

    fn move_focus(&mut self, forward: bool) {
        let fields = self.fields();
        let current = fields
            .iter()
            .position(|field| *field == self.focus)
            .unwrap_or(0);
        let next = if forward {
            (current + 1) % fields.len()
        } else {
            (current + fields.len() - 1) % fields.len()
        };
        self.focus = fields[next];
    }

    fn add_session(&mut self, builder: &EntryBuilder) {
        self.form.add_session(builder.today());
        self.focus = FormField::SessionAmount(self.form.sessions.len() - 1);
    }

    fn remove_session(&mut self) {
        let index = match self.focus {
            FormField::SessionDate(index) | FormField::SessionAmount(index) => index,
            _ => match self.form.sessions.len() {
                0 => return,
                len => len - 1,
            },
        };
        self.form.remove_session(index);
        if !self.fields().contains(&self.focus) {
            self.focus = match self.form.sessions.len() {
                0 => FormField::Deposit,
                len => FormField::SessionAmount(index.min(len - 1)),
            };
        }
    }

    fn active_field_mut(&mut self) -> Option<&mut String> {
        match self.focus {
            FormField::Date => Some(&mut self.form.date),
            FormField::Client => Some(&mut self.form.client),
            FormField::Total => Some(&mut self.form.total),
            FormField::Deposit => Some(&mut self.form.deposit),
            FormField::SessionDate(index) => self.form.sessions.get_mut(index).map(|row| &mut row.date),
            FormField::SessionAmount(index) => {
                self.form.sessions.get_mut(index).map(|row| &mut row.amount)
            }
            FormField::Receipt => Some(&mut self.receipt),
        }
    }

    fn sync_receipt(&mut self) {
        let path = self.receipt.trim();
        self.form.image = (!path.is_empty()).then(|| PathBuf::from(path));
    }
}

#[derive(Debug)]
pub struct AppState {
    pub entries: EntriesState,
    pub form: FormState,
    pub toast: Option<ToastState>,
    pub data_dir: String,
}

impl AppState {
    fn show_toast(&mut self, level: ToastLevel, message: impl Into<String>) {
        self.toast = Some(ToastState {
            message: message.into(),
            level,
            shown_at: Instant::now(),
        });
    }
}

pub struct App {
    store: EntryStore,
    pub state: AppState,
    sender: UnboundedSender<AppEvent>,
    events: UnboundedReceiver<AppEvent>,
    should_quit: bool,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        let (sender, events) = mpsc::unbounded_channel();
        let storage = FileStorage::new(&config.data_dir);
        tracing::info!(dir = %storage.dir().display(), "opening entry store");

        let store = EntryStore::builder()
            .storage(storage)
            .notifier(ChannelNotifier {
                sender: sender.clone(),
            })
            .load()?;

        let mut state = AppState {
            entries: EntriesState::default(),
            form: FormState::default(),
            toast: None,
            data_dir: config.data_dir.clone(),
        };
        store.render_to(&mut state.entries);

        Ok(Self {
            store,
            state,
            sender,
            events,
            should_quit: false,
        })
    }

    pub async fn run(mut self) -> Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        ui::restore_terminal(&mut terminal)?;
        result?;

        self.store.close()?;
        Ok(())
    }

    async fn event_loop(&mut self, terminal: &mut ui::Terminal) -> Result<()> {
        let tick_rate = Duration::from_millis(100);

        while !self.should_quit {
            self.drain_events();
            self.expire_toast();

            terminal
                .draw(|frame| ui::render(frame, &self.state))
                .map_err(|err| AppError::Terminal(err.to_string()))?;

            if event::poll(tick_rate)? {
                if let Event::Key(key) = event::read()? {
                    self.handle_key(key);
                }
            }
            tokio::task::yield_now().await;
        }

        Ok(())
    }

    fn drain_events(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            match event {
                AppEvent::Notice(message) => self.state.show_toast(ToastLevel::Info, message),
                AppEvent::ImageRead(Ok(entry)) => {
                    self.state.form.pending = false;
                    self.save(entry);
                }
                AppEvent::Saved(Ok(())) => {
                    let message = format!("Entry saved ({} total).", self.store.len());
                    self.state.show_toast(ToastLevel::Success, message);
                }
                AppEvent::Saved(Err(err)) => {
                    self.state
                        .show_toast(ToastLevel::Error, format!("Save failed: {err}"));
                }
                AppEvent::ImageRead(Err(err)) => {
                    self.state.form.pending = false;
                    tracing::warn!("receipt read failed, entry dropped: {err}");
                    self.state
                        .show_toast(ToastLevel::Error, format!("Receipt not saved: {err}"));
                }
            }
        }
    }

    fn expire_toast(&mut self) {
        if self
            .state
            .toast
            .as_ref()
            .is_some_and(|toast| toast.shown_at.elapsed() >= TOAST_TTL)
        {
            self.state.toast = None;
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let action = map_key(key);
        if action == AppAction::Quit {
            self.should_quit = true;
            return;
        }

        if self.state.form.form.visible {
            self.handle_form_action(action);
        } else {
            self.handle_list_action(action);
        }
    }

    fn handle_list_action(&mut self, action: AppAction) {
        match action {
            AppAction::Up | AppAction::Input('k') => self.state.entries.select_prev(),
            AppAction::Down | AppAction::Input('j') => self.state.entries.select_next(),
            AppAction::Input('n') | AppAction::Submit => {
                self.state.form.open(&EntryBuilder::new());
            }
            AppAction::Input('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn handle_form_action(&mut self, action: AppAction) {
        let form = &mut self.state.form;
        match action {
            AppAction::Cancel => form.form.visible = false,
            AppAction::NextField | AppAction::Down => form.move_focus(true),
            AppAction::PrevField | AppAction::Up => form.move_focus(false),
            AppAction::AddSession => form.add_session(&EntryBuilder::new()),
            AppAction::RemoveSession => form.remove_session(),
            AppAction::Backspace => {
                if let Some(field) = form.active_field_mut() {
                    field.pop();
                }
            }
            AppAction::Input(ch) => {
                if let Some(field) = form.active_field_mut() {
                    field.push(ch);
                }
            }
            AppAction::Submit => self.submit(),
            AppAction::Quit | AppAction::None => {}
        }
    }

    /// Builds the entry; a receipt is read on the runtime and the entry comes
    /// back through the event channel.
    fn submit(&mut self) {
        if self.state.form.pending {
            self.state
                .show_toast(ToastLevel::Info, "Still reading the previous receipt.");
            return;
        }

        self.state.form.sync_receipt();
        match EntryBuilder::new().prepare(&self.state.form.form) {
            Candidate::Ready(entry) => self.save(entry),
            Candidate::AwaitingImage(pending) => {
                tracing::debug!(path = %pending.path().display(), "reading receipt");
                self.state.form.pending = true;
                self.state.show_toast(ToastLevel::Info, "Reading receipt…");
                let sender = self.sender.clone();
                tokio::spawn(async move {
                    let _ = sender.send(AppEvent::ImageRead(pending.read().await));
                });
            }
        }
    }

    fn save(&mut self, entry: Entry) {
        let id = entry.id;
        let result = self.store.save_entry(entry);

        if self.store.contains(id) {
            self.store.render_to(&mut self.state.entries);
            self.state.entries.select_last();
            self.state.form.form.reset();
        }

        if let Err(err) = &result {
            tracing::warn!(%id, "entry not persisted: {err}");
        }
        let _ = self.sender.send(AppEvent::Saved(result));
    }
}
