use std::{cell::Cell, path::PathBuf, rc::Rc};

use chrono::NaiveDate;
use ledger::{
    Candidate, ENTRIES_KEY, Entry, EntryBuilder, EntryStore, FileStorage, Form, HtmlSurface,
    LedgerError, MemoryStorage, Money, Payment, PaymentKind, ResultLedger, Storage,
};
use uuid::Uuid;

fn test_dir() -> PathBuf {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../target/test_ledgers");
    let dir = root.join(Uuid::new_v4().to_string());
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 12).unwrap()
}

fn memory_store() -> EntryStore {
    EntryStore::builder()
        .storage(MemoryStorage::new())
        .load()
        .unwrap()
}

fn filled_form(client: &str, total: &str, deposit: &str, sessions: &[&str]) -> Form {
    let mut form = Form::default();
    form.open(day());
    form.client = client.to_string();
    form.total = total.to_string();
    form.deposit = deposit.to_string();
    for amount in sessions {
        form.add_session(day());
        if let Some(row) = form.sessions.last_mut() {
            row.amount = amount.to_string();
        }
    }
    form
}

fn sample_entries() -> Vec<Entry> {
    let mut with_image = Entry::new(
        "2024-02-01".to_string(),
        "Giulia".to_string(),
        Money::new(12_050),
        vec![
            Payment::deposit(Money::new(2_025)).unwrap(),
            Payment::session(Money::new(3_000), Some("2024-02-08".to_string())).unwrap(),
            Payment::session(Money::new(1), None).unwrap(),
        ],
    );
    with_image.image = Some("data:image/png;base64,iVBORw0KGgo=".to_string());

    vec![
        with_image,
        Entry::new("2024-02-02".to_string(), String::new(), Money::ZERO, vec![]),
        Entry::new(
            "2024-02-03".to_string(),
            "Giulia".to_string(),
            Money::new(99_999_99),
            vec![Payment::session(Money::new(45_67), Some("2024-02-10".to_string())).unwrap()],
        ),
    ]
}

/// Storage whose writes fail while the switch is on.
struct FlakyStorage {
    inner: MemoryStorage,
    failing: Rc<Cell<bool>>,
}

impl Storage for FlakyStorage {
    fn read(&self, key: &str) -> ResultLedger<Option<String>> {
        self.inner.read(key)
    }

    fn write(&mut self, key: &str, value: &str) -> ResultLedger<()> {
        if self.failing.get() {
            return Err(LedgerError::Storage("quota exceeded".to_string()));
        }
        self.inner.write(key, value)
    }
}

#[test]
fn persisted_entries_reload_identically() {
    let dir = test_dir();
    let entries = sample_entries();

    let mut store = EntryStore::builder()
        .storage(FileStorage::new(&dir))
        .load()
        .unwrap();
    for entry in entries.clone() {
        store.save_entry(entry).unwrap();
    }
    drop(store);

    let reloaded = EntryStore::builder()
        .storage(FileStorage::new(&dir))
        .load()
        .unwrap();
    assert_eq!(reloaded.entries(), entries.as_slice());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn stored_document_is_a_plain_entry_array() {
    let dir = test_dir();
    let mut store = EntryStore::builder()
        .storage(FileStorage::new(&dir))
        .load()
        .unwrap();
    let entry = Entry::new(
        "2024-02-01".to_string(),
        "Ada".to_string(),
        Money::new(10_000),
        vec![Payment::deposit(Money::new(2_000)).unwrap()],
    );
    store.save_entry(entry.clone()).unwrap();

    let raw = std::fs::read_to_string(dir.join(format!("{ENTRIES_KEY}.json"))).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(
        value,
        serde_json::json!([{
            "id": entry.id.to_string(),
            "date": "2024-02-01",
            "client": "Ada",
            "total": 100,
            "payments": [{ "amount": 20, "type": "deposit" }],
            "image": null,
        }])
    );

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn corrupt_slot_fails_fast() {
    let storage = MemoryStorage::with_slot(ENTRIES_KEY, "{ not json");
    let err = EntryStore::builder().storage(storage).load().unwrap_err();
    assert!(matches!(err, LedgerError::CorruptStore { ref key, .. } if key == ENTRIES_KEY));
}

#[test]
fn stored_non_positive_payment_is_corrupt() {
    let raw = r#"[{"id":"5f0c6f4e-58a4-4b5e-9a3c-1b2d3e4f5a6b","date":"2023-12-01","client":"Old","total":80,"payments":[{"amount":0,"type":"deposit"}]}]"#;
    let err = EntryStore::builder()
        .storage(MemoryStorage::with_slot(ENTRIES_KEY, raw))
        .load()
        .unwrap_err();
    assert!(matches!(err, LedgerError::CorruptStore { ref key, .. } if key == ENTRIES_KEY));
}

#[test]
fn large_total_survives_reload() {
    let dir = test_dir();
    let total: Money = "9999999999999.99".parse().unwrap();
    let entry = Entry::new("2024-02-01".to_string(), "Big".to_string(), total, vec![]);
    {
        let mut store = EntryStore::builder()
            .storage(FileStorage::new(&dir))
            .load()
            .unwrap();
        store.save_entry(entry.clone()).unwrap();
    }
    let reloaded = EntryStore::builder()
        .storage(FileStorage::new(&dir))
        .load()
        .unwrap();
    assert_eq!(reloaded.entries(), [entry].as_slice());
}

#[test]
fn legacy_document_without_optional_fields_loads() {
    let raw = r#"[{"id":"5f0c6f4e-58a4-4b5e-9a3c-1b2d3e4f5a6b","date":"2023-12-01","client":"Old","total":80}]"#;
    let store = EntryStore::builder()
        .storage(MemoryStorage::with_slot(ENTRIES_KEY, raw))
        .load()
        .unwrap();
    assert_eq!(store.len(), 1);
    assert!(store.entries()[0].payments.is_empty());
    assert_eq!(store.entries()[0].image, None);
    assert_eq!(store.entries()[0].total, Money::new(8_000));
}

#[test]
fn failed_write_keeps_entry_in_memory() {
    let failing = Rc::new(Cell::new(true));
    let mut store = EntryStore::builder()
        .storage(FlakyStorage {
            inner: MemoryStorage::new(),
            failing: failing.clone(),
        })
        .load()
        .unwrap();

    let entry = sample_entries().remove(1);
    let err = store.save_entry(entry.clone()).unwrap_err();
    assert_eq!(err, LedgerError::Storage("quota exceeded".to_string()));
    assert!(store.contains(entry.id));
    assert!(store.is_dirty());

    failing.set(false);
    store.close().unwrap();
}

#[test]
fn close_skips_write_when_clean() {
    let failing = Rc::new(Cell::new(false));
    let mut store = EntryStore::builder()
        .storage(FlakyStorage {
            inner: MemoryStorage::new(),
            failing: failing.clone(),
        })
        .load()
        .unwrap();
    store.save_entry(sample_entries().remove(0)).unwrap();

    failing.set(true);
    store.close().unwrap();
}

#[test]
fn render_aggregates_and_is_idempotent() {
    let mut store = memory_store();
    for entry in sample_entries() {
        store.save_entry(entry).unwrap();
    }

    let first = store.render();
    let second = store.render();
    assert_eq!(first, second);

    let labels: Vec<String> = first.iter().map(|view| view.paid_label()).collect();
    assert_eq!(
        labels,
        vec![
            "Paid: $50.26 / $120.50".to_string(),
            "Paid: $0 / $0".to_string(),
            "Paid: $45.67 / $99999.99".to_string(),
        ]
    );
    for (view, entry) in first.iter().zip(store.entries()) {
        assert_eq!(view.earned, entry.payments.iter().map(|p| p.amount).sum::<Money>());
    }
}

#[test]
fn saves_only_ever_append() {
    let mut store = memory_store();
    store.save_entry(sample_entries().remove(0)).unwrap();
    let before = store.entries().to_vec();

    for entry in sample_entries() {
        store.save_entry(entry).unwrap();
    }

    assert_eq!(store.len(), before.len() + 3);
    assert_eq!(&store.entries()[..before.len()], before.as_slice());
}

#[tokio::test]
async fn scenario_deposit_and_sessions() {
    let builder = EntryBuilder::with_today(day());
    let mut store = memory_store();
    let mut surface = HtmlSurface::new();
    let mut form = filled_form("Marco", "100", "20", &["30", "0"]);

    let id = builder.submit(&mut form, &mut store, &mut surface).await.unwrap();

    let entry = &store.entries()[0];
    assert_eq!(entry.id, id);
    let payments: Vec<(Money, PaymentKind)> =
        entry.payments.iter().map(|p| (p.amount, p.kind)).collect();
    assert_eq!(
        payments,
        vec![
            (Money::new(2_000), PaymentKind::Deposit),
            (Money::new(3_000), PaymentKind::Payment),
        ]
    );
    assert_eq!(entry.earned(), Money::new(5_000));
    assert!(surface.html().contains("Paid: $50 / $100"));
    assert!(!form.visible);
    assert!(form.sessions.is_empty());
}

#[tokio::test]
async fn scenario_empty_entry() {
    let builder = EntryBuilder::with_today(day());
    let mut store = memory_store();
    let mut surface = HtmlSurface::new();
    let mut form = filled_form("Sara", "0", "", &[]);

    builder.submit(&mut form, &mut store, &mut surface).await.unwrap();

    let entry = &store.entries()[0];
    assert!(entry.payments.is_empty());
    assert_eq!(entry.earned(), Money::ZERO);
    assert_eq!(entry.image, None);
    assert!(surface.html().contains("$0 / $0"));
    assert!(!surface.html().contains("<img"));
}

#[tokio::test]
async fn scenario_negative_deposit_is_dropped() {
    let builder = EntryBuilder::with_today(day());
    let mut store = memory_store();
    let mut surface = HtmlSurface::new();
    let mut form = filled_form("Elena", "50", "-5", &[]);

    builder.submit(&mut form, &mut store, &mut surface).await.unwrap();

    assert!(store.entries()[0].payments.is_empty());
    assert_eq!(store.entries()[0].total, Money::new(5_000));
}

#[tokio::test]
async fn scenario_image_appends_after_read() {
    let dir = test_dir();
    let receipt = dir.join("receipt.png");
    std::fs::write(&receipt, b"png bytes").unwrap();

    let builder = EntryBuilder::with_today(day());
    let mut store = memory_store();
    let mut form = filled_form("Paolo", "40", "10", &[]);
    form.image = Some(receipt.clone());

    let candidate = builder.prepare(&form);
    let id = candidate.entry_id();
    assert!(matches!(candidate, Candidate::AwaitingImage(_)));
    assert_eq!(store.len(), 0);

    let entry = candidate.resolve().await.unwrap();
    assert_eq!(store.len(), 0);
    assert_eq!(
        entry.image.as_deref(),
        Some("data:image/png;base64,cG5nIGJ5dGVz")
    );

    store.save_entry(entry).unwrap();
    assert_eq!(store.len(), 1);
    assert!(store.contains(id));

    let views = store.render();
    let thumbnail = views[0].image.as_ref().unwrap();
    assert_eq!(thumbnail.width, ledger::THUMBNAIL_WIDTH);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn unreadable_image_never_appends() {
    let builder = EntryBuilder::with_today(day());
    let mut store = memory_store();
    let mut surface = HtmlSurface::new();
    let mut form = filled_form("Nina", "40", "", &[]);
    form.image = Some(test_dir().join("missing.jpg"));

    let err = builder
        .submit(&mut form, &mut store, &mut surface)
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::ImageRead { .. }));
    assert!(store.is_empty());
    assert!(form.visible);
}

#[tokio::test]
async fn failed_write_still_resets_form() {
    let failing = Rc::new(Cell::new(true));
    let mut store = EntryStore::builder()
        .storage(FlakyStorage {
            inner: MemoryStorage::new(),
            failing,
        })
        .load()
        .unwrap();
    let builder = EntryBuilder::with_today(day());
    let mut surface = HtmlSurface::new();
    let mut form = filled_form("Irene", "10", "", &["5"]);

    let err = builder
        .submit(&mut form, &mut store, &mut surface)
        .await
        .unwrap_err();

    assert_eq!(err, LedgerError::Storage("quota exceeded".to_string()));
    assert_eq!(store.len(), 1);
    assert!(!form.visible);
    assert!(surface.html().contains("Paid: $5 / $10"));
}
