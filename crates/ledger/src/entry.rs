//! Entry primitives.
//!
//! An `Entry` is one client's billing record: what the client owes and the
//! `Payment`s received so far. Entries are never edited once stored, so the
//! paid amount is always derived from `payments` instead of being kept next
//! to `total`.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, de};
use uuid::Uuid;

use crate::{LedgerError, Money, ResultLedger};

/// Stable identifier of an [`Entry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(Uuid);

impl EntryId {
    /// Generates a fresh, random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    /// Upfront amount, at most one per entry.
    Deposit,
    /// One session row.
    Payment,
}

impl PaymentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "deposit",
            Self::Payment => "payment",
        }
    }
}

/// A received amount. Always positive, whether built here or read back from
/// storage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PaymentRecord")]
pub struct Payment {
    pub amount: Money,
    #[serde(rename = "type")]
    pub kind: PaymentKind,
    /// Day of the session, as typed in the session row.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Deserialize)]
struct PaymentRecord {
    amount: Money,
    #[serde(rename = "type")]
    kind: PaymentKind,
    #[serde(default)]
    date: Option<String>,
}

impl TryFrom<PaymentRecord> for Payment {
    type Error = LedgerError;

    fn try_from(record: PaymentRecord) -> ResultLedger<Self> {
        Self::new(record.amount, record.kind, record.date)
    }
}

impl Payment {
    pub fn new(amount: Money, kind: PaymentKind, date: Option<String>) -> ResultLedger<Self> {
        if !amount.is_positive() {
            return Err(LedgerError::InvalidAmount(format!(
                "{} must be > 0, got {amount}",
                kind.as_str()
            )));
        }
        Ok(Self { amount, kind, date })
    }

    pub fn deposit(amount: Money) -> ResultLedger<Self> {
        Self::new(amount, PaymentKind::Deposit, None)
    }

    pub fn session(amount: Money, date: Option<String>) -> ResultLedger<Self> {
        Self::new(amount, PaymentKind::Payment, date)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: EntryId,
    pub date: String,
    pub client: String,
    #[serde(deserialize_with = "non_negative")]
    pub total: Money,
    #[serde(default)]
    pub payments: Vec<Payment>,
    /// Receipt as a `data:` URI.
    #[serde(default)]
    pub image: Option<String>,
}

impl Entry {
    pub fn new(date: String, client: String, total: Money, payments: Vec<Payment>) -> Self {
        Self {
            id: EntryId::new(),
            date,
            client,
            total,
            payments,
            image: None,
        }
    }

    /// Sum of every payment received for this entry.
    #[must_use]
    pub fn earned(&self) -> Money {
        self.payments.iter().map(|payment| payment.amount).sum()
    }
}

fn non_negative<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Money, D::Error> {
    let amount = Money::deserialize(deserializer)?;
    if amount.is_negative() {
        return Err(de::Error::custom(format!("total must be >= 0, got {amount}")));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_refuses_non_positive_amounts() {
        assert!(Payment::deposit(Money::ZERO).is_err());
        assert!(Payment::session(Money::new(-500), None).is_err());
        let ok = Payment::session(Money::new(3000), Some("2024-03-02".to_string())).unwrap();
        assert_eq!(ok.kind, PaymentKind::Payment);
        assert_eq!(ok.date.as_deref(), Some("2024-03-02"));
    }

    #[test]
    fn earned_sums_payments() {
        let entry = Entry::new(
            "2024-03-01".to_string(),
            "Ada".to_string(),
            Money::new(10_000),
            vec![
                Payment::deposit(Money::new(2000)).unwrap(),
                Payment::session(Money::new(3000), None).unwrap(),
            ],
        );
        assert_eq!(entry.earned(), Money::new(5000));

        let empty = Entry::new("2024-03-01".to_string(), "Bo".to_string(), Money::ZERO, vec![]);
        assert_eq!(empty.earned(), Money::ZERO);
    }

    #[test]
    fn serialized_shape_matches_storage_format() {
        let entry = Entry::new(
            "2024-03-01".to_string(),
            "Ada".to_string(),
            Money::new(10_000),
            vec![
                Payment::deposit(Money::new(2000)).unwrap(),
                Payment::session(Money::new(3050), Some("2024-03-08".to_string())).unwrap(),
            ],
        );
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["id"], entry.id.to_string());
        assert_eq!(value["total"], 100);
        assert_eq!(value["payments"][0]["type"], "deposit");
        assert_eq!(value["payments"][0]["amount"], 20);
        assert!(value["payments"][0].get("date").is_none());
        assert_eq!(value["payments"][1]["type"], "payment");
        assert_eq!(value["payments"][1]["amount"], 30.5);
        assert_eq!(value["payments"][1]["date"], "2024-03-08");
        assert!(value["image"].is_null());
    }

    #[test]
    fn stored_payments_keep_the_positive_amount_rule() {
        let ok: Payment = serde_json::from_str(r#"{"amount":12.5,"type":"payment"}"#).unwrap();
        assert_eq!(ok.amount, Money::new(1250));
        assert_eq!(ok.date, None);

        assert!(serde_json::from_str::<Payment>(r#"{"amount":0,"type":"deposit"}"#).is_err());
        assert!(serde_json::from_str::<Payment>(r#"{"amount":-3,"type":"payment"}"#).is_err());
    }

    #[test]
    fn stored_total_is_never_negative() {
        let raw = r#"{"id":"5f0c6f4e-58a4-4b5e-9a3c-1b2d3e4f5a6b","date":"2024-01-01","client":"Ada","total":-1}"#;
        assert!(serde_json::from_str::<Entry>(raw).is_err());
        let zero = raw.replace("-1", "0");
        assert_eq!(serde_json::from_str::<Entry>(&zero).unwrap().total, Money::ZERO);
    }
}
