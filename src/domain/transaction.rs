use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{compute_new_balance, Cents, CustomerId, ValidationError};

pub type TransactionId = i64;

/// Whether an entry takes money out of (debit) or puts money into (credit) the customer's account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Debit,
    Credit,
}

impl EntryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Debit => "debit",
            EntryType::Credit => "credit",
        }
    }
}

impl std::str::FromStr for EntryType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "debit" => Ok(EntryType::Debit),
            "credit" => Ok(EntryType::Credit),
            _ => Err(ValidationError::InvalidEntryType(s.to_string())),
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ledger entry. Transactions are append-only: never edited, never deleted on their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub customer_id: CustomerId,
    /// When the transaction happened, as chosen by the user
    pub date: DateTime<Utc>,
    /// When the data service recorded it
    pub created_at: DateTime<Utc>,
    pub description: String,
    pub debit: Cents,
    pub credit: Cents,
    /// Running balance snapshot taken at creation time; never recomputed
    pub balance: Cents,
}

impl Transaction {
    /// The entry type, when exactly one side of the entry is non-zero.
    pub fn entry_type(&self) -> Option<EntryType> {
        match (self.debit > 0, self.credit > 0) {
            (true, false) => Some(EntryType::Debit),
            (false, true) => Some(EntryType::Credit),
            _ => None,
        }
    }

    /// Effect of this entry on the running balance.
    pub fn net_change(&self) -> Cents {
        self.credit - self.debit
    }
}

/// Everything the data service needs to append a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTransaction {
    pub customer_id: CustomerId,
    pub date: DateTime<Utc>,
    pub description: String,
    pub debit: Cents,
    pub credit: Cents,
    pub balance: Cents,
}

impl NewTransaction {
    /// Build a single-sided entry on top of `current_balance`.
    pub fn entry(
        customer_id: CustomerId,
        date: DateTime<Utc>,
        description: impl Into<String>,
        entry_type: EntryType,
        amount: Cents,
        current_balance: Cents,
    ) -> Self {
        let (debit, credit) = match entry_type {
            EntryType::Debit => (amount, 0),
            EntryType::Credit => (0, amount),
        };
        Self {
            customer_id,
            date,
            description: description.into(),
            debit,
            credit,
            balance: compute_new_balance(current_balance, entry_type, amount),
        }
    }
}
