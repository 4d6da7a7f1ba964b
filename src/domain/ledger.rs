use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Cents, EntryType, Transaction, TransactionId};

/// A customer's transactions in display order, with the balance shown as "current".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ledger {
    pub transactions: Vec<Transaction>,
    pub current_balance: Cents,
}

impl Ledger {
    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Sum of all debits, or `None` if it does not fit in `Cents`.
    pub fn total_debits(&self) -> Option<Cents> {
        self.transactions
            .iter()
            .try_fold(0, |total: Cents, t| total.checked_add(t.debit))
    }

    /// Sum of all credits, or `None` if it does not fit in `Cents`.
    pub fn total_credits(&self) -> Option<Cents> {
        self.transactions
            .iter()
            .try_fold(0, |total: Cents, t| total.checked_add(t.credit))
    }
}

/// Display order: ascending by occurrence date.
/// Same-date entries fall back to creation time, then id.
fn chronological(a: &Transaction, b: &Transaction) -> Ordering {
    a.date
        .cmp(&b.date)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}

/// Build the display-ready ledger from a customer's transactions in any order.
///
/// Stored balances are taken as-is. The current balance is the snapshot on the
/// last entry in display order, or 0 when there are no entries.
pub fn compute_ledger(transactions: &[Transaction]) -> Ledger {
    let mut ordered = transactions.to_vec();
    ordered.sort_by(chronological);

    let current_balance = ordered.last().map(|t| t.balance).unwrap_or(0);

    Ledger {
        transactions: ordered,
        current_balance,
    }
}

/// Balance snapshot for a new entry of `amount` on top of `current_balance`.
/// Amount validation belongs to the caller.
pub fn compute_new_balance(current_balance: Cents, entry_type: EntryType, amount: Cents) -> Cents {
    match entry_type {
        EntryType::Credit => current_balance + amount,
        EntryType::Debit => current_balance - amount,
    }
}

/// An entry whose stored snapshot disagrees with a chronological replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceDrift {
    pub transaction_id: TransactionId,
    pub date: DateTime<Utc>,
    pub stored: Cents,
    /// Replayed balance, or `None` once the replay no longer fits in `Cents`.
    pub expected: Option<Cents>,
}

impl BalanceDrift {
    pub fn difference(&self) -> Option<Cents> {
        self.expected.and_then(|expected| self.stored.checked_sub(expected))
    }
}

/// Replay the ledger in display order starting from 0 and report every entry
/// whose stored balance differs from the replayed running balance.
///
/// Backdated entries are the usual cause: their snapshot was taken from the
/// latest balance at creation time, and later-dated snapshots are never revised.
/// Once the replay overflows, every remaining entry is reported without an
/// expected balance.
pub fn find_balance_drift(transactions: &[Transaction]) -> Vec<BalanceDrift> {
    let ledger = compute_ledger(transactions);
    let mut running: Option<Cents> = Some(0);
    let mut drifts = Vec::new();

    for transaction in &ledger.transactions {
        running = running.and_then(|r| r.checked_add(transaction.net_change()));
        if running != Some(transaction.balance) {
            drifts.push(BalanceDrift {
                transaction_id: transaction.id,
                date: transaction.date,
                stored: transaction.balance,
                expected: running,
            });
        }
    }

    drifts
}
