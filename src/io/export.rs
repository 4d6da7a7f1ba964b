use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;

use crate::application::LedgerService;
use crate::domain::{format_cents, Cents, Customer, CustomerId, Transaction};

/// JSON document for a single customer's ledger
#[derive(Debug, Clone, Serialize)]
pub struct LedgerSnapshot {
    pub version: String,
    pub exported_at: DateTime<Utc>,
    pub customer: Customer,
    pub current_balance: Cents,
    pub transactions: Vec<Transaction>,
}

/// Exporter for writing a customer's ledger in display order
pub struct Exporter<'a> {
    service: &'a LedgerService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a LedgerService) -> Self {
        Self { service }
    }

    /// Export the ledger rows to CSV. Amounts are written as decimals.
    pub async fn export_ledger_csv<W: Write>(
        &self,
        customer_id: CustomerId,
        writer: W,
    ) -> Result<usize> {
        let ledger = self.service.customer_ledger(customer_id).await?.ledger;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "id",
            "date",
            "description",
            "debit",
            "credit",
            "balance",
            "created_at",
        ])?;

        for transaction in &ledger.transactions {
            csv_writer.write_record([
                transaction.id.to_string(),
                transaction.date.to_rfc3339(),
                transaction.description.clone(),
                format_cents(transaction.debit),
                format_cents(transaction.credit),
                format_cents(transaction.balance),
                transaction.created_at.to_rfc3339(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(ledger.len())
    }

    /// Export the customer and its ledger as a JSON snapshot. Amounts are integer cents.
    pub async fn export_ledger_json<W: Write>(
        &self,
        customer_id: CustomerId,
        mut writer: W,
    ) -> Result<LedgerSnapshot> {
        let view = self.service.customer_ledger(customer_id).await?;

        let snapshot = LedgerSnapshot {
            version: env!("CARGO_PKG_VERSION").to_string(),
            exported_at: Utc::now(),
            customer: view.customer,
            current_balance: view.ledger.current_balance,
            transactions: view.ledger.transactions,
        };

        let json = serde_json::to_string_pretty(&snapshot)?;
        writer.write_all(json.as_bytes())?;
        writer.flush()?;

        Ok(snapshot)
    }
}
