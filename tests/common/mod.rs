// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use ledgerbook::application::{DataService, LedgerService, TransactionForm};
use ledgerbook::domain::{
    Customer, CustomerDetails, CustomerId, EntryType, NewTransaction, Transaction, TransactionId,
};
use ledgerbook::storage::MemoryRepository;
use tempfile::TempDir;

/// Helper to create a test service with a temporary database
pub async fn test_service() -> Result<(LedgerService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let service = LedgerService::init(db_path.to_str().unwrap()).await?;
    Ok((service, temp_dir))
}

/// Helper to parse a date string into DateTime<Utc>
pub fn parse_date(date_str: &str) -> DateTime<Utc> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        .and_utc()
}

pub fn jane() -> CustomerDetails {
    CustomerDetails::new("Jane Doe", "jane@example.com", "+1 (555) 123-4567")
}

pub fn john() -> CustomerDetails {
    CustomerDetails::new("John Roe", "john@example.com", "555-0100")
}

pub fn entry(entry_type: EntryType, amount: &str, date: &str, description: &str) -> TransactionForm {
    TransactionForm {
        date: parse_date(date),
        description: description.to_string(),
        entry_type,
        amount: amount.to_string(),
    }
}

pub async fn credit(
    service: &LedgerService,
    customer: CustomerId,
    amount: &str,
    date: &str,
) -> Result<Transaction> {
    Ok(service
        .add_transaction(customer, entry(EntryType::Credit, amount, date, "Payment received"))
        .await?)
}

pub async fn debit(
    service: &LedgerService,
    customer: CustomerId,
    amount: &str,
    date: &str,
) -> Result<Transaction> {
    Ok(service
        .add_transaction(customer, entry(EntryType::Debit, amount, date, "Invoice"))
        .await?)
}

/// Data service wrapper that counts every call reaching the storage boundary.
#[derive(Default)]
pub struct CountingService {
    inner: MemoryRepository,
    calls: AtomicUsize,
}

impl CountingService {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DataService for CountingService {
    async fn create_customer(&self, details: &CustomerDetails) -> Result<Customer> {
        self.hit();
        self.inner.create_customer(details).await
    }

    async fn update_customer(
        &self,
        id: CustomerId,
        details: &CustomerDetails,
    ) -> Result<Option<Customer>> {
        self.hit();
        self.inner.update_customer(id, details).await
    }

    async fn delete_customer(&self, id: CustomerId) -> Result<()> {
        self.hit();
        self.inner.delete_customer(id).await
    }

    async fn get_all_customers(&self) -> Result<Vec<Customer>> {
        self.hit();
        self.inner.get_all_customers().await
    }

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        self.hit();
        self.inner.get_customer(id).await
    }

    async fn create_transaction(&self, transaction: &NewTransaction) -> Result<Transaction> {
        self.hit();
        self.inner.create_transaction(transaction).await
    }

    async fn get_transactions_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Transaction>> {
        self.hit();
        self.inner.get_transactions_by_customer(customer_id).await
    }

    async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>> {
        self.hit();
        self.inner.get_transaction(id).await
    }
}

/// A service over a counting in-memory store, plus a handle to read the count.
pub fn counting_service() -> (LedgerService, Arc<CountingService>) {
    let counter = Arc::new(CountingService::default());
    let service = LedgerService::new(counter.clone());
    (service, counter)
}

/// Data service whose every operation is rejected.
pub struct FailingService;

#[async_trait]
impl DataService for FailingService {
    async fn create_customer(&self, _details: &CustomerDetails) -> Result<Customer> {
        anyhow::bail!("service unavailable")
    }

    async fn update_customer(
        &self,
        _id: CustomerId,
        _details: &CustomerDetails,
    ) -> Result<Option<Customer>> {
        anyhow::bail!("service unavailable")
    }

    async fn delete_customer(&self, _id: CustomerId) -> Result<()> {
        anyhow::bail!("service unavailable")
    }

    async fn get_all_customers(&self) -> Result<Vec<Customer>> {
        anyhow::bail!("service unavailable")
    }

    async fn get_customer(&self, _id: CustomerId) -> Result<Option<Customer>> {
        anyhow::bail!("service unavailable")
    }

    async fn create_transaction(&self, _transaction: &NewTransaction) -> Result<Transaction> {
        anyhow::bail!("service unavailable")
    }

    async fn get_transactions_by_customer(
        &self,
        _customer_id: CustomerId,
    ) -> Result<Vec<Transaction>> {
        anyhow::bail!("service unavailable")
    }

    async fn get_transaction(&self, _id: TransactionId) -> Result<Option<Transaction>> {
        anyhow::bail!("service unavailable")
    }
}
