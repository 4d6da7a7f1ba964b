use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::domain::{
    compute_ledger, find_balance_drift, parse_amount, require, to_nanos, BalanceDrift, Cents,
    Customer, CustomerDetails, CustomerId, EntryType, Ledger, NewTransaction, Transaction,
    TransactionId, ValidationError,
};
use crate::storage::Repository;

use super::{AppError, DataService};

/// Application service providing the customer-ledger use cases.
/// This is the primary interface for any client (CLI, API, TUI, etc.).
pub struct LedgerService {
    data: Arc<dyn DataService>,
}

/// Raw input of the "add transaction" form, validated before anything is stored.
#[derive(Debug, Clone)]
pub struct TransactionForm {
    pub date: DateTime<Utc>,
    pub description: String,
    pub entry_type: EntryType,
    pub amount: String,
}

/// A customer together with its display-ordered ledger
pub struct CustomerLedger {
    pub customer: Customer,
    pub ledger: Ledger,
}

/// One row of the customer directory
pub struct CustomerSummary {
    pub customer: Customer,
    pub transaction_count: usize,
    pub current_balance: Cents,
}

/// Result of replaying one customer's ledger
pub struct DriftReport {
    pub customer: Customer,
    pub transaction_count: usize,
    pub drifts: Vec<BalanceDrift>,
}

impl DriftReport {
    pub fn is_consistent(&self) -> bool {
        self.drifts.is_empty()
    }
}

impl LedgerService {
    /// Create a ledger service on top of any data service.
    pub fn new(data: Arc<dyn DataService>) -> Self {
        Self { data }
    }

    /// Initialize a new SQLite database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(Arc::new(repo)))
    }

    /// Connect to an existing SQLite database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(Arc::new(repo)))
    }

    // ========================
    // Customer operations
    // ========================

    /// Create a new customer.
    pub async fn create_customer(&self, details: CustomerDetails) -> Result<Customer, AppError> {
        let details = details.validated()?;
        let customer = self.data.create_customer(&details).await?;
        info!(customer_id = customer.id, name = %customer.name, "customer created");
        Ok(customer)
    }

    /// Replace a customer's name, email and phone.
    pub async fn update_customer(
        &self,
        id: CustomerId,
        details: CustomerDetails,
    ) -> Result<Customer, AppError> {
        let details = details.validated()?;
        let customer = self
            .data
            .update_customer(id, &details)
            .await?
            .ok_or(AppError::CustomerNotFound(id))?;
        info!(customer_id = id, "customer updated");
        Ok(customer)
    }

    /// Delete a customer and its transactions.
    pub async fn delete_customer(&self, id: CustomerId) -> Result<Customer, AppError> {
        let customer = self.customer(id).await?;
        self.data.delete_customer(id).await?;
        info!(customer_id = id, "customer deleted");
        Ok(customer)
    }

    /// Look up a customer. An unknown id is `Ok(None)`, not an error.
    pub async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>, AppError> {
        debug!(customer_id = id, "fetching customer");
        Ok(self.data.get_customer(id).await?)
    }

    /// Look up a customer that must exist.
    pub async fn customer(&self, id: CustomerId) -> Result<Customer, AppError> {
        self.get_customer(id)
            .await?
            .ok_or(AppError::CustomerNotFound(id))
    }

    /// List all customers in creation order.
    pub async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        let mut customers = self.data.get_all_customers().await?;
        customers.sort_by_key(|c| c.id);
        Ok(customers)
    }

    /// List all customers with their transaction count and current balance.
    pub async fn list_customer_summaries(&self) -> Result<Vec<CustomerSummary>, AppError> {
        let customers = self.list_customers().await?;
        let mut summaries = Vec::with_capacity(customers.len());

        for customer in customers {
            let transactions = self.data.get_transactions_by_customer(customer.id).await?;
            let ledger = compute_ledger(&transactions);
            summaries.push(CustomerSummary {
                customer,
                transaction_count: ledger.len(),
                current_balance: ledger.current_balance,
            });
        }

        Ok(summaries)
    }

    // ========================
    // Ledger operations
    // ========================

    /// Load a customer's ledger in display order.
    pub async fn customer_ledger(
        &self,
        customer_id: CustomerId,
    ) -> Result<CustomerLedger, AppError> {
        let customer = self.customer(customer_id).await?;
        let transactions = self.data.get_transactions_by_customer(customer_id).await?;
        debug!(
            customer_id,
            count = transactions.len(),
            "fetched transactions"
        );

        Ok(CustomerLedger {
            customer,
            ledger: compute_ledger(&transactions),
        })
    }

    /// Append a debit or credit entry to a customer's ledger.
    ///
    /// The new entry's stored balance is the current balance (last entry in date
    /// order) plus credit minus debit. Earlier snapshots are left untouched, so a
    /// backdated entry can leave the ledger inconsistent; see [`Self::check_balances`].
    pub async fn add_transaction(
        &self,
        customer_id: CustomerId,
        form: TransactionForm,
    ) -> Result<Transaction, AppError> {
        let description = require("Description", &form.description)?;
        let amount = parse_amount(&form.amount)?;
        if to_nanos(form.date).is_none() {
            return Err(ValidationError::DateOutOfRange(form.date.to_rfc3339()).into());
        }

        let current = self.customer_ledger(customer_id).await?;
        let current_balance = current.ledger.current_balance;

        let headroom = match form.entry_type {
            EntryType::Credit => current_balance.checked_add(amount),
            EntryType::Debit => current_balance.checked_sub(amount),
        };
        if headroom.is_none() {
            return Err(ValidationError::InvalidAmount {
                input: form.amount,
                reason: "balance would overflow".to_string(),
            }
            .into());
        }

        let entry = NewTransaction::entry(
            customer_id,
            form.date,
            description,
            form.entry_type,
            amount,
            current_balance,
        );
        let transaction = self.data.create_transaction(&entry).await?;

        info!(
            customer_id,
            transaction_id = transaction.id,
            entry_type = %form.entry_type,
            amount,
            balance = transaction.balance,
            "transaction recorded"
        );
        Ok(transaction)
    }

    /// Get a transaction by id.
    pub async fn get_transaction(&self, id: TransactionId) -> Result<Transaction, AppError> {
        self.data
            .get_transaction(id)
            .await?
            .ok_or(AppError::TransactionNotFound(id))
    }

    /// Replay ledgers and report entries whose stored balance disagrees with
    /// chronological order. Checks one customer, or all when `customer_id` is `None`.
    /// Nothing is rewritten.
    pub async fn check_balances(
        &self,
        customer_id: Option<CustomerId>,
    ) -> Result<Vec<DriftReport>, AppError> {
        let customers = match customer_id {
            Some(id) => vec![self.customer(id).await?],
            None => self.list_customers().await?,
        };

        let mut reports = Vec::with_capacity(customers.len());
        for customer in customers {
            let transactions = self.data.get_transactions_by_customer(customer.id).await?;
            let drifts = find_balance_drift(&transactions);
            if !drifts.is_empty() {
                warn!(
                    customer_id = customer.id,
                    drifted = drifts.len(),
                    "stored balances disagree with chronological order"
                );
            }
            reports.push(DriftReport {
                customer,
                transaction_count: transactions.len(),
                drifts,
            });
        }

        Ok(reports)
    }
}
