use anyhow::Result;
use async_trait::async_trait;

use crate::domain::{
    Customer, CustomerDetails, CustomerId, NewTransaction, Transaction, TransactionId,
};

/// Storage boundary for customers and their transactions.
///
/// Implementations assign ids and creation timestamps. Single-entity lookups
/// return `Ok(None)` for unknown ids; `Err` always means the operation was rejected.
#[async_trait]
pub trait DataService: Send + Sync {
    async fn create_customer(&self, details: &CustomerDetails) -> Result<Customer>;

    /// Replace the editable fields of a customer. `Ok(None)` if the id is unknown.
    async fn update_customer(
        &self,
        id: CustomerId,
        details: &CustomerDetails,
    ) -> Result<Option<Customer>>;

    /// Remove a customer together with its transactions. Unknown ids are not an error.
    async fn delete_customer(&self, id: CustomerId) -> Result<()>;

    /// All customers, in no particular order.
    async fn get_all_customers(&self) -> Result<Vec<Customer>>;

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>>;

    /// Append a transaction. The balance snapshot is stored exactly as given.
    async fn create_transaction(&self, transaction: &NewTransaction) -> Result<Transaction>;

    /// A customer's transactions, in no particular order.
    async fn get_transactions_by_customer(&self, customer_id: CustomerId)
    -> Result<Vec<Transaction>>;

    async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>>;
}
