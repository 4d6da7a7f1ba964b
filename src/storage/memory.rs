use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::application::DataService;
use crate::domain::{
    Customer, CustomerDetails, CustomerId, NewTransaction, Transaction, TransactionId,
};

#[derive(Debug, Default)]
struct Store {
    last_customer_id: CustomerId,
    last_transaction_id: TransactionId,
    customers: BTreeMap<CustomerId, Customer>,
    transactions: BTreeMap<TransactionId, Transaction>,
}

/// In-process data service. Nothing survives the process; ids are never reused.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    store: RwLock<Store>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DataService for MemoryRepository {
    async fn create_customer(&self, details: &CustomerDetails) -> Result<Customer> {
        let mut store = self.store.write().await;
        store.last_customer_id += 1;

        let customer = Customer {
            id: store.last_customer_id,
            name: details.name.clone(),
            email: details.email.clone(),
            phone: details.phone.clone(),
            created_at: Utc::now(),
        };
        store.customers.insert(customer.id, customer.clone());
        Ok(customer)
    }

    async fn update_customer(
        &self,
        id: CustomerId,
        details: &CustomerDetails,
    ) -> Result<Option<Customer>> {
        let mut store = self.store.write().await;
        Ok(store.customers.get_mut(&id).map(|customer| {
            customer.name = details.name.clone();
            customer.email = details.email.clone();
            customer.phone = details.phone.clone();
            customer.clone()
        }))
    }

    async fn delete_customer(&self, id: CustomerId) -> Result<()> {
        let mut store = self.store.write().await;
        store.customers.remove(&id);
        store.transactions.retain(|_, t| t.customer_id != id);
        Ok(())
    }

    async fn get_all_customers(&self) -> Result<Vec<Customer>> {
        let store = self.store.read().await;
        Ok(store.customers.values().cloned().collect())
    }

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        let store = self.store.read().await;
        Ok(store.customers.get(&id).cloned())
    }

    async fn create_transaction(&self, transaction: &NewTransaction) -> Result<Transaction> {
        let mut store = self.store.write().await;
        store.last_transaction_id += 1;

        let stored = Transaction {
            id: store.last_transaction_id,
            customer_id: transaction.customer_id,
            date: transaction.date,
            created_at: Utc::now(),
            description: transaction.description.clone(),
            debit: transaction.debit,
            credit: transaction.credit,
            balance: transaction.balance,
        };
        store.transactions.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn get_transactions_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Transaction>> {
        let store = self.store.read().await;
        Ok(store
            .transactions
            .values()
            .filter(|t| t.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let store = self.store.read().await;
        Ok(store.transactions.get(&id).cloned())
    }
}
