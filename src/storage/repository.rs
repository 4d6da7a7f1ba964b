use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use crate::application::DataService;
use crate::domain::{
    from_nanos, to_nanos, Customer, CustomerDetails, CustomerId, Nanos, NewTransaction,
    Transaction, TransactionId,
};

use super::MIGRATION_001_INITIAL;

const CUSTOMER_COLUMNS: &str = "id, name, email, phone, created_at";
const TRANSACTION_COLUMNS: &str =
    "id, customer_id, date, created_at, description, debit, credit, balance";

/// SQLite-backed data service.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database URL.
    /// Use `?mode=rwc` in the URL to create the file when missing.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePool::connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database {}", database_url))?;
        Ok(Self::new(pool))
    }

    /// Run database migrations. Safe to run on every start.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Connect and migrate.
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    fn now_nanos() -> Result<Nanos> {
        to_nanos(Utc::now()).ok_or_else(|| anyhow!("System clock is outside the supported range"))
    }

    fn encode_time(timestamp: DateTime<Utc>) -> Result<Nanos> {
        to_nanos(timestamp)
            .ok_or_else(|| anyhow!("Timestamp out of range: {}", timestamp.to_rfc3339()))
    }

    fn row_to_customer(row: &SqliteRow) -> Result<Customer> {
        Ok(Customer {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            created_at: from_nanos(row.try_get("created_at")?),
        })
    }

    fn row_to_transaction(row: &SqliteRow) -> Result<Transaction> {
        Ok(Transaction {
            id: row.try_get("id")?,
            customer_id: row.try_get("customer_id")?,
            date: from_nanos(row.try_get("date")?),
            created_at: from_nanos(row.try_get("created_at")?),
            description: row.try_get("description")?,
            debit: row.try_get("debit")?,
            credit: row.try_get("credit")?,
            balance: row.try_get("balance")?,
        })
    }
}

#[async_trait]
impl DataService for Repository {
    async fn create_customer(&self, details: &CustomerDetails) -> Result<Customer> {
        let created_at = Self::now_nanos()?;

        let result = sqlx::query(
            r#"
            INSERT INTO customers (name, email, phone, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&details.name)
        .bind(&details.email)
        .bind(&details.phone)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .context("Failed to save customer")?;

        Ok(Customer {
            id: result.last_insert_rowid(),
            name: details.name.clone(),
            email: details.email.clone(),
            phone: details.phone.clone(),
            created_at: from_nanos(created_at),
        })
    }

    async fn update_customer(
        &self,
        id: CustomerId,
        details: &CustomerDetails,
    ) -> Result<Option<Customer>> {
        let result = sqlx::query("UPDATE customers SET name = ?, email = ?, phone = ? WHERE id = ?")
            .bind(&details.name)
            .bind(&details.email)
            .bind(&details.phone)
            .bind(id)
            .execute(&self.pool)
            .await
            .context("Failed to update customer")?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_customer(id).await
    }

    async fn delete_customer(&self, id: CustomerId) -> Result<()> {
        let mut tx = self.pool.begin().await.context("Failed to begin delete")?;

        let removed = sqlx::query("DELETE FROM transactions WHERE customer_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete customer transactions")?;

        sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete customer")?;

        tx.commit().await.context("Failed to commit delete")?;
        debug!(
            customer_id = id,
            transactions = removed.rows_affected(),
            "deleted customer rows"
        );
        Ok(())
    }

    async fn get_all_customers(&self) -> Result<Vec<Customer>> {
        let rows = sqlx::query(&format!("SELECT {} FROM customers", CUSTOMER_COLUMNS))
            .fetch_all(&self.pool)
            .await
            .context("Failed to list customers")?;

        rows.iter().map(Self::row_to_customer).collect()
    }

    async fn get_customer(&self, id: CustomerId) -> Result<Option<Customer>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM customers WHERE id = ?",
            CUSTOMER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch customer")?;

        row.as_ref().map(Self::row_to_customer).transpose()
    }

    async fn create_transaction(&self, transaction: &NewTransaction) -> Result<Transaction> {
        let created_at = Self::now_nanos()?;
        let date = Self::encode_time(transaction.date)?;

        let result = sqlx::query(
            r#"
            INSERT INTO transactions
                (customer_id, date, created_at, description, debit, credit, balance)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(transaction.customer_id)
        .bind(date)
        .bind(created_at)
        .bind(&transaction.description)
        .bind(transaction.debit)
        .bind(transaction.credit)
        .bind(transaction.balance)
        .execute(&self.pool)
        .await
        .context("Failed to save transaction")?;

        Ok(Transaction {
            id: result.last_insert_rowid(),
            customer_id: transaction.customer_id,
            date: from_nanos(date),
            created_at: from_nanos(created_at),
            description: transaction.description.clone(),
            debit: transaction.debit,
            credit: transaction.credit,
            balance: transaction.balance,
        })
    }

    async fn get_transactions_by_customer(
        &self,
        customer_id: CustomerId,
    ) -> Result<Vec<Transaction>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM transactions WHERE customer_id = ?",
            TRANSACTION_COLUMNS
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list transactions for customer")?;

        rows.iter().map(Self::row_to_transaction).collect()
    }

    async fn get_transaction(&self, id: TransactionId) -> Result<Option<Transaction>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM transactions WHERE id = ?",
            TRANSACTION_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch transaction")?;

        row.as_ref().map(Self::row_to_transaction).transpose()
    }
}
