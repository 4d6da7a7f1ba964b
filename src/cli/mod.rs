use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};

use crate::application::{AppError, LedgerService, TransactionForm};
use crate::domain::{
    format_cents, parse_date, Cents, CustomerDetails, CustomerId, EntryType, TransactionId,
};

/// ledgerbook - Customer Ledger
#[derive(Parser)]
#[command(name = "ledgerbook")]
#[command(about = "Keep customer records and an append-only debit/credit ledger per customer")]
#[command(version)]
pub struct Cli {
    /// Database file path
    #[arg(short, long, env = "LEDGERBOOK_DB", default_value = "ledgerbook.db")]
    pub database: String,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize a new database
    Init,

    /// Customer management commands
    #[command(subcommand)]
    Customer(CustomerCommands),

    /// Show a customer's ledger with running balances
    Ledger {
        /// Customer ID
        customer: CustomerId,
    },

    /// Add a debit or credit entry to a customer's ledger
    Add {
        /// Customer ID
        customer: CustomerId,

        /// Entry type: debit (money out) or credit (money in)
        #[arg(short = 't', long = "type", default_value = "credit")]
        entry_type: String,

        /// Amount (e.g., "100.00" or "100")
        #[arg(short, long, allow_hyphen_values = true)]
        amount: String,

        /// Description (e.g., "Payment received, Invoice #123")
        #[arg(short, long)]
        description: String,

        /// Date of the transaction (YYYY-MM-DD, defaults to now)
        #[arg(long)]
        date: Option<String>,
    },

    /// Show detailed transaction information
    Transaction {
        /// Transaction ID
        id: TransactionId,
    },

    /// Report entries whose stored balance disagrees with date order
    Check {
        /// Customer ID (omit to check all customers)
        customer: Option<CustomerId>,
    },

    /// Export a customer's ledger to CSV or JSON
    Export {
        /// Customer ID
        customer: CustomerId,

        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum CustomerCommands {
    /// Create a new customer
    Create {
        /// Customer name
        name: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Phone number
        #[arg(short, long)]
        phone: String,
    },

    /// List all customers with their current balance
    List,

    /// Show customer details
    Show {
        /// Customer ID
        id: CustomerId,
    },

    /// Edit a customer (omitted fields keep their value)
    Edit {
        /// Customer ID
        id: CustomerId,

        /// New name
        #[arg(short, long)]
        name: Option<String>,

        /// New email address
        #[arg(short, long)]
        email: Option<String>,

        /// New phone number
        #[arg(short, long)]
        phone: Option<String>,
    },

    /// Delete a customer and all its transactions
    Delete {
        /// Customer ID
        id: CustomerId,
    },
}

/// Data service failures become a generic "Failed to ..." notification.
/// Validation and not-found errors are shown as they are.
fn notify(action: &'static str) -> impl FnOnce(AppError) -> anyhow::Error {
    move |err| match err {
        AppError::DataService(source) => source.context(format!("Failed to {}", action)),
        other => anyhow::Error::new(other),
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => {
                LedgerService::init(&self.database)
                    .await
                    .map_err(notify("initialize database"))?;
                println!("Database initialized: {}", self.database);
            }

            Commands::Customer(customer_cmd) => {
                let service = connect(&self.database).await?;
                run_customer_command(&service, customer_cmd).await?;
            }

            Commands::Ledger { customer } => {
                let service = connect(&self.database).await?;
                run_ledger_command(&service, customer).await?;
            }

            Commands::Add {
                customer,
                entry_type,
                amount,
                description,
                date,
            } => {
                let entry_type: EntryType = entry_type.parse()?;
                let date = match date {
                    Some(date_str) => parse_date(&date_str).with_context(|| {
                        format!("Invalid date format '{}'. Use YYYY-MM-DD", date_str)
                    })?,
                    None => Utc::now(),
                };

                let service = connect(&self.database).await?;
                let form = TransactionForm {
                    date,
                    description,
                    entry_type,
                    amount,
                };
                let transaction = service
                    .add_transaction(customer, form)
                    .await
                    .map_err(notify("add transaction"))?;

                println!(
                    "Recorded {}: {} on {} (balance {}) [{}]",
                    entry_type,
                    format_cents(transaction.debit + transaction.credit),
                    transaction.date.format("%Y-%m-%d"),
                    format_cents(transaction.balance),
                    transaction.id
                );
            }

            Commands::Transaction { id } => {
                let service = connect(&self.database).await?;
                run_show_transaction_command(&service, id).await?;
            }

            Commands::Check { customer } => {
                let service = connect(&self.database).await?;
                run_check_command(&service, customer).await?;
            }

            Commands::Export {
                customer,
                format,
                output,
            } => {
                let service = connect(&self.database).await?;
                run_export_command(&service, customer, &format, output.as_deref()).await?;
            }
        }

        Ok(())
    }
}

async fn connect(database: &str) -> Result<LedgerService> {
    LedgerService::connect(database)
        .await
        .map_err(notify("open database"))
        .with_context(|| format!("Is '{}' initialized? Run `ledgerbook init` first", database))
}

async fn run_customer_command(service: &LedgerService, cmd: CustomerCommands) -> Result<()> {
    match cmd {
        CustomerCommands::Create { name, email, phone } => {
            let customer = service
                .create_customer(CustomerDetails::new(name, email, phone))
                .await
                .map_err(notify("create customer"))?;
            println!("Created customer: {} ({})", customer.name, customer.id);
        }

        CustomerCommands::List => {
            let summaries = service
                .list_customer_summaries()
                .await
                .map_err(notify("load customers"))?;
            if summaries.is_empty() {
                println!("No customers yet.");
            } else {
                println!(
                    "{:<6} {:<24} {:<28} {:<18} {:>6} {:>14}",
                    "ID", "NAME", "EMAIL", "PHONE", "TXNS", "BALANCE"
                );
                println!("{}", "-".repeat(101));
                for summary in summaries {
                    let customer = &summary.customer;
                    println!(
                        "{:<6} {:<24} {:<28} {:<18} {:>6} {:>14}",
                        customer.id,
                        truncate(&customer.name, 24),
                        truncate(&customer.email, 28),
                        truncate(&customer.phone, 18),
                        summary.transaction_count,
                        format_cents(summary.current_balance)
                    );
                }
            }
        }

        CustomerCommands::Show { id } => {
            let customer = service
                .get_customer(id)
                .await
                .map_err(notify("load customer"))?;
            match customer {
                Some(customer) => {
                    println!("Customer: {}", customer.name);
                    println!("  ID:      {}", customer.id);
                    println!("  Email:   {}", customer.email);
                    println!("  Phone:   {}", customer.phone);
                    println!(
                        "  Created: {}",
                        customer.created_at.format("%Y-%m-%d %H:%M:%S")
                    );
                }
                None => println!("Customer not found: {}", id),
            }
        }

        CustomerCommands::Edit {
            id,
            name,
            email,
            phone,
        } => {
            let existing = service.customer(id).await.map_err(notify("load customer"))?;
            let mut details = CustomerDetails::from(&existing);
            if let Some(name) = name {
                details.name = name;
            }
            if let Some(email) = email {
                details.email = email;
            }
            if let Some(phone) = phone {
                details.phone = phone;
            }

            let customer = service
                .update_customer(id, details)
                .await
                .map_err(notify("update customer"))?;
            println!("Updated customer: {} ({})", customer.name, customer.id);
        }

        CustomerCommands::Delete { id } => {
            let customer = service
                .delete_customer(id)
                .await
                .map_err(notify("delete customer"))?;
            println!("Deleted customer: {} ({})", customer.name, customer.id);
        }
    }
    Ok(())
}

async fn run_ledger_command(service: &LedgerService, customer_id: CustomerId) -> Result<()> {
    let view = service
        .customer_ledger(customer_id)
        .await
        .map_err(notify("load ledger"))?;
    let customer = &view.customer;
    let ledger = &view.ledger;

    println!("{}", customer.name);
    println!("  {}  |  {}", customer.email, customer.phone);
    println!();
    println!("Current balance:    {}", format_cents(ledger.current_balance));
    println!("Total transactions: {}", ledger.len());
    println!("Total debits:       {}", total_or_overflow(ledger.total_debits()));
    println!("Total credits:      {}", total_or_overflow(ledger.total_credits()));
    println!();

    if ledger.is_empty() {
        println!("No transactions yet.");
        return Ok(());
    }

    println!(
        "{:<14} {:<30} {:>12} {:>12} {:>14}",
        "DATE", "DESCRIPTION", "DEBIT", "CREDIT", "BALANCE"
    );
    println!("{}", "-".repeat(86));
    for transaction in &ledger.transactions {
        println!(
            "{:<14} {:<30} {:>12} {:>12} {:>14}",
            format_date(transaction.date),
            truncate(&transaction.description, 30),
            amount_or_dash(transaction.debit),
            amount_or_dash(transaction.credit),
            format_cents(transaction.balance)
        );
    }

    Ok(())
}

async fn run_show_transaction_command(service: &LedgerService, id: TransactionId) -> Result<()> {
    let transaction = service
        .get_transaction(id)
        .await
        .map_err(notify("load transaction"))?;
    let customer = service
        .get_customer(transaction.customer_id)
        .await
        .map_err(notify("load customer"))?;

    println!("Transaction: {}", transaction.id);
    match customer {
        Some(customer) => println!("  Customer:    {} ({})", customer.name, customer.id),
        None => println!("  Customer:    {} (deleted)", transaction.customer_id),
    }
    println!("  Date:        {}", transaction.date.format("%Y-%m-%d %H:%M:%S"));
    println!("  Description: {}", transaction.description);
    if let Some(entry_type) = transaction.entry_type() {
        println!("  Type:        {}", entry_type);
    }
    println!("  Debit:       {}", amount_or_dash(transaction.debit));
    println!("  Credit:      {}", amount_or_dash(transaction.credit));
    println!("  Balance:     {}", format_cents(transaction.balance));
    println!(
        "  Recorded at: {}",
        transaction.created_at.format("%Y-%m-%d %H:%M:%S")
    );

    Ok(())
}

async fn run_check_command(service: &LedgerService, customer: Option<CustomerId>) -> Result<()> {
    println!("Checking stored balances...\n");

    let reports = service
        .check_balances(customer)
        .await
        .map_err(notify("check balances"))?;

    let mut drifted = 0;
    for report in &reports {
        if report.is_consistent() {
            println!(
                "  {:<24} {:>4} transactions  OK",
                truncate(&report.customer.name, 24),
                report.transaction_count
            );
            continue;
        }

        drifted += 1;
        println!(
            "  {:<24} {:>4} transactions  {} out of order",
            truncate(&report.customer.name, 24),
            report.transaction_count,
            report.drifts.len()
        );
        for drift in &report.drifts {
            println!(
                "      #{:<6} {}  stored {:>12}  expected {:>12}  off by {:>12}",
                drift.transaction_id,
                format_date(drift.date),
                format_cents(drift.stored),
                total_or_overflow(drift.expected),
                total_or_overflow(drift.difference())
            );
        }
    }

    println!();
    if drifted == 0 {
        println!("All stored balances follow date order.");
    } else {
        println!(
            "{} customer(s) have stored balances that do not follow date order.",
            drifted
        );
        println!("Stored balances are snapshots and are never rewritten.");
    }

    Ok(())
}

async fn run_export_command(
    service: &LedgerService,
    customer: CustomerId,
    format: &str,
    output: Option<&str>,
) -> Result<()> {
    use crate::io::Exporter;
    use std::io::{stdout, Write};

    let exporter = Exporter::new(service);

    // The output file is only written once the export has fully rendered.
    let mut buffer = Vec::new();
    let summary = match format {
        "csv" => {
            let count = exporter.export_ledger_csv(customer, &mut buffer).await?;
            format!("Exported {} transactions", count)
        }
        "json" => {
            let snapshot = exporter.export_ledger_json(customer, &mut buffer).await?;
            format!(
                "Exported ledger of {}: {} transactions",
                snapshot.customer.name,
                snapshot.transactions.len()
            )
        }
        _ => {
            anyhow::bail!("Invalid export format '{}'. Valid formats: csv, json", format);
        }
    };

    match output {
        Some(path) => {
            std::fs::write(path, &buffer)
                .with_context(|| format!("Failed to write output file: {}", path))?;
            eprintln!("{}", summary);
        }
        None => {
            let mut out = stdout();
            out.write_all(&buffer)?;
            out.flush()?;
        }
    }

    Ok(())
}

fn format_date(date: DateTime<Utc>) -> String {
    date.format("%b %-d, %Y").to_string()
}

fn amount_or_dash(amount: Cents) -> String {
    if amount > 0 {
        format_cents(amount)
    } else {
        "-".to_string()
    }
}

fn total_or_overflow(amount: Option<Cents>) -> String {
    amount.map_or_else(|| "overflow".to_string(), format_cents)
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_truncate_is_char_aware() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Müller & Söhne GmbH", 10), "Müller ...");
    }

    #[test]
    fn test_amount_or_dash() {
        assert_eq!(amount_or_dash(0), "-");
        assert_eq!(amount_or_dash(3000), "30.00");
    }

    #[test]
    fn test_total_or_overflow() {
        assert_eq!(total_or_overflow(Some(-1250)), "-12.50");
        assert_eq!(total_or_overflow(None), "overflow");
    }

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();
        assert_eq!(format_date(date), "Jan 5, 2024");
    }

    #[test]
    fn test_negative_amount_reaches_validation() {
        let cli = Cli::try_parse_from([
            "ledgerbook", "add", "1", "--type", "debit", "--amount", "-5", "-d", "refund",
        ])
        .unwrap();
        match cli.command {
            Commands::Add { amount, .. } => assert_eq!(amount, "-5"),
            _ => panic!("expected add command"),
        }
    }

    #[tokio::test]
    async fn test_failed_export_keeps_existing_output() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let db_path = temp_dir.path().join("ledger.db");
        let db = db_path.to_str().unwrap();
        let out_path = temp_dir.path().join("out.csv");
        let out = out_path.to_str().unwrap();
        std::fs::write(&out_path, "previous export").unwrap();

        let init = Cli::try_parse_from(["ledgerbook", "--database", db, "init"]).unwrap();
        init.run().await.unwrap();

        let export =
            Cli::try_parse_from(["ledgerbook", "--database", db, "export", "99", "-o", out])
                .unwrap();
        let err = export.run().await.unwrap_err();
        assert_eq!(err.to_string(), "Customer not found: 99");
        assert_eq!(std::fs::read_to_string(&out_path).unwrap(), "previous export");
    }

    #[test]
    fn test_data_service_failures_get_generic_message() {
        let err = notify("create customer")(AppError::DataService(anyhow::anyhow!("disk full")));
        assert_eq!(err.to_string(), "Failed to create customer");

        let err = notify("create customer")(AppError::CustomerNotFound(3));
        assert_eq!(err.to_string(), "Customer not found: 3");
    }
}
