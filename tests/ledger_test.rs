mod common;

use anyhow::Result;
use common::*;
use ledgerbook::application::AppError;
use ledgerbook::domain::{compute_ledger, EntryType};

#[tokio::test]
async fn test_new_customer_has_empty_ledger() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let customer = service.create_customer(jane()).await?;

    let view = service.customer_ledger(customer.id).await?;
    assert_eq!(view.customer, customer);
    assert_eq!(view.ledger.current_balance, 0);
    assert_eq!(view.ledger.len(), 0);

    Ok(())
}

#[tokio::test]
async fn test_credit_then_debit_running_balance() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let customer = service.create_customer(jane()).await?;

    let first = credit(&service, customer.id, "100.00", "2024-01-01").await?;
    assert_eq!(first.credit, 10000);
    assert_eq!(first.debit, 0);
    assert_eq!(first.balance, 10000);

    let second = debit(&service, customer.id, "30.00", "2024-01-02").await?;
    assert_eq!(second.debit, 3000);
    assert_eq!(second.credit, 0);
    assert_eq!(second.balance, 7000);

    let view = service.customer_ledger(customer.id).await?;
    assert_eq!(view.ledger.current_balance, 7000);
    assert_eq!(view.ledger.len(), 2);
    assert_eq!(view.ledger.total_credits(), Some(10000));
    assert_eq!(view.ledger.total_debits(), Some(3000));

    Ok(())
}

#[tokio::test]
async fn test_balance_can_go_negative() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let customer = service.create_customer(jane()).await?;

    let tx = debit(&service, customer.id, "12.34", "2024-03-01").await?;
    assert_eq!(tx.balance, -1234);
    assert_eq!(
        service.customer_ledger(customer.id).await?.ledger.current_balance,
        -1234
    );

    Ok(())
}

#[tokio::test]
async fn test_backdated_entry_keeps_creation_snapshot() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let customer = service.create_customer(jane()).await?;

    let later = credit(&service, customer.id, "100.00", "2024-01-05").await?;
    let backdated = credit(&service, customer.id, "50.00", "2024-01-01").await?;

    // The backdated entry was computed from the balance at creation time
    assert_eq!(later.balance, 10000);
    assert_eq!(backdated.balance, 15000);

    let view = service.customer_ledger(customer.id).await?;
    let order: Vec<_> = view.ledger.transactions.iter().map(|t| t.id).collect();
    assert_eq!(order, vec![backdated.id, later.id]);

    // Stored snapshots are displayed as-is
    assert_eq!(view.ledger.transactions[0].balance, 15000);
    assert_eq!(view.ledger.transactions[1].balance, 10000);
    assert_eq!(view.ledger.current_balance, 10000);

    Ok(())
}

#[tokio::test]
async fn test_check_reports_backdated_drift() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let in_order = service.create_customer(john()).await?;
    let backdated = service.create_customer(jane()).await?;

    credit(&service, in_order.id, "100.00", "2024-01-01").await?;
    debit(&service, in_order.id, "30.00", "2024-01-02").await?;

    let later = credit(&service, backdated.id, "100.00", "2024-01-05").await?;
    let earlier = credit(&service, backdated.id, "50.00", "2024-01-01").await?;

    let reports = service.check_balances(None).await?;
    assert_eq!(reports.len(), 2);
    assert!(reports[0].is_consistent());
    assert_eq!(reports[0].transaction_count, 2);

    let drifts = &reports[1].drifts;
    assert_eq!(drifts.len(), 2);
    assert_eq!(drifts[0].transaction_id, earlier.id);
    assert_eq!(drifts[0].stored, 15000);
    assert_eq!(drifts[0].expected, Some(5000));
    assert_eq!(drifts[1].transaction_id, later.id);
    assert_eq!(drifts[1].expected, Some(15000));

    // Checking never rewrites stored balances
    let view = service.customer_ledger(backdated.id).await?;
    assert_eq!(view.ledger.current_balance, 10000);

    let single = service.check_balances(Some(in_order.id)).await?;
    assert_eq!(single.len(), 1);
    assert!(single[0].is_consistent());

    Ok(())
}

#[tokio::test]
async fn test_check_survives_replay_overflow() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let customer = service.create_customer(jane()).await?;
    let max = "92233720368547758.07";

    // Each entry fits against the current balance; the date-ordered replay does not.
    credit(&service, customer.id, max, "2024-01-01").await?;
    let last = debit(&service, customer.id, max, "2024-01-10").await?;
    let backdated = credit(&service, customer.id, max, "2024-01-05").await?;

    let reports = service.check_balances(Some(customer.id)).await?;
    let drifts = &reports[0].drifts;
    let ids: Vec<_> = drifts.iter().map(|d| d.transaction_id).collect();
    assert_eq!(ids, vec![backdated.id, last.id]);
    assert!(drifts.iter().all(|d| d.expected.is_none()));

    let view = service.customer_ledger(customer.id).await?;
    assert_eq!(view.ledger.total_credits(), None);
    assert_eq!(view.ledger.total_debits(), Some(i64::MAX));

    Ok(())
}

#[tokio::test]
async fn test_ledger_is_sorted_and_idempotent() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let customer = service.create_customer(jane()).await?;

    for (amount, date) in [
        ("10", "2024-02-10"),
        ("20", "2024-01-15"),
        ("30", "2024-03-01"),
        ("40", "2024-01-15"),
        ("50", "2023-12-31"),
    ] {
        credit(&service, customer.id, amount, date).await?;
    }

    let ledger = service.customer_ledger(customer.id).await?.ledger;
    assert_eq!(ledger.len(), 5);
    assert!(
        ledger
            .transactions
            .windows(2)
            .all(|pair| pair[0].date <= pair[1].date)
    );

    // Same-date entries keep creation order
    let same_day: Vec<_> = ledger
        .transactions
        .iter()
        .filter(|t| t.date == parse_date("2024-01-15"))
        .map(|t| t.credit)
        .collect();
    assert_eq!(same_day, vec![2000, 4000]);

    assert_eq!(compute_ledger(&ledger.transactions), ledger);

    Ok(())
}

#[tokio::test]
async fn test_transaction_dates_survive_storage() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let customer = service.create_customer(jane()).await?;

    let mut form = entry(EntryType::Credit, "1.00", "2024-01-01", "Precise");
    form.date = form.date + chrono::Duration::nanoseconds(123_456_789);
    let created = service.add_transaction(customer.id, form.clone()).await?;

    let fetched = service.get_transaction(created.id).await?;
    assert_eq!(fetched.date, form.date);
    assert_eq!(fetched, created);
    assert!(fetched.created_at >= fetched.date);

    Ok(())
}

#[tokio::test]
async fn test_get_unknown_transaction() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service.get_transaction(999).await;
    assert!(matches!(result, Err(AppError::TransactionNotFound(999))));

    Ok(())
}

#[tokio::test]
async fn test_ledger_for_unknown_customer() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let result = service.customer_ledger(5).await;
    assert!(matches!(result, Err(AppError::CustomerNotFound(5))));

    Ok(())
}

#[tokio::test]
async fn test_data_persists_across_connections() -> Result<()> {
    let temp_dir = tempfile::TempDir::new()?;
    let db_path = temp_dir.path().join("persist.db");
    let db_path = db_path.to_str().unwrap();

    let customer_id = {
        let service = ledgerbook::application::LedgerService::init(db_path).await?;
        let customer = service.create_customer(jane()).await?;
        credit(&service, customer.id, "100.00", "2024-01-01").await?;
        customer.id
    };

    let service = ledgerbook::application::LedgerService::connect(db_path).await?;
    let view = service.customer_ledger(customer_id).await?;
    assert_eq!(view.ledger.current_balance, 10000);

    Ok(())
}
