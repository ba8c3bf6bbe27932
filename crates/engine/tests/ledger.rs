use chrono::{DateTime, TimeZone, Utc};
use rstest::rstest;

use engine::{EngineError, Polarity, Role};

mod common;

use common::engine_with_db;

fn at(day: u32, hour: u32) -> Option<DateTime<Utc>> {
    Some(Utc.with_ymd_and_hms(2026, 3, day, hour, 0, 0).unwrap())
}

#[tokio::test]
async fn add_debtor_trims_and_lists_with_zero_balance() {
    let (engine, _db) = engine_with_db().await;

    let debtor = engine
        .add_debtor("  Ali Hassan ", Role::Customer, Some(" 0100 "))
        .await
        .unwrap();
    assert!(debtor.id.starts_with("debtor-"));
    assert_eq!(debtor.name, "Ali Hassan");
    assert_eq!(debtor.phone.as_deref(), Some("0100"));

    let listed = engine.list_debtors(None).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].debtor, debtor);
    assert_eq!(listed[0].balance, 0.0);
}

#[tokio::test]
async fn duplicate_names_are_rejected_ignoring_case_and_accents() {
    let (engine, _db) = engine_with_db().await;
    engine
        .add_debtor("José Pérez", Role::Supplier, None)
        .await
        .unwrap();

    let err = engine
        .add_debtor("jose perez", Role::Customer, None)
        .await
        .unwrap_err();
    assert_eq!(err, EngineError::ExistingKey("jose perez".to_string()));

    let err = engine.add_debtor("   ", Role::Customer, None).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));
    assert_eq!(engine.list_debtors(None).await.unwrap().len(), 1);
}

#[tokio::test]
async fn import_contact_rejects_known_phone() {
    let (engine, _db) = engine_with_db().await;
    engine
        .import_contact("Mona", Some("+20 100 555 1234"), Role::Customer)
        .await
        .unwrap();

    let err = engine
        .import_contact("Mona Two", Some("+20-100-555-1234"), Role::Customer)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    engine
        .import_contact("Karim", None, Role::Supplier)
        .await
        .unwrap();
    assert_eq!(engine.list_debtors(None).await.unwrap().len(), 2);
}

#[rstest]
#[case::a_partial_payment(Role::Customer, vec![(Polarity::Debt, 100.0), (Polarity::Payment, 40.0)], 60.0, 40.0, false)]
#[case::b_paid_in_full(Role::Customer, vec![(Polarity::Debt, 100.0), (Polarity::Payment, 100.0)], 0.0, 100.0, true)]
#[case::c_supplier_debt(Role::Supplier, vec![(Polarity::Debt, 200.0), (Polarity::Payment, 50.0)], -150.0, 25.0, false)]
#[case::d_prepayment(Role::Customer, vec![(Polarity::Payment, 30.0)], -30.0, 100.0, true)]
#[tokio::test]
async fn recorded_entries_drive_balance_and_progress(
    #[case] role: Role,
    #[case] entries: Vec<(Polarity, f64)>,
    #[case] balance: f64,
    #[case] percent: f64,
    #[case] settled: bool,
) {
    let (engine, _db) = engine_with_db().await;
    let debtor = engine.add_debtor("Subject", role, None).await.unwrap();

    let mut view = engine.subject_view(&debtor.id).await.unwrap();
    for (hour, (polarity, amount)) in entries.into_iter().enumerate() {
        view = engine
            .record_transaction(&debtor.id, polarity, amount, "entry", at(1, hour as u32))
            .await
            .unwrap();
    }

    assert_eq!(view.balance, balance);
    assert_eq!(view.progress.progress_percent, percent);
    assert_eq!(view.progress.is_settled, settled);
    assert_eq!(engine.subject_view(&debtor.id).await.unwrap(), view);
}

#[tokio::test]
async fn subject_without_entries_is_settled_at_zero_percent() {
    let (engine, _db) = engine_with_db().await;
    let debtor = engine
        .add_debtor("Fresh", Role::Customer, None)
        .await
        .unwrap();

    let view = engine.subject_view(&debtor.id).await.unwrap();
    assert_eq!(view.balance, 0.0);
    assert!(view.transactions.is_empty());
    assert_eq!(view.progress.progress_percent, 0.0);
    assert!(view.progress.is_settled);
}

#[tokio::test]
async fn rejected_entries_leave_the_log_untouched() {
    let (engine, _db) = engine_with_db().await;
    let debtor = engine
        .add_debtor("Ali", Role::Customer, None)
        .await
        .unwrap();
    engine
        .record_transaction(&debtor.id, Polarity::Debt, 10.0, "bread", None)
        .await
        .unwrap();
    let before = engine.subject_view(&debtor.id).await.unwrap();

    for (amount, note) in [(0.0, "zero"), (-5.0, "negative"), (5.0, "   ")] {
        let err = engine
            .record_transaction(&debtor.id, Polarity::Debt, amount, note, None)
            .await
            .unwrap_err();
        assert!(err.is_validation(), "{err}");
    }
    let err = engine
        .record_transaction("debtor-missing", Polarity::Payment, 5.0, "cash", None)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::KeyNotFound("debtor debtor-missing".to_string())
    );

    assert_eq!(engine.subject_view(&debtor.id).await.unwrap(), before);
}

#[tokio::test]
async fn view_lists_newest_first_and_hides_other_debtors() {
    let (engine, _db) = engine_with_db().await;
    let ali = engine.add_debtor("Ali", Role::Customer, None).await.unwrap();
    let omar = engine.add_debtor("Omar", Role::Customer, None).await.unwrap();

    engine
        .record_transaction(&ali.id, Polarity::Debt, 50.0, "first", at(2, 9))
        .await
        .unwrap();
    engine
        .record_transaction(&omar.id, Polarity::Debt, 70.0, "other", at(3, 9))
        .await
        .unwrap();
    engine
        .record_transaction(&ali.id, Polarity::Payment, 20.0, "second", at(4, 9))
        .await
        .unwrap();

    let view = engine.subject_view(&ali.id).await.unwrap();
    let notes: Vec<&str> = view
        .transactions
        .iter()
        .map(|t| t.description.as_str())
        .collect();
    assert_eq!(notes, vec!["second", "first"]);
    assert_eq!(view.balance, 30.0);
}

#[tokio::test]
async fn totals_split_receivables_and_payables() {
    let (engine, _db) = engine_with_db().await;
    let customer = engine.add_debtor("Ali", Role::Customer, None).await.unwrap();
    let supplier = engine
        .add_debtor("Wholesale Co", Role::Supplier, Some("0222"))
        .await
        .unwrap();

    engine
        .record_transaction(&customer.id, Polarity::Debt, 120.0, "goods", None)
        .await
        .unwrap();
    engine
        .record_transaction(&supplier.id, Polarity::Debt, 300.0, "stock", None)
        .await
        .unwrap();

    let totals = engine.debt_totals().await.unwrap();
    assert_eq!(totals.receivables, 120.0);
    assert_eq!(totals.payables, 300.0);
    assert_eq!(totals.net_position, -180.0);

    let found = engine.list_debtors(Some("wholesale")).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].balance, -300.0);
    let found = engine.list_debtors(Some("0222")).await.unwrap();
    assert_eq!(found[0].debtor.id, supplier.id);
}

#[tokio::test]
async fn corrupted_collections_load_empty_and_are_cleared() {
    let (engine, _db) = engine_with_db().await;
    engine
        .restore(r#"{"debtors": "{not json", "debtTransactions": {"id": "t1"}}"#)
        .await
        .unwrap();

    assert!(engine.list_debtors(None).await.unwrap().is_empty());

    let backup = engine.backup().await.unwrap();
    assert!(backup["debtors"].is_null());
    assert!(backup["debtTransactions"].is_null());

    let debtor = engine.add_debtor("Ali", Role::Customer, None).await.unwrap();
    let view = engine
        .record_transaction(&debtor.id, Polarity::Debt, 5.0, "tea", None)
        .await
        .unwrap();
    assert_eq!(view.balance, 5.0);
}

#[tokio::test]
async fn stored_legacy_records_are_tolerated() {
    let (engine, _db) = engine_with_db().await;
    let backup = serde_json::json!({
        "debtors": [
            {"id": "debtor-1", "name": "Ali", "type": "customer", "balance": 500}
        ],
        "debtTransactions": [
            {"id": "t1", "debtorId": "debtor-1", "date": "2026-01-01T10:00:00.000Z",
             "description": "old", "amount": "12", "type": "debt"},
            {"id": "t2", "debtorId": "debtor-1", "date": "2026-01-02T10:00:00.000Z",
             "description": "ok", "amount": 30, "type": "debt"},
            {"id": "t3", "debtorId": "debtor-gone", "date": "2026-01-02T10:00:00.000Z",
             "description": "orphan", "amount": 9, "type": "debt"},
            {"id": "t4", "debtorId": "debtor-1", "date": "2026-01-03T10:00:00.000Z",
             "description": "signed", "amount": -50, "type": "debt"}
        ]
    });
    engine.restore(&backup.to_string()).await.unwrap();

    let view = engine.subject_view("debtor-1").await.unwrap();
    assert_eq!(view.transactions.len(), 3);
    assert_eq!(view.balance, 30.0);
    assert_eq!(view.progress.total_debt, 30.0);
    assert!(!view.progress.is_settled);
}

#[rstest]
#[case::null(serde_json::Value::Null)]
#[case::object(serde_json::json!({}))]
#[case::negative(serde_json::json!(-5))]
#[case::zero(serde_json::json!(0))]
#[tokio::test]
async fn malformed_stored_amounts_count_as_zero(#[case] amount: serde_json::Value) {
    let (engine, _db) = engine_with_db().await;
    let backup = serde_json::json!({
        "debtors": [{"id": "debtor-1", "name": "Ali", "type": "customer"}],
        "debtTransactions": [
            {"id": "t1", "debtorId": "debtor-1", "date": "2026-01-01T10:00:00.000Z",
             "description": "bad", "amount": amount, "type": "debt"},
            {"id": "t2", "debtorId": "debtor-1", "date": "2026-01-02T10:00:00.000Z",
             "description": "cash", "amount": 10, "type": "payment"}
        ]
    });
    engine.restore(&backup.to_string()).await.unwrap();

    let view = engine.subject_view("debtor-1").await.unwrap();
    assert_eq!(view.transactions.len(), 2);
    assert_eq!(view.transactions[1].amount, 0.0);
    assert_eq!(view.balance, -10.0);
    assert_eq!(view.progress.total_debt, 0.0);
    assert_eq!(view.progress.total_payments, 10.0);
    assert_eq!(view.progress.progress_percent, 100.0);
    assert!(view.progress.is_settled);
}
