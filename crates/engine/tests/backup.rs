use serde_json::json;

use engine::{EngineError, Polarity, ProductInput, Role};

mod common;

use common::engine_with_db;

#[tokio::test]
async fn backup_then_restore_into_a_fresh_store() {
    let (source, _db) = engine_with_db().await;
    source
        .set_business_profile("Corner Shop", Some("0100 200"))
        .await
        .unwrap();
    let debtor = source.add_debtor("Ali", Role::Customer, None).await.unwrap();
    source
        .record_transaction(&debtor.id, Polarity::Debt, 40.0, "sugar", None)
        .await
        .unwrap();
    source
        .add_product(&ProductInput {
            barcode: "1".to_string(),
            name: "Sugar".to_string(),
            quantity: 3.0,
            price: 1.5,
        })
        .await
        .unwrap();

    let backup = source.backup().await.unwrap();
    assert_eq!(backup["businessName"], json!("Corner Shop"));
    assert!(backup["salesInvoices"].is_null());
    assert!(backup["debtors"].is_array());

    let (target, _db) = engine_with_db().await;
    let restored = target.restore(&backup.to_string()).await.unwrap();
    assert_eq!(restored, 6);

    assert_eq!(target.subject_view(&debtor.id).await.unwrap().balance, 40.0);
    assert_eq!(target.inventory_value().await.unwrap(), 4.5);
    let profile = target.business_profile().await.unwrap();
    assert_eq!(profile.name, "Corner Shop");
    assert_eq!(profile.phone, "0100 200");
    assert_eq!(target.backup().await.unwrap(), backup);
}

#[tokio::test]
async fn restore_rejects_documents_without_known_keys() {
    let (engine, _db) = engine_with_db().await;
    engine.add_debtor("Ali", Role::Customer, None).await.unwrap();

    for document in ["[1, 2]", "not json", r#"{"theme": "dark"}"#] {
        let err = engine.restore(document).await.unwrap_err();
        assert!(matches!(err, EngineError::InvalidBackup(_)), "{document}");
    }
    assert_eq!(engine.list_debtors(None).await.unwrap().len(), 1);

    let restored = engine
        .restore(r#"{"theme": "dark", "debtors": []}"#)
        .await
        .unwrap();
    assert_eq!(restored, 1);
    assert!(engine.list_debtors(None).await.unwrap().is_empty());
}

#[tokio::test]
async fn empty_stored_value_backs_up_as_null() {
    let (engine, _db) = engine_with_db().await;
    let restored = engine
        .restore(r#"{"debtors": "", "debtTransactions": "  "}"#)
        .await
        .unwrap();
    assert_eq!(restored, 2);

    let backup = engine.backup().await.unwrap();
    assert!(backup["debtors"].is_null());
    assert!(backup["debtTransactions"].is_null());
    assert!(backup["salesInvoices"].is_null());
}

#[tokio::test]
async fn business_profile_defaults_and_statements() {
    let (engine, _db) = engine_with_db().await;
    let profile = engine.business_profile().await.unwrap();
    assert_eq!(profile.name, "My Business");
    assert_eq!(profile.phone, "");

    let err = engine.set_business_profile("  ", None).await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));

    let supplier = engine
        .add_debtor("Wholesale", Role::Supplier, None)
        .await
        .unwrap();
    engine
        .record_transaction(&supplier.id, Polarity::Debt, 80.0, "flour", None)
        .await
        .unwrap();

    let text = engine.statement_text(&supplier.id).await.unwrap();
    assert!(text.starts_with("My Business\n"));
    assert!(text.contains("Account: Wholesale (supplier)"));
    assert!(text.contains("Current balance: You owe: 80.00"));

    let csv = engine.statement_csv(&supplier.id).await.unwrap();
    assert_eq!(csv.lines().count(), 2);
    assert!(csv.lines().nth(1).unwrap().ends_with(",flour,debt,80.00"));

    let err = engine.statement_text("debtor-unknown").await.unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}
