//! End-to-end lifecycle scenarios: a polling manager wired to a scripted
//! broker, driven cycle by cycle through a notify watcher.

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::account;
use common::account_path;
use common::ScriptedBroker;
use common::ACCOUNT_FILTER;
use common::WAIT;
use ind_engine::CimInstance;
use ind_engine::CimValue;
use ind_engine::IndicationManager;
use ind_engine::IndicationManagerBuilder;
use ind_engine::IndicationType;
use ind_engine::NotifierConfig;
use ind_engine::NotifyWatcher;
use ind_engine::OperationContext;

fn build_manager(
    ty: IndicationType,
    broker: Arc<ScriptedBroker>,
    watcher: NotifyWatcher,
) -> IndicationManager {
    IndicationManagerBuilder::new(ty, NotifierConfig::default())
        .broker(broker)
        .watcher(Arc::new(watcher))
        .polling()
        .allowed_classes(vec!["LMI_Account".to_string()])
        .build()
        .unwrap()
}

fn source_instance(indication: &CimInstance) -> &CimInstance {
    match &indication.property("SourceInstance").unwrap().value {
        CimValue::Instance(inner) => inner,
        other => panic!("SourceInstance is not an embedded instance: {other:?}"),
    }
}

#[tokio::test]
async fn test_creation_indication_end_to_end() {
    let broker = ScriptedBroker::new();
    let watcher = NotifyWatcher::new();
    let wake = watcher.handle();
    let manager = build_manager(IndicationType::Creation, broker.clone(), watcher);

    manager.add_filter(ACCOUNT_FILTER).await.unwrap();

    // cycle 1: empty baseline
    broker.push_snapshot(&account_path(), vec![]);
    manager.start(OperationContext::new("root/cimv2")).await.unwrap();
    assert!(broker.wait_for_enumerations(1, WAIT).await);
    assert_eq!(broker.delivered_count(), 0);

    // cycle 2: one account appears
    broker.push_snapshot(&account_path(), vec![account(1, "a")]);
    wake.notify_one();
    assert!(broker.wait_for_deliveries(1, WAIT).await);

    let delivered = broker.delivered();
    let (namespace, indication) = &delivered[0];
    assert_eq!(namespace, "root/cimv2");
    assert_eq!(indication.class_name, "LMI_Account");
    assert!(source_instance(indication).full_eq(&account(1, "a")));
    assert!(indication.property("PreviousInstance").is_none());
    assert!(matches!(
        indication.property("IndicationTime").unwrap().value,
        CimValue::DateTime(_)
    ));

    // cycle 3: unchanged snapshot, nothing delivered
    wake.notify_one();
    assert!(broker.wait_for_enumerations(3, WAIT).await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(broker.delivered_count(), 1);

    manager.stop().await.unwrap();
}

#[tokio::test]
async fn test_deletion_indication_end_to_end() {
    let broker = ScriptedBroker::new();
    let watcher = NotifyWatcher::new();
    let wake = watcher.handle();
    let manager = build_manager(IndicationType::Deletion, broker.clone(), watcher);

    manager.add_filter(ACCOUNT_FILTER).await.unwrap();

    // baseline holds one account
    broker.push_snapshot(&account_path(), vec![account(1, "a")]);
    broker.push_snapshot(&account_path(), vec![]);
    manager.start(OperationContext::new("root/cimv2")).await.unwrap();
    assert!(broker.wait_for_enumerations(1, WAIT).await);

    // the account disappears
    wake.notify_one();
    assert!(broker.wait_for_deliveries(1, WAIT).await);

    let delivered = broker.delivered();
    let indication = &delivered[0].1;
    assert!(source_instance(indication).full_eq(&account(1, "a")));
    assert!(indication.property("PreviousInstance").is_none());

    manager.stop().await.unwrap();
}

#[tokio::test]
async fn test_modification_indication_carries_both_instances() {
    let broker = ScriptedBroker::new();
    let watcher = NotifyWatcher::new();
    let wake = watcher.handle();
    let manager = build_manager(IndicationType::Modification, broker.clone(), watcher);

    manager.add_filter(ACCOUNT_FILTER).await.unwrap();

    broker.push_snapshot(&account_path(), vec![account(1, "a")]);
    broker.push_snapshot(&account_path(), vec![account(1, "renamed")]);
    manager.start(OperationContext::new("root/cimv2")).await.unwrap();
    assert!(broker.wait_for_enumerations(1, WAIT).await);

    wake.notify_one();
    assert!(broker.wait_for_deliveries(1, WAIT).await);

    let delivered = broker.delivered();
    let indication = &delivered[0].1;
    assert!(source_instance(indication).full_eq(&account(1, "renamed")));
    match &indication.property("PreviousInstance").unwrap().value {
        CimValue::Instance(previous) => assert!(previous.full_eq(&account(1, "a"))),
        other => panic!("PreviousInstance is not an embedded instance: {other:?}"),
    }

    manager.stop().await.unwrap();
}

#[tokio::test]
async fn test_restart_rebaselines_watched_paths() {
    let broker = ScriptedBroker::new();
    let watcher = NotifyWatcher::new();
    let wake = watcher.handle();
    let manager = build_manager(IndicationType::Creation, broker.clone(), watcher);

    manager.add_filter(ACCOUNT_FILTER).await.unwrap();
    broker.push_snapshot(&account_path(), vec![account(1, "a")]);

    manager.start(OperationContext::new("root/cimv2")).await.unwrap();
    assert!(broker.wait_for_enumerations(1, WAIT).await);
    manager.stop().await.unwrap();

    // snapshots were discarded on stop; the restart re-baselines before the
    // first wake, so the pre-existing account is not reported again
    manager.start(OperationContext::new("root/cimv2")).await.unwrap();
    assert!(broker.wait_for_enumerations(2, WAIT).await);
    wake.notify_one();
    assert!(broker.wait_for_enumerations(3, WAIT).await);
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(broker.delivered_count(), 0);
    manager.stop().await.unwrap();
}

#[tokio::test]
async fn test_two_filters_on_one_path_deliver_once_per_change() {
    let broker = ScriptedBroker::new();
    let watcher = NotifyWatcher::new();
    let wake = watcher.handle();
    let manager = build_manager(IndicationType::Creation, broker.clone(), watcher);

    let second_filter =
        "SELECT * FROM LMI_AccountInstanceDeletionIndication WHERE SourceInstance ISA LMI_Account";
    manager.add_filter(ACCOUNT_FILTER).await.unwrap();
    manager.add_filter(second_filter).await.unwrap();

    broker.push_snapshot(&account_path(), vec![]);
    broker.push_snapshot(&account_path(), vec![account(1, "a")]);
    manager.start(OperationContext::new("root/cimv2")).await.unwrap();
    assert!(broker.wait_for_enumerations(1, WAIT).await);

    wake.notify_one();
    assert!(broker.wait_for_deliveries(1, WAIT).await);
    tokio::time::sleep(Duration::from_millis(50)).await;

    // one enumeration pair, one indication, despite two filters
    assert_eq!(broker.delivered_count(), 1);

    manager.stop().await.unwrap();
}
