use super::*;

fn create_test_registry() -> Registry {
    let registry = Registry::new_custom(Some("ind_engine".to_string()), None).unwrap();
    register_custom_metrics(&registry);
    registry
}

#[test]
fn test_custom_registry() {
    let registry = create_test_registry();

    POLL_CYCLES_METRIC.with_label_values(&["LMI_Account"]).inc();
    let metrics = &registry.gather();
    assert!(!metrics.is_empty());

    let metric_names: Vec<_> = metrics.iter().map(|m| m.get_name()).collect();
    assert!(
        metric_names.contains(&"ind_engine_poll_cycles_total"),
        "Missing ind_engine_poll_cycles_total"
    );
}

// Test the correctness of the indicator update logic
#[test]
fn test_counter_increment() {
    // Reset the counter to avoid test pollution
    INDICATIONS_DELIVERED_METRIC.reset();

    INDICATIONS_DELIVERED_METRIC.with_label_values(&["creation"]).inc();
    INDICATIONS_DELIVERED_METRIC.with_label_values(&["creation"]).inc();

    let value = INDICATIONS_DELIVERED_METRIC.with_label_values(&["creation"]).get();
    assert_eq!(value, 2, "Counter should increment correctly");
}
