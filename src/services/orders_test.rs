use super::*;

// =============================================================================
// OrderStatus — names
// =============================================================================

#[test]
fn status_round_trips_through_names() {
    for status in [
        OrderStatus::Pending,
        OrderStatus::InProduction,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ] {
        assert_eq!(OrderStatus::from_str(status.as_str()), Some(status));
    }
}

#[test]
fn unknown_status_name_is_rejected() {
    assert_eq!(OrderStatus::from_str("shipped"), None);
    assert_eq!(OrderStatus::from_str(""), None);
    assert_eq!(OrderStatus::from_str("PENDING"), None);
}

// =============================================================================
// OrderStatus — workflow transitions
// =============================================================================

#[test]
fn happy_path_transitions_are_allowed() {
    assert!(OrderStatus::Pending.can_transition(OrderStatus::InProduction));
    assert!(OrderStatus::InProduction.can_transition(OrderStatus::Ready));
    assert!(OrderStatus::Ready.can_transition(OrderStatus::Delivered));
}

#[test]
fn cancel_is_allowed_from_any_non_terminal_state() {
    assert!(OrderStatus::Pending.can_transition(OrderStatus::Cancelled));
    assert!(OrderStatus::InProduction.can_transition(OrderStatus::Cancelled));
    assert!(OrderStatus::Ready.can_transition(OrderStatus::Cancelled));
}

#[test]
fn skipping_a_stage_is_forbidden() {
    assert!(!OrderStatus::Pending.can_transition(OrderStatus::Ready));
    assert!(!OrderStatus::Pending.can_transition(OrderStatus::Delivered));
    assert!(!OrderStatus::InProduction.can_transition(OrderStatus::Delivered));
}

#[test]
fn moving_backwards_is_forbidden() {
    assert!(!OrderStatus::InProduction.can_transition(OrderStatus::Pending));
    assert!(!OrderStatus::Ready.can_transition(OrderStatus::InProduction));
    assert!(!OrderStatus::Delivered.can_transition(OrderStatus::Ready));
}

#[test]
fn terminal_states_allow_nothing() {
    for next in [
        OrderStatus::Pending,
        OrderStatus::InProduction,
        OrderStatus::Ready,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
    ] {
        assert!(!OrderStatus::Delivered.can_transition(next), "delivered -> {next}");
        assert!(!OrderStatus::Cancelled.can_transition(next), "cancelled -> {next}");
    }
}

#[test]
fn self_transitions_are_forbidden() {
    for status in [OrderStatus::Pending, OrderStatus::InProduction, OrderStatus::Ready] {
        assert!(!status.can_transition(status), "{status} -> {status}");
    }
}

// =============================================================================
// validate_items
// =============================================================================

#[test]
fn items_with_positive_quantities_pass() {
    let items = vec![
        NewOrderItem { product_id: Uuid::new_v4(), quantity: 1 },
        NewOrderItem { product_id: Uuid::new_v4(), quantity: 40 },
    ];
    assert!(validate_items(&items).is_ok());
}

#[test]
fn empty_item_list_is_rejected() {
    assert!(matches!(validate_items(&[]), Err(OrderError::Invalid(_))));
}

#[test]
fn zero_quantity_is_rejected() {
    let items = vec![NewOrderItem { product_id: Uuid::new_v4(), quantity: 0 }];
    assert!(matches!(validate_items(&items), Err(OrderError::Invalid(_))));
}

#[test]
fn negative_quantity_is_rejected() {
    let items = vec![NewOrderItem { product_id: Uuid::new_v4(), quantity: -2 }];
    assert!(matches!(validate_items(&items), Err(OrderError::Invalid(_))));
}

// =============================================================================
// errors & serde
// =============================================================================

#[test]
fn bad_transition_display_names_both_states() {
    let err = OrderError::BadTransition { current: OrderStatus::Delivered, requested: OrderStatus::Ready };
    let msg = err.to_string();
    assert!(msg.contains("delivered"));
    assert!(msg.contains("ready"));
}

#[test]
fn order_detail_flattens_order_fields() {
    let detail = OrderDetail {
        order: OrderRow {
            id: Uuid::nil(),
            customer_id: Uuid::nil(),
            customer_name: "Acme Cafe".into(),
            courier_id: None,
            status: "pending".into(),
            notes: None,
        },
        items: vec![OrderItemRow { product_id: Uuid::nil(), product_name: "Beans".into(), quantity: 2 }],
    };
    let json: serde_json::Value = serde_json::to_value(&detail).unwrap();
    assert_eq!(json["customer_name"], "Acme Cafe");
    assert_eq!(json["status"], "pending");
    assert_eq!(json["items"][0]["quantity"], 2);
}

#[test]
fn new_order_deserializes_without_courier() {
    let json = r#"{
        "customer_id": "00000000-0000-0000-0000-000000000001",
        "items": [{"product_id": "00000000-0000-0000-0000-000000000002", "quantity": 3}]
    }"#;
    let order: NewOrder = serde_json::from_str(json).unwrap();
    assert!(order.courier_id.is_none());
    assert_eq!(order.items.len(), 1);
}
