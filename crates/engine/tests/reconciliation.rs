use std::collections::BTreeMap;

use chrono::Utc;
use uuid::Uuid;

use engine::{
    ConsistencyWarning, Engine, EngineError, ExchangeCmd, ImpactWindow, MoneyCents,
    ReturnItemInput, ReturnOrderCmd, SnapshotStore, StockKind, SupplyOrderCmd,
};

fn engine_with_fixture() -> (Engine, Uuid, Uuid) {
    let mut engine = Engine::builder().build().unwrap();
    let bottle_type_id = engine
        .create_bottle_type("12KG", "12KG", MoneyCents::new(5000), 100)
        .unwrap();
    let driver_id = engine.create_driver("Rachid", Some("A-4821-17")).unwrap();
    (engine, bottle_type_id, driver_id)
}

fn assert_conservation(engine: &Engine) {
    for bottle_type in engine.bottle_types() {
        assert_eq!(
            bottle_type.remaining_quantity,
            bottle_type
                .total_quantity
                .saturating_sub(bottle_type.distributed_quantity),
            "conservation broken for {}",
            bottle_type.name
        );
        if bottle_type.distributed_quantity <= bottle_type.total_quantity {
            assert_eq!(
                bottle_type.total_quantity,
                bottle_type.distributed_quantity + bottle_type.remaining_quantity
            );
        }
    }
}

#[test]
fn supply_order_moves_stock_to_the_field() {
    let (mut engine, bottle_type_id, driver_id) = engine_with_fixture();

    let outcome = engine
        .create_supply_order(
            SupplyOrderCmd::new("BS-7", driver_id, Utc::now()).item(bottle_type_id, 0, 30),
        )
        .unwrap();

    assert!(outcome.warnings.is_empty());
    assert_eq!(outcome.order.subtotal, MoneyCents::new(150_000));
    assert_eq!(outcome.order.tax, MoneyCents::new(30_000));
    assert_eq!(outcome.order.total, MoneyCents::new(180_000));

    let bottle_type = engine.bottle_type(bottle_type_id).unwrap();
    assert_eq!(bottle_type.distributed_quantity, 30);
    assert_eq!(bottle_type.remaining_quantity, 70);
    assert_conservation(&engine);
}

#[test]
fn duplicate_order_number_differs_only_in_case_is_rejected() {
    let (mut engine, bottle_type_id, driver_id) = engine_with_fixture();
    engine
        .create_supply_order(
            SupplyOrderCmd::new("BS-7", driver_id, Utc::now()).item(bottle_type_id, 0, 30),
        )
        .unwrap();

    let before = engine.bottle_type(bottle_type_id).unwrap().clone();
    let history_len = engine.stock_history().len();

    let err = engine
        .create_supply_order(
            SupplyOrderCmd::new("bs-7", driver_id, Utc::now()).item(bottle_type_id, 0, 10),
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    // Rejection happened before any mutation.
    assert_eq!(engine.bottle_type(bottle_type_id).unwrap(), &before);
    assert_eq!(engine.stock_history().len(), history_len);
    assert_eq!(engine.supply_orders().len(), 1);
}

#[test]
fn zero_movement_items_are_dropped() {
    let (mut engine, bottle_type_id, driver_id) = engine_with_fixture();
    let outcome = engine
        .create_supply_order(
            SupplyOrderCmd::new("BS-9", driver_id, Utc::now())
                .item(bottle_type_id, 0, 0)
                .item(bottle_type_id, 5, 20),
        )
        .unwrap();
    assert_eq!(outcome.order.items.len(), 1);
    assert_eq!(outcome.order.items[0].full_quantity, 20);
}

#[test]
fn return_order_fans_out_across_ledgers() {
    let (mut engine, bottle_type_id, driver_id) = engine_with_fixture();
    let supply = engine
        .create_supply_order(
            SupplyOrderCmd::new("BS-7", driver_id, Utc::now()).item(bottle_type_id, 0, 30),
        )
        .unwrap()
        .order;

    let outcome = engine
        .create_return_order(
            ReturnOrderCmd::new(driver_id, Utc::now())
                .supply_order(supply.id)
                .item(
                    ReturnItemInput::new(bottle_type_id)
                        .returned_empty(20)
                        .consigne(5)
                        .lost(2)
                        .foreign(3),
                ),
        )
        .unwrap();

    assert!(outcome.warnings.is_empty());
    assert!(outcome.skipped.is_empty());

    // emptyDelta = 20 - 5 - 2 - 3 = 10
    let empty = engine
        .empty_stock()
        .iter()
        .find(|e| e.bottle_type_id == bottle_type_id)
        .unwrap();
    assert_eq!(empty.quantity, 10);

    // No full bottles came back, so distribution is untouched.
    let bottle_type = engine.bottle_type(bottle_type_id).unwrap();
    assert_eq!(bottle_type.distributed_quantity, 30);
    assert_eq!(bottle_type.remaining_quantity, 70);

    // Everything supplied is accounted for: R.C stays empty.
    let driver = engine.driver(driver_id).unwrap();
    assert_eq!(driver.remaining_bottles.get(&bottle_type_id), None);

    // Foreign bottles were credited against the return order.
    let foreign = engine.foreign_bottles();
    assert_eq!(foreign.len(), 1);
    assert_eq!(foreign[0].quantity, 3);
    assert_eq!(foreign[0].return_order_id, Some(outcome.order.id));
    assert_conservation(&engine);
}

#[test]
fn unaccounted_bottles_stay_with_the_driver() {
    let (mut engine, bottle_type_id, driver_id) = engine_with_fixture();
    let supply = engine
        .create_supply_order(
            SupplyOrderCmd::new("BS-7", driver_id, Utc::now()).item(bottle_type_id, 0, 30),
        )
        .unwrap()
        .order;

    engine
        .create_return_order(
            ReturnOrderCmd::new(driver_id, Utc::now())
                .supply_order(supply.id)
                .item(
                    ReturnItemInput::new(bottle_type_id)
                        .returned_empty(10)
                        .returned_full(5),
                ),
        )
        .unwrap();

    // 30 supplied − (10 empty + 5 full) = 15 still held.
    let driver = engine.driver(driver_id).unwrap();
    assert_eq!(driver.remaining_bottles.get(&bottle_type_id), Some(&15));

    // Returned fulls go back to the depot.
    let bottle_type = engine.bottle_type(bottle_type_id).unwrap();
    assert_eq!(bottle_type.distributed_quantity, 25);
    assert_eq!(bottle_type.remaining_quantity, 75);
}

#[test]
fn over_accounted_return_warns_but_applies() {
    let (mut engine, bottle_type_id, driver_id) = engine_with_fixture();
    let supply = engine
        .create_supply_order(
            SupplyOrderCmd::new("BS-7", driver_id, Utc::now()).item(bottle_type_id, 0, 10),
        )
        .unwrap()
        .order;

    let outcome = engine
        .create_return_order(
            ReturnOrderCmd::new(driver_id, Utc::now())
                .supply_order(supply.id)
                .item(ReturnItemInput::new(bottle_type_id).returned_empty(14)),
        )
        .unwrap();

    assert!(outcome.warnings.iter().any(|w| matches!(
        w,
        ConsistencyWarning::OverAccounted {
            supplied: 10,
            accounted: 14,
            ..
        }
    )));
    assert_eq!(
        engine
            .empty_stock()
            .iter()
            .find(|e| e.bottle_type_id == bottle_type_id)
            .unwrap()
            .quantity,
        14
    );
}

#[test]
fn return_item_for_deleted_type_is_skipped_whole() {
    let (mut engine, bottle_type_id, driver_id) = engine_with_fixture();
    let other_type = engine
        .create_bottle_type("6KG", "6KG", MoneyCents::new(3000), 50)
        .unwrap();
    let supply = engine
        .create_supply_order(
            SupplyOrderCmd::new("BS-7", driver_id, Utc::now())
                .item(bottle_type_id, 0, 30)
                .item(other_type, 0, 10),
        )
        .unwrap()
        .order;
    engine.delete_bottle_type(other_type).unwrap();

    let outcome = engine
        .create_return_order(
            ReturnOrderCmd::new(driver_id, Utc::now())
                .supply_order(supply.id)
                .item(ReturnItemInput::new(bottle_type_id).returned_empty(30))
                .item(ReturnItemInput::new(other_type).returned_empty(10)),
        )
        .unwrap();

    assert_eq!(outcome.skipped, vec![other_type]);
    assert_eq!(outcome.order.items.len(), 1);
    // No partial effect for the skipped type: not even in the empty pool.
    assert!(
        engine
            .empty_stock()
            .iter()
            .all(|e| e.bottle_type_id != other_type)
    );
}

#[test]
fn remove_stock_clamps_at_zero_and_brackets_history() {
    let (mut engine, bottle_type_id, _) = engine_with_fixture();
    engine.add_empty_stock(bottle_type_id, 3, None).unwrap();

    let update = engine
        .remove_empty_stock(bottle_type_id, 5, Some("inventaire"))
        .unwrap();
    assert_eq!(update.quantity, 0);
    assert_eq!(update.warnings.len(), 1);

    let last = engine.stock_history().last().unwrap();
    assert_eq!(last.previous_quantity, 3);
    assert_eq!(last.new_quantity, 0);
    assert_eq!(last.quantity, -3);
}

#[test]
fn audit_replay_reconstructs_pool_quantities() {
    let (mut engine, bottle_type_id, driver_id) = engine_with_fixture();
    engine.add_empty_stock(bottle_type_id, 8, None).unwrap();
    engine.remove_empty_stock(bottle_type_id, 2, None).unwrap();
    let supply = engine
        .create_supply_order(
            SupplyOrderCmd::new("BS-7", driver_id, Utc::now()).item(bottle_type_id, 0, 30),
        )
        .unwrap()
        .order;
    engine
        .create_return_order(
            ReturnOrderCmd::new(driver_id, Utc::now())
                .supply_order(supply.id)
                .item(
                    ReturnItemInput::new(bottle_type_id)
                        .returned_empty(20)
                        .defective(2),
                ),
        )
        .unwrap();

    let replayed: i64 = engine
        .stock_history()
        .iter()
        .filter(|e| e.stock == StockKind::Empty && e.bottle_type_id == bottle_type_id)
        .map(|e| e.quantity)
        .sum();
    assert_eq!(
        replayed,
        i64::from(
            engine
                .empty_stock()
                .iter()
                .find(|e| e.bottle_type_id == bottle_type_id)
                .unwrap()
                .quantity
        )
    );

    let replayed_defective: i64 = engine
        .stock_history()
        .iter()
        .filter(|e| e.stock == StockKind::Defective && e.bottle_type_id == bottle_type_id)
        .map(|e| e.quantity)
        .sum();
    assert_eq!(replayed_defective, 2);
}

#[test]
fn exchange_computes_difference_and_direction() {
    let (mut engine, bottle_type_id, _) = engine_with_fixture();
    let record = engine
        .create_exchange(
            ExchangeCmd::new("Gaz du Sud", bottle_type_id, 10, 8, Utc::now())
                .unit_price(MoneyCents::new(5000))
                .paid_by("caisse"),
        )
        .unwrap();

    assert_eq!(record.price_difference, MoneyCents::new(10_000));
    assert!(record.is_paid_by_us);
    assert!(engine.foreign_bottles().is_empty());
}

#[test]
fn possession_override_records_diffs() {
    let (mut engine, bottle_type_id, driver_id) = engine_with_fixture();
    let supply = engine
        .create_supply_order(
            SupplyOrderCmd::new("BS-7", driver_id, Utc::now()).item(bottle_type_id, 0, 30),
        )
        .unwrap()
        .order;
    engine
        .create_return_order(
            ReturnOrderCmd::new(driver_id, Utc::now())
                .supply_order(supply.id)
                .item(ReturnItemInput::new(bottle_type_id).returned_empty(20)),
        )
        .unwrap();
    assert_eq!(
        engine
            .driver(driver_id)
            .unwrap()
            .remaining_bottles
            .get(&bottle_type_id),
        Some(&10)
    );

    let entry = engine
        .override_driver_possession(driver_id, BTreeMap::from([(bottle_type_id, 40)]))
        .unwrap();
    assert_eq!(entry.changes.len(), 1);
    assert_eq!(entry.changes[0].previous_qty, 10);
    assert_eq!(entry.changes[0].new_qty, 40);
    assert_eq!(entry.changes[0].diff, 30);

    let driver = engine.driver(driver_id).unwrap();
    assert!(driver.is_override);
    assert_eq!(driver.remaining_bottles.get(&bottle_type_id), Some(&40));

    // Both automatic and manual entries share one stream, newest first.
    let history = engine.rc_history(driver_id).unwrap();
    assert_eq!(history.len(), 2);
    assert!(history[0].date >= history[1].date);
}

#[test]
fn aggregator_agrees_with_ledgers_over_all_time() {
    let (mut engine, bottle_type_id, driver_id) = engine_with_fixture();
    let supply = engine
        .create_supply_order(
            SupplyOrderCmd::new("BS-7", driver_id, Utc::now()).item(bottle_type_id, 0, 30),
        )
        .unwrap()
        .order;
    engine
        .create_return_order(
            ReturnOrderCmd::new(driver_id, Utc::now())
                .supply_order(supply.id)
                .item(
                    ReturnItemInput::new(bottle_type_id)
                        .returned_empty(20)
                        .consigne(5)
                        .lost(2)
                        .foreign(3)
                        .defective(1),
                ),
        )
        .unwrap();
    engine
        .add_foreign_bottles("Butane Nord", bottle_type_id, 4)
        .unwrap();

    let totals = engine.impact_all_time();
    assert_eq!(totals.empty_delta, 10);
    assert_eq!(totals.full_delta, -30);
    assert_eq!(totals.defective_delta, 1);
    assert_eq!(totals.foreign_delta, 7);

    // Aggregated empty/defective deltas match the audit trail's sums.
    let empty_from_history: i64 = engine
        .stock_history()
        .iter()
        .filter(|e| e.stock == StockKind::Empty)
        .map(|e| e.quantity)
        .sum();
    assert_eq!(totals.empty_delta, empty_from_history);

    // And the windowed views see today's activity.
    let now = Utc::now();
    assert_eq!(engine.impact(ImpactWindow::Today, now), totals);
    assert_eq!(engine.impact(ImpactWindow::Last7Days, now), totals);
}

#[test]
fn snapshot_round_trips_byte_for_byte() {
    let (mut engine, bottle_type_id, driver_id) = engine_with_fixture();
    let supply = engine
        .create_supply_order(
            SupplyOrderCmd::new("BS-7", driver_id, Utc::now()).item(bottle_type_id, 2, 30),
        )
        .unwrap()
        .order;
    engine
        .create_return_order(
            ReturnOrderCmd::new(driver_id, Utc::now())
                .supply_order(supply.id)
                .item(
                    ReturnItemInput::new(bottle_type_id)
                        .returned_empty(12)
                        .foreign_branded(3, "Gaz du Sud"),
                ),
        )
        .unwrap();

    let exported = engine.export_snapshot();
    let bytes = serde_json::to_vec(&exported).unwrap();

    let mut restored = Engine::builder().build().unwrap();
    restored
        .import_snapshot(serde_json::from_slice(&bytes).unwrap())
        .unwrap();
    let bytes_again = serde_json::to_vec(&restored.export_snapshot()).unwrap();
    assert_eq!(bytes, bytes_again);
    assert_eq!(restored.export_snapshot(), exported);
}

#[test]
fn snapshot_store_survives_engine_restart() {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../target/test_snapshots");
    std::fs::create_dir_all(&root).unwrap();
    let path = root.join(format!("engine_{}.json", Uuid::new_v4()));

    let bottle_type_id = {
        let mut engine = Engine::builder()
            .store(SnapshotStore::new(&path))
            .build()
            .unwrap();
        let id = engine
            .create_bottle_type("12KG", "12KG", MoneyCents::new(5000), 100)
            .unwrap();
        engine.add_empty_stock(id, 6, None).unwrap();
        id
    };

    let engine = Engine::builder()
        .store(SnapshotStore::new(&path))
        .build()
        .unwrap();
    assert_eq!(engine.bottle_types().len(), 1);
    assert_eq!(
        engine
            .empty_stock()
            .iter()
            .find(|e| e.bottle_type_id == bottle_type_id)
            .unwrap()
            .quantity,
        6
    );
    std::fs::remove_file(&path).unwrap();
}

#[test]
fn clear_inventory_keeps_definitions_and_audit_trail() {
    let (mut engine, bottle_type_id, driver_id) = engine_with_fixture();
    engine.add_empty_stock(bottle_type_id, 6, None).unwrap();
    engine
        .create_supply_order(
            SupplyOrderCmd::new("BS-7", driver_id, Utc::now()).item(bottle_type_id, 0, 30),
        )
        .unwrap();
    let history_len = engine.stock_history().len();

    engine.clear_all_inventory().unwrap();

    let bottle_type = engine.bottle_type(bottle_type_id).unwrap();
    assert_eq!(bottle_type.name, "12KG");
    assert_eq!(bottle_type.total_quantity, 0);
    assert_eq!(bottle_type.distributed_quantity, 0);
    assert_eq!(bottle_type.remaining_quantity, 0);
    assert!(engine.empty_stock().is_empty());
    assert_eq!(engine.stock_history().len(), history_len);
    assert_eq!(engine.supply_orders().len(), 1);
}

#[test]
fn unknown_driver_or_type_rejects_before_mutation() {
    let (mut engine, bottle_type_id, driver_id) = engine_with_fixture();

    let err = engine
        .create_supply_order(
            SupplyOrderCmd::new("BS-1", Uuid::new_v4(), Utc::now()).item(bottle_type_id, 0, 5),
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine
        .create_supply_order(
            SupplyOrderCmd::new("BS-1", driver_id, Utc::now()).item(Uuid::new_v4(), 0, 5),
        )
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    assert!(engine.supply_orders().is_empty());
    assert_eq!(engine.bottle_type(bottle_type_id).unwrap().distributed_quantity, 0);
}
