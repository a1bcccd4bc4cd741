//! Property tests over arbitrary operation sequences.

use proptest::prelude::*;
use shop_cart::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Add { id: u8, cents: i64, qty: i64 },
    Remove { id: u8 },
    Update { id: u8, qty: i64 },
    Coupon(&'static str),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u8..6, -100i64..100_000, -3i64..20)
            .prop_map(|(id, cents, qty)| Op::Add { id, cents, qty }),
        (0u8..6).prop_map(|id| Op::Remove { id }),
        (0u8..6, -3i64..20).prop_map(|(id, qty)| Op::Update { id, qty }),
        prop::sample::select(vec!["SAVE10", "save20", " Save10 ", "BOGUS", ""])
            .prop_map(Op::Coupon),
    ]
}

fn apply(store: &mut CartStore, op: &Op) -> Result<(), CartError> {
    match op {
        Op::Add { id, cents, qty } => store
            .add_item(LineItem::new(
                u64::from(*id),
                format!("Item {}", id),
                Money::from_cents(*cents),
                *qty,
            ))
            .map(|_| ()),
        Op::Remove { id } => {
            store.remove_item(&ItemId::from(u64::from(*id)));
            Ok(())
        }
        Op::Update { id, qty } => store
            .update_quantity(&ItemId::from(u64::from(*id)), *qty)
            .map(|_| ()),
        Op::Coupon(code) => store.apply_coupon(code).map(|_| ()),
    }
}

proptest! {
    #[test]
    fn prop_total_never_negative(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut store = CartStore::with_defaults();
        for op in &ops {
            let _ = apply(&mut store, op);
            prop_assert!(!store.calculate_total().is_negative());
        }
    }

    #[test]
    fn prop_failed_ops_change_nothing(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let sink = RecordingSink::new();
        let mut store = CartStore::with_defaults().with_sink(sink.clone());
        for op in &ops {
            let before = store.snapshot();
            let notified = sink.len();
            if apply(&mut store, op).is_err() {
                prop_assert_eq!(store.snapshot(), before);
                prop_assert_eq!(sink.len(), notified);
            } else {
                prop_assert_eq!(sink.len(), notified + 1);
                prop_assert_eq!(sink.last().unwrap(), store.snapshot());
            }
        }
    }

    #[test]
    fn prop_cart_invariants_hold(ops in prop::collection::vec(op_strategy(), 0..40)) {
        let mut store = CartStore::with_defaults();
        for op in &ops {
            let _ = apply(&mut store, op);
            let state = store.state();
            let mut ids: Vec<&ItemId> = state.items().iter().map(|i| &i.id).collect();
            ids.sort();
            ids.dedup();
            prop_assert_eq!(ids.len(), state.unique_item_count());
            prop_assert!(state.items().iter().all(|i| i.quantity > 0));
            if state.is_empty() {
                prop_assert_eq!(state.coupon(), &CouponState::none());
            }
        }
    }

    #[test]
    fn prop_repeated_add_merges(q1 in 1i64..1000, q2 in 1i64..1000) {
        let mut store = CartStore::new(CartState::empty(), CouponTable::default());
        store.add_item(LineItem::new("x", "X", Money::from_cents(100), q1)).unwrap();
        store.add_item(LineItem::new("x", "X", Money::from_cents(100), q2)).unwrap();
        prop_assert_eq!(store.state().unique_item_count(), 1);
        prop_assert_eq!(store.state().items()[0].quantity, q1 + q2);
    }

    #[test]
    fn prop_total_independent_of_order(
        rows in prop::collection::vec((0i64..100_000, 1i64..50), 1..8)
    ) {
        let items: Vec<LineItem> = rows
            .iter()
            .enumerate()
            .map(|(i, (cents, qty))| LineItem::new(i as u64, "Row", Money::from_cents(*cents), *qty))
            .collect();
        let mut reversed = items.clone();
        reversed.reverse();

        let a = CartState::from_parts(items, CouponState::none()).unwrap();
        let b = CartState::from_parts(reversed, CouponState::none()).unwrap();
        prop_assert_eq!(a.calculate_total(), b.calculate_total());
    }
}
