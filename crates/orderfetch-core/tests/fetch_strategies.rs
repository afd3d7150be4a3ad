//! Integration tests for the fetch strategies.

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use orderfetch_core::assemble;
use orderfetch_core::catalog::{Address, OrderStatus};
use orderfetch_core::query::{
    FetchConfig, FetchPlanner, Loader, OrderSearch, Page, Predicate, Strategy,
};
use orderfetch_core::storage::{Line, StorageConfig, StorageEngine};
use orderfetch_core::Error;
use rusqlite::Connection;

fn at(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, day)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap()
}

/// Two orders: A with two lines, B with one.
struct TwoOrders {
    storage: StorageEngine,
    config: FetchConfig,
    order_a: i64,
    order_b: i64,
}

impl TwoOrders {
    fn new() -> Self {
        let storage = StorageEngine::open(StorageConfig::in_memory()).unwrap();
        let mut ids = (0, 0);
        storage
            .seed(|s| {
                let seoul = Address::new("Seoul", "Main 1", "1111");
                let busan = Address::new("Busan", "Harbor 2", "2222");
                let alice = s.member("alice", &seoul)?;
                let bob = s.member("bob", &busan)?;
                let jpa1 = s.item("JPA1 BOOK", 10_000, 100)?;
                let jpa2 = s.item("JPA2 BOOK", 20_000, 100)?;
                let spring = s.item("SPRING BOOK", 30_000, 100)?;
                ids.0 = s.order(
                    alice,
                    &seoul,
                    OrderStatus::Placed,
                    at(1),
                    &[Line::new(jpa1, 9_000, 1), Line::new(jpa2, 18_000, 2)],
                )?;
                ids.1 = s.order(
                    bob,
                    &busan,
                    OrderStatus::Placed,
                    at(2),
                    &[Line::new(spring, 30_000, 3)],
                )?;
                Ok(())
            })
            .unwrap();

        Self {
            storage,
            config: FetchConfig::default(),
            order_a: ids.0,
            order_b: ids.1,
        }
    }
}

/// `n` orders for one member, one line each.
fn many_orders(n: usize) -> StorageEngine {
    let storage = StorageEngine::open(StorageConfig::in_memory()).unwrap();
    seed_many(&storage, n);
    storage
}

fn seed_many(storage: &StorageEngine, n: usize) {
    storage
        .seed(|s| {
            let home = Address::new("Seoul", "1", "1111");
            let member = s.member("bulk", &home)?;
            let item = s.item("BOOK", 1_000, 10_000)?;
            for i in 0..n {
                s.order(
                    member,
                    &home,
                    OrderStatus::Placed,
                    at(1 + (i % 28) as u32),
                    &[Line::new(item, 1_000, 1)],
                )?;
            }
            Ok(())
        })
        .unwrap();
}

#[test]
fn test_naive_scenario_two_orders() {
    let fx = TwoOrders::new();
    let scope = fx.storage.read_scope().unwrap();
    let planner = FetchPlanner::new(&scope, &fx.config);

    let dtos = planner
        .order_dtos(Strategy::Naive, &Predicate::all(), None)
        .unwrap();

    assert_eq!(dtos.len(), 2);
    assert_eq!(dtos[0].order_id, fx.order_a);
    assert_eq!(dtos[0].member_name, "alice");
    assert_eq!(dtos[0].order_items.len(), 2);
    assert_eq!(dtos[0].order_items[0].item_name, "JPA1 BOOK");
    assert_eq!(dtos[0].order_items[0].order_price, 9_000);
    assert_eq!(dtos[0].order_items[1].count, 2);
    assert_eq!(dtos[1].order_id, fx.order_b);
    assert_eq!(dtos[1].order_items.len(), 1);
    assert_eq!(dtos[1].address.city, "Busan");
}

#[test]
fn test_full_join_matches_naive_output() {
    let fx = TwoOrders::new();
    let scope = fx.storage.read_scope().unwrap();
    let planner = FetchPlanner::new(&scope, &fx.config);

    let naive = planner
        .order_dtos(Strategy::Naive, &Predicate::all(), None)
        .unwrap();
    let joined = planner
        .order_dtos(Strategy::FullJoin, &Predicate::all(), None)
        .unwrap();

    assert_eq!(naive, joined);
}

#[test]
fn test_all_strategies_agree() {
    let fx = TwoOrders::new();
    let scope = fx.storage.read_scope().unwrap();
    let planner = FetchPlanner::new(&scope, &fx.config);

    let expected = planner
        .order_dtos(Strategy::TwoPhase, &Predicate::all(), None)
        .unwrap();
    for strategy in Strategy::ALL {
        let dtos = planner.order_dtos(strategy, &Predicate::all(), None).unwrap();
        assert_eq!(dtos, expected, "strategy {strategy}");
    }
}

#[test]
fn test_naive_and_full_join_same_ids_for_every_predicate() {
    let fx = TwoOrders::new();
    let statuses = [None, Some(OrderStatus::Placed), Some(OrderStatus::Cancelled)];
    let names = [None, Some(""), Some("  "), Some("li"), Some("bob"), Some("zzz")];

    for status in statuses {
        for name in names {
            let search = OrderSearch {
                status,
                member_name: name.map(str::to_string),
            };
            let predicate = Predicate::from(&search);

            let scope = fx.storage.read_scope().unwrap();
            let planner = FetchPlanner::new(&scope, &fx.config);
            let naive: BTreeSet<i64> = planner
                .fetch_orders(Strategy::Naive, &predicate, None)
                .unwrap()
                .iter()
                .map(|o| o.id)
                .collect();
            let joined: BTreeSet<i64> = planner
                .fetch_orders(Strategy::FullJoin, &predicate, None)
                .unwrap()
                .iter()
                .map(|o| o.id)
                .collect();
            assert_eq!(naive, joined, "search {search:?}");
            scope.commit().unwrap();
        }
    }
}

#[test]
fn test_member_name_filter_matches_substring() {
    let fx = TwoOrders::new();
    let scope = fx.storage.read_scope().unwrap();
    let planner = FetchPlanner::new(&scope, &fx.config);

    let predicate = Predicate::from(&OrderSearch::new().with_member_name("lic"));
    let dtos = planner
        .order_dtos(Strategy::TwoPhase, &predicate, None)
        .unwrap();

    assert_eq!(dtos.len(), 1);
    assert_eq!(dtos[0].member_name, "alice");
}

#[test]
fn test_full_join_collapses_duplicate_rows() {
    let fx = TwoOrders::new();
    let scope = fx.storage.read_scope().unwrap();

    let raw_rows: Vec<i64> = scope
        .query(
            "SELECT o.id FROM orders o JOIN order_item oi ON oi.order_id = o.id WHERE o.id = ?1",
            [fx.order_a],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(raw_rows.len(), 2);

    let planner = FetchPlanner::new(&scope, &fx.config);
    let orders = planner
        .fetch_orders(Strategy::FullJoin, &Predicate::all(), None)
        .unwrap();
    assert_eq!(orders.len(), 2);

    let order_a = planner.order_dto(fx.order_a).unwrap();
    assert_eq!(order_a.order_items.len(), 2);
    let names: Vec<&str> = order_a
        .order_items
        .iter()
        .map(|i| i.item_name.as_str())
        .collect();
    assert_eq!(names, vec!["JPA1 BOOK", "JPA2 BOOK"]);
}

#[test]
fn test_full_join_issues_one_round_trip() {
    let fx = TwoOrders::new();
    let scope = fx.storage.read_scope().unwrap();
    let planner = FetchPlanner::new(&scope, &fx.config);

    planner
        .order_dtos(Strategy::FullJoin, &Predicate::all(), None)
        .unwrap();
    assert_eq!(scope.round_trips(), 1);
}

#[test]
fn test_naive_round_trips_grow_with_roots() {
    let fx = TwoOrders::new();

    let scope = fx.storage.read_scope().unwrap();
    let planner = FetchPlanner::new(&scope, &fx.config);
    let orders = planner
        .fetch_orders(Strategy::Naive, &Predicate::all(), None)
        .unwrap();
    assemble::simple_order_dtos(&orders, planner.loader(), &scope).unwrap();
    // roots + member and delivery per order
    assert_eq!(scope.round_trips(), 1 + 2 * 2);
    scope.commit().unwrap();

    let scope = fx.storage.read_scope().unwrap();
    let planner = FetchPlanner::new(&scope, &fx.config);
    planner
        .order_dtos(Strategy::Naive, &Predicate::all(), None)
        .unwrap();
    // roots + (member, delivery, lines) per order + one per distinct item
    assert_eq!(scope.round_trips(), 1 + 3 * 2 + 3);
}

#[test]
fn test_lazy_relation_cached_for_scope() {
    let storage = many_orders(3);
    let config = FetchConfig::default();
    let scope = storage.read_scope().unwrap();
    let planner = FetchPlanner::new(&scope, &config);

    let orders = planner
        .fetch_orders(Strategy::Naive, &Predicate::all(), None)
        .unwrap();
    assemble::simple_order_dtos(&orders, planner.loader(), &scope).unwrap();
    // one shared member, three deliveries
    assert_eq!(scope.round_trips(), 1 + 1 + 3);

    let before = scope.round_trips();
    let member = planner.loader().resolve(&orders[2].member, &scope).unwrap();
    assert_eq!(member.name, "bulk");
    assert_eq!(scope.round_trips(), before);
}

#[test]
fn test_to_one_join_simple_orders_in_one_round_trip() {
    let fx = TwoOrders::new();
    let scope = fx.storage.read_scope().unwrap();
    let planner = FetchPlanner::new(&scope, &fx.config);

    let orders = planner
        .fetch_orders(Strategy::ToOneJoin, &Predicate::all(), None)
        .unwrap();
    let dtos = assemble::simple_order_dtos(&orders, planner.loader(), &scope).unwrap();

    assert_eq!(dtos.len(), 2);
    assert_eq!(dtos[0].name, "alice");
    assert_eq!(scope.round_trips(), 1);
}

#[test]
fn test_to_one_join_prefetches_lines_in_batches() {
    let fx = TwoOrders::new();

    let scope = fx.storage.read_scope().unwrap();
    let planner = FetchPlanner::new(&scope, &fx.config);
    let batched = planner
        .order_dtos(Strategy::ToOneJoin, &Predicate::all(), Some(Page::default()))
        .unwrap();
    assert_eq!(scope.round_trips(), 2);
    scope.commit().unwrap();

    let scope = fx.storage.read_scope().unwrap();
    let planner = FetchPlanner::new(&scope, &fx.config).with_loader(Loader::unbatched());
    let lazy = planner
        .order_dtos(Strategy::ToOneJoin, &Predicate::all(), Some(Page::default()))
        .unwrap();
    // roots + one collection per order + one per distinct item
    assert_eq!(scope.round_trips(), 1 + 2 + 3);

    assert_eq!(batched, lazy);
}

#[test]
fn test_two_phase_round_trips_within_threshold() {
    let storage = many_orders(40);
    let config = FetchConfig::default().with_in_clause_batch_size(50);
    let scope = storage.read_scope().unwrap();
    let planner = FetchPlanner::new(&scope, &config);

    let dtos = planner
        .order_dtos(Strategy::TwoPhase, &Predicate::all(), None)
        .unwrap();

    assert_eq!(dtos.len(), 40);
    assert!(dtos.iter().all(|dto| dto.order_items.len() == 1));
    assert_eq!(scope.round_trips(), 2);
}

#[test]
fn test_two_phase_round_trips_chunked_above_threshold() {
    let storage = many_orders(23);
    let config = FetchConfig::default().with_in_clause_batch_size(5);
    let scope = storage.read_scope().unwrap();
    let planner = FetchPlanner::new(&scope, &config);

    let dtos = planner
        .order_dtos(Strategy::TwoPhase, &Predicate::all(), None)
        .unwrap();

    assert_eq!(dtos.len(), 23);
    assert!(dtos.iter().all(|dto| dto.order_items.len() == 1));
    assert_eq!(scope.round_trips(), 23usize.div_ceil(5) + 1);
}

#[test]
fn test_two_phase_honors_page() {
    let storage = many_orders(10);
    let config = FetchConfig::default();
    let scope = storage.read_scope().unwrap();
    let planner = FetchPlanner::new(&scope, &config);

    let all = planner
        .order_dtos(Strategy::TwoPhase, &Predicate::all(), None)
        .unwrap();
    let page = planner
        .order_dtos(Strategy::TwoPhase, &Predicate::all(), Some(Page::new(3, 4)))
        .unwrap();

    assert_eq!(page.len(), 4);
    assert_eq!(page, all[3..7].to_vec());
}

#[test]
fn test_pagination_guard_on_planner() {
    let fx = TwoOrders::new();
    let scope = fx.storage.read_scope().unwrap();
    let planner = FetchPlanner::new(&scope, &fx.config);

    let err = planner
        .fetch_orders(Strategy::FullJoin, &Predicate::all(), Some(Page::limit(10)))
        .unwrap_err();
    assert!(matches!(err, Error::PaginationUnsupported { .. }));
    let err = planner
        .order_dtos(Strategy::FlatProjection, &Predicate::all(), Some(Page::limit(10)))
        .unwrap_err();
    assert!(matches!(err, Error::PaginationUnsupported { .. }));

    let page = planner
        .fetch_orders(Strategy::ToOneJoin, &Predicate::all(), Some(Page::limit(10)))
        .unwrap();
    assert_eq!(page.len(), 2);

    let second = planner
        .fetch_orders(Strategy::ToOneJoin, &Predicate::all(), Some(Page::new(1, 1)))
        .unwrap();
    assert_eq!(second.len(), 1);
    assert_eq!(second[0].id, fx.order_b);
}

#[test]
fn test_unpaged_queries_capped_at_max_results() {
    let storage = many_orders(8);
    let config = FetchConfig::default().with_max_results(5);
    let scope = storage.read_scope().unwrap();
    let planner = FetchPlanner::new(&scope, &config);

    let naive = planner
        .fetch_orders(Strategy::Naive, &Predicate::all(), None)
        .unwrap();
    let to_one = planner
        .fetch_orders(Strategy::ToOneJoin, &Predicate::all(), None)
        .unwrap();

    assert_eq!(naive.len(), 5);
    assert_eq!(to_one.len(), 5);

    let paged = planner
        .fetch_orders(Strategy::Naive, &Predicate::all(), Some(Page::new(5, 10)))
        .unwrap();
    assert_eq!(paged.len(), 3);
}

#[test]
fn test_cancelled_filter_with_no_cancelled_orders_is_empty() {
    let fx = TwoOrders::new();
    let scope = fx.storage.read_scope().unwrap();
    let planner = FetchPlanner::new(&scope, &fx.config);
    let predicate = Predicate::from(&OrderSearch::new().with_status(OrderStatus::Cancelled));

    for strategy in Strategy::ALL {
        let dtos = planner.order_dtos(strategy, &predicate, None).unwrap();
        assert!(dtos.is_empty(), "strategy {strategy}");
    }
    // phase 2 is skipped when phase 1 finds nothing
    let before = scope.round_trips();
    planner.two_phase(&predicate, None).unwrap();
    assert_eq!(scope.round_trips(), before + 1);
}

#[test]
fn test_two_phase_is_idempotent_across_scopes() {
    let fx = TwoOrders::new();

    let render = || {
        let scope = fx.storage.read_scope().unwrap();
        let planner = FetchPlanner::new(&scope, &fx.config);
        let dtos = planner
            .order_dtos(Strategy::TwoPhase, &Predicate::all(), None)
            .unwrap();
        scope.commit().unwrap();
        serde_json::to_vec(&dtos).unwrap()
    };

    assert_eq!(render(), render());
}

#[test]
fn test_resolving_outside_originating_scope_fails_fast() {
    let fx = TwoOrders::new();

    let scope = fx.storage.read_scope().unwrap();
    let planner = FetchPlanner::new(&scope, &fx.config);
    let lazy = planner
        .fetch_orders(Strategy::Naive, &Predicate::all(), None)
        .unwrap();
    let eager = planner
        .fetch_orders(Strategy::FullJoin, &Predicate::all(), None)
        .unwrap();
    scope.commit().unwrap();

    let later = fx.storage.read_scope().unwrap();
    let loader = Loader::unbatched();

    let err = loader.resolve(&lazy[0].member, &later).unwrap_err();
    assert!(matches!(err, Error::StaleReference { entity: "Member", .. }));

    let err = loader.resolve(&eager[0].delivery, &later).unwrap_err();
    assert!(matches!(err, Error::StaleReference { entity: "Delivery", .. }));

    let err = loader
        .resolve_order_items(&lazy[0].order_items, &later)
        .unwrap_err();
    assert!(matches!(err, Error::StaleReference { .. }));
    assert_eq!(later.round_trips(), 0);
}

#[test]
fn test_find_one() {
    let fx = TwoOrders::new();
    let scope = fx.storage.read_scope().unwrap();
    let planner = FetchPlanner::new(&scope, &fx.config);

    let dto = planner.order_dto(fx.order_b).unwrap();
    assert_eq!(dto.member_name, "bob");
    assert_eq!(dto.order_items.len(), 1);

    assert!(matches!(planner.order_dto(9_999), Err(Error::NotFound)));
}

#[test]
fn test_order_graph_exposes_entities() {
    let fx = TwoOrders::new();
    let scope = fx.storage.read_scope().unwrap();
    let planner = FetchPlanner::new(&scope, &fx.config);

    let orders = planner
        .fetch_orders(Strategy::Naive, &Predicate::all(), None)
        .unwrap();
    let graphs = assemble::order_graphs(&orders, planner.loader(), &scope).unwrap();

    assert_eq!(graphs.len(), 2);
    assert_eq!(graphs[0].member.name, "alice");
    assert_eq!(graphs[0].order_items[1].item.price, 20_000);
    assert_eq!(graphs[0].order_items[1].order_price, 18_000);

    let json = serde_json::to_value(&graphs[0]).unwrap();
    assert!(json["member"]["id"].is_i64());
    assert!(json["orderItems"][0]["item"]["stockQuantity"].is_i64());
}

#[test]
fn test_order_without_lines_survives_every_strategy() {
    let storage = StorageEngine::open(StorageConfig::in_memory()).unwrap();
    storage
        .seed(|s| {
            let home = Address::new("Daegu", "3", "3333");
            let member = s.member("carol", &home)?;
            s.order(member, &home, OrderStatus::Cancelled, at(3), &[])?;
            Ok(())
        })
        .unwrap();
    let config = FetchConfig::default();
    let scope = storage.read_scope().unwrap();
    let planner = FetchPlanner::new(&scope, &config);

    for strategy in Strategy::ALL {
        let dtos = planner.order_dtos(strategy, &Predicate::all(), None).unwrap();
        assert_eq!(dtos.len(), 1, "strategy {strategy}");
        assert!(dtos[0].order_items.is_empty());
        assert_eq!(dtos[0].order_status, OrderStatus::Cancelled);
    }
}

#[test]
fn test_failing_chunk_fails_whole_two_phase_read() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("orders.db");
    let storage = StorageEngine::open(StorageConfig::new(&path)).unwrap();
    seed_many(&storage, 5);

    let raw = Connection::open(&path).unwrap();
    raw.execute(
        "UPDATE order_item SET count = 'many' WHERE id = (SELECT MAX(id) FROM order_item)",
        [],
    )
    .unwrap();

    let config = FetchConfig::default().with_in_clause_batch_size(2);
    let scope = storage.read_scope().unwrap();
    let planner = FetchPlanner::new(&scope, &config);

    let result = planner.order_dtos(Strategy::TwoPhase, &Predicate::all(), None);
    assert!(matches!(result, Err(Error::Storage(_))), "got {result:?}");
    // roots, then chunks of two until the third chunk fails
    assert_eq!(scope.round_trips(), 1 + 3);
}

#[test]
fn test_reference_from_other_engine_is_stale() {
    let first = TwoOrders::new();
    let second = TwoOrders::new();

    let scope = first.storage.read_scope().unwrap();
    let planner = FetchPlanner::new(&scope, &first.config);
    let orders = planner
        .fetch_orders(Strategy::Naive, &Predicate::all(), None)
        .unwrap();

    let other = second.storage.read_scope().unwrap();
    let err = Loader::unbatched()
        .resolve(&orders[0].member, &other)
        .unwrap_err();
    assert!(matches!(err, Error::StaleReference { entity: "Member", .. }));
}
