//! Concurrency tests for the draw and shop flows
//!
//! Each scenario hammers one contended resource from many tasks, then
//! checks the invariants that must survive the contention: the budget is
//! never oversubscribed, each user wins at most once per day, stock never
//! goes negative, and cancels pay out exactly once.

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use fortuna_core::models::{ParticipationStatus, PointEntry, PointStatus, Product, User};
    use fortuna_core::traits::{
        BudgetRepository, OrderRepository, ParticipationRepository, PointRepository,
        ProductRepository, UserRepository,
    };
    use fortuna_core::AppError;
    use fortuna_services::{OrderService, PointLedger, SpinService};
    use fortuna_store::{
        MemBudgetRepository, MemOrderRepository, MemParticipationRepository, MemPointRepository,
        MemProductRepository, MemStore, MemUserRepository, StoreSettings,
    };
    use futures::future::join_all;
    use std::sync::Arc;
    use std::time::Duration;

    struct TestApp {
        store: Arc<MemStore>,
        spin: SpinService,
        ledger: PointLedger,
        orders: OrderService,
    }

    fn settings(daily_budget_total: i64) -> StoreSettings {
        StoreSettings {
            lock_wait: Duration::from_secs(5),
            daily_budget_total,
        }
    }

    fn build_app(settings: StoreSettings) -> TestApp {
        let store = Arc::new(MemStore::with_settings(settings));
        let budgets = Arc::new(MemBudgetRepository::new(store.clone()));
        let participations = Arc::new(MemParticipationRepository::new(store.clone()));
        let points = Arc::new(MemPointRepository::new(store.clone()));
        let products = Arc::new(MemProductRepository::new(store.clone()));
        let orders = Arc::new(MemOrderRepository::new(store.clone()));
        let users = Arc::new(MemUserRepository::new(store.clone()));

        let ledger = PointLedger::new(points.clone());
        let spin = SpinService::new(
            budgets,
            participations,
            points,
            users.clone(),
        );
        let order_service = OrderService::new(orders, products, users, ledger.clone());

        TestApp {
            store,
            spin,
            ledger,
            orders: order_service,
        }
    }

    async fn add_user(app: &TestApp, name: &str) -> i64 {
        MemUserRepository::new(app.store.clone())
            .create(&User::new(name.to_string()))
            .await
            .unwrap()
            .id
    }

    async fn grant(app: &TestApp, user_id: i64, amount: i64) {
        MemPointRepository::new(app.store.clone())
            .create(&PointEntry::new(user_id, amount))
            .await
            .unwrap();
    }

    async fn add_product(app: &TestApp, price: i64, stock: i64) -> i64 {
        MemProductRepository::new(app.store.clone())
            .create(&Product::new("Coffee Coupon".to_string(), None, price, stock))
            .await
            .unwrap()
            .id
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_same_user_concurrent_spins_win_once() {
        let app = build_app(settings(100_000));
        let user_id = add_user(&app, "player").await;

        let mut handles = Vec::new();
        for _ in 0..10 {
            let spin = app.spin.clone();
            handles.push(tokio::spawn(async move { spin.spin(user_id).await }));
        }

        let mut wins = 0;
        let mut duplicates = 0;
        for result in join_all(handles).await {
            match result.unwrap() {
                Ok(_) => wins += 1,
                Err(AppError::AlreadyParticipated) => duplicates += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(wins, 1);
        assert_eq!(duplicates, 9);
        assert_eq!(app.spin.history(user_id).await.unwrap().len(), 1);

        // Exactly one grant landed in the ledger
        let entries = app.ledger.entries(user_id).await.unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_spins_never_exceed_budget() {
        let app = build_app(settings(1000));

        let mut user_ids = Vec::new();
        for i in 0..20 {
            user_ids.push(add_user(&app, &format!("player{i}")).await);
        }

        let mut handles = Vec::new();
        for user_id in user_ids {
            let spin = app.spin.clone();
            handles.push(tokio::spawn(async move { spin.spin(user_id).await }));
        }

        let mut awards = Vec::new();
        for result in join_all(handles).await {
            match result.unwrap() {
                Ok(win) => awards.push(win.participation.awarded_points),
                Err(AppError::BudgetExhausted { .. }) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        let total: i64 = awards.iter().sum();
        assert!(!awards.is_empty());
        assert!(total <= 1000, "awards {total} exceed the budget");
        assert!(awards.iter().all(|a| (100..=1000).contains(a)));

        let budgets = MemBudgetRepository::new(app.store.clone());
        let budget = budgets
            .find_by_date(Utc::now().date_naive())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(budget.used_budget, total);
        assert!(budget.used_budget <= budget.total_budget);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_spins_all_win_under_large_budget() {
        let app = build_app(settings(100_000));

        let mut user_ids = Vec::new();
        for i in 0..50 {
            user_ids.push(add_user(&app, &format!("player{i}")).await);
        }

        let mut handles = Vec::new();
        for user_id in user_ids.clone() {
            let spin = app.spin.clone();
            handles.push(tokio::spawn(async move { spin.spin(user_id).await }));
        }

        let mut total = 0;
        for result in join_all(handles).await {
            total += result.unwrap().unwrap().participation.awarded_points;
        }

        let budgets = MemBudgetRepository::new(app.store.clone());
        let budget = budgets
            .find_by_date(Utc::now().date_naive())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(budget.used_budget, total);

        // Every winner holds exactly their award
        for user_id in user_ids {
            let summary = app.ledger.balance(user_id).await.unwrap();
            let history = app.spin.history(user_id).await.unwrap();
            assert_eq!(summary.available, history[0].participation.awarded_points);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_participation_cancels_restore_once() {
        let app = build_app(settings(100_000));
        let user_id = add_user(&app, "player").await;

        let win = app.spin.spin(user_id).await.unwrap();
        let participation_id = win.participation.id;

        let mut handles = Vec::new();
        for _ in 0..5 {
            let spin = app.spin.clone();
            handles.push(tokio::spawn(async move {
                spin.cancel_participation(participation_id).await
            }));
        }

        let mut cancelled = 0;
        let mut already = 0;
        for result in join_all(handles).await {
            match result.unwrap() {
                Ok(outcome) => {
                    assert!(outcome.budget_restored);
                    cancelled += 1;
                }
                Err(AppError::ParticipationAlreadyCancelled(_)) => already += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(cancelled, 1);
        assert_eq!(already, 4);

        // The award went back exactly once; used budget is zero, not negative
        let budgets = MemBudgetRepository::new(app.store.clone());
        let budget = budgets
            .find_by_date(Utc::now().date_naive())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(budget.used_budget, 0);

        let points = MemPointRepository::new(app.store.clone());
        let entry = points
            .find_by_id(win.point_entry.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(entry.status, PointStatus::Canceled);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_cancel_racing_spin_keeps_award_accounting() {
        let app = build_app(settings(100_000));
        let user_id = add_user(&app, "player").await;
        let today = Utc::now().date_naive();

        let spinner = {
            let spin = app.spin.clone();
            tokio::spawn(async move { spin.spin(user_id).await })
        };
        let canceller = {
            let spin = app.spin.clone();
            let participations = MemParticipationRepository::new(app.store.clone());
            tokio::spawn(async move {
                // Pounce on the row the moment it becomes visible
                for _ in 0..1000 {
                    if let Some(row) = participations
                        .find_by_user_and_date(user_id, today)
                        .await
                        .unwrap()
                    {
                        match spin.cancel_participation(row.id).await {
                            Ok(_) => return true,
                            Err(e) if e.is_transient() => {}
                            Err(e) => panic!("unexpected error: {e}"),
                        }
                    }
                    tokio::task::yield_now().await;
                }
                false
            })
        };

        let win = spinner.await.unwrap().unwrap();
        let cancelled = canceller.await.unwrap();

        // Whatever the interleaving, the stored row, its entry and the
        // budget must tell the same story
        let participations = MemParticipationRepository::new(app.store.clone());
        let row = participations
            .find_by_id(win.participation.id)
            .await
            .unwrap()
            .unwrap();
        let budgets = MemBudgetRepository::new(app.store.clone());
        let budget = budgets.find_by_date(today).await.unwrap().unwrap();
        let points = MemPointRepository::new(app.store.clone());
        let entry = points
            .find_by_id(win.point_entry.id)
            .await
            .unwrap()
            .unwrap();

        if cancelled {
            assert_eq!(row.status, ParticipationStatus::Cancelled);
            assert_eq!(budget.used_budget, 0);
            assert_eq!(entry.status, PointStatus::Canceled);
        } else {
            assert_eq!(row.status, ParticipationStatus::Participated);
            assert_eq!(budget.used_budget, row.awarded_points);
            assert_eq!(entry.status, PointStatus::Earned);
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_buyers_share_limited_stock() {
        let app = build_app(settings(100_000));
        let product_id = add_product(&app, 300, 5).await;

        let mut buyer_ids = Vec::new();
        for i in 0..10 {
            let user_id = add_user(&app, &format!("buyer{i}")).await;
            grant(&app, user_id, 1000).await;
            buyer_ids.push(user_id);
        }

        let mut handles = Vec::new();
        for user_id in buyer_ids.clone() {
            let orders = app.orders.clone();
            handles.push(tokio::spawn(async move {
                (user_id, orders.place_order(user_id, product_id).await)
            }));
        }

        let mut bought = 0;
        let mut sold_out = 0;
        let mut winners = Vec::new();
        for result in join_all(handles).await {
            let (user_id, outcome) = result.unwrap();
            match outcome {
                Ok(_) => {
                    bought += 1;
                    winners.push(user_id);
                }
                Err(AppError::InsufficientStock(_)) => sold_out += 1,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(bought, 5);
        assert_eq!(sold_out, 5);

        let products = MemProductRepository::new(app.store.clone());
        let product = products.find_by_id(product_id).await.unwrap().unwrap();
        assert_eq!(product.stock, 0);

        // Winners paid, losers kept their points
        for user_id in buyer_ids {
            let summary = app.ledger.balance(user_id).await.unwrap();
            if winners.contains(&user_id) {
                assert_eq!(summary.available, 700);
            } else {
                assert_eq!(summary.available, 1000);
            }
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_single_unit_goes_to_one_buyer() {
        let app = build_app(settings(100_000));
        let product_id = add_product(&app, 300, 1).await;

        let mut handles = Vec::new();
        for i in 0..5 {
            let user_id = add_user(&app, &format!("buyer{i}")).await;
            grant(&app, user_id, 1000).await;
            let orders = app.orders.clone();
            handles.push(tokio::spawn(async move {
                orders.place_order(user_id, product_id).await
            }));
        }

        let mut bought = 0;
        for result in join_all(handles).await {
            match result.unwrap() {
                Ok(_) => bought += 1,
                Err(AppError::InsufficientStock(_)) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(bought, 1);

        let products = MemProductRepository::new(app.store.clone());
        assert_eq!(
            products.find_by_id(product_id).await.unwrap().unwrap().stock,
            0
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_order_cancels_refund_once() {
        let app = build_app(settings(100_000));
        let user_id = add_user(&app, "buyer").await;
        grant(&app, user_id, 300).await;
        let product_id = add_product(&app, 300, 5).await;

        let order = app.orders.place_order(user_id, product_id).await.unwrap();
        assert_eq!(app.ledger.balance(user_id).await.unwrap().available, 0);

        let mut handles = Vec::new();
        for _ in 0..5 {
            let orders = app.orders.clone();
            let order_id = order.id;
            handles.push(tokio::spawn(
                async move { orders.cancel_order(order_id).await },
            ));
        }

        let mut cancelled = 0;
        for result in join_all(handles).await {
            match result.unwrap() {
                Ok(_) => cancelled += 1,
                Err(AppError::OrderAlreadyCancelled(_)) => {}
                Err(e) => panic!("unexpected error: {e}"),
            }
        }

        assert_eq!(cancelled, 1);

        // One refund, one unit back
        assert_eq!(app.ledger.balance(user_id).await.unwrap().available, 300);
        let products = MemProductRepository::new(app.store.clone());
        assert_eq!(
            products.find_by_id(product_id).await.unwrap().unwrap().stock,
            5
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_cancel_and_rebuy_conserve_points_and_stock() {
        let app = build_app(settings(100_000));
        let user_id = add_user(&app, "buyer").await;
        grant(&app, user_id, 600).await;
        let product_id = add_product(&app, 300, 10).await;

        let first = app.orders.place_order(user_id, product_id).await.unwrap();
        assert_eq!(app.ledger.balance(user_id).await.unwrap().available, 300);

        let cancel = {
            let orders = app.orders.clone();
            let order_id = first.id;
            tokio::spawn(async move { orders.cancel_order(order_id).await })
        };
        let rebuy = {
            let orders = app.orders.clone();
            tokio::spawn(async move { orders.place_order(user_id, product_id).await })
        };

        cancel.await.unwrap().unwrap();
        let second = rebuy.await.unwrap().unwrap();

        // Net effect: one order stands, one refund landed
        assert_eq!(app.ledger.balance(user_id).await.unwrap().available, 300);

        let orders_repo = MemOrderRepository::new(app.store.clone());
        let first = orders_repo.find_by_id(first.id).await.unwrap().unwrap();
        let second = orders_repo.find_by_id(second.id).await.unwrap().unwrap();
        assert!(!first.status.is_completed());
        assert!(second.status.is_completed());

        let products = MemProductRepository::new(app.store.clone());
        assert_eq!(
            products.find_by_id(product_id).await.unwrap().unwrap().stock,
            9
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_spin_times_out_when_budget_lease_is_held() {
        let app = build_app(StoreSettings {
            lock_wait: Duration::from_millis(20),
            daily_budget_total: 100_000,
        });
        let user_id = add_user(&app, "player").await;

        let budgets = MemBudgetRepository::new(app.store.clone());
        let _held = budgets.lock(Utc::now().date_naive()).await.unwrap();

        let err = app.spin.spin(user_id).await.unwrap_err();
        assert!(matches!(err, AppError::LockTimeout(_)));
        assert!(err.is_transient());
    }
}
