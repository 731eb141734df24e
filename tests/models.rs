mod common;

use axum::http::StatusCode;
use time::macros::datetime;
use lunchly::models::customer::Customer;
use lunchly::models::error::ModelError;
use lunchly::models::reservation::Reservation;
use lunchly::repositories::postgres_repo::PostgresConnectionRepo;

async fn saved_customer(repo: &PostgresConnectionRepo, first_name: &str, last_name: &str) -> Customer {
    let mut customer = Customer::new(first_name, last_name, Some("555-0100".to_string()), None);
    customer.save(repo).await.unwrap();
    customer
}

#[tokio::test]
async fn unsaved_customer_has_no_reservations() {
    let repo = PostgresConnectionRepo::new(common::lazy_app_state().postgres_connection);
    let customer = Customer::new("Walk", "In", None, None);

    assert!(customer.get_reservations(&repo).await.unwrap().is_empty());
}

#[tokio::test]
async fn save_inserts_then_updates_customer() {
    let Some(repo) = common::live_repo().await else { return };
    let last_name = format!("Lovelace{}", common::unique_suffix());

    let mut customer = saved_customer(&repo, "Ada", &last_name).await;
    let id = customer.id.expect("insert assigns an id");

    customer.phone = None;
    customer.set_notes(Some("prefers the booth".to_string()));
    customer.save(&repo).await.unwrap();

    assert_eq!(customer.id, Some(id));
    let stored = Customer::get(&repo, id).await.unwrap();
    assert_eq!(stored, customer);
    assert_eq!(stored.notes(), "prefers the booth");
}

#[tokio::test]
async fn missing_customer_is_not_found() {
    let Some(repo) = common::live_repo().await else { return };

    let err = Customer::get(&repo, i32::MAX).await.unwrap_err();
    assert_eq!(err.to_string(), format!("No such customer: {}", i32::MAX));
    assert_eq!(err.status(), StatusCode::NOT_FOUND);

    let mut ghost = Customer::new("No", "Body", None, None).with_id(i32::MAX);
    assert!(matches!(ghost.save(&repo).await, Err(ModelError::NotFound { .. })));
}

#[tokio::test]
async fn search_matches_name_prefixes_case_insensitively() {
    let Some(repo) = common::live_repo().await else { return };
    let last_name = format!("Hopper{}", common::unique_suffix());
    let customer = saved_customer(&repo, "Grace", &last_name).await;

    let by_last = Customer::search(&repo, &last_name.to_lowercase()).await.unwrap();
    assert_eq!(by_last, vec![customer.clone()]);

    let by_full = Customer::search(&repo, &format!("grace {}", &last_name[..8])).await.unwrap();
    assert!(by_full.contains(&customer));

    let middle = Customer::search(&repo, &last_name[3..]).await.unwrap();
    assert!(!middle.contains(&customer));

    let all = Customer::all(&repo).await.unwrap();
    assert!(all.contains(&customer));
}

#[tokio::test]
async fn reservations_round_trip_in_start_order() {
    let Some(repo) = common::live_repo().await else { return };
    let customer = saved_customer(&repo, "Alan", &format!("Turing{}", common::unique_suffix())).await;
    let customer_id = customer.id.unwrap();

    let mut dinner = Reservation::new(customer_id, 4, datetime!(2024-06-23 19:30), Some("anniversary".to_string())).unwrap();
    let mut lunch = Reservation::new(customer_id, 2, datetime!(2024-06-23 12:00), None).unwrap();
    dinner.save(&repo).await.unwrap();
    lunch.save(&repo).await.unwrap();
    assert!(dinner.id.is_some() && lunch.id.is_some());

    let reservations = customer.get_reservations(&repo).await.unwrap();
    assert_eq!(reservations, vec![lunch.clone(), dinner.clone()]);
    assert_eq!(reservations[0].notes(), "");

    dinner.set_num_guests(6).unwrap();
    dinner.set_notes(None);
    dinner.save(&repo).await.unwrap();

    let reservations = Reservation::get_reservations_for_customer(&repo, customer_id).await.unwrap();
    assert_eq!(reservations[1].num_guests(), 6);
    assert_eq!(reservations[1].notes(), "");
}

#[tokio::test]
async fn top_ten_is_ranked_by_reservation_count() {
    let Some(repo) = common::live_repo().await else { return };
    let customer = saved_customer(&repo, "Edsger", &format!("Dijkstra{}", common::unique_suffix())).await;
    for day in 1..=3 {
        let start_at = datetime!(2024-09-01 18:00).replace_day(day).unwrap();
        Reservation::new(customer.id.unwrap(), 2, start_at, None)
            .unwrap()
            .save(&repo)
            .await
            .unwrap();
    }

    let top = Customer::top_ten(&repo).await.unwrap();
    assert!(!top.is_empty() && top.len() <= 10);
    assert!(top.iter().all(|entry| entry.count >= 1));
    assert!(top.windows(2).all(|pair| pair[0].count >= pair[1].count));
}

async fn book_many(repo: &PostgresConnectionRepo, customer: &Customer, count: i64) {
    for offset in 0..count {
        let start_at = datetime!(2025-01-01 18:00) + time::Duration::hours(offset);
        Reservation::new(customer.id.unwrap(), 2, start_at, None)
            .unwrap()
            .save(repo)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn top_ten_breaks_ties_by_name_and_skips_customers_without_reservations() {
    let Some(repo) = common::live_repo().await else { return };
    let suffix = common::unique_suffix();

    let busiest = Customer::top_ten(&repo)
        .await
        .unwrap()
        .first()
        .map_or(0, |entry| entry.count);
    let count = busiest + 5;

    let late_first_name = saved_customer(&repo, "Zelda", &format!("Tie{}a", suffix)).await;
    let early_first_name = saved_customer(&repo, "Abe", &format!("Tie{}b", suffix)).await;
    let late_last_name = saved_customer(&repo, "Bea", &format!("Tie{}b", suffix)).await;
    let no_bookings = saved_customer(&repo, "Idle", &format!("Tie{}c", suffix)).await;

    for customer in [&late_last_name, &early_first_name, &late_first_name] {
        book_many(&repo, customer, count).await;
    }

    let top = Customer::top_ten(&repo).await.unwrap();
    let leaders: Vec<(Customer, i64)> = top
        .iter()
        .take(3)
        .map(|entry| (entry.customer.clone(), entry.count))
        .collect();
    assert_eq!(leaders, vec![
        (late_first_name, count),
        (early_first_name, count),
        (late_last_name, count),
    ]);
    assert!(top.iter().all(|entry| entry.customer != no_bookings));
}

#[tokio::test]
async fn saving_unknown_reservation_is_not_found() {
    let Some(repo) = common::live_repo().await else { return };
    let customer = saved_customer(&repo, "Barbara", &format!("Liskov{}", common::unique_suffix())).await;

    let mut ghost = Reservation::new(customer.id.unwrap(), 2, datetime!(2024-06-01 19:00), None)
        .unwrap()
        .with_id(i32::MAX);
    let err = ghost.save(&repo).await.unwrap_err();
    assert_eq!(err.to_string(), format!("No such reservation: {}", i32::MAX));
}

#[tokio::test]
async fn booking_for_unknown_customer_is_not_found() {
    let Some(repo) = common::live_repo().await else { return };

    let mut orphan = Reservation::new(i32::MAX, 2, datetime!(2024-06-01 19:00), None).unwrap();
    let err = orphan.save(&repo).await.unwrap_err();

    assert_eq!(err.to_string(), format!("No such customer: {}", i32::MAX));
    assert_eq!(err.status(), StatusCode::NOT_FOUND);
    assert_eq!(orphan.id, None);
}

#[tokio::test]
async fn search_treats_wildcards_literally() {
    let Some(repo) = common::live_repo().await else { return };
    let suffix = common::unique_suffix();
    let percent = saved_customer(&repo, "Sale", &format!("50%off{}", suffix)).await;
    saved_customer(&repo, "Sale", &format!("50Xoff{}", suffix)).await;
    let underscore = saved_customer(&repo, "Sale", &format!("under_score{}", suffix)).await;
    saved_customer(&repo, "Sale", &format!("underXscore{}", suffix)).await;

    let found = Customer::search(&repo, &format!("50%off{}", suffix)).await.unwrap();
    assert_eq!(found, vec![percent]);

    let found = Customer::search(&repo, &format!("under_score{}", suffix)).await.unwrap();
    assert_eq!(found, vec![underscore]);
}
