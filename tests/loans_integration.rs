//! End-to-end borrow/return flows through the HTTP store.

use std::sync::Arc;
use std::time::Duration;

use bookshelf_core::catalog::{BookFilter, BookId, Catalog};
use bookshelf_core::loans::{Countdown, CountdownTicker, LoanCoordinator, LoanError, RecordId};
use bookshelf_core::session::{Borrower, StaticTokenProvider};
use bookshelf_core::store::HttpStore;
use chrono::NaiveDate;
use serde_json::json;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod support;
use support::socket_guard::start_mock_server_or_skip;
use support::{book_json, borrow_json};

const EMAIL: &str = "ann@example.com";

fn ann() -> Borrower {
    Borrower::new(EMAIL, "Ann")
}

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
}

async fn mount_session(server: &MockServer, records: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/books"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            book_json("b1", "Dune", 2),
            book_json("b2", "Emma", 0),
        ])))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/borrow/{EMAIL}")))
        .and(header("authorization", "Bearer tok"))
        .respond_with(ResponseTemplate::new(200).set_body_json(records))
        .mount(server)
        .await;
}

fn coordinator(server: &MockServer) -> LoanCoordinator<HttpStore, StaticTokenProvider> {
    LoanCoordinator::new(
        HttpStore::new(&server.uri()).unwrap(),
        StaticTokenProvider::new("tok"),
    )
}

#[tokio::test]
async fn test_load_borrow_and_return_round_trip() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_session(&server, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/borrow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"insertedId": "r-9"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/borrow/r-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deletedCount": 1})))
        .expect(1)
        .mount(&server)
        .await;

    let loans = coordinator(&server);
    let books = loans.load_session(&ann()).await.unwrap();
    let dune = books.iter().find(|b| b.id == BookId::new("b1")).unwrap();

    let record = loans
        .borrow(dune, Some(&ann()), day(1), Some(day(8)))
        .await
        .unwrap();
    assert_eq!(record.record_id, RecordId::new("r-9"));
    assert_eq!(loans.known_quantity(&dune.id), Some(1));
    assert!(loans.has_borrowed(&dune.id));

    loans.return_book(&record.record_id).await.unwrap();
    assert!(loans.active_records().is_empty());
    assert_eq!(loans.known_quantity(&dune.id), Some(1), "no local increment on return");
}

#[tokio::test]
async fn test_out_of_stock_book_never_reaches_store() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_session(&server, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/borrow"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"insertedId": "x"})))
        .expect(0)
        .mount(&server)
        .await;

    let loans = coordinator(&server);
    let books = loans.load_session(&ann()).await.unwrap();
    let emma = books.iter().find(|b| b.id == BookId::new("b2")).unwrap();

    let err = loans
        .borrow(emma, Some(&ann()), day(1), Some(day(8)))
        .await
        .unwrap_err();
    assert!(matches!(err, LoanError::OutOfStock { .. }), "{err:?}");
}

#[tokio::test]
async fn test_rejected_return_restores_record() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_session(&server, json!([borrow_json("r1", "b1", EMAIL, "2025-06-08")])).await;
    Mock::given(method("DELETE"))
        .and(path("/borrow/r1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "write failed"})))
        .mount(&server)
        .await;

    let loans = coordinator(&server);
    loans.load_session(&ann()).await.unwrap();
    let before = loans.record(&RecordId::new("r1")).unwrap();

    let err = loans.return_book(&RecordId::new("r1")).await.unwrap_err();

    match err {
        LoanError::RemoteRejected { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "write failed");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
    assert_eq!(loans.record(&RecordId::new("r1")), Some(before));
}

#[tokio::test]
async fn test_zero_deleted_is_inconsistent_delete() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_session(&server, json!([borrow_json("r1", "b1", EMAIL, "2025-06-08")])).await;
    Mock::given(method("DELETE"))
        .and(path("/borrow/r1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"deletedCount": 0})))
        .mount(&server)
        .await;

    let loans = coordinator(&server);
    loans.load_session(&ann()).await.unwrap();

    let err = loans.return_book(&RecordId::new("r1")).await.unwrap_err();
    assert!(matches!(err, LoanError::InconsistentDelete { .. }), "{err:?}");
    assert!(loans.record(&RecordId::new("r1")).is_some());
}

#[tokio::test]
async fn test_expired_borrow_store_401_is_unauthenticated() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_session(&server, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/borrow"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let loans = coordinator(&server);
    let books = loans.load_session(&ann()).await.unwrap();
    let dune = books.iter().find(|b| b.id == BookId::new("b1")).unwrap();

    let err = loans
        .borrow(dune, Some(&ann()), day(1), Some(day(8)))
        .await
        .unwrap_err();
    assert!(matches!(err, LoanError::Unauthenticated { .. }), "{err:?}");
    assert!(loans.active_records().is_empty());
    assert_eq!(loans.known_quantity(&dune.id), Some(2));
}

#[tokio::test]
async fn test_catalog_filters_over_http() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_session(&server, json!([])).await;

    let catalog = Catalog::new(
        HttpStore::new(&server.uri()).unwrap(),
        StaticTokenProvider::anonymous(),
    );
    let filter = BookFilter {
        available_only: true,
        ..BookFilter::default()
    };
    let books = catalog.list_books(&filter).await.unwrap();
    let names: Vec<&str> = books.iter().map(|b| b.name.as_str()).collect();
    assert_eq!(names, ["Dune"]);
}

#[tokio::test]
async fn test_ticker_tracks_loaded_records() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    mount_session(
        &server,
        json!([
            borrow_json("r-old", "b1", EMAIL, "2000-01-01"),
            borrow_json("r-new", "b2", EMAIL, "2999-01-01"),
        ]),
    )
    .await;

    let loans = Arc::new(coordinator(&server));
    loans.load_session(&ann()).await.unwrap();

    let mut ticker = CountdownTicker::start(Arc::clone(&loans), Duration::from_millis(100));
    let board = ticker.next().await.unwrap();

    assert_eq!(board.len(), 2);
    assert_eq!(board[&RecordId::new("r-old")], Countdown::Expired);
    assert!(!board[&RecordId::new("r-new")].is_expired());
    ticker.stop();
}
