//! Shared helpers for integration tests.

#![allow(dead_code)]

pub mod socket_guard;

use serde_json::{Value, json};

/// A catalog book as the store serves it.
pub fn book_json(id: &str, name: &str, quantity: i64) -> Value {
    json!({
        "_id": id,
        "name": name,
        "author": "Frank Herbert",
        "category": "Sci-Fi",
        "quantity": quantity,
        "rating": 4.5,
        "image": "https://img.example/dune.jpg",
        "description": "Spice."
    })
}

/// A borrow record as the store serves it.
pub fn borrow_json(id: &str, book_id: &str, email: &str, due: &str) -> Value {
    json!({
        "_id": id,
        "bookId": book_id,
        "title": "Dune",
        "image": "https://img.example/dune.jpg",
        "category": "Sci-Fi",
        "email": email,
        "userName": "Ann",
        "borrowDate": "2025-06-01",
        "returnDate": due
    })
}
