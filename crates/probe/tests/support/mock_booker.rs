//! In-process stand-in for the booking API.
//!
//! Mirrors the public service closely enough for the scenarios: `/auth`
//! answers 200 with either a token or a `reason`, writes need a
//! `token=<..>` cookie, `DELETE` answers 201 and unknown ids on reads
//! answer 404.

use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "password123";

#[derive(Debug, Default)]
struct Store {
    next_id: u64,
    bookings: BTreeMap<u64, Value>,
    tokens: HashSet<String>,
    omit_booking_id: bool,
}

type Shared = Arc<Mutex<Store>>;

pub struct MockBooker {
    pub base_url: String,
    store: Shared,
}

impl MockBooker {
    /// Start a service seeded with one "Jim Brown" booking.
    pub async fn start() -> Self {
        Self::start_with(false).await
    }

    /// Start a service whose create response lacks `bookingid`.
    pub async fn start_without_booking_ids() -> Self {
        Self::start_with(true).await
    }

    async fn start_with(omit_booking_id: bool) -> Self {
        let store = Arc::new(Mutex::new(Store {
            next_id: 1,
            omit_booking_id,
            ..Store::default()
        }));
        insert(
            &store,
            json!({
                "firstname": "Jim",
                "lastname": "Brown",
                "totalprice": 111,
                "depositpaid": true,
                "bookingdates": { "checkin": "2018-01-01", "checkout": "2019-01-01" },
                "additionalneeds": "Breakfast"
            }),
        );

        let app = Router::new()
            .route("/auth", post(auth))
            .route("/booking", post(create).get(search))
            .route("/booking/{id}", get(read).put(update).delete(remove))
            .with_state(Arc::clone(&store));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{addr}"),
            store,
        }
    }

    pub fn booking(&self, id: u64) -> Option<Value> {
        self.store.lock().unwrap().bookings.get(&id).cloned()
    }

    pub fn booking_count(&self) -> usize {
        self.store.lock().unwrap().bookings.len()
    }
}

fn insert(store: &Shared, booking: Value) -> u64 {
    let mut store = store.lock().unwrap();
    let id = store.next_id;
    store.next_id += 1;
    store.bookings.insert(id, booking);
    id
}

fn authorized(store: &Shared, headers: &HeaderMap) -> bool {
    let Some(cookie) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    let store = store.lock().unwrap();
    cookie
        .split(';')
        .filter_map(|pair| pair.trim().strip_prefix("token="))
        .any(|token| store.tokens.contains(token))
}

async fn auth(State(store): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    if body["username"] == USERNAME && body["password"] == PASSWORD {
        let mut store = store.lock().unwrap();
        let token = format!("token{:04}", store.tokens.len() + 1);
        store.tokens.insert(token.clone());
        Json(json!({ "token": token }))
    } else {
        Json(json!({ "reason": "Bad credentials" }))
    }
}

async fn create(State(store): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let id = insert(&store, body.clone());
    if store.lock().unwrap().omit_booking_id {
        return Json(json!({ "booking": body }));
    }
    Json(json!({ "bookingid": id, "booking": body }))
}

async fn search(
    State(store): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Json<Value> {
    let store = store.lock().unwrap();
    let matches = |booking: &Value, field: &str| {
        query
            .get(field)
            .map_or(true, |wanted| booking[field] == wanted.as_str())
    };
    let ids: Vec<Value> = store
        .bookings
        .iter()
        .filter(|(_, booking)| matches(booking, "firstname") && matches(booking, "lastname"))
        .map(|(id, _)| json!({ "bookingid": id }))
        .collect();
    Json(Value::Array(ids))
}

async fn read(State(store): State<Shared>, Path(id): Path<u64>) -> Response {
    match store.lock().unwrap().bookings.get(&id) {
        Some(booking) => Json(booking.clone()).into_response(),
        None => (StatusCode::NOT_FOUND, "Not Found").into_response(),
    }
}

async fn update(
    State(store): State<Shared>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&store, &headers) {
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    }
    let mut store = store.lock().unwrap();
    match store.bookings.get_mut(&id) {
        Some(booking) => {
            *booking = body.clone();
            Json(body).into_response()
        }
        None => (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response(),
    }
}

async fn remove(State(store): State<Shared>, Path(id): Path<u64>, headers: HeaderMap) -> Response {
    if !authorized(&store, &headers) {
        return (StatusCode::FORBIDDEN, "Forbidden").into_response();
    }
    match store.lock().unwrap().bookings.remove(&id) {
        Some(_) => (StatusCode::CREATED, "Created").into_response(),
        None => (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed").into_response(),
    }
}
