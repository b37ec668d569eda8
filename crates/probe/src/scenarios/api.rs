//! Booking API scenarios.
//!
//! Status checks and field comparisons are soft; schema conformance and
//! fixture preconditions are hard.

use super::{Scenario, ScenarioEnv, Suite};
use crate::assertion::{json_path, SoftAssertions};
use crate::data::BookingData;
use crate::result::ProbeResult;
use crate::schema::SchemaKind;
use serde_json::{json, Value};

/// Booking fields compared between a request and its echo
pub const BOOKING_FIELDS: [&str; 7] = [
    "firstname",
    "lastname",
    "totalprice",
    "depositpaid",
    "bookingdates.checkin",
    "bookingdates.checkout",
    "additionalneeds",
];

/// Softly compare every booking field of `actual` (under `prefix`) with `expected`.
pub fn expect_booking_fields(
    soft: &SoftAssertions,
    actual: &Value,
    prefix: &str,
    expected: &Value,
) {
    for field in BOOKING_FIELDS {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };
        let want = json_path(expected, field).cloned().unwrap_or(Value::Null);
        soft.assert_json_eq(actual, &path, &want, field);
    }
}

/// The API scenarios in catalogue order.
#[must_use]
pub fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario::new(Suite::Api, "post_api_request", "Verify POST API Request", |env| {
            Box::pin(post_literal(env))
        })
        .tagged(&["api"]),
        Scenario::new(
            Suite::Api,
            "post_api_request",
            "Verify POST API Request using JSON File",
            |env| Box::pin(post_from_file(env)),
        )
        .tagged(&["api"]),
        Scenario::new(
            Suite::Api,
            "post_api_request",
            "Verify POST API Request using random data generation",
            |env| Box::pin(post_random(env)),
        )
        .tagged(&["api"]),
        Scenario::new(
            Suite::Api,
            "get_api_request",
            "Get Booking Details by ID - path parameter",
            |env| Box::pin(get_by_id(env)),
        )
        .tagged(&["api"]),
        Scenario::new(
            Suite::Api,
            "get_api_request",
            "Get Booking IDs by Name with Query Parameters",
            |env| Box::pin(get_by_name(env)),
        )
        .tagged(&["api"]),
        Scenario::new(Suite::Api, "put_api_request", "Verify PUT API Request", |env| {
            Box::pin(put_booking(env))
        })
        .tagged(&["api"]),
        Scenario::new(Suite::Api, "delete_api_request", "Verify DELETE API Request", |env| {
            Box::pin(delete_booking(env))
        })
        .tagged(&["api"]),
    ]
}

async fn create_and_verify(env: &mut ScenarioEnv, request: &Value) -> ProbeResult<()> {
    let response = env.client.create_booking(request).await?;
    env.soft.assert_eq(&response.status, &200, "POST /booking status");
    let body: Value = response.json()?;
    tracing::info!(%body, "create response body");

    env.schemas.get(SchemaKind::Create).ensure_valid(&body)?;

    env.soft.assert_has_property(&body, "bookingid", "create response");
    expect_booking_fields(&env.soft, &body, "booking", request);
    Ok(())
}

async fn post_literal(mut env: ScenarioEnv) -> ProbeResult<()> {
    let request = json!({
        "firstname": "Jim",
        "lastname": "Brown",
        "totalprice": 111,
        "depositpaid": true,
        "bookingdates": { "checkin": "2018-01-01", "checkout": "2019-01-01" },
        "additionalneeds": "Breakfast"
    });
    create_and_verify(&mut env, &request).await?;
    env.finish()
}

async fn post_from_file(mut env: ScenarioEnv) -> ProbeResult<()> {
    let request = env.test_data.post_request_body()?;
    create_and_verify(&mut env, &request).await?;
    env.finish()
}

async fn post_random(mut env: ScenarioEnv) -> ProbeResult<()> {
    let request = BookingData::random().to_value();
    create_and_verify(&mut env, &request).await?;
    env.finish()
}

async fn get_by_id(mut env: ScenarioEnv) -> ProbeResult<()> {
    let id = env.fixtures.booking_id().await?;
    let response = env.client.get_booking(id).await?;
    env.soft.assert_eq(&response.status, &200, "GET /booking/{id} status");
    let body: Value = response.json()?;
    tracing::info!(%body, "read response body");

    env.schemas.get(SchemaKind::Read).ensure_valid(&body)?;

    for property in [
        "firstname",
        "lastname",
        "totalprice",
        "depositpaid",
        "bookingdates",
        "bookingdates.checkin",
        "bookingdates.checkout",
    ] {
        env.soft.assert_has_property(&body, property, "read response");
    }

    let created = env.fixtures.booking_data().await?.to_value();
    expect_booking_fields(&env.soft, &body, "", &created);

    let again = env.client.get_booking(id).await?;
    env.soft.assert_eq(
        again.body.as_str(),
        response.body.as_str(),
        "repeated GET /booking/{id} body",
    );
    env.finish()
}

async fn get_by_name(mut env: ScenarioEnv) -> ProbeResult<()> {
    let response = env.client.search_bookings("Jim", "Brown").await?;
    env.soft.assert_eq(&response.status, &200, "GET /booking?firstname&lastname status");
    let body: Value = response.json()?;
    tracing::info!(%body, "search response body");

    env.schemas.get(SchemaKind::Search).ensure_valid(&body)?;

    let items = body.as_array().cloned().unwrap_or_default();
    env.soft.assert_true(body.is_array(), "search response is an array");
    env.soft.assert_gt(&items.len(), &0, "search result count");
    for item in &items {
        env.soft.assert_has_property(item, "bookingid", "search item");
        let id = item.get("bookingid").and_then(Value::as_i64);
        env.soft.assert_true(id.is_some(), "search item bookingid is a number");
        env.soft.assert_gt(&id.unwrap_or(0), &0, "search item bookingid");
    }
    env.finish()
}

async fn put_booking(mut env: ScenarioEnv) -> ProbeResult<()> {
    let request = env.test_data.put_request_body()?;
    let id = env.fixtures.booking_id().await?;
    let token = env.fixtures.token().await?;

    let response = env.client.update_booking(id, &request, &token).await?;
    env.soft.assert_true(response.is_ok(), "PUT /booking/{id} ok");
    let body: Value = response.json()?;
    tracing::info!(%body, "update response body");

    env.schemas.get(SchemaKind::Update).ensure_valid(&body)?;

    expect_booking_fields(&env.soft, &body, "", &request);
    env.finish()
}

async fn delete_booking(mut env: ScenarioEnv) -> ProbeResult<()> {
    let id = env.fixtures.booking_id().await?;
    let token = env.fixtures.token().await?;

    let deleted = env.client.delete_booking(id, &token).await?;
    env.soft.assert_eq(&deleted.status, &201, "DELETE /booking/{id} status");
    tracing::info!(status = deleted.status, "delete response status");

    let read = env.client.get_booking(id).await?;
    env.soft.assert_eq(&read.status, &404, "GET /booking/{id} after delete status");
    tracing::info!(status = read.status, body = %read.body, "read after delete");
    env.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expect_booking_fields_with_prefix() {
        let request = json!({
            "firstname": "Jim", "lastname": "Brown", "totalprice": 111, "depositpaid": true,
            "bookingdates": { "checkin": "2018-01-01", "checkout": "2019-01-01" },
            "additionalneeds": "Breakfast"
        });
        let mut echoed = json!({ "bookingid": 1, "booking": request.clone() });
        echoed["booking"]["totalprice"] = json!(112);

        let soft = SoftAssertions::new();
        expect_booking_fields(&soft, &echoed, "booking", &request);
        assert_eq!(soft.assertion_count(), BOOKING_FIELDS.len());
        assert_eq!(soft.failure_count(), 1);
        assert!(soft.failures()[0].message.contains("totalprice"));

        let soft = SoftAssertions::new();
        expect_booking_fields(&soft, &request, "", &request);
        assert!(soft.all_passed());
    }

    fn body_is_send<F>(_: impl Fn(ScenarioEnv) -> F)
    where
        F: std::future::Future<Output = ProbeResult<()>> + Send,
    {
    }

    #[test]
    fn test_bodies_are_send() {
        body_is_send(post_literal);
        body_is_send(post_from_file);
        body_is_send(post_random);
        body_is_send(get_by_id);
        body_is_send(get_by_name);
        body_is_send(put_booking);
        body_is_send(delete_booking);
    }
}
