//! Fixture Management
//!
//! Test-scoped fixtures resolved lazily and memoized per test.
//!
//! A [`FixtureContext`] belongs to exactly one running scenario. Each named
//! fixture is produced by an async factory the first time it is requested;
//! every later request (including concurrent ones) receives the same
//! `Arc`. Nothing is shared between contexts, so concurrently running
//! scenarios never contend on a fixture.

use crate::client::{extract_booking_id, extract_token, BookerClient};
use crate::config::Credentials;
use crate::data::BookingData;
use crate::result::{ProbeError, ProbeResult};
use crate::schema::{SchemaKind, SchemaSet};
use serde_json::Value;
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::OnceCell;

/// Fixture name for the random booking payload
pub const BOOKING_DATA: &str = "bookingData";

/// Fixture name for the session token
pub const TOKEN: &str = "token";

/// Fixture name for the created booking id
pub const BOOKING_ID: &str = "bookingId";

type Slot = Arc<OnceCell<Arc<dyn Any + Send + Sync>>>;

/// Per-test memo of resolved fixture values keyed by name.
#[derive(Default)]
pub struct FixtureContext {
    slots: Mutex<HashMap<String, Slot>>,
}

impl std::fmt::Debug for FixtureContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixtureContext")
            .field("resolved", &self.resolved())
            .finish()
    }
}

impl FixtureContext {
    /// Create an empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve `name`, running `factory` only if no value exists yet.
    ///
    /// A failed factory leaves the slot empty. Asking for an existing name
    /// with a different type is a fixture error.
    pub async fn resolve<T, F, Fut>(&self, name: &str, factory: F) -> ProbeResult<Arc<T>>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = ProbeResult<T>>,
    {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(name.to_string()).or_default())
        };

        let value = slot
            .get_or_try_init(|| async move {
                let value = factory().await?;
                tracing::debug!(fixture = name, "fixture resolved");
                Ok::<_, ProbeError>(Arc::new(value) as Arc<dyn Any + Send + Sync>)
            })
            .await?;

        Arc::clone(value).downcast::<T>().map_err(|_| {
            ProbeError::fixture(format!(
                "Fixture '{name}' was resolved with a different type than {}",
                std::any::type_name::<T>()
            ))
        })
    }

    /// Whether `name` has a resolved value
    #[must_use]
    pub fn is_resolved(&self, name: &str) -> bool {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(name).is_some_and(|slot| slot.initialized())
    }

    /// Names of all resolved fixtures, sorted
    #[must_use]
    pub fn resolved(&self) -> Vec<String> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let mut names: Vec<String> = slots
            .iter()
            .filter(|(_, slot)| slot.initialized())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }
}

/// The booking API fixtures: random data, auth token and a created booking.
#[derive(Debug)]
pub struct ApiFixtures {
    context: FixtureContext,
    client: BookerClient,
    schemas: Arc<SchemaSet>,
    credentials: Result<Credentials, String>,
}

impl ApiFixtures {
    /// Create fixtures for one test.
    ///
    /// `credentials` may carry a configuration error; it only surfaces when
    /// a scenario actually asks for [`ApiFixtures::token`].
    pub fn new(
        client: BookerClient,
        schemas: Arc<SchemaSet>,
        credentials: ProbeResult<Credentials>,
    ) -> Self {
        let credentials = credentials.map_err(|e| match e {
            ProbeError::MissingConfig { key } => key,
            other => other.to_string(),
        });
        Self {
            context: FixtureContext::new(),
            client,
            schemas,
            credentials,
        }
    }

    /// The underlying memo
    #[must_use]
    pub const fn context(&self) -> &FixtureContext {
        &self.context
    }

    /// The client used by the fixtures
    #[must_use]
    pub const fn client(&self) -> &BookerClient {
        &self.client
    }

    /// Random booking payload, generated once per test.
    pub async fn booking_data(&self) -> ProbeResult<Arc<BookingData>> {
        self.context
            .resolve(BOOKING_DATA, || async { Ok(BookingData::random()) })
            .await
    }

    /// Session token from `POST /auth`.
    ///
    /// Missing credentials and non-2xx responses fail without retry.
    pub async fn token(&self) -> ProbeResult<Arc<String>> {
        self.context
            .resolve(TOKEN, || async move {
                let credentials = self
                    .credentials
                    .as_ref()
                    .map_err(|key| ProbeError::MissingConfig { key: key.clone() })?;
                let response = self.client.auth(credentials).await?;
                response.expect_ok()?;
                let token = extract_token(&response.json::<Value>()?)?;
                tracing::info!(%token, "generated token via auth request");
                Ok(token)
            })
            .await
    }

    /// Id of a booking created from [`ApiFixtures::booking_data`].
    ///
    /// The create response must validate against the create schema.
    pub async fn booking_id(&self) -> ProbeResult<u64> {
        let id = self
            .context
            .resolve(BOOKING_ID, || async move {
                let data = self.booking_data().await?;
                let response = self.client.create_booking(data.as_ref()).await?;
                response.expect_ok()?;
                let body: Value = response.json()?;
                self.schemas.get(SchemaKind::Create).ensure_valid(&body)?;
                let id = extract_booking_id(&body)?;
                tracing::info!(booking_id = id, "created booking via fixture");
                Ok(id)
            })
            .await?;
        Ok(*id)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    mod context_tests {
        use super::*;

        #[tokio::test]
        async fn test_factory_runs_once() {
            let ctx = FixtureContext::new();
            let counter = AtomicUsize::new(0);
            let calls = &counter;
            for _ in 0..3 {
                let value = ctx
                    .resolve("answer", || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Ok(42_u32)
                    })
                    .await
                    .unwrap();
                assert_eq!(*value, 42);
            }
            assert_eq!(calls.load(Ordering::SeqCst), 1);
            assert!(ctx.is_resolved("answer"));
        }

        #[tokio::test]
        async fn test_concurrent_requests_share_one_value() {
            let ctx = FixtureContext::new();
            let counter = AtomicUsize::new(0);
            let calls = &counter;
            let factory = || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(20)).await;
                Ok(String::from("token-abc"))
            };
            let (a, b) = tokio::join!(ctx.resolve("token", factory), ctx.resolve("token", factory));
            assert!(Arc::ptr_eq(&a.unwrap(), &b.unwrap()));
            assert_eq!(calls.load(Ordering::SeqCst), 1);
        }

        #[tokio::test]
        async fn test_failed_factory_leaves_slot_empty() {
            let ctx = FixtureContext::new();
            let err = ctx
                .resolve::<u32, _, _>("flaky", || async { Err(ProbeError::fixture("boom")) })
                .await
                .unwrap_err();
            assert!(err.to_string().contains("boom"));
            assert!(!ctx.is_resolved("flaky"));
            let value = ctx.resolve("flaky", || async { Ok(1_u32) }).await.unwrap();
            assert_eq!(*value, 1);
        }

        #[tokio::test]
        async fn test_type_mismatch_is_fixture_error() {
            let ctx = FixtureContext::new();
            ctx.resolve("id", || async { Ok(7_u64) }).await.unwrap();
            let err = ctx
                .resolve("id", || async { Ok(String::new()) })
                .await
                .unwrap_err();
            assert!(matches!(err, ProbeError::FixtureError { .. }));
        }

        #[tokio::test]
        async fn test_contexts_are_independent() {
            let first = FixtureContext::new();
            let second = FixtureContext::new();
            let a = first.resolve("data", || async { Ok(1_u8) }).await.unwrap();
            let b = second.resolve("data", || async { Ok(2_u8) }).await.unwrap();
            assert_ne!(*a, *b);
            assert_eq!(first.resolved(), vec!["data".to_string()]);
        }
    }

    mod api_fixture_tests {
        use super::*;

        fn fixtures(credentials: ProbeResult<Credentials>) -> ApiFixtures {
            let client = BookerClient::new("http://127.0.0.1:9", Duration::from_millis(200)).unwrap();
            ApiFixtures::new(client, Arc::new(SchemaSet::bundled().unwrap()), credentials)
        }

        #[tokio::test]
        async fn test_booking_data_is_memoized() {
            let fx = fixtures(Ok(Credentials::new("admin", "pw")));
            let a = fx.booking_data().await.unwrap();
            let b = fx.booking_data().await.unwrap();
            assert!(Arc::ptr_eq(&a, &b));
            assert!(fx.context().is_resolved(BOOKING_DATA));
        }

        #[tokio::test]
        async fn test_missing_credentials_surface_at_resolution() {
            let fx = fixtures(Err(ProbeError::MissingConfig {
                key: "AUTH_PASSWORD".to_string(),
            }));
            let err = fx.token().await.unwrap_err();
            assert!(
                matches!(err, ProbeError::MissingConfig { ref key } if key == "AUTH_PASSWORD")
            );
            assert!(!fx.context().is_resolved(TOKEN));
        }
    }
}
