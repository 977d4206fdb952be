use chrono::{DateTime, Duration, TimeZone, Utc};
use portfolio_contact::contact::cooldown::cooldown_key;
use portfolio_contact::{
    AutoReply, ContactGateway, ContactMessage, CooldownStatus, EmailProvider, GatewaySettings,
    KeyValueStore, MemoryStore, ProviderError, ProviderResponse, Remaining, SqliteStore,
    SubmitError, TemplateParams,
};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Provider that always answers with the same result and counts calls.
struct FixedProvider {
    result: Result<ProviderResponse, ProviderError>,
    calls: AtomicUsize,
    last_params: Mutex<Option<TemplateParams>>,
}

impl FixedProvider {
    fn ok() -> Self {
        Self::with(Ok(ProviderResponse {
            status: 200,
            text: "OK".into(),
        }))
    }

    fn failing(status: u16) -> Self {
        Self::with(Err(ProviderError::http(status, "provider says no")))
    }

    fn with(result: Result<ProviderResponse, ProviderError>) -> Self {
        Self {
            result,
            calls: AtomicUsize::new(0),
            last_params: Mutex::new(None),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn last_params(&self) -> Option<TemplateParams> {
        self.last_params.lock().unwrap().clone()
    }
}

impl EmailProvider for FixedProvider {
    async fn send(
        &self,
        _template_id: &str,
        params: &TemplateParams,
    ) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_params.lock().unwrap() = Some(params.clone());
        self.result.clone()
    }
}

fn settings() -> GatewaySettings {
    GatewaySettings {
        template_id: "template_cqdks3g".into(),
        auto_reply_template_id: None,
        to_email: "owner@example.com".into(),
    }
}

fn in_memory(provider: FixedProvider) -> ContactGateway<MemoryStore, FixedProvider> {
    ContactGateway::new(MemoryStore::new(), provider, settings())
}

fn message() -> ContactMessage {
    ContactMessage::new("Al", "a@b.com", "Hi!", "1234567890")
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 11, 3, 9, 30, 0).unwrap()
}

#[tokio::test]
async fn scenario_a_first_message_is_sent_and_recorded() {
    let gateway = in_memory(FixedProvider::ok());

    let outcome = gateway
        .submit(&message(), now())
        .await
        .expect("send succeeds");
    assert_eq!(outcome.response.status, 200);
    assert_eq!(outcome.auto_reply, AutoReply::Skipped);
    assert_eq!(gateway.provider().calls(), 1);

    let stored = gateway.store().get(&cooldown_key("a@b.com")).unwrap();
    assert_eq!(stored, Some(now().timestamp_millis().to_string()));
}

#[tokio::test]
async fn scenario_b_resubmitting_within_a_day_is_rate_limited() {
    let gateway = in_memory(FixedProvider::ok());
    gateway.submit(&message(), now()).await.unwrap();

    let err = gateway
        .submit(&message(), now() + Duration::hours(1))
        .await
        .unwrap_err();
    match &err {
        SubmitError::RateLimited(remaining) => {
            assert_eq!(remaining.to_string(), "23 hours and 0 minutes")
        }
        other => panic!("expected RateLimited, got {:?}", other),
    }
    assert_eq!(gateway.provider().calls(), 1);

    // A full day later the sender is free again.
    gateway
        .submit(&message(), now() + Duration::hours(24))
        .await
        .unwrap();
    assert_eq!(gateway.provider().calls(), 2);
}

#[tokio::test]
async fn scenario_c_short_body_is_rejected_before_io() {
    let gateway = in_memory(FixedProvider::ok());
    let msg = ContactMessage {
        body: "short".into(),
        ..message()
    };

    let result = gateway.submit(&msg, now()).await;
    assert_eq!(result, Err(SubmitError::InvalidBody));
    assert_eq!(gateway.provider().calls(), 0);
    assert!(gateway.store().is_empty());
}

#[tokio::test]
async fn scenario_d_provider_throttling_keeps_cooldown_unchanged() {
    let store = MemoryStore::new();
    let key = cooldown_key("a@b.com");
    let earlier = (now() - Duration::days(3)).timestamp_millis().to_string();
    store.set(&key, &earlier).unwrap();
    let gateway = ContactGateway::new(store, FixedProvider::failing(429), settings());

    let result = gateway.submit(&message(), now()).await;
    assert_eq!(result, Err(SubmitError::ProviderRateLimited));
    assert_eq!(gateway.provider().calls(), 1);
    assert_eq!(gateway.store().get(&key).unwrap(), Some(earlier));

    let status = gateway.check_cooldown("a@b.com", now());
    assert_eq!(status, CooldownStatus::Allowed);
}

#[tokio::test]
async fn provider_errors_map_to_user_messages() {
    let cases = [
        (400, SubmitError::BadRequest),
        (401, SubmitError::AuthFailure),
        (404, SubmitError::ServiceNotFound),
        (503, SubmitError::Unknown(Some("provider says no".into()))),
    ];
    for (status, expected) in cases {
        let gateway = in_memory(FixedProvider::failing(status));
        let err = gateway.submit(&message(), now()).await.unwrap_err();
        assert_eq!(err, expected);
        assert!(!err.to_string().is_empty());
        assert!(gateway.store().is_empty());
    }
}

#[tokio::test]
async fn cooldown_persists_in_sqlite_between_gateways() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("contact.sqlite");

    let store = SqliteStore::open(&path).unwrap();
    let first = ContactGateway::new(store, FixedProvider::ok(), settings());
    first.submit(&message(), now()).await.unwrap();
    let params = first.provider().last_params().unwrap();
    assert_eq!(params.get("to_email"), Some("owner@example.com"));

    let store = SqliteStore::open(&path).unwrap();
    let second = ContactGateway::new(store, FixedProvider::ok(), settings());
    let err = second
        .submit(&message(), now() + Duration::minutes(30))
        .await
        .unwrap_err();
    let remaining = Remaining {
        hours: 23,
        minutes: 30,
    };
    assert_eq!(err, SubmitError::RateLimited(remaining));
    assert_eq!(second.provider().calls(), 0);
}
