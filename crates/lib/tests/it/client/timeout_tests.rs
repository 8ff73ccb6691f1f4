use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use haven::config::TimeoutConfig;
use haven::event::Event;
use haven::relay::{Filter, RelayGateway};
use haven::session::Credential;
use haven::store::InMemoryStore;
use haven::{Client, FixedClock, Identity, Result};

use crate::helpers::{RELAY_URL, test_config};

/// Relay that never answers in time.
#[derive(Debug)]
struct StalledRelay;

#[async_trait]
impl RelayGateway for StalledRelay {
    fn url(&self) -> &str {
        RELAY_URL
    }

    async fn challenge(&self) -> Result<String> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok("late".to_string())
    }

    async fn authenticate(&self, _auth: &Event) -> Result<()> {
        Ok(())
    }

    async fn publish(&self, _event: &Event) -> Result<()> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(())
    }

    async fn query(&self, _filter: &Filter) -> Result<Vec<Event>> {
        Ok(Vec::new())
    }
}

async fn stalled_client() -> Client {
    let mut config = test_config();
    config.timeouts = TimeoutConfig {
        relay_secs: 1,
        ..TimeoutConfig::default()
    };
    let client = Client::new(
        config,
        Arc::new(InMemoryStore::new()),
        Arc::new(StalledRelay),
        Arc::new(FixedClock::default()),
    );
    client
        .login(Credential::secret_key(Identity::generate().to_nsec().as_str()))
        .await
        .unwrap();
    client
}

#[tokio::test]
async fn stalled_publish_times_out() {
    let client = stalled_client().await;
    let err = client
        .send_direct_message(&Identity::generate().public_key(), "hello")
        .await
        .unwrap_err();
    assert!(err.is_timeout());
    assert!(err.is_retryable_after_delay());
}

#[tokio::test]
async fn stalled_fetch_times_out() {
    let client = stalled_client().await;
    let err = client.fetch_direct_messages().await.unwrap_err();
    assert!(err.is_timeout());
}
