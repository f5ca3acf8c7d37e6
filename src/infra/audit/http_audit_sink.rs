use crate::domain::ports::{AuditEvent, AuditSink};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use tracing::warn;

/// Ships audit events to the central audit service. Delivery is spawned so
/// the claim path never waits on the sink, and failures are logged only;
/// audit persistence is the sink's problem, not this service's.
pub struct HttpAuditSink {
    client: Client,
    api_url: String,
    api_key: String,
}

impl HttpAuditSink {
    pub fn new(api_url: String, api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_url,
            api_key,
        }
    }
}

#[derive(Serialize)]
struct AuditPayload {
    actor: String,
    action: String,
    entity_type: String,
    entity_id: String,
    scope: String,
    at: DateTime<Utc>,
}

#[async_trait]
impl AuditSink for HttpAuditSink {
    async fn record(&self, event: AuditEvent) {
        let payload = AuditPayload {
            actor: event.actor,
            action: event.action,
            entity_type: event.entity_type,
            entity_id: event.entity_id,
            scope: event.scope,
            at: event.at,
        };

        let client = self.client.clone();
        let api_url = self.api_url.clone();
        let api_key = self.api_key.clone();

        tokio::spawn(async move {
            let res = client.post(&api_url)
                .header("Authorization", format!("Bearer {}", api_key))
                .json(&payload)
                .send()
                .await;

            match res {
                Ok(r) if !r.status().is_success() => {
                    warn!("Audit sink rejected event: status {}", r.status());
                }
                Err(e) => {
                    warn!("Audit sink connection error: {}", e);
                }
                _ => {}
            }
        });
    }
}
