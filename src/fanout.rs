use serde_json::Value;

/// Seam to the external realtime service. Message events are handed off
/// fire-and-forget; delivery failure never fails or rolls back the mutation
/// that produced the event.
#[derive(Clone)]
pub struct Fanout {
    client: reqwest::Client,
    endpoint: Option<String>,
}

impl Fanout {
    pub fn new(client: reqwest::Client, endpoint: Option<String>) -> Self {
        Self { client, endpoint }
    }

    pub fn publish(&self, event: Value) {
        let Some(endpoint) = self.endpoint.clone() else {
            log::debug!("realtime endpoint unconfigured, dropping event");
            return;
        };
        let client = self.client.clone();
        actix_web::rt::spawn(async move {
            if let Err(e) = client.post(&endpoint).json(&event).send().await {
                log::warn!("realtime fan-out failed: {e}");
            }
        });
    }
}
