// ── Backend adapter ──
//
// `ResourceClient` over the hosted backend: REST for rows, one realtime
// channel per subscribed collection.

use async_trait::async_trait;
use serde_json::Value;
use shelter_api::{RealtimeHandle, ReconnectConfig, RestClient, TlsMode, TransportConfig};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use super::{ChangeEvent, Query, ResourceClient, Subscription};
use crate::config::{BackendConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{Collection, RecordId};

const FEED_CAPACITY: usize = 256;

pub struct RemoteClient {
    rest: RestClient,
    base_url: Url,
    transport: TransportConfig,
    realtime_enabled: bool,
}

impl RemoteClient {
    pub fn new(config: &BackendConfig) -> Result<Self, CoreError> {
        let transport = TransportConfig {
            tls: tls_to_transport(&config.tls),
            timeout: config.retry.timeout,
            api_key: config.api_key.clone(),
            access_token: config.access_token.clone(),
        };
        let rest = RestClient::new(config.url.clone(), &transport)?;

        Ok(Self {
            rest,
            base_url: config.url.clone(),
            transport,
            realtime_enabled: config.realtime_enabled,
        })
    }
}

fn tls_to_transport(tls: &TlsVerification) -> TlsMode {
    match tls {
        TlsVerification::SystemDefaults => TlsMode::System,
        TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
        TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
    }
}

#[async_trait]
impl ResourceClient for RemoteClient {
    async fn select(&self, collection: Collection, query: &Query) -> Result<Vec<Value>, CoreError> {
        Ok(self.rest.select(collection.as_str(), query).await?)
    }

    async fn insert(&self, collection: Collection, row: Value) -> Result<Value, CoreError> {
        Ok(self.rest.insert(collection.as_str(), &row).await?)
    }

    async fn update(
        &self,
        collection: Collection,
        id: &RecordId,
        patch: Value,
    ) -> Result<(), CoreError> {
        self.rest
            .update(collection.as_str(), &id.to_string(), &patch)
            .await?;
        Ok(())
    }

    async fn delete(&self, collection: Collection, id: &RecordId) -> Result<(), CoreError> {
        Ok(self.rest.delete(collection.as_str(), &id.to_string()).await?)
    }

    async fn subscribe(&self, collection: Collection) -> Result<Subscription, CoreError> {
        let cancel = CancellationToken::new();
        let (tx, rx) = broadcast::channel(FEED_CAPACITY);

        if !self.realtime_enabled {
            debug!(%collection, "realtime disabled, subscription is inert");
            return Ok(Subscription::new(collection, rx, cancel));
        }

        let handle = RealtimeHandle::connect(
            &self.base_url,
            &self.transport.api_key,
            vec![collection.as_str().to_owned()],
            ReconnectConfig::default(),
            cancel.clone(),
        )?;
        let mut changes = handle.subscribe();

        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    () = task_cancel.cancelled() => break,
                    received = changes.recv() => match received {
                        Ok(change) => {
                            let event = ChangeEvent::new(collection, change.op, change.record.clone());
                            if tx.send(event).is_err() {
                                debug!(%collection, "no listeners left for change feed");
                            }
                        }
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            warn!(%collection, skipped, "realtime feed lagged");
                            let _ = tx.send(ChangeEvent::missed(collection));
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
            handle.shutdown();
        });

        Ok(Subscription::new(collection, rx, cancel))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    #[test]
    fn tls_modes_map_across() {
        assert!(matches!(
            tls_to_transport(&TlsVerification::SystemDefaults),
            TlsMode::System
        ));
        assert!(matches!(
            tls_to_transport(&TlsVerification::DangerAcceptInvalid),
            TlsMode::DangerAcceptInvalid
        ));
    }

    #[tokio::test]
    async fn disabled_realtime_gives_inert_subscription() {
        let mut config = BackendConfig::new(
            Url::parse("http://127.0.0.1:9").unwrap(),
            SecretString::from("anon"),
        );
        config.realtime_enabled = false;

        let client = RemoteClient::new(&config).unwrap();
        let sub = client.subscribe(Collection::Donations).await.unwrap();
        assert!(sub.is_active());
        sub.unsubscribe();
        assert!(!sub.is_active());
    }
}
