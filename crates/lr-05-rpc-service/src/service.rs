//! Service wiring: stores, ingestion fan-out and method registry built from
//! one [`ServiceConfig`].

use lr_02_event_store::{EventStore, EventStoreApi};
use lr_03_transaction_store::{TransactionStore, TransactionStoreApi};
use lr_04_request_limiters::{BacklogQueueLayer, RequestDurationLayer, RpcRequest, RpcResult};
use prometheus::Registry;
use shared_types::LedgerCloseMeta;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::ServiceConfig;
use crate::errors::ServiceError;
use crate::ingest::{IngestError, LedgerIngestor};
use crate::registry::{global_http_layers, MethodRegistry};

pub struct RpcService {
    config: ServiceConfig,
    ingestor: LedgerIngestor,
    methods: MethodRegistry,
}

impl RpcService {
    /// Build the stores and register every method, with limiter metrics
    /// going to `registry`.
    pub fn new(config: ServiceConfig, registry: &Registry) -> Result<Self, ServiceError> {
        config.validate()?;

        let events = Arc::new(EventStore::new(
            config.network_passphrase.clone(),
            config.event_ledger_retention_window,
        )?);
        let transactions = Arc::new(TransactionStore::new(
            config.network_passphrase.clone(),
            config.transaction_ledger_retention_window,
        )?);

        let methods = MethodRegistry::from_config(
            Arc::clone(&events) as Arc<dyn EventStoreApi>,
            Arc::clone(&transactions) as Arc<dyn TransactionStoreApi>,
            &config,
            registry,
        )?;

        info!(
            event_retention = config.event_ledger_retention_window,
            transaction_retention = config.transaction_ledger_retention_window,
            "Ledger RPC service initialized"
        );

        Ok(Self {
            ingestor: LedgerIngestor::new(events, transactions),
            methods,
            config,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn methods(&self) -> &MethodRegistry {
        &self.methods
    }

    pub fn ingestor(&self) -> &LedgerIngestor {
        &self.ingestor
    }

    pub fn on_ledger_closed(&self, ledger: &LedgerCloseMeta) -> Result<(), Vec<IngestError>> {
        self.ingestor.on_ledger_closed(ledger)
    }

    pub async fn dispatch(&self, cancel: CancellationToken, request: RpcRequest) -> RpcResult {
        self.methods.dispatch(cancel, request).await
    }

    /// Global HTTP limiter layers, duration first.
    pub fn http_layers(
        &self,
        registry: &Registry,
    ) -> Result<(RequestDurationLayer, BacklogQueueLayer), ServiceError> {
        global_http_layers(&self.config.request_limits.http, registry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[tokio::test]
    async fn test_ingested_ledger_visible_to_methods() {
        let config = ServiceConfig {
            event_ledger_retention_window: 4,
            transaction_ledger_retention_window: 4,
            ..ServiceConfig::default()
        };
        let service = RpcService::new(config, &Registry::new()).unwrap();

        service
            .on_ledger_closed(&LedgerCloseMeta {
                ledger_sequence: 9,
                close_time: 90,
                transactions: vec![],
            })
            .unwrap();

        let latest = service
            .dispatch(
                CancellationToken::new(),
                RpcRequest::new("getLatestLedger", Value::Null),
            )
            .await
            .unwrap();
        assert_eq!(latest, json!({ "sequence": 9, "closeTime": 90 }));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ServiceConfig {
            event_ledger_retention_window: 0,
            ..ServiceConfig::default()
        };
        assert!(matches!(
            RpcService::new(config, &Registry::new()),
            Err(ServiceError::Config(_))
        ));
    }
}
