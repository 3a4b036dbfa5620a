//! # Ingestion Fan-out
//!
//! Delivers each closed ledger to both stores and keeps the ingestion
//! metrics current. The stores have independent windows, so a failure in one
//! does not stop the other from advancing.

use ledger_telemetry::metrics::{INGESTION_ERRORS, LATEST_LEDGER, LEDGERS_INGESTED};
use lr_02_event_store::{EventStore, EventStoreError};
use lr_03_transaction_store::{TransactionStore, TransactionStoreError};
use shared_types::LedgerCloseMeta;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error, warn};

const EVENTS: &str = "events";
const TRANSACTIONS: &str = "transactions";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("ingesting ledger {ledger} into the event store: {source}")]
    Events {
        ledger: u32,
        #[source]
        source: EventStoreError,
    },

    #[error("ingesting ledger {ledger} into the transaction store: {source}")]
    Transactions {
        ledger: u32,
        #[source]
        source: TransactionStoreError,
    },
}

impl IngestError {
    /// True when ledgers arrived out of order or malformed; the caller
    /// should restart ingestion rather than skip the ledger.
    pub fn is_invariant_violation(&self) -> bool {
        match self {
            Self::Events { source, .. } => source.is_invariant_violation(),
            Self::Transactions { source, .. } => source.is_invariant_violation(),
        }
    }
}

fn error_kind(invariant: bool) -> &'static str {
    if invariant {
        "invariant"
    } else {
        "read"
    }
}

pub struct LedgerIngestor {
    events: Arc<EventStore>,
    transactions: Arc<TransactionStore>,
}

impl LedgerIngestor {
    pub fn new(events: Arc<EventStore>, transactions: Arc<TransactionStore>) -> Self {
        Self {
            events,
            transactions,
        }
    }

    /// Ingest `ledger` into both stores. Returns every failure, event store
    /// first; an empty vector means both stores advanced.
    pub fn on_ledger_closed(&self, ledger: &LedgerCloseMeta) -> Result<(), Vec<IngestError>> {
        let sequence = ledger.ledger_sequence;
        let mut failures = Vec::new();

        match self.events.ingest(ledger) {
            Ok(()) => LEDGERS_INGESTED.with_label_values(&[EVENTS]).inc(),
            Err(source) => failures.push(IngestError::Events {
                ledger: sequence,
                source,
            }),
        }
        match self.transactions.ingest(ledger) {
            Ok(()) => LEDGERS_INGESTED.with_label_values(&[TRANSACTIONS]).inc(),
            Err(source) => failures.push(IngestError::Transactions {
                ledger: sequence,
                source,
            }),
        }

        if failures.is_empty() {
            LATEST_LEDGER.set(i64::from(sequence));
            debug!(
                ledger = sequence,
                transactions = ledger.transactions.len(),
                "Ledger ingested"
            );
            return Ok(());
        }

        for failure in &failures {
            let store = match failure {
                IngestError::Events { .. } => EVENTS,
                IngestError::Transactions { .. } => TRANSACTIONS,
            };
            let invariant = failure.is_invariant_violation();
            INGESTION_ERRORS
                .with_label_values(&[store, error_kind(invariant)])
                .inc();
            if invariant {
                error!(ledger = sequence, store, error = %failure, "Ledger ingestion invariant violated");
            } else {
                warn!(ledger = sequence, store, error = %failure, "Ledger ingestion failed");
            }
        }
        Err(failures)
    }

    pub fn event_store(&self) -> &Arc<EventStore> {
        &self.events
    }

    pub fn transaction_store(&self) -> &Arc<TransactionStore> {
        &self.transactions
    }
}
