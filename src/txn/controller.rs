use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::http::{ExplorerApi, fetch_data};

use super::keys::normalize_operation;
use super::types::{OperationsPayload, STELLAR_CURRENCY, TxnDetail, TxnView};

/// Drives the transaction page: the transaction record and its operations.
///
/// Only the Stellar currency has a transaction page; for any other currency
/// the controller stays empty and issues no request. Stale and post-teardown
/// responses are dropped the same way as in
/// [`AddressFeedController`](crate::feed::AddressFeedController).
pub struct TxnDetailController {
    api: Arc<dyn ExplorerApi>,
    currency: String,
    cancel: CancellationToken,
    inner: Mutex<Inner>,
    view_tx: watch::Sender<TxnView>,
}

#[derive(Default)]
struct Inner {
    generation: u64,
    hash: Option<String>,
    txn: Option<TxnDetail>,
    operations: Vec<serde_json::Value>,
    pending: usize,
}

impl Inner {
    fn view(&self) -> TxnView {
        TxnView {
            txn: self.txn.clone(),
            operations: self.operations.clone(),
            is_loading: self.pending > 0,
        }
    }
}

impl TxnDetailController {
    pub fn new(api: Arc<dyn ExplorerApi>, currency: impl Into<String>) -> Self {
        Self::with_cancel_token(api, currency, CancellationToken::new())
    }

    pub fn with_cancel_token(api: Arc<dyn ExplorerApi>, currency: impl Into<String>, cancel: CancellationToken) -> Self {
        let (view_tx, _) = watch::channel(TxnView::default());
        Self {
            api,
            currency: currency.into(),
            cancel,
            inner: Mutex::new(Inner::default()),
            view_tx,
        }
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    /// Loads the transaction and its operations.
    pub async fn on_hash_established(&self, hash: &str) {
        if !self.accepts(hash) {
            return;
        }

        let generation = {
            let mut inner = self.state();
            inner.hash = Some(hash.to_string());
            inner.generation
        };

        self.load(hash, generation).await;
    }

    /// Switches to `hash` when it differs from the one shown.
    ///
    /// The previous operations stay visible until the new list arrives.
    pub async fn on_hash_changed(&self, hash: &str) {
        if !self.accepts(hash) {
            return;
        }

        let generation = {
            let mut inner = self.state();
            if inner.hash.as_deref() == Some(hash) {
                debug!(hash = hash; "Transaction unchanged");
                return;
            }
            inner.generation += 1;
            inner.hash = Some(hash.to_string());
            inner.pending = 0;
            inner.generation
        };

        self.load(hash, generation).await;
    }

    pub fn teardown(&self) {
        self.cancel.cancel();
    }

    pub fn view(&self) -> TxnView {
        self.state().view()
    }

    pub fn subscribe(&self) -> watch::Receiver<TxnView> {
        self.view_tx.subscribe()
    }

    fn accepts(&self, hash: &str) -> bool {
        if hash.is_empty() || self.cancel.is_cancelled() {
            return false;
        }
        if self.currency != STELLAR_CURRENCY {
            debug!(currency = &*self.currency; "No transaction view for currency");
            return false;
        }
        true
    }

    async fn load(&self, hash: &str, generation: u64) {
        info!(hash = hash; "Loading transaction");
        tokio::join!(self.load_txn(hash, generation), self.load_operations(hash, generation));
    }

    async fn load_txn(&self, hash: &str, generation: u64) {
        if !self.begin(generation, |inner| inner.txn = None) {
            return;
        }

        let result = fetch_data::<TxnDetail>(self.api.as_ref(), &format!("/tx/{}", hash), &[]).await;

        self.finish(generation, |inner| match result {
            Ok(Some(txn)) => inner.txn = Some(txn),
            Ok(None) => {},
            Err(e) => warn!(hash = hash, error:% = e; "Failed to load transaction"),
        });
    }

    async fn load_operations(&self, hash: &str, generation: u64) {
        if !self.begin(generation, |_| {}) {
            return;
        }

        let result = fetch_data::<OperationsPayload>(self.api.as_ref(), &format!("/tx/operations/{}", hash), &[]).await;

        self.finish(generation, |inner| match result {
            Ok(Some(payload)) => {
                inner.operations = payload.result.into_iter().map(normalize_operation).collect();
            },
            Ok(None) => {},
            Err(e) => warn!(hash = hash, error:% = e; "Failed to load operations"),
        });
    }

    /// Registers a request for `generation`; false if it is already stale.
    fn begin(&self, generation: u64, reset: impl FnOnce(&mut Inner)) -> bool {
        let mut inner = self.state();
        if !self.is_current(&inner, generation) {
            return false;
        }
        reset(&mut *inner);
        inner.pending += 1;
        self.publish(&inner);
        true
    }

    fn finish(&self, generation: u64, apply: impl FnOnce(&mut Inner)) {
        let mut inner = self.state();
        if !self.is_current(&inner, generation) {
            debug!("Discarding stale transaction response");
            return;
        }
        apply(&mut *inner);
        inner.pending = inner.pending.saturating_sub(1);
        self.publish(&inner);
    }

    fn is_current(&self, inner: &Inner, generation: u64) -> bool {
        inner.generation == generation && !self.cancel.is_cancelled()
    }

    fn publish(&self, inner: &Inner) {
        self.view_tx.send_replace(inner.view());
    }

    fn state(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
