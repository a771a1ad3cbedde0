use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info, warn};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::http::{ExplorerApi, fetch_data};

use super::types::{AddressQuery, AddressTxsPage, AddressView, BalancePayload, BalanceState, FeedState, TokenBalance, ViewTxn};
use super::value::balance_for;

/// Drives the address page: balance, paginated history and "view more".
///
/// Every request captures the query *generation* it was issued for. A
/// completion mutates state only while that generation is still current and
/// the controller has not been torn down, so responses for a previous
/// address or arriving after [`teardown`](Self::teardown) are dropped.
///
/// Page requests for one generation are serialized: a "view more" issued
/// while a page is in flight waits for it and then requests from the new
/// end of the list, so pages never overlap or get skipped.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use url::Url;
/// use nrlxplore::feed::{AddressFeedController, AddressQuery};
/// use nrlxplore::http::ExplorerHttpClient;
///
/// # async fn example() -> Result<(), anyhow::Error> {
/// let api = Arc::new(ExplorerHttpClient::new(Url::parse("http://localhost:3000/api/")?)?);
/// let controller = AddressFeedController::new(api);
///
/// controller.on_query_established(AddressQuery::new("AK2nJJpJr6o664CWJKi1QRXjqeic2zRp8y", "NEO")).await;
/// if controller.view().has_more_txns {
///     controller.request_next_page().await;
/// }
/// # Ok(())
/// # }
/// ```
pub struct AddressFeedController {
    api: Arc<dyn ExplorerApi>,
    cancel: CancellationToken,
    inner: Mutex<Inner>,
    view_tx: watch::Sender<AddressView>,
}

struct Inner {
    generation: u64,
    query: Option<AddressQuery>,
    feed: FeedState,
    balance: BalanceState,
    page_lock: Arc<tokio::sync::Mutex<()>>,
}

impl Inner {
    fn view(&self) -> AddressView {
        AddressView::from_parts(&self.feed, &self.balance)
    }
}

impl AddressFeedController {
    pub fn new(api: Arc<dyn ExplorerApi>) -> Self {
        Self::with_cancel_token(api, CancellationToken::new())
    }

    /// Creates a controller that is torn down when `cancel` fires.
    pub fn with_cancel_token(api: Arc<dyn ExplorerApi>, cancel: CancellationToken) -> Self {
        let (view_tx, _) = watch::channel(AddressView::default());
        Self {
            api,
            cancel,
            inner: Mutex::new(Inner {
                generation: 0,
                query: None,
                feed: FeedState::default(),
                balance: BalanceState::default(),
                page_lock: Arc::new(tokio::sync::Mutex::new(())),
            }),
            view_tx,
        }
    }

    /// Adopts `query` and loads its balance and first page.
    ///
    /// Does nothing for an empty address or a torn-down controller. Once a
    /// query is active this behaves as [`on_query_changed`](Self::on_query_changed).
    pub async fn on_query_established(&self, query: AddressQuery) {
        if query.address.is_empty() || self.cancel.is_cancelled() {
            return;
        }

        let generation = {
            let mut inner = self.state();
            if inner.query.is_some() {
                None
            } else {
                inner.query = Some(query.clone());
                Some(inner.generation)
            }
        };
        let Some(generation) = generation else {
            return self.on_query_changed(query).await;
        };

        info!(address = &*query.address, currency = &*query.currency; "Loading address");
        self.load(&query, generation).await;
    }

    /// Switches to `query` if its address differs from the active one.
    ///
    /// The accumulated history is cleared before any request is issued. An
    /// unchanged or empty address is a no-op.
    pub async fn on_query_changed(&self, query: AddressQuery) {
        if query.address.is_empty() || self.cancel.is_cancelled() {
            return;
        }

        let generation = {
            let mut inner = self.state();
            if inner.query.as_ref().is_some_and(|q| q.address == query.address) {
                debug!(address = &*query.address; "Address unchanged, keeping loaded history");
                return;
            }

            inner.generation += 1;
            inner.query = Some(query.clone());
            inner.feed.reset();
            inner.page_lock = Arc::new(tokio::sync::Mutex::new(()));
            self.publish(&inner);
            inner.generation
        };

        info!(address = &*query.address, currency = &*query.currency; "Address changed, reloading");
        self.load(&query, generation).await;
    }

    /// Loads the page following the items already shown ("view more").
    pub async fn request_next_page(&self) {
        let active = {
            let inner = self.state();
            inner.query.clone().map(|query| (query, inner.generation))
        };

        match active {
            Some((query, generation)) => self.load_next_page(&query, generation).await,
            None => debug!("No active address, ignoring request for more transactions"),
        }
    }

    /// Marks the controller inactive. Responses still in flight are dropped.
    pub fn teardown(&self) {
        self.cancel.cancel();
    }

    pub fn is_torn_down(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Snapshot of the current view.
    pub fn view(&self) -> AddressView {
        self.state().view()
    }

    /// Receives a fresh view after every state change.
    pub fn subscribe(&self) -> watch::Receiver<AddressView> {
        self.view_tx.subscribe()
    }

    async fn load(&self, query: &AddressQuery, generation: u64) {
        tokio::join!(
            self.load_balance(query, generation),
            self.load_next_page(query, generation)
        );
    }

    async fn load_next_page(&self, query: &AddressQuery, generation: u64) {
        let page_lock = {
            let inner = self.state();
            if !self.is_current(&inner, generation) {
                return;
            }
            inner.page_lock.clone()
        };
        let _serial = page_lock.lock().await;

        let offset = {
            let mut inner = self.state();
            if !self.is_current(&inner, generation) {
                debug!(address = &*query.address; "Query changed while waiting, dropping page request");
                return;
            }
            inner.feed.is_loading = true;
            self.publish(&inner);
            inner.feed.next_offset()
        };

        debug!(address = &*query.address, offset = offset; "Requesting address transactions");
        let path = format!("/address/txs/{}", query.address);
        let result = fetch_data::<AddressTxsPage>(self.api.as_ref(), &path, &[("offset", offset.to_string())]).await;

        let mut inner = self.state();
        if !self.is_current(&inner, generation) {
            debug!(address = &*query.address, offset = offset; "Discarding stale transaction page");
            return;
        }

        match result {
            Ok(Some(page)) => {
                let items: Vec<ViewTxn> = page
                    .result
                    .into_iter()
                    .map(|txn| ViewTxn::from_raw(txn, &query.address))
                    .collect();
                debug!(offset = offset, received = items.len(); "Appending transaction page");
                inner.feed.append_page(page.total, items);
            },
            Ok(None) => {},
            Err(e) => warn!(address = &*query.address, offset = offset, error:% = e; "Failed to load transactions"),
        }

        inner.feed.is_loading = false;
        self.publish(&inner);
    }

    async fn load_balance(&self, query: &AddressQuery, generation: u64) {
        {
            let mut inner = self.state();
            if !self.is_current(&inner, generation) {
                return;
            }
            inner.balance = BalanceState {
                address: Some(query.address.clone()),
                balance: None,
                token_balances: None,
                is_loading: true,
            };
            self.publish(&inner);
        }

        let path = format!("/balance/{}", query.address);
        let result = fetch_data::<BalancePayload>(self.api.as_ref(), &path, &[]).await;

        let mut inner = self.state();
        if !self.is_current(&inner, generation) {
            debug!(address = &*query.address; "Discarding stale balance");
            return;
        }

        match result {
            Ok(Some(payload)) => {
                let tokens: Vec<TokenBalance> = payload.balance.into_iter().map(TokenBalance::from).collect();
                inner.balance.balance = Some(balance_for(&tokens, &query.currency));
                inner.balance.token_balances = Some(tokens);
            },
            Ok(None) => {},
            Err(e) => warn!(address = &*query.address, error:% = e; "Failed to load balance"),
        }

        inner.balance.is_loading = false;
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::{ScriptedApi, ok};
    use crate::feed::PAGE_SIZE;
    use serde_json::{Value, json};

    const ADDR: &str = "AK2nJJpJr6o664CWJKi1QRXjqeic2zRp8y";
    const OTHER: &str = "AUkVH4k8gPowAEpvQVAmNEkriX96CrKzk9";
    const TXS: &str = "/address/txs/AK2nJJpJr6o664CWJKi1QRXjqeic2zRp8y";
    const BALANCE: &str = "/balance/AK2nJJpJr6o664CWJKi1QRXjqeic2zRp8y";
    const OTHER_TXS: &str = "/address/txs/AUkVH4k8gPowAEpvQVAmNEkriX96CrKzk9";
    const OTHER_BALANCE: &str = "/balance/AUkVH4k8gPowAEpvQVAmNEkriX96CrKzk9";

    fn page(address: &str, prefix: &str, n: usize, total: u64) -> Value {
        let result: Vec<Value> = (0..n)
            .map(|i| {
                json!({
                    "txid": format!("{}-{}", prefix, i),
                    "blockhash": format!("block-{}", i),
                    "blocktime": 1_530_000_000u64 + i as u64,
                    "vin": [],
                    "vout": [{ "address": address, "value": "1" }]
                })
            })
            .collect();
        json!({ "total": total, "result": result })
    }

    fn balances() -> Value {
        json!({ "balance": [
            { "ticker": "NEO", "value": "10", "asset": "neo-asset" },
            { "ticker": "GAS", "value": 0.25, "asset": "gas-asset" }
        ] })
    }

    fn setup() -> (Arc<ScriptedApi>, AddressFeedController) {
        let api = Arc::new(ScriptedApi::default());
        let controller = AddressFeedController::new(api.clone());
        (api, controller)
    }

    fn offsets(api: &ScriptedApi, path: &str) -> Vec<String> {
        api.calls_to(path)
            .into_iter()
            .map(|params| params.into_iter().find(|(k, _)| k == "offset").map(|(_, v)| v).unwrap())
            .collect()
    }

    fn hashes(view: &AddressView) -> Vec<String> {
        view.txn_history.iter().map(|t| t.hash.clone()).collect()
    }

    #[tokio::test]
    async fn test_established_query_loads_balance_and_first_page() {
        let (api, controller) = setup();
        api.respond(BALANCE, 200, balances());
        api.respond(TXS, 200, page(ADDR, "a", PAGE_SIZE, 42));

        controller.on_query_established(AddressQuery::new(ADDR, "NEO")).await;

        let view = controller.view();
        assert_eq!(view.address.as_deref(), Some(ADDR));
        assert_eq!(view.balance, Some(10.0));
        assert_eq!(view.token_balances.as_ref().map(|t| t.len()), Some(2));
        assert_eq!(view.txn_history.len(), PAGE_SIZE);
        assert_eq!(view.txn_history[0].value, 1.0);
        assert_eq!(view.total_txns, Some(42));
        assert!(view.has_more_txns);
        assert!(!view.is_loading_txns);
        assert!(!view.is_loading_balance);
        assert_eq!(offsets(&api, TXS), vec!["0"]);
    }

    #[tokio::test]
    async fn test_balance_defaults_to_zero_for_missing_currency() {
        let (api, controller) = setup();
        api.respond(BALANCE, 200, json!({ "balance": [{ "ticker": "NEO", "value": "10", "asset": "x" }] }));
        api.respond(TXS, 200, page(ADDR, "a", 0, 0));

        controller.on_query_established(AddressQuery::new(ADDR, "GAS")).await;

        assert_eq!(controller.view().balance, Some(0.0));
    }

    #[tokio::test]
    async fn test_empty_address_is_ignored() {
        let (api, controller) = setup();

        controller.on_query_established(AddressQuery::new("", "NEO")).await;
        controller.on_query_changed(AddressQuery::new("", "NEO")).await;

        assert!(api.calls().is_empty());
        assert_eq!(controller.view(), AddressView::default());
    }

    #[tokio::test]
    async fn test_short_page_ends_feed() {
        let (api, controller) = setup();
        api.respond(BALANCE, 200, balances());
        api.respond(TXS, 200, page(ADDR, "a", PAGE_SIZE, 13));
        api.respond(TXS, 200, page(ADDR, "b", 3, 13));

        controller.on_query_established(AddressQuery::new(ADDR, "NEO")).await;
        controller.request_next_page().await;

        let view = controller.view();
        assert_eq!(view.txn_history.len(), 13);
        assert!(!view.has_more_txns);
        assert_eq!(offsets(&api, TXS), vec!["0", "10"]);
    }

    #[tokio::test]
    async fn test_has_more_recomputed_only_after_reset() {
        let (api, controller) = setup();
        api.respond(BALANCE, 200, balances());
        api.respond(TXS, 200, page(ADDR, "a", 3, 3));
        api.respond(OTHER_BALANCE, 200, balances());
        api.respond(OTHER_TXS, 200, page(OTHER, "b", PAGE_SIZE, 30));

        controller.on_query_established(AddressQuery::new(ADDR, "NEO")).await;
        assert!(!controller.view().has_more_txns);

        controller.on_query_changed(AddressQuery::new(OTHER, "NEO")).await;
        let view = controller.view();
        assert!(view.has_more_txns);
        assert_eq!(view.txn_history.len(), PAGE_SIZE);
        assert!(view.txn_history.iter().all(|t| t.hash.starts_with("b-")));
    }

    #[tokio::test]
    async fn test_second_establish_starts_a_fresh_feed() {
        let (api, controller) = setup();
        api.respond(BALANCE, 200, balances());
        api.respond(TXS, 200, page(ADDR, "a", PAGE_SIZE, 10));
        api.respond(OTHER_BALANCE, 200, balances());
        api.respond(OTHER_TXS, 200, page(OTHER, "b", 3, 3));

        controller.on_query_established(AddressQuery::new(ADDR, "NEO")).await;
        controller.on_query_established(AddressQuery::new(OTHER, "NEO")).await;

        let view = controller.view();
        assert_eq!(view.address.as_deref(), Some(OTHER));
        assert_eq!(hashes(&view), vec!["b-0", "b-1", "b-2"]);
        assert_eq!(view.total_txns, Some(3));
        assert_eq!(offsets(&api, OTHER_TXS), vec!["0"]);

        controller.on_query_established(AddressQuery::new(OTHER, "NEO")).await;
        assert_eq!(controller.view(), view);
        assert_eq!(api.calls_to(OTHER_TXS).len(), 1);
    }

    #[tokio::test]
    async fn test_stale_balance_after_address_change_is_dropped() {
        let (api, controller) = setup();
        let stale = api.gate(BALANCE);
        api.respond(TXS, 200, page(ADDR, "a", 2, 2));
        api.respond(OTHER_BALANCE, 200, json!({ "balance": [{ "ticker": "NEO", "value": "3", "asset": "x" }] }));
        api.respond(OTHER_TXS, 200, page(OTHER, "b", 1, 1));

        tokio::join!(controller.on_query_established(AddressQuery::new(ADDR, "NEO")), async {
            tokio::task::yield_now().await;
            controller.on_query_changed(AddressQuery::new(OTHER, "NEO")).await;
            stale
                .send(ok(json!({ "balance": [{ "ticker": "NEO", "value": "99", "asset": "x" }] })))
                .unwrap();
        });

        let view = controller.view();
        assert_eq!(view.address.as_deref(), Some(OTHER));
        assert_eq!(view.balance, Some(3.0));
        assert!(!view.is_loading_balance);
    }

    #[tokio::test]
    async fn test_unchanged_address_is_noop() {
        let (api, controller) = setup();
        api.respond(BALANCE, 200, balances());
        api.respond(TXS, 200, page(ADDR, "a", PAGE_SIZE, 20));

        controller.on_query_established(AddressQuery::new(ADDR, "NEO")).await;
        let before = controller.view();
        let calls_before = api.calls().len();

        controller.on_query_changed(AddressQuery::new(ADDR, "NEO")).await;

        assert_eq!(controller.view(), before);
        assert_eq!(api.calls().len(), calls_before);
    }

    #[tokio::test]
    async fn test_new_address_clears_history_before_reloading() {
        let (api, controller) = setup();
        api.respond(BALANCE, 200, balances());
        api.respond(TXS, 200, page(ADDR, "a", PAGE_SIZE, 20));
        api.respond(OTHER_BALANCE, 200, balances());
        let release = api.gate(OTHER_TXS);

        controller.on_query_established(AddressQuery::new(ADDR, "NEO")).await;
        let mut views = controller.subscribe();

        tokio::join!(controller.on_query_changed(AddressQuery::new(OTHER, "NEO")), async {
            views.changed().await.unwrap();
            let cleared = views.borrow_and_update().clone();
            assert!(cleared.txn_history.is_empty());
            assert_eq!(cleared.total_txns, None);
            assert!(!cleared.has_more_txns);
            release.send(ok(page(OTHER, "b", 4, 4))).unwrap();
        });

        let view = controller.view();
        assert_eq!(view.txn_history.len(), 4);
        assert_eq!(view.address.as_deref(), Some(OTHER));
        assert_eq!(offsets(&api, OTHER_TXS), vec!["0"]);
    }

    #[tokio::test]
    async fn test_concurrent_view_more_is_serialized() {
        let (api, controller) = setup();
        api.respond(BALANCE, 200, balances());
        api.respond(TXS, 200, page(ADDR, "a", PAGE_SIZE, 23));
        controller.on_query_established(AddressQuery::new(ADDR, "NEO")).await;

        let release = api.gate(TXS);
        api.respond(TXS, 200, page(ADDR, "c", 3, 23));

        tokio::join!(controller.request_next_page(), controller.request_next_page(), async {
            tokio::task::yield_now().await;
            assert!(controller.view().is_loading_txns);
            release.send(ok(page(ADDR, "b", PAGE_SIZE, 23))).unwrap();
        });

        let view = controller.view();
        let mut seen = hashes(&view);
        assert_eq!(seen.len(), 23);
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 23, "no transaction appears twice");
        assert_eq!(offsets(&api, TXS), vec!["0", "10", "20"]);
        assert!(!view.has_more_txns);
        assert!(!view.is_loading_txns);
    }

    #[tokio::test]
    async fn test_stale_page_after_address_change_is_dropped() {
        let (api, controller) = setup();
        api.respond(BALANCE, 200, balances());
        let stale = api.gate(TXS);
        api.respond(OTHER_BALANCE, 200, balances());
        api.respond(OTHER_TXS, 200, page(OTHER, "b", 2, 2));

        tokio::join!(controller.on_query_established(AddressQuery::new(ADDR, "NEO")), async {
            tokio::task::yield_now().await;
            controller.on_query_changed(AddressQuery::new(OTHER, "NEO")).await;
            stale.send(ok(page(ADDR, "a", PAGE_SIZE, 50))).unwrap();
        });

        let view = controller.view();
        assert_eq!(hashes(&view), vec!["b-0", "b-1"]);
        assert_eq!(view.total_txns, Some(2));
        assert!(!view.is_loading_txns);
    }

    #[tokio::test]
    async fn test_response_after_teardown_is_discarded() {
        let (api, controller) = setup();
        api.respond(BALANCE, 200, balances());
        let release = api.gate(TXS);

        tokio::join!(controller.on_query_established(AddressQuery::new(ADDR, "NEO")), async {
            tokio::task::yield_now().await;
            controller.teardown();
            release.send(ok(page(ADDR, "a", PAGE_SIZE, 10))).unwrap();
        });

        let view = controller.view();
        assert!(controller.is_torn_down());
        assert!(view.txn_history.is_empty());
        assert_eq!(view.total_txns, None);

        controller.request_next_page().await;
        assert_eq!(api.calls_to(TXS).len(), 1);
    }

    #[tokio::test]
    async fn test_non_success_status_leaves_history_untouched() {
        let (api, controller) = setup();
        api.respond(BALANCE, 500, Value::Null);
        api.respond(TXS, 200, page(ADDR, "a", PAGE_SIZE, 20));
        api.respond(TXS, 404, Value::Null);

        controller.on_query_established(AddressQuery::new(ADDR, "NEO")).await;
        let before = controller.view();
        assert_eq!(before.balance, None);
        assert!(!before.is_loading_balance);

        controller.request_next_page().await;

        let after = controller.view();
        assert_eq!(after.txn_history, before.txn_history);
        assert_eq!(after.total_txns, Some(20));
        assert!(after.has_more_txns);
        assert!(!after.is_loading_txns);
    }

    #[tokio::test]
    async fn test_transport_failure_only_clears_loading() {
        let (api, controller) = setup();
        api.fail(BALANCE);
        api.fail(TXS);

        controller.on_query_established(AddressQuery::new(ADDR, "NEO")).await;

        let view = controller.view();
        assert!(view.txn_history.is_empty());
        assert_eq!(view.total_txns, None);
        assert!(!view.is_loading_txns);
        assert!(!view.is_loading_balance);
    }

    #[tokio::test]
    async fn test_undecodable_amount_drops_page() {
        let (api, controller) = setup();
        api.respond(BALANCE, 200, balances());
        api.respond(
            TXS,
            200,
            json!({ "total": 1, "result": [{ "txid": "t", "vin": [], "vout": [{ "address": ADDR, "value": "lots" }] }] }),
        );

        controller.on_query_established(AddressQuery::new(ADDR, "NEO")).await;

        let view = controller.view();
        assert!(view.txn_history.is_empty());
        assert_eq!(view.total_txns, None);
        assert!(!view.is_loading_txns);
    }
}
