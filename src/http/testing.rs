use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::api::{ExplorerApi, QueryParams};
use super::error::HttpError;
use super::types::Envelope;

type Reply = Result<Envelope, HttpError>;

enum Scripted {
    Ready(Reply),
    Gated(oneshot::Receiver<Reply>),
}

/// In-memory [`ExplorerApi`] answering from per-path reply queues.
///
/// Gated replies stay pending until the test releases them, which lets
/// tests interleave completions with controller calls.
#[derive(Default)]
pub(crate) struct ScriptedApi {
    routes: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<(String, Vec<(String, String)>)>>,
}

impl ScriptedApi {
    pub fn respond(&self, path: &str, status: u16, data: serde_json::Value) {
        self.push(path, Scripted::Ready(Ok(Envelope::new(status, data))));
    }

    pub fn fail(&self, path: &str) {
        self.push(
            path,
            Scripted::Ready(Err(HttpError::ServerError {
                status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
                body: "unavailable".into(),
            })),
        );
    }

    pub fn gate(&self, path: &str) -> oneshot::Sender<Reply> {
        let (tx, rx) = oneshot::channel();
        self.push(path, Scripted::Gated(rx));
        tx
    }

    pub fn calls(&self) -> Vec<(String, Vec<(String, String)>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn calls_to(&self, path: &str) -> Vec<Vec<(String, String)>> {
        self.calls()
            .into_iter()
            .filter(|(p, _)| p == path)
            .map(|(_, params)| params)
            .collect()
    }

    fn push(&self, path: &str, reply: Scripted) {
        self.routes
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(reply);
    }
}

pub(crate) fn ok(data: serde_json::Value) -> Reply {
    Ok(Envelope::new(200, data))
}

#[async_trait]
impl ExplorerApi for ScriptedApi {
    async fn get(&self, path: &str, params: QueryParams<'_>) -> Result<Envelope, HttpError> {
        self.calls.lock().unwrap().push((
            path.to_string(),
            params.iter().map(|(k, v)| (k.to_string(), v.clone())).collect(),
        ));

        let next = self.routes.lock().unwrap().get_mut(path).and_then(|q| q.pop_front());
        match next {
            Some(Scripted::Ready(reply)) => reply,
            Some(Scripted::Gated(rx)) => rx.await.unwrap_or_else(|_| panic!("gate for {} dropped", path)),
            None => panic!("no scripted reply for {}", path),
        }
    }
}
