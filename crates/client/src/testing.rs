//! Test doubles shared by the engine tests.

use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use async_trait::async_trait;
use offgrid_core::{AppConfig, Error, InterceptedRequest, ResponseEnvelope, ResponseKind, StoreDb};
use url::Url;

use crate::fetch::{Fetcher, resolve};
use crate::host::{Host, Notification};
use crate::intercept::StoreManager;

pub const ORIGIN: &str = "http://localhost:5000/";

pub fn origin() -> Url {
    Url::parse(ORIGIN).unwrap()
}

pub async fn manager() -> StoreManager {
    let db = StoreDb::open_in_memory().await.unwrap();
    StoreManager::new(db, AppConfig::default().store_names(), origin())
}

pub fn ok_response(body: &str) -> ResponseEnvelope {
    response(200, body)
}

pub fn response(status: u16, body: &str) -> ResponseEnvelope {
    let mut headers = BTreeMap::new();
    headers.insert("content-type".to_string(), "text/html".to_string());
    ResponseEnvelope {
        url: String::new(),
        status,
        status_text: String::new(),
        kind: ResponseKind::Basic,
        headers,
        body: body.as_bytes().to_vec(),
    }
}

/// Fetcher answering from a fixed routing table; unknown URLs fail at the
/// network level.
#[derive(Default)]
pub struct StubFetcher {
    routes: HashMap<String, ResponseEnvelope>,
    calls: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, url: &str, response: ResponseEnvelope) -> Self {
        let mut response = response;
        if response.url.is_empty() {
            response.url = url.to_string();
        }
        self.routes.insert(url.to_string(), response);
        self
    }

    pub fn status(self, url: &str, status: u16) -> Self {
        self.respond(url, response(status, "error"))
    }

    pub fn opaque(self, url: &str, body: &[u8]) -> Self {
        self.respond(url, ResponseEnvelope::opaque(url, body.to_vec()))
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, request: &InterceptedRequest) -> Result<ResponseEnvelope, Error> {
        let url = resolve(&origin(), &request.url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        self.calls.lock().unwrap().push(url.to_string());
        self.routes
            .get(url.as_str())
            .cloned()
            .ok_or_else(|| Error::Network(format!("connection refused: {url}")))
    }
}

/// Host that refuses every capability request.
pub struct RefusingHost;

#[async_trait]
impl Host for RefusingHost {
    async fn skip_waiting(&self) -> Result<(), Error> {
        Err(Error::Host("skip waiting refused".into()))
    }

    async fn claim_clients(&self) -> Result<(), Error> {
        Err(Error::Host("claim refused".into()))
    }

    async fn show_notification(&self, _notification: &Notification) -> Result<(), Error> {
        Err(Error::Host("notifications disabled".into()))
    }

    async fn close_notification(&self, _notification: &Notification) -> Result<(), Error> {
        Err(Error::Host("notifications disabled".into()))
    }

    async fn focus_or_open_window(&self, _url: &str) -> Result<(), Error> {
        Err(Error::Host("no window available".into()))
    }
}

/// Host that records every capability request.
#[derive(Default)]
pub struct RecordingHost {
    pub actions: Mutex<Vec<String>>,
    pub shown: Mutex<Vec<Notification>>,
}

impl RecordingHost {
    pub fn actions(&self) -> Vec<String> {
        self.actions.lock().unwrap().clone()
    }
}

#[async_trait]
impl Host for RecordingHost {
    async fn skip_waiting(&self) -> Result<(), Error> {
        self.actions.lock().unwrap().push("skip_waiting".into());
        Ok(())
    }

    async fn claim_clients(&self) -> Result<(), Error> {
        self.actions.lock().unwrap().push("claim_clients".into());
        Ok(())
    }

    async fn show_notification(&self, notification: &Notification) -> Result<(), Error> {
        self.actions.lock().unwrap().push(format!("show:{}", notification.title));
        self.shown.lock().unwrap().push(notification.clone());
        Ok(())
    }

    async fn close_notification(&self, notification: &Notification) -> Result<(), Error> {
        self.actions.lock().unwrap().push(format!("close:{}", notification.title));
        Ok(())
    }

    async fn focus_or_open_window(&self, url: &str) -> Result<(), Error> {
        self.actions.lock().unwrap().push(format!("open:{url}"));
        Ok(())
    }
}
