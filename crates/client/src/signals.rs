//! Signal handlers: the entry points the host runtime drives.
//!
//! [`ServiceWorker`] wires the classifier, strategies, fallback and store
//! manager together and answers setup, activation, request, sync, push and
//! notification-click signals.

use std::sync::Arc;

use offgrid_core::{AppConfig, Error, InterceptedRequest, ResponseEnvelope, StoreDb};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::fetch::Fetcher;
use crate::host::{Host, NoopSync, Notification, NotificationData, SyncRoutine};
use crate::intercept::{Classifier, FallbackProvider, ProvisionReport, StoreManager, StrategyClass, StrategyExecutor};

/// Result of the setup signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct InstallOutcome {
    pub report: ProvisionReport,
    /// Whether the host accepted the skip-waiting request.
    pub skip_waiting: bool,
}

/// Result of the activation signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct ActivateOutcome {
    /// Stores deleted because they belong to an older version tag.
    pub deleted: Vec<String>,
    /// Whether the host accepted the claim-clients request.
    pub claimed: bool,
}

/// What happened to an inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Not intercepted; the host should perform the request itself.
    Bypass,
    Respond { class: StrategyClass, response: ResponseEnvelope },
}

/// Push message body. Every field is optional.
#[derive(Debug, Default, Deserialize)]
struct PushPayload {
    title: Option<String>,
    body: Option<String>,
    url: Option<String>,
}

pub struct ServiceWorker {
    config: Arc<AppConfig>,
    classifier: Classifier,
    stores: StoreManager,
    executor: StrategyExecutor,
    fetcher: Arc<dyn Fetcher>,
    host: Arc<dyn Host>,
    sync: Arc<dyn SyncRoutine>,
}

impl ServiceWorker {
    pub fn new(
        config: Arc<AppConfig>, db: StoreDb, fetcher: Arc<dyn Fetcher>, host: Arc<dyn Host>,
    ) -> Result<Self, Error> {
        let origin = Url::parse(&config.origin).map_err(|e| Error::InvalidUrl(format!("{}: {e}", config.origin)))?;
        let classifier = Classifier::from_config(&config)?;
        let stores = StoreManager::new(db, config.store_names(), origin);
        let fallback = FallbackProvider::new(stores.clone(), config.root_document.clone());
        let executor = StrategyExecutor::new(stores.clone(), fetcher.clone(), fallback);

        Ok(Self { config, classifier, stores, executor, fetcher, host, sync: Arc::new(NoopSync) })
    }

    /// Replace the default no-op synchronization routine.
    pub fn with_sync_routine(mut self, sync: Arc<dyn SyncRoutine>) -> Self {
        self.sync = sync;
        self
    }

    pub fn stores(&self) -> &StoreManager {
        &self.stores
    }

    /// Setup: provision the static store, then ask to skip waiting.
    pub async fn on_install(&self) -> Result<InstallOutcome, Error> {
        let report = self.stores.provision_static_store(self.fetcher.as_ref(), &self.config.static_assets).await?;
        tracing::info!(stored = report.stored.len(), failed = report.failed.len(), "static store provisioned");

        let skip_waiting = match self.host.skip_waiting().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "skip waiting rejected");
                false
            }
        };

        Ok(InstallOutcome { report, skip_waiting })
    }

    /// Activation: delete stale stores, then claim open clients.
    pub async fn on_activate(&self) -> Result<ActivateOutcome, Error> {
        let deleted = self.stores.reclaim_stale_stores().await?;

        let claimed = match self.host.claim_clients().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "claim clients rejected");
                false
            }
        };

        Ok(ActivateOutcome { deleted, claimed })
    }

    /// Inbound request: bypass or classify and run the matching strategy.
    pub async fn on_fetch(&self, request: &InterceptedRequest) -> FetchOutcome {
        if self.bypasses(request) {
            tracing::trace!(url = %request.url, method = %request.method, "bypassing");
            return FetchOutcome::Bypass;
        }

        let Some(class) = self.classifier.classify_request(self.stores.origin(), request) else {
            return FetchOutcome::Bypass;
        };

        tracing::debug!(url = %request.url, class = ?class, "intercepted");
        let response = self.executor.execute(class, request).await;
        FetchOutcome::Respond { class, response }
    }

    fn bypasses(&self, request: &InterceptedRequest) -> bool {
        !request.is_retrieval_safe()
            || self
                .config
                .bypass_schemes
                .iter()
                .any(|scheme| !scheme.is_empty() && request.url.starts_with(scheme.as_str()))
    }

    /// Deferred sync. Returns whether the tag triggered the routine.
    pub async fn on_sync(&self, tag: &str) -> Result<bool, Error> {
        if tag != self.config.sync_tag {
            tracing::debug!(tag, "ignoring sync tag");
            return Ok(false);
        }
        self.sync.synchronize(tag).await?;
        Ok(true)
    }

    /// Push: build and show a notification from an optional JSON payload.
    ///
    /// An absent payload does nothing. A malformed one, or JSON that is not
    /// an object, is logged and ignored. Missing or empty fields take their
    /// configured defaults.
    pub async fn on_push(&self, payload: Option<&str>) -> Option<Notification> {
        let raw = payload.map(str::trim).filter(|p| !p.is_empty())?;

        let parsed = match parse_push_payload(raw) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring push message");
                return None;
            }
        };

        let defaults = &self.config.notification;
        let or_default = |value: Option<String>, default: &str| {
            value.filter(|v| !v.is_empty()).unwrap_or_else(|| default.to_string())
        };

        let notification = Notification {
            title: or_default(parsed.title, &defaults.title),
            body: or_default(parsed.body, &defaults.body),
            icon: defaults.icon.clone(),
            badge: defaults.badge.clone(),
            data: NotificationData { url: Some(or_default(parsed.url, &defaults.url)) },
        };

        match self.host.show_notification(&notification).await {
            Ok(()) => tracing::info!(title = %notification.title, "notification shown"),
            Err(e) => tracing::warn!(error = %e, "notification display failed"),
        }

        Some(notification)
    }

    /// Notification click: close it and focus or open its target.
    ///
    /// Returns the target URL.
    pub async fn on_notification_click(&self, notification: &Notification) -> String {
        if let Err(e) = self.host.close_notification(notification).await {
            tracing::warn!(error = %e, "closing notification failed");
        }

        let target = notification
            .data
            .url
            .clone()
            .filter(|url| !url.is_empty())
            .unwrap_or_else(|| self.config.notification.url.clone());

        if let Err(e) = self.host.focus_or_open_window(&target).await {
            tracing::warn!(url = %target, error = %e, "opening window failed");
        }

        target
    }
}

fn parse_push_payload(raw: &str) -> Result<PushPayload, Error> {
    let value: serde_json::Value = serde_json::from_str(raw).map_err(|e| Error::InvalidPayload(e.to_string()))?;
    if !value.is_object() {
        return Err(Error::InvalidPayload("push payload must be a JSON object".into()));
    }
    serde_json::from_value(value).map_err(|e| Error::InvalidPayload(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingHost, RefusingHost, StubFetcher, ok_response};
    use offgrid_core::{StoreNames, StoreRole, VersionTag};
    use std::sync::Mutex;

    async fn worker(config: AppConfig, fetcher: StubFetcher) -> (ServiceWorker, Arc<StubFetcher>, Arc<RecordingHost>) {
        let db = StoreDb::open_in_memory().await.unwrap();
        let fetcher = Arc::new(fetcher);
        let host = Arc::new(RecordingHost::default());
        let sw = ServiceWorker::new(Arc::new(config), db, fetcher.clone(), host.clone()).unwrap();
        (sw, fetcher, host)
    }

    fn config_with_assets(assets: &[&str]) -> AppConfig {
        AppConfig { static_assets: assets.iter().map(|a| a.to_string()).collect(), ..AppConfig::default() }
    }

    #[tokio::test]
    async fn test_install_provisions_then_skips_waiting() {
        let fetcher = StubFetcher::new().respond("http://localhost:5000/style.css", ok_response("body {}"));
        let (sw, fetcher, host) = worker(config_with_assets(&["./style.css"]), fetcher).await;

        let outcome = sw.on_install().await.unwrap();
        assert_eq!(outcome.report.stored, vec!["./style.css".to_string()]);
        assert!(outcome.skip_waiting);
        assert_eq!(host.actions(), vec!["skip_waiting".to_string()]);
        assert_eq!(fetcher.calls(), 1);

        // Served from the static store with no further network traffic, repeatedly.
        for _ in 0..3 {
            match sw.on_fetch(&InterceptedRequest::get("./style.css")).await {
                FetchOutcome::Respond { class, response } => {
                    assert_eq!(class, StrategyClass::Static);
                    assert_eq!(response.body, b"body {}".to_vec());
                }
                FetchOutcome::Bypass => panic!("expected interception"),
            }
        }
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_install_survives_failed_assets() {
        let (sw, _, host) = worker(config_with_assets(&["./index.html", "./script.js"]), StubFetcher::new()).await;

        let outcome = sw.on_install().await.unwrap();
        assert!(outcome.report.stored.is_empty());
        assert_eq!(outcome.report.failed.len(), 2);
        assert_eq!(host.actions(), vec!["skip_waiting".to_string()]);
    }

    #[tokio::test]
    async fn test_refused_capabilities_are_reported_not_raised() {
        let db = StoreDb::open_in_memory().await.unwrap();
        let sw = ServiceWorker::new(
            Arc::new(config_with_assets(&[])),
            db,
            Arc::new(StubFetcher::new()),
            Arc::new(RefusingHost),
        )
        .unwrap();

        assert!(!sw.on_install().await.unwrap().skip_waiting);
        assert!(!sw.on_activate().await.unwrap().claimed);

        let notification = sw.on_push(Some(r#"{"title": "Goa"}"#)).await.unwrap();
        assert_eq!(notification.title, "Goa");
        assert_eq!(sw.on_notification_click(&notification).await, "./");
    }

    #[tokio::test]
    async fn test_activate_reclaims_then_claims() {
        let db = StoreDb::open_in_memory().await.unwrap();
        let host = Arc::new(RecordingHost::default());
        let fetcher = Arc::new(StubFetcher::new());
        let sw = ServiceWorker::new(Arc::new(AppConfig::default()), db.clone(), fetcher, host.clone()).unwrap();
        let old = InterceptedRequest::get("/api/data");
        let v3 = StoreManager::new(db, StoreNames::new(VersionTag::new("pyti-v3")), sw.stores().origin().clone());
        v3.put(StoreRole::Static, &old, &ok_response("old")).await.unwrap();
        sw.stores().put(StoreRole::Dynamic, &old, &ok_response("new")).await.unwrap();

        let outcome = sw.on_activate().await.unwrap();
        assert_eq!(outcome.deleted, vec!["pyti-v3-static".to_string()]);
        assert!(outcome.claimed);
        assert_eq!(host.actions(), vec!["claim_clients".to_string()]);

        let second = sw.on_activate().await.unwrap();
        assert!(second.deleted.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_bypasses_non_get_and_extension_urls() {
        let (sw, fetcher, _) = worker(AppConfig::default(), StubFetcher::new()).await;

        let post = InterceptedRequest::get("/api/contact").with_method("POST");
        assert_eq!(sw.on_fetch(&post).await, FetchOutcome::Bypass);

        let extension = InterceptedRequest::get("chrome-extension://abc/script.js");
        assert_eq!(sw.on_fetch(&extension).await, FetchOutcome::Bypass);

        assert_eq!(fetcher.calls(), 0);
    }

    #[tokio::test]
    async fn test_fetch_classifies_relative_and_absolute_alike() {
        let fetcher = StubFetcher::new().respond("http://localhost:5000/api/trips", ok_response("[]"));
        let (sw, _, _) = worker(AppConfig::default(), fetcher).await;

        for url in ["./api/trips", "http://localhost:5000/api/trips"] {
            match sw.on_fetch(&InterceptedRequest::get(url)).await {
                FetchOutcome::Respond { class, .. } => assert_eq!(class, StrategyClass::Generic, "{url}"),
                FetchOutcome::Bypass => panic!("expected interception for {url}"),
            }
        }
    }

    #[tokio::test]
    async fn test_fetch_generic_offline_without_entry() {
        let (sw, _, _) = worker(AppConfig::default(), StubFetcher::new()).await;

        match sw.on_fetch(&InterceptedRequest::get("/api/data")).await {
            FetchOutcome::Respond { class, response } => {
                assert_eq!(class, StrategyClass::Generic);
                assert_eq!(response.status, 503);
                assert_eq!(response.content_type(), Some("text/plain"));
            }
            FetchOutcome::Bypass => panic!("expected interception"),
        }
    }

    #[tokio::test]
    async fn test_fetch_generic_stores_success() {
        let fetcher = StubFetcher::new().respond("http://localhost:5000/api/data", ok_response("[]"));
        let (sw, _, _) = worker(AppConfig::default(), fetcher).await;
        let request = InterceptedRequest::get("/api/data");

        sw.on_fetch(&request).await;

        let stored = sw.stores().match_request(StoreRole::Dynamic, &request).await.unwrap();
        assert_eq!(stored.unwrap().body, b"[]".to_vec());
    }

    #[tokio::test]
    async fn test_sync_runs_routine_for_matching_tag_only() {
        struct Counting(Mutex<Vec<String>>);

        #[async_trait::async_trait]
        impl SyncRoutine for Counting {
            async fn synchronize(&self, tag: &str) -> Result<(), Error> {
                self.0.lock().unwrap().push(tag.to_string());
                Ok(())
            }
        }

        let (sw, _, _) = worker(AppConfig::default(), StubFetcher::new()).await;
        let routine = Arc::new(Counting(Mutex::new(Vec::new())));
        let sw = sw.with_sync_routine(routine.clone());

        assert!(sw.on_sync("sync-contact").await.unwrap());
        assert!(!sw.on_sync("sync-other").await.unwrap());
        assert_eq!(*routine.0.lock().unwrap(), vec!["sync-contact".to_string()]);
    }

    #[tokio::test]
    async fn test_sync_with_default_routine() {
        let (sw, _, _) = worker(AppConfig::default(), StubFetcher::new()).await;
        assert!(sw.on_sync("sync-contact").await.unwrap());
    }

    #[tokio::test]
    async fn test_push_empty_object_uses_defaults() {
        let (sw, _, host) = worker(AppConfig::default(), StubFetcher::new()).await;

        let notification = sw.on_push(Some("{}")).await.unwrap();

        assert_eq!(notification.title, "Plan Your Trip India");
        assert_eq!(notification.body, "Your trip plan is ready!");
        assert_eq!(notification.data.url.as_deref(), Some("./"));
        assert_eq!(notification.icon, AppConfig::default().notification.icon);
        assert_eq!(host.actions(), vec!["show:Plan Your Trip India".to_string()]);
    }

    #[tokio::test]
    async fn test_push_payload_fields_override_defaults() {
        let (sw, _, host) = worker(AppConfig::default(), StubFetcher::new()).await;

        let notification = sw
            .on_push(Some(r#"{"title": "Goa", "body": "", "url": "/trips/goa"}"#))
            .await
            .unwrap();

        assert_eq!(notification.title, "Goa");
        assert_eq!(notification.body, "Your trip plan is ready!");
        assert_eq!(notification.data.url.as_deref(), Some("/trips/goa"));
        assert_eq!(host.shown.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_push_absent_or_malformed_is_noop() {
        let (sw, _, host) = worker(AppConfig::default(), StubFetcher::new()).await;

        assert!(sw.on_push(None).await.is_none());
        assert!(sw.on_push(Some("")).await.is_none());
        assert!(sw.on_push(Some("not json")).await.is_none());
        assert!(sw.on_push(Some("[1, 2]")).await.is_none());
        assert!(sw.on_push(Some(r#"["Trip", "Ready", "/trips"]"#)).await.is_none());
        assert!(sw.on_push(Some("\"Trip\"")).await.is_none());
        assert!(host.actions().is_empty());
    }

    #[tokio::test]
    async fn test_notification_click_closes_and_opens_target() {
        let (sw, _, host) = worker(AppConfig::default(), StubFetcher::new()).await;
        let notification = Notification {
            title: "Goa".into(),
            body: "Ready".into(),
            icon: String::new(),
            badge: String::new(),
            data: NotificationData { url: Some("/trips/goa".into()) },
        };

        let target = sw.on_notification_click(&notification).await;

        assert_eq!(target, "/trips/goa");
        assert_eq!(host.actions(), vec!["close:Goa".to_string(), "open:/trips/goa".to_string()]);
    }

    #[tokio::test]
    async fn test_notification_click_defaults_to_root() {
        let (sw, _, host) = worker(AppConfig::default(), StubFetcher::new()).await;
        let notification = Notification {
            title: "Trip".into(),
            body: "Ready".into(),
            icon: String::new(),
            badge: String::new(),
            data: NotificationData::default(),
        };

        assert_eq!(sw.on_notification_click(&notification).await, "./");
        assert_eq!(host.actions().last().map(String::as_str), Some("open:./"));
    }
}
