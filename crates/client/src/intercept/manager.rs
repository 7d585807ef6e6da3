//! Store lifecycle: provisioning, lookups, writes and reclamation of
//! stores left over from earlier version tags.

use futures_util::future::join_all;
use offgrid_core::store::entries::StoreSummary;
use offgrid_core::{Error, InterceptedRequest, ResponseEnvelope, StoreDb, StoreNames, StoreRole};
use serde::Serialize;
use url::Url;

use crate::fetch::{Fetcher, resolve};

/// One asset that could not be provisioned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct ProvisionFailure {
    pub url: String,
    pub reason: String,
}

/// Outcome of populating the static store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, schemars::JsonSchema)]
pub struct ProvisionReport {
    pub stored: Vec<String>,
    pub failed: Vec<ProvisionFailure>,
}

/// Owns every read and write against the named stores.
#[derive(Clone, Debug)]
pub struct StoreManager {
    db: StoreDb,
    names: StoreNames,
    origin: Url,
}

impl StoreManager {
    pub fn new(db: StoreDb, names: StoreNames, origin: Url) -> Self {
        Self { db, names, origin }
    }

    pub fn names(&self) -> &StoreNames {
        &self.names
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Canonical URL under which a request is stored.
    fn key_url(&self, request: &InterceptedRequest) -> Result<String, Error> {
        resolve(&self.origin, &request.url)
            .map(String::from)
            .map_err(|e| Error::InvalidUrl(e.to_string()))
    }

    /// Open the static store and populate it with every asset.
    ///
    /// Assets are fetched concurrently. A failed asset (network error,
    /// non-2xx status, or store write error) is logged and recorded in the
    /// report without affecting the others. Only failing to open the store
    /// itself is an error.
    pub async fn provision_static_store(
        &self, fetcher: &dyn Fetcher, assets: &[String],
    ) -> Result<ProvisionReport, Error> {
        let store = self.names.name(StoreRole::Static);
        self.db.open_store(store).await?;

        tracing::info!(store, assets = assets.len(), "pre-caching static assets");

        let attempts = assets.iter().map(|asset| async move { (asset, self.provision_one(fetcher, asset).await) });
        let mut report = ProvisionReport::default();

        for (asset, result) in join_all(attempts).await {
            match result {
                Ok(()) => report.stored.push(asset.clone()),
                Err(e) => {
                    tracing::warn!(url = %asset, error = %e, "cache failed for asset");
                    report.failed.push(ProvisionFailure { url: asset.clone(), reason: e.to_string() });
                }
            }
        }

        Ok(report)
    }

    async fn provision_one(&self, fetcher: &dyn Fetcher, asset: &str) -> Result<(), Error> {
        let request = InterceptedRequest::get(asset);
        let response = fetcher.fetch(&request).await?;
        if !response.is_ok() {
            return Err(Error::Network(format!("unexpected status {}", response.status)));
        }
        self.put(StoreRole::Static, &request, &response).await
    }

    /// Delete every store whose name is not a current store name.
    ///
    /// Returns the names that were deleted. Running it again without a
    /// version change deletes nothing.
    pub async fn reclaim_stale_stores(&self) -> Result<Vec<String>, Error> {
        let mut deleted = Vec::new();

        for name in self.db.store_names().await? {
            if self.names.is_current(&name) {
                continue;
            }
            tracing::info!(store = %name, "deleting old store");
            if self.db.delete_store(&name).await? {
                deleted.push(name);
            }
        }

        Ok(deleted)
    }

    /// Look up a request in the store for `role`.
    ///
    /// A miss is `Ok(None)`; errors are reserved for store failures.
    pub async fn match_request(
        &self, role: StoreRole, request: &InterceptedRequest,
    ) -> Result<Option<ResponseEnvelope>, Error> {
        let url = self.key_url(request)?;
        self.db.match_entry(self.names.name(role), &request.method, &url).await
    }

    /// Store a response for a request in the store for `role`.
    pub async fn put(
        &self, role: StoreRole, request: &InterceptedRequest, response: &ResponseEnvelope,
    ) -> Result<(), Error> {
        if !request.is_retrieval_safe() {
            return Err(Error::InvalidInput(format!("{} requests are not stored", request.method)));
        }
        let url = self.key_url(request)?;
        self.db.put_entry(self.names.name(role), &request.method, &url, response).await
    }

    /// Every store with its entry count.
    pub async fn summaries(&self) -> Result<Vec<StoreSummary>, Error> {
        self.db.store_summaries().await
    }

    /// Look up a request in an arbitrary store by name.
    pub async fn match_in(
        &self, store: &str, request: &InterceptedRequest,
    ) -> Result<Option<ResponseEnvelope>, Error> {
        let url = self.key_url(request)?;
        self.db.match_entry(store, &request.method, &url).await
    }
}
