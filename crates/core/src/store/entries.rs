//! Named store operations.
//!
//! Stores are created on first use and deleted wholesale. Entries inside a
//! store are keyed by canonical request; writing the same key again
//! replaces the previous response.

use std::collections::BTreeMap;

use super::connection::StoreDb;
use super::hash::compute_request_key;
use crate::Error;
use crate::model::{ResponseEnvelope, ResponseKind};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// Summary of one store for inspection.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, schemars::JsonSchema)]
pub struct StoreSummary {
    pub name: String,
    pub created_at: String,
    pub entries: u64,
}

impl StoreDb {
    /// Create a store if it does not exist yet.
    pub async fn open_store(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO stores (name, created_at) VALUES (?1, ?2)",
                    params![name, chrono::Utc::now().to_rfc3339()],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// All store names in creation order.
    pub async fn store_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM stores ORDER BY rowid ASC")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Every store with its entry count, in creation order.
    pub async fn store_summaries(&self) -> Result<Vec<StoreSummary>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<StoreSummary>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT s.name, s.created_at, COUNT(e.key_hash)
                     FROM stores s LEFT JOIN entries e ON e.store_name = s.name
                     GROUP BY s.name
                     ORDER BY s.rowid ASC",
                )?;
                let summaries = stmt
                    .query_map([], |row| {
                        Ok(StoreSummary {
                            name: row.get(0)?,
                            created_at: row.get(1)?,
                            entries: row.get::<_, i64>(2)? as u64,
                        })
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(summaries)
            })
            .await
            .map_err(Error::from)
    }

    /// Delete a store and every entry in it.
    ///
    /// Returns false if no store had that name.
    pub async fn delete_store(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM stores WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Store `response` under (`method`, `url`) in `store`, creating the
    /// store if needed. Last write wins.
    pub async fn put_entry(
        &self, store: &str, method: &str, url: &str, response: &ResponseEnvelope,
    ) -> Result<(), Error> {
        let store = store.to_string();
        let method = method.to_ascii_uppercase();
        let url = url.to_string();
        let key_hash = compute_request_key(&method, &url);
        let headers_json = serde_json::to_string(&response.headers)?;
        let response = response.clone();
        let now = chrono::Utc::now().to_rfc3339();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction()?;
                tx.execute(
                    "INSERT OR IGNORE INTO stores (name, created_at) VALUES (?1, ?2)",
                    params![store, now],
                )?;
                tx.execute(
                    "INSERT INTO entries (
                    store_name, key_hash, method, url, response_url, status, status_text,
                    kind, headers_json, body, stored_at
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
                ON CONFLICT(store_name, key_hash) DO UPDATE SET
                    response_url = excluded.response_url,
                    status = excluded.status,
                    status_text = excluded.status_text,
                    kind = excluded.kind,
                    headers_json = excluded.headers_json,
                    body = excluded.body,
                    stored_at = excluded.stored_at",
                    params![
                        &store,
                        &key_hash,
                        &method,
                        &url,
                        &response.url,
                        response.status as i64,
                        &response.status_text,
                        response.kind.as_str(),
                        &headers_json,
                        &response.body,
                        &now,
                    ],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up (`method`, `url`) in `store`.
    ///
    /// The envelope comes back exactly as it was put, including its own
    /// final URL. Returns None on a miss, including when the store does
    /// not exist.
    pub async fn match_entry(
        &self, store: &str, method: &str, url: &str,
    ) -> Result<Option<ResponseEnvelope>, Error> {
        let store = store.to_string();
        let key_hash = compute_request_key(method, url);
        self.conn
            .call(move |conn| -> Result<Option<ResponseEnvelope>, Error> {
                let mut stmt = conn.prepare(
                    "SELECT response_url, status, status_text, kind, headers_json, body
                     FROM entries WHERE store_name = ?1 AND key_hash = ?2",
                )?;

                let result = stmt.query_row(params![store, key_hash], |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                        row.get::<_, Vec<u8>>(5)?,
                    ))
                });

                let (url, status, status_text, kind, headers_json, body) = match result {
                    Ok(row) => row,
                    Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
                    Err(e) => return Err(e.into()),
                };

                let kind =
                    ResponseKind::parse(&kind).ok_or_else(|| Error::CorruptEntry(format!("unknown kind {kind}")))?;
                let status = u16::try_from(status).map_err(|_| Error::CorruptEntry(format!("bad status {status}")))?;
                let headers: BTreeMap<String, String> = serde_json::from_str(&headers_json)?;

                Ok(Some(ResponseEnvelope { url, status, status_text, kind, headers, body }))
            })
            .await
            .map_err(Error::from)
    }
}
