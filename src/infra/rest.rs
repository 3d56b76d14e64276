//! Asynchronous client for the hosted record store's REST endpoint.
//!
//! - Reads go through `GET /rest/v1/{table}` with equality filters.
//! - Writes ask for the stored row back so callers see what was persisted.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, RequestBuilder, Url};
use serde::Deserialize;

use crate::domain::{Filter, Ordering, Record, RecordStore, StoreError, Table};

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const USER_AGENT: &str = concat!("parcel-desk/", env!("CARGO_PKG_VERSION"));
const REST_PREFIX: &str = "rest/v1/";

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    hint: Option<String>,
}

#[derive(Clone)]
pub struct RestStore {
    http: Client,
    base_url: Url,
    api_key: String,
}

impl RestStore {
    pub fn new(base: &str, api_key: impl Into<String>) -> Result<Self, StoreError> {
        Self::with_timeout(base, api_key, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let mut base_url = Url::parse(base)?;
        // `Url::join` drops the last segment unless the path ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url,
            api_key: api_key.into(),
        })
    }

    /// Builds the collection URL for `table` with filters and ordering applied.
    pub fn table_url(
        &self,
        table: Table,
        filter: &Filter,
        ordering: Option<&Ordering>,
    ) -> Result<Url, url::ParseError> {
        let mut url = self.base_url.join(REST_PREFIX)?.join(table.name())?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("select", table.select());
            for (column, value) in filter.conditions() {
                query.append_pair(column, &format!("eq.{value}"));
            }
            if let Some(ordering) = ordering {
                let direction = if ordering.ascending { "asc" } else { "desc" };
                query.append_pair("order", &format!("{}.{direction}", ordering.column));
            }
        }
        Ok(url)
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
    }

    async fn send_rows(&self, builder: RequestBuilder) -> Result<Vec<Record>, StoreError> {
        let response = self.authorized(builder).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let reason = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(|err| err.message.or(err.hint))
                .unwrap_or_else(|| format!("HTTP {status}"));
            tracing::warn!("[rest-store] request failed: {reason}");
            return Err(StoreError::Api(reason));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl RecordStore for RestStore {
    async fn fetch(
        &self,
        table: Table,
        filter: &Filter,
        ordering: Option<&Ordering>,
    ) -> Result<Vec<Record>, StoreError> {
        let url = self.table_url(table, filter, ordering)?;
        tracing::debug!("[rest-store] GET {url}");
        self.send_rows(self.http.get(url)).await
    }

    async fn update(&self, table: Table, id: &str, fields: Record) -> Result<Record, StoreError> {
        let url = self.table_url(table, &Filter::all().eq("id", id), None)?;
        tracing::debug!("[rest-store] PATCH {url}");
        let rows = self
            .send_rows(
                self.http
                    .patch(url)
                    .header("Prefer", "return=representation")
                    .json(&fields),
            )
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::MissingRecord {
                table: table.name(),
                id: id.to_string(),
            })
    }

    async fn insert(&self, table: Table, fields: Record) -> Result<Record, StoreError> {
        let url = self.table_url(table, &Filter::all(), None)?;
        tracing::debug!("[rest-store] POST {url}");
        let rows = self
            .send_rows(
                self.http
                    .post(url)
                    .header("Prefer", "return=representation")
                    .json(&fields),
            )
            .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| StoreError::Api(format!("{} insert returned no row", table.name())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_url_encodes_filters_and_order() {
        let store = RestStore::new("https://example.supabase.co", "anon").expect("client");
        let url = store
            .table_url(
                Table::Shipments,
                &Filter::all()
                    .eq("pickup_district", "Agdal")
                    .eq("status", "pending"),
                Some(&Ordering::asc("created_at")),
            )
            .expect("url");

        assert_eq!(url.path(), "/rest/v1/shipments");
        let pairs: Vec<(String, String)> = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("pickup_district".into(), "eq.Agdal".into())));
        assert!(pairs.contains(&("status".into(), "eq.pending".into())));
        assert!(pairs.contains(&("order".into(), "created_at.asc".into())));
        assert!(pairs.contains(&(
            "select".into(),
            "*,sender:users!sender_id(first_name,last_name,phone)".into()
        )));
    }

    #[test]
    fn base_path_is_preserved() {
        let store = RestStore::new("https://host.example/proxy", "anon").expect("client");
        let url = store
            .table_url(Table::Tariffs, &Filter::all(), Some(&Ordering::desc("city")))
            .expect("url");
        assert_eq!(url.path(), "/proxy/rest/v1/tariffs");
        assert!(url.query().is_some_and(|q| q.contains("order=city.desc")));
    }

    #[test]
    fn rejects_unparsable_base() {
        assert!(matches!(
            RestStore::new("not a url", "anon"),
            Err(StoreError::InvalidUrl(_))
        ));
    }
}
