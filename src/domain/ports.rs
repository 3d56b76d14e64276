//! Boundary to the hosted record store.
//!
//! Records cross this boundary as raw JSON; typed decoding happens once in
//! `infra::records`.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Raw record as returned by the store, nested joins included.
pub type Record = Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Table {
    Shipments,
    Users,
    Tariffs,
    ShipmentEvents,
}

impl Table {
    pub fn name(&self) -> &'static str {
        match self {
            Table::Shipments => "shipments",
            Table::Users => "users",
            Table::Tariffs => "tariffs",
            Table::ShipmentEvents => "shipment_events",
        }
    }

    /// Column projection including relational joins.
    pub fn select(&self) -> &'static str {
        match self {
            Table::Shipments => "*,sender:users!sender_id(first_name,last_name,phone)",
            Table::Users | Table::Tariffs | Table::ShipmentEvents => "*",
        }
    }
}

/// Conjunction of column equality tests.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Filter {
    conditions: Vec<(String, String)>,
}

impl Filter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.conditions.push((column.into(), value.into()));
        self
    }

    pub fn conditions(&self) -> &[(String, String)] {
        &self.conditions
    }

    /// Evaluates the filter against a top-level record, comparing scalars by
    /// their string form.
    pub fn matches(&self, record: &Record) -> bool {
        self.conditions.iter().all(|(column, expected)| {
            match record.get(column) {
                Some(Value::String(value)) => value == expected,
                Some(Value::Number(value)) => value.to_string() == *expected,
                Some(Value::Bool(value)) => value.to_string() == *expected,
                _ => false,
            }
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ordering {
    pub column: String,
    pub ascending: bool,
}

impl Ordering {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("store error: {0}")]
    Api(String),
    #[error("no {table} record with id {id}")]
    MissingRecord { table: &'static str, id: String },
    #[error("malformed {table} record: {reason}")]
    Decode { table: &'static str, reason: String },
    #[error("record store unavailable")]
    Unavailable,
}

/// Generic record store. Implementations must only report success once the
/// write is durable on their side.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn fetch(
        &self,
        table: Table,
        filter: &Filter,
        ordering: Option<&Ordering>,
    ) -> Result<Vec<Record>, StoreError>;

    /// Applies `fields` to the record with `id` and returns the updated record.
    async fn update(&self, table: Table, id: &str, fields: Record) -> Result<Record, StoreError>;

    /// Inserts `fields` as a new record and returns it with its identifier.
    async fn insert(&self, table: Table, fields: Record) -> Result<Record, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn filter_compares_scalars_by_string_form() {
        let record = json!({"id": 7, "status": "pending", "active": true});
        assert!(Filter::all().matches(&record));
        assert!(Filter::all().eq("id", "7").eq("status", "pending").matches(&record));
        assert!(Filter::all().eq("active", "true").matches(&record));
        assert!(!Filter::all().eq("status", "collected").matches(&record));
        assert!(!Filter::all().eq("missing", "x").matches(&record));
    }
}
