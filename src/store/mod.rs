//! Generic record store interface.
//!
//! The remote store holds every dashboard table and speaks one envelope
//! format for all of them. This module defines that contract; the HTTP client
//! lives in [`http`].

mod http;

pub use http::*;

use std::cmp::Ordering;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;

/// Comparison applied by a [`Condition`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Operator {
    EqualTo,
    GreaterThanOrEqualTo,
    LessThanOrEqualTo,
}

/// One `where` clause of a fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Condition {
    #[serde(rename = "FieldName")]
    pub field: String,
    #[serde(rename = "Operator")]
    pub operator: Operator,
    #[serde(rename = "Values")]
    pub values: Vec<Value>,
    #[serde(rename = "Include", default = "default_include")]
    pub include: bool,
}

fn default_include() -> bool {
    true
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            values: vec![value.into()],
            include: true,
        }
    }

    pub fn equal_to(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::new(field, Operator::EqualTo, value)
    }

    /// Evaluate the clause against one JSON record.
    ///
    /// Lookup fields (`{"Id": .., "Name": ..}`) compare by their `Id`, and
    /// strings that both parse as RFC 3339 compare chronologically.
    pub fn matches(&self, record: &Value) -> bool {
        let Some(actual) = record.get(&self.field).map(lookup_id) else {
            return !self.include;
        };

        let matched = match self.operator {
            Operator::EqualTo => self
                .values
                .iter()
                .any(|v| compare_values(actual, v) == Some(Ordering::Equal)),
            Operator::GreaterThanOrEqualTo => self.values.first().is_some_and(|v| {
                matches!(
                    compare_values(actual, v),
                    Some(Ordering::Greater | Ordering::Equal)
                )
            }),
            Operator::LessThanOrEqualTo => self.values.first().is_some_and(|v| {
                matches!(
                    compare_values(actual, v),
                    Some(Ordering::Less | Ordering::Equal)
                )
            }),
        };

        matched == self.include
    }
}

fn lookup_id(value: &Value) -> &Value {
    match value {
        Value::Object(map) => map.get("Id").unwrap_or(value),
        _ => value,
    }
}

fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(a), Value::String(b)) => {
            match (
                DateTime::parse_from_rfc3339(a),
                DateTime::parse_from_rfc3339(b),
            ) {
                (Ok(a), Ok(b)) => Some(a.with_timezone(&Utc).cmp(&b.with_timezone(&Utc))),
                _ => Some(a.cmp(b)),
            }
        }
        (Value::Number(a), Value::Number(b)) => a.as_f64()?.partial_cmp(&b.as_f64()?),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        _ => None,
    }
}

/// Sort direction as spelled by the store.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SortDirection {
    #[serde(rename = "ASC")]
    Ascending,
    #[serde(rename = "DESC")]
    Descending,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderBy {
    #[serde(rename = "fieldName")]
    pub field: String,
    #[serde(rename = "sorttype")]
    pub direction: SortDirection,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Paging {
    pub limit: usize,
    #[serde(default)]
    pub offset: usize,
}

/// Field projection entry, `{"field": {"Name": "timestamp"}}` on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: FieldName,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldName {
    #[serde(rename = "Name")]
    pub name: String,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            field: FieldName { name: name.into() },
        }
    }
}

/// Parameters of a `fetch_records` call.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FetchQuery {
    #[serde(default)]
    pub fields: Vec<FieldSpec>,
    #[serde(rename = "where", default)]
    pub conditions: Vec<Condition>,
    #[serde(rename = "orderBy", default)]
    pub order_by: Vec<OrderBy>,
    #[serde(rename = "pagingInfo", default, skip_serializing_if = "Option::is_none")]
    pub paging: Option<Paging>,
}

impl FetchQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fields(mut self, names: &[&str]) -> Self {
        self.fields = names.iter().map(|name| FieldSpec::new(*name)).collect();
        self
    }

    pub fn filter(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.order_by.push(OrderBy {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn paging(mut self, limit: usize, offset: usize) -> Self {
        self.paging = Some(Paging { limit, offset });
        self
    }

    /// Apply filters, ordering and paging to a set of rows the way the store does.
    pub fn evaluate(&self, rows: &[Value]) -> Vec<Value> {
        let mut selected: Vec<Value> = rows
            .iter()
            .filter(|row| self.conditions.iter().all(|c| c.matches(row)))
            .cloned()
            .collect();

        for order in self.order_by.iter().rev() {
            selected.sort_by(|a, b| {
                let a = a.get(&order.field).unwrap_or(&Value::Null);
                let b = b.get(&order.field).unwrap_or(&Value::Null);
                let ordering = compare_values(a, b).unwrap_or(Ordering::Equal);
                match order.direction {
                    SortDirection::Ascending => ordering,
                    SortDirection::Descending => ordering.reverse(),
                }
            });
        }

        match self.paging {
            Some(Paging { limit, offset }) => {
                selected.into_iter().skip(offset).take(limit).collect()
            }
            None => selected,
        }
    }
}

/// Response to `fetch_records`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FetchResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response to `get_record_by_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordResponse {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Per-record outcome of a create, update or delete.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecordResult {
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Response to create, update and delete calls.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MutationResponse {
    pub success: bool,
    #[serde(default)]
    pub results: Option<Vec<RecordResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl MutationResponse {
    /// Split the per-record results into successes and failures.
    pub fn partition(&self) -> (Vec<&RecordResult>, Vec<&RecordResult>) {
        self.results
            .as_deref()
            .unwrap_or_default()
            .iter()
            .partition(|result| result.success)
    }
}

/// Body of create and update calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordsPayload {
    pub records: Vec<Value>,
}

/// Body of delete calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeletePayload {
    #[serde(rename = "RecordIds")]
    pub record_ids: Vec<i64>,
}

/// The remote CRUD backend shared by every dashboard table.
///
/// `Err` means the call itself failed (network, undecodable reply). A reply
/// with `success: false` is returned as `Ok` so callers can read its message.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn fetch_records(&self, table: &str, query: &FetchQuery)
        -> Result<FetchResponse, AppError>;

    async fn get_record_by_id(
        &self,
        table: &str,
        id: i64,
        fields: &[&str],
    ) -> Result<RecordResponse, AppError>;

    async fn create_records(
        &self,
        table: &str,
        records: Vec<Value>,
    ) -> Result<MutationResponse, AppError>;

    async fn update_records(
        &self,
        table: &str,
        records: Vec<Value>,
    ) -> Result<MutationResponse, AppError>;

    async fn delete_records(&self, table: &str, ids: &[i64])
        -> Result<MutationResponse, AppError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows() -> Vec<Value> {
        vec![
            json!({"Id": 1, "type": "appointment", "timestamp": "2026-10-20T11:00:00.000Z"}),
            json!({"Id": 2, "type": "admission", "timestamp": "2026-10-20T08:00:00.000Z"}),
            json!({"Id": 3, "type": "appointment", "timestamp": "2026-10-20T09:00:00Z"}),
            json!({"Id": 4, "type": "appointment", "timestamp": "2026-10-21T09:00:00Z"}),
        ]
    }

    #[test]
    fn test_query_wire_format() {
        let query = FetchQuery::new()
            .fields(&["Name"])
            .filter(Condition::equal_to("type", "appointment"))
            .order_by("timestamp", SortDirection::Ascending);

        let value = serde_json::to_value(&query).unwrap();
        assert_eq!(value["fields"][0]["field"]["Name"], "Name");
        assert_eq!(value["where"][0]["FieldName"], "type");
        assert_eq!(value["where"][0]["Operator"], "EqualTo");
        assert_eq!(value["where"][0]["Values"][0], "appointment");
        assert_eq!(value["where"][0]["Include"], true);
        assert_eq!(value["orderBy"][0]["fieldName"], "timestamp");
        assert_eq!(value["orderBy"][0]["sorttype"], "ASC");
        assert!(value.get("pagingInfo").is_none());
    }

    #[test]
    fn test_evaluate_filters_ranges_and_sorts() {
        let query = FetchQuery::new()
            .filter(Condition::equal_to("type", "appointment"))
            .filter(Condition::new(
                "timestamp",
                Operator::GreaterThanOrEqualTo,
                "2026-10-20T00:00:00.000Z",
            ))
            .filter(Condition::new(
                "timestamp",
                Operator::LessThanOrEqualTo,
                "2026-10-20T23:59:59.999Z",
            ))
            .order_by("timestamp", SortDirection::Ascending);

        let ids: Vec<i64> = query
            .evaluate(&rows())
            .iter()
            .map(|row| row["Id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    fn test_evaluate_paging_and_descending() {
        let query = FetchQuery::new()
            .order_by("Id", SortDirection::Descending)
            .paging(2, 1);
        let ids: Vec<i64> = query
            .evaluate(&rows())
            .iter()
            .map(|row| row["Id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn test_condition_compares_lookup_by_id() {
        let row = json!({"patientId": {"Id": 4, "Name": "Ada"}});
        assert!(Condition::equal_to("patientId", 4).matches(&row));
        assert!(!Condition::equal_to("patientId", 5).matches(&row));
    }

    #[test]
    fn test_partition_results() {
        let response: MutationResponse = serde_json::from_value(json!({
            "success": true,
            "results": [
                {"success": true, "data": {"Id": 1}},
                {"success": false, "message": "invalid timestamp"}
            ]
        }))
        .unwrap();
        let (ok, failed) = response.partition();
        assert_eq!(ok.len(), 1);
        assert_eq!(failed[0].message.as_deref(), Some("invalid timestamp"));
    }
}
