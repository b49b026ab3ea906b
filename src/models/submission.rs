use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sqlx::sqlite::SqliteRow;
use sqlx::types::Json;
use sqlx::{FromRow, Row};

/// One filled-out request: field name to value, in form order.
pub type Record = Map<String, Value>;

/// Keys the store assigns itself. Callers never supply these.
pub const SYSTEM_KEYS: [&str; 2] = ["id", "timestamp"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    #[serde(flatten)]
    pub fields: Record,
    pub timestamp: DateTime<Utc>,
}

impl Submission {
    /// Flatten into a single record with `id` first and `timestamp` last.
    pub fn to_record(&self) -> Record {
        let mut record = Record::with_capacity(self.fields.len() + 2);
        record.insert("id".to_string(), Value::from(self.id));
        for (key, value) in &self.fields {
            record.insert(key.clone(), value.clone());
        }
        record.insert(
            "timestamp".to_string(),
            Value::String(self.timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
        record
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(|v| v.as_str())
    }
}

impl<'r> FromRow<'r, SqliteRow> for Submission {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let Json(fields) = row.try_get::<Json<Record>, _>("data")?;
        Ok(Submission {
            id: row.try_get("id")?,
            fields,
            timestamp: row.try_get("timestamp")?,
        })
    }
}

/// The non-unique secondary keys of the submissions collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionIndex {
    DateRequested,
    AppName,
    Requestor,
}

impl SubmissionIndex {
    pub const ALL: [SubmissionIndex; 3] = [
        SubmissionIndex::DateRequested,
        SubmissionIndex::AppName,
        SubmissionIndex::Requestor,
    ];

    /// The record field the index is keyed on.
    pub fn field(self) -> &'static str {
        match self {
            SubmissionIndex::DateRequested => "dateRequested",
            SubmissionIndex::AppName => "appName",
            SubmissionIndex::Requestor => "requestor",
        }
    }

    pub fn index_name(self) -> &'static str {
        match self {
            SubmissionIndex::DateRequested => "idx_form_submissions_date_requested",
            SubmissionIndex::AppName => "idx_form_submissions_app_name",
            SubmissionIndex::Requestor => "idx_form_submissions_requestor",
        }
    }

    /// JSON path expression; must match the indexed expression exactly for
    /// SQLite to use the index.
    pub fn expression(self) -> String {
        format!("json_extract(data, '$.{}')", self.field())
    }
}

impl std::str::FromStr for SubmissionIndex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dateRequested" | "date_requested" | "date" => Ok(SubmissionIndex::DateRequested),
            "appName" | "app_name" | "app" => Ok(SubmissionIndex::AppName),
            "requestor" => Ok(SubmissionIndex::Requestor),
            other => Err(format!("unknown index '{other}'")),
        }
    }
}
