use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A job application owned by exactly one user. Every field defaults so a
/// partial request body still decodes; the storage layer enforces what is
/// actually required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase", default)]
pub struct Application {
    pub id: i32,
    pub user_id: i32,
    pub job_title: String,
    pub work_type_id: i32,
    pub company_name: String,
    #[serde(with = "flexible_date")]
    pub submission_date: Option<NaiveDate>,
    pub status_id: i32,
    pub wanted_salary: Option<f32>,
    pub accepted_salary: Option<f32>,
    #[serde(with = "flexible_date")]
    pub start_date: Option<NaiveDate>,
    pub commentary: Option<String>,
}

impl Application {
    /// Copy every caller-editable field from `other`, keeping id and owner
    pub fn replace_fields(&mut self, other: Application) {
        self.job_title = other.job_title;
        self.work_type_id = other.work_type_id;
        self.company_name = other.company_name;
        self.submission_date = other.submission_date;
        self.status_id = other.status_id;
        self.wanted_salary = other.wanted_salary;
        self.accepted_salary = other.accepted_salary;
        self.start_date = other.start_date;
        self.commentary = other.commentary;
    }
}

/// Dates serialize as `YYYY-MM-DD`. On input an RFC 3339 timestamp is also
/// accepted and truncated to its date.
mod flexible_date {
    use chrono::{DateTime, NaiveDate};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(date: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match date {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        if raw.is_empty() {
            return Ok(None);
        }

        NaiveDate::parse_from_str(&raw, FORMAT)
            .or_else(|_| DateTime::parse_from_rfc3339(&raw).map(|dt| dt.date_naive()))
            .map(Some)
            .map_err(|_| D::Error::custom(format!("invalid date '{}'", raw)))
    }
}
