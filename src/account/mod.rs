//! Account resource.
//!
//! [`Account`] is the persisted record and doubles as the wire format: it
//! serializes with `date_joined` as an ISO `YYYY-MM-DD` string. Clients
//! submit an [`AccountPayload`], which carries no `id` and is built through
//! an explicit conversion from JSON reporting every failing attribute.
mod memory;
mod postgres;
mod repository;

pub use memory::*;
pub use postgres::*;
pub use repository::{AccountRepository, PersistenceError, ToPersistence};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::{Validate, ValidationError, ValidationErrors};

/// Account as saved on database.
#[derive(
    Clone, Debug, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow,
)]
pub struct Account {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub address: String,
    pub phone_number: Option<String>,
    pub date_joined: NaiveDate,
}

impl Account {
    /// Overwrite every field but `id` with `payload`.
    ///
    /// `date_joined` is only replaced when the payload carries one.
    pub fn apply(&mut self, payload: AccountPayload) {
        self.name = payload.name;
        self.email = payload.email;
        self.address = payload.address;
        self.phone_number = payload.phone_number;
        if let Some(date_joined) = payload.date_joined {
            self.date_joined = date_joined;
        }
    }
}

/// Account submitted by a client, not yet persisted.
///
/// Lengths follow the width of the `accounts` table columns.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Validate)]
pub struct AccountPayload {
    #[validate(length(
        max = 64,
        message = "Name must be at most 64 characters long."
    ))]
    pub name: String,
    #[validate(length(
        max = 64,
        message = "Email must be at most 64 characters long."
    ))]
    pub email: String,
    #[validate(length(
        max = 256,
        message = "Address must be at most 256 characters long."
    ))]
    pub address: String,
    #[validate(length(
        max = 32,
        message = "Phone number must be at most 32 characters long."
    ))]
    pub phone_number: Option<String>,
    pub date_joined: Option<NaiveDate>,
}

impl AccountPayload {
    /// Date the account joined, today if the client sent none.
    pub fn date_joined_or_today(&self) -> NaiveDate {
        self.date_joined
            .unwrap_or_else(|| chrono::Utc::now().date_naive())
    }
}

impl TryFrom<Value> for AccountPayload {
    type Error = ValidationErrors;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let mut errors = ValidationErrors::new();

        let data = match value {
            Value::Object(data) => data,
            other => {
                errors.add(
                    "body",
                    ValidationError::new("type").with_message(
                        format!(
                            "Body must be a JSON object, found {}.",
                            kind(&other)
                        )
                        .into(),
                    ),
                );
                return Err(errors);
            },
        };

        let name = required_string(&data, "name", &mut errors);
        let email = required_string(&data, "email", &mut errors);
        let address = required_string(&data, "address", &mut errors);
        let phone_number =
            optional_string(&data, "phone_number", &mut errors);
        let date_joined = optional_date(&data, "date_joined", &mut errors);

        match (name, email, address) {
            (Some(name), Some(email), Some(address)) if errors.is_empty() => {
                let payload = Self {
                    name,
                    email,
                    address,
                    phone_number,
                    date_joined,
                };
                payload.validate()?;
                Ok(payload)
            },
            _ => Err(errors),
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn wrong_type(field: &str, expected: &str, value: &Value) -> ValidationError {
    ValidationError::new("type").with_message(
        format!(
            "Field '{field}' must be {expected}, found {}.",
            kind(value)
        )
        .into(),
    )
}

fn required_string(
    data: &Map<String, Value>,
    field: &'static str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match data.get(field) {
        Some(Value::String(value)) => Some(value.clone()),
        None | Some(Value::Null) => {
            errors.add(
                field,
                ValidationError::new("required").with_message(
                    format!("Missing required field '{field}'.").into(),
                ),
            );
            None
        },
        Some(other) => {
            errors.add(field, wrong_type(field, "a string", other));
            None
        },
    }
}

fn optional_string(
    data: &Map<String, Value>,
    field: &'static str,
    errors: &mut ValidationErrors,
) -> Option<String> {
    match data.get(field) {
        Some(Value::String(value)) => Some(value.clone()),
        None | Some(Value::Null) => None,
        Some(other) => {
            errors.add(field, wrong_type(field, "a string or null", other));
            None
        },
    }
}

fn optional_date(
    data: &Map<String, Value>,
    field: &'static str,
    errors: &mut ValidationErrors,
) -> Option<NaiveDate> {
    match data.get(field) {
        Some(Value::String(value)) if value.is_empty() => None,
        Some(Value::String(value)) => {
            match NaiveDate::parse_from_str(value, "%Y-%m-%d") {
                Ok(date) => Some(date),
                Err(_) => {
                    errors.add(
                        field,
                        ValidationError::new("date").with_message(
                            format!("Field '{field}' must be a YYYY-MM-DD date.")
                                .into(),
                        ),
                    );
                    None
                },
            }
        },
        None | Some(Value::Null) => None,
        Some(other) => {
            errors.add(field, wrong_type(field, "a date string", other));
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn rey() -> Value {
        json!({
            "name": "Rey",
            "email": "r@e.com",
            "address": "1 Main",
            "phone_number": "555-1234",
        })
    }

    #[test]
    fn test_deserialize_valid_payload() {
        let payload = AccountPayload::try_from(rey()).unwrap();

        assert_eq!(payload.name, "Rey");
        assert_eq!(payload.email, "r@e.com");
        assert_eq!(payload.address, "1 Main");
        assert_eq!(payload.phone_number.as_deref(), Some("555-1234"));
        assert_eq!(payload.date_joined, None);
        assert_eq!(
            payload.date_joined_or_today(),
            chrono::Utc::now().date_naive()
        );
    }

    #[test]
    fn test_deserialize_reports_every_missing_field() {
        let errors =
            AccountPayload::try_from(json!({ "name": "x" })).unwrap_err();
        let fields = errors.field_errors();

        assert!(fields.contains_key("email"));
        assert!(fields.contains_key("address"));
        assert!(!fields.contains_key("name"));
        assert!(!fields.contains_key("phone_number"));
    }

    #[test]
    fn test_deserialize_rejects_wrong_types() {
        let mut data = rey();
        data["name"] = json!(42);
        data["phone_number"] = json!(["555"]);
        data["date_joined"] = json!("yesterday");

        let errors = AccountPayload::try_from(data).unwrap_err();
        let fields = errors.field_errors();

        assert_eq!(fields.len(), 3);
        assert!(fields.contains_key("name"));
        assert!(fields.contains_key("phone_number"));
        assert!(fields.contains_key("date_joined"));
    }

    #[test]
    fn test_deserialize_rejects_non_object() {
        let errors = AccountPayload::try_from(json!([rey()])).unwrap_err();
        assert!(errors.field_errors().contains_key("body"));
    }

    #[test]
    fn test_deserialize_rejects_oversized_fields() {
        let mut data = rey();
        data["phone_number"] = json!("5".repeat(33));

        let errors = AccountPayload::try_from(data).unwrap_err();
        assert!(errors.field_errors().contains_key("phone_number"));
    }

    #[test]
    fn test_serialize_then_deserialize_keeps_fields() {
        let account = Account {
            id: 7,
            name: "Rey".into(),
            email: "r@e.com".into(),
            address: "1 Main".into(),
            phone_number: None,
            date_joined: NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(),
        };

        let value = serde_json::to_value(&account).unwrap();
        assert_eq!(value["id"], 7);
        assert_eq!(value["date_joined"], "2024-02-29");
        assert_eq!(value["phone_number"], Value::Null);

        let payload = AccountPayload::try_from(value).unwrap();
        let mut copy = Account {
            id: account.id,
            name: String::default(),
            email: String::default(),
            address: String::default(),
            phone_number: Some("old".into()),
            date_joined: NaiveDate::default(),
        };
        copy.apply(payload);
        assert_eq!(copy, account);
    }

    #[test]
    fn test_apply_keeps_date_joined_when_absent() {
        let joined = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let mut account = Account {
            id: 1,
            name: "Rey".into(),
            email: "r@e.com".into(),
            address: "1 Main".into(),
            phone_number: Some("555-1234".into()),
            date_joined: joined,
        };

        let mut data = rey();
        data["name"] = json!("Rey2");
        data["phone_number"] = Value::Null;
        account.apply(AccountPayload::try_from(data).unwrap());

        assert_eq!(account.id, 1);
        assert_eq!(account.name, "Rey2");
        assert_eq!(account.phone_number, None);
        assert_eq!(account.date_joined, joined);
    }
}
