use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// The five contact fields recognized as placeholder tokens.
pub const PLACEHOLDER_FIELDS: [&str; 5] =
    ["firstName", "lastName", "email", "company", "position"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Contact {
    /// The address to deliver to, or None when the record has no usable one.
    pub fn sanitized_email(&self) -> Option<&str> {
        self.email
            .as_deref()
            .map(str::trim)
            .filter(|e| !e.is_empty())
    }

    /// Placeholder values for this contact. All five recognized keys are
    /// always present, missing fields mapping to the empty string, so the
    /// supported tokens never survive substitution unresolved.
    pub fn placeholder_values(&self) -> HashMap<String, String> {
        let field = |v: &Option<String>| v.clone().unwrap_or_default();
        HashMap::from([
            ("firstName".to_string(), field(&self.first_name)),
            ("lastName".to_string(), field(&self.last_name)),
            ("email".to_string(), field(&self.email)),
            ("company".to_string(), field(&self.company)),
            ("position".to_string(), field(&self.position)),
        ])
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContact {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
}
