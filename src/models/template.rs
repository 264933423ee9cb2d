use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::models::component::EmailComponent;

/// Page-level background styling applied to the document wrapper.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PageStyle {
    #[serde(default = "default_background_color")]
    pub background_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_image: Option<String>,
    #[serde(default = "default_background_size")]
    pub background_size: String,
    #[serde(default = "default_background_repeat")]
    pub background_repeat: String,
    #[serde(default = "default_background_position")]
    pub background_position: String,
}

fn default_background_color() -> String {
    "#ffffff".to_string()
}

fn default_background_size() -> String {
    "cover".to_string()
}

fn default_background_repeat() -> String {
    "no-repeat".to_string()
}

fn default_background_position() -> String {
    "center center".to_string()
}

impl Default for PageStyle {
    fn default() -> Self {
        PageStyle {
            background_color: default_background_color(),
            background_image: None,
            background_size: default_background_size(),
            background_repeat: default_background_repeat(),
            background_position: default_background_position(),
        }
    }
}

/// The saved, named unit containing a full component tree plus metadata.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub components: Vec<EmailComponent>,
    #[serde(default)]
    pub page_style: PageStyle,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTemplate {
    pub name: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub components: Vec<EmailComponent>,
    #[serde(default)]
    pub page_style: PageStyle,
}

impl CreateTemplate {
    /// Structural validity: a non-empty name and non-empty, unique component
    /// ids throughout the tree (columns included).
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Template name is required".to_string());
        }
        let mut seen = HashSet::new();
        let mut stack: Vec<&EmailComponent> = self.components.iter().collect();
        while let Some(component) = stack.pop() {
            if let Some(id) = component.id() {
                if id.is_empty() {
                    return Err("Component id must not be empty".to_string());
                }
                if !seen.insert(id.to_string()) {
                    return Err(format!("Duplicate component id: {}", id));
                }
            }
            if let EmailComponent::Columns { columns, .. } = component {
                for column in columns {
                    stack.extend(column.components.iter());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn text(id: &str) -> EmailComponent {
        serde_json::from_value(json!({ "type": "text", "id": id, "content": id })).unwrap()
    }

    #[test]
    fn validate_rejects_duplicate_ids_across_columns() {
        let columns: EmailComponent = serde_json::from_value(json!({
            "type": "columns",
            "id": "cols",
            "columns": [
                { "id": "col-a", "components": [{ "type": "text", "id": "dup", "content": "A" }] },
                { "id": "col-b", "components": [{ "type": "text", "id": "dup", "content": "B" }] }
            ]
        }))
        .unwrap();

        let payload = CreateTemplate {
            name: "Intro".to_string(),
            subject: String::new(),
            components: vec![columns],
            page_style: PageStyle::default(),
        };
        let err = payload.validate().unwrap_err();
        assert!(err.contains("Duplicate component id"));
    }

    #[test]
    fn validate_accepts_distinct_ids() {
        let payload = CreateTemplate {
            name: "Intro".to_string(),
            subject: "Hello".to_string(),
            components: vec![text("a"), text("b")],
            page_style: PageStyle::default(),
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn validate_requires_name() {
        let payload = CreateTemplate {
            name: "   ".to_string(),
            subject: String::new(),
            components: vec![],
            page_style: PageStyle::default(),
        };
        assert!(payload.validate().is_err());
    }
}
