//! ICP Row Mapping
//!
//! Wire shape of the `icps` table (snake_case columns) and its translation
//! to and from the application record.

use serde::{Deserialize, Serialize};

use crate::models::icp::{AssistantLink, CustomParameter, Icp, IcpColor};
use crate::utils::error::{AppError, AppResult};

/// One row of the `icps` table
///
/// `custom_parameters` is JSON. Postgres `jsonb` returns it as an array while
/// SQLite `TEXT` returns it as a JSON-encoded string; both are accepted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IcpRow {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub custom_parameters: serde_json::Value,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub assistant_id: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub date_modified: Option<String>,
}

impl IcpRow {
    pub fn from_icp(icp: &Icp) -> AppResult<Self> {
        Ok(Self {
            id: icp.id.clone(),
            name: icp.name.clone(),
            description: icp.description.clone(),
            custom_parameters: serde_json::to_value(&icp.custom_parameters)?,
            color: Some(color_label(icp.color)?),
            assistant_id: icp.assistant.assistant_id().map(str::to_string),
            system_prompt: Some(icp.system_prompt.clone()),
            user_id: Some(icp.owner_id.clone()),
            created_at: Some(icp.created_at.clone()),
            updated_at: Some(icp.updated_at.clone()),
            date_modified: Some(icp.date_modified.clone()),
        })
    }

    pub fn into_icp(self) -> AppResult<Icp> {
        let custom_parameters = parse_parameters(self.custom_parameters).map_err(|e| {
            AppError::database(format!(
                "ICP {} has unreadable custom_parameters: {}",
                self.id, e
            ))
        })?;
        let color = self
            .color
            .as_deref()
            .and_then(parse_color)
            .unwrap_or_default();

        let created_at = self.created_at.unwrap_or_default();
        let updated_at = self.updated_at.unwrap_or_else(|| created_at.clone());
        // the modification column wins over the generic updated timestamp
        let date_modified = self
            .date_modified
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| updated_at.clone());

        Ok(Icp {
            id: self.id,
            name: self.name,
            description: self.description,
            custom_parameters,
            color,
            assistant: AssistantLink::from(self.assistant_id),
            system_prompt: self.system_prompt.unwrap_or_default(),
            owner_id: self.user_id.unwrap_or_default(),
            created_at,
            updated_at,
            date_modified,
        })
    }

    /// Parameters as JSON text, for `TEXT` columns
    pub fn custom_parameters_text(&self) -> String {
        match &self.custom_parameters {
            serde_json::Value::String(text) => text.clone(),
            serde_json::Value::Null => "[]".to_string(),
            other => other.to_string(),
        }
    }
}

fn parse_parameters(value: serde_json::Value) -> Result<Vec<CustomParameter>, serde_json::Error> {
    let params: Vec<CustomParameter> = match value {
        serde_json::Value::Null => Vec::new(),
        serde_json::Value::String(text) if text.trim().is_empty() => Vec::new(),
        serde_json::Value::String(text) => serde_json::from_str(&text)?,
        other => serde_json::from_value(other)?,
    };
    Ok(params.into_iter().map(CustomParameter::normalized).collect())
}

fn color_label(color: IcpColor) -> AppResult<String> {
    match serde_json::to_value(color)? {
        serde_json::Value::String(label) => Ok(label),
        other => Err(AppError::internal(format!("unexpected color encoding: {}", other))),
    }
}

fn parse_color(label: &str) -> Option<IcpColor> {
    serde_json::from_value(serde_json::Value::String(label.to_string())).ok()
}
