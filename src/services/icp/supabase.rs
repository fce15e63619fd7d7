//! Supabase ICP Store
//!
//! `IcpRowStore` over the PostgREST API Supabase exposes for the `icps`
//! table (`/rest/v1/icps`).

use async_trait::async_trait;
use serde::Serialize;

use super::row::IcpRow;
use super::store::IcpRowStore;
use crate::utils::error::{AppError, AppResult};
use prospectiq_core::ProxyConfig;
use prospectiq_llm::build_http_client;

const TABLE_PATH: &str = "rest/v1/icps";

/// Columns written by an update; id, owner and creation time are immutable
#[derive(Serialize)]
struct IcpRowPatch<'a> {
    name: &'a str,
    description: &'a str,
    custom_parameters: &'a serde_json::Value,
    color: &'a Option<String>,
    assistant_id: &'a Option<String>,
    system_prompt: &'a Option<String>,
    updated_at: &'a Option<String>,
    date_modified: &'a Option<String>,
}

impl<'a> From<&'a IcpRow> for IcpRowPatch<'a> {
    fn from(row: &'a IcpRow) -> Self {
        Self {
            name: &row.name,
            description: &row.description,
            custom_parameters: &row.custom_parameters,
            color: &row.color,
            assistant_id: &row.assistant_id,
            system_prompt: &row.system_prompt,
            updated_at: &row.updated_at,
            date_modified: &row.date_modified,
        }
    }
}

pub struct SupabaseIcpStore {
    table_url: String,
    anon_key: String,
    client: reqwest::Client,
}

impl SupabaseIcpStore {
    pub fn new(
        project_url: &str,
        anon_key: impl Into<String>,
        proxy: Option<&ProxyConfig>,
    ) -> AppResult<Self> {
        let base = url::Url::parse(project_url)
            .map_err(|e| AppError::config(format!("Invalid Supabase URL {}: {}", project_url, e)))?;
        let table_url = format!("{}/{}", base.as_str().trim_end_matches('/'), TABLE_PATH);
        let client = build_http_client(proxy)?;

        Ok(Self {
            table_url,
            anon_key: anon_key.into(),
            client,
        })
    }

    fn request(&self, method: reqwest::Method) -> reqwest::RequestBuilder {
        self.client
            .request(method, &self.table_url)
            .header("apikey", &self.anon_key)
            .header("Authorization", format!("Bearer {}", self.anon_key))
    }

    /// Send and decode a JSON array of rows
    async fn rows(&self, request: reqwest::RequestBuilder) -> AppResult<Vec<IcpRow>> {
        let response = request
            .send()
            .await
            .map_err(|e| AppError::http(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::http(e.to_string()))?;

        if !status.is_success() {
            return Err(AppError::remote(status.as_u16(), error_message(&body)));
        }
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&body)?)
    }
}

/// PostgREST error bodies carry a `message` field
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

fn eq(value: &str) -> String {
    format!("eq.{}", value)
}

#[async_trait]
impl IcpRowStore for SupabaseIcpStore {
    fn backend(&self) -> &'static str {
        "supabase"
    }

    async fn list(&self, user_id: &str) -> AppResult<Vec<IcpRow>> {
        let request = self.request(reqwest::Method::GET).query(&[
            ("select", "*".to_string()),
            ("user_id", eq(user_id)),
            ("order", "created_at.desc".to_string()),
        ]);
        self.rows(request).await
    }

    async fn get(&self, id: &str) -> AppResult<Option<IcpRow>> {
        let request = self
            .request(reqwest::Method::GET)
            .query(&[("select", "*".to_string()), ("id", eq(id))]);
        Ok(self.rows(request).await?.into_iter().next())
    }

    async fn insert(&self, row: IcpRow) -> AppResult<IcpRow> {
        let request = self
            .request(reqwest::Method::POST)
            .header("Prefer", "return=representation")
            .json(&row);
        self.rows(request)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| AppError::database(format!("Insert of ICP {} returned no row", row.id)))
    }

    async fn update(&self, row: IcpRow) -> AppResult<Option<IcpRow>> {
        let request = self
            .request(reqwest::Method::PATCH)
            .query(&[("id", eq(&row.id))])
            .header("Prefer", "return=representation")
            .json(&IcpRowPatch::from(&row));
        Ok(self.rows(request).await?.into_iter().next())
    }

    async fn delete(&self, id: &str) -> AppResult<bool> {
        let request = self
            .request(reqwest::Method::DELETE)
            .query(&[("id", eq(id))])
            .header("Prefer", "return=representation");
        Ok(!self.rows(request).await?.is_empty())
    }
}
