//! Persistence adapter: one of three interchangeable backends.
//!
//! Persistence failure never invalidates an already-generated quiz; callers
//! attempt at most one save and treat errors as non-fatal.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use reqwest::Client;
use serde_json::json;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::error::PersistError;
use crate::quiz::{Quiz, StoredQuizRecord};

/// Which durable backend to write through.
#[derive(Debug, Clone)]
pub enum Backend {
    /// Supabase REST: one row per quiz in the `quizzes` table.
    Supabase { url: String, key: String },
    /// GitHub contents API: one JSON file per quiz under `path`.
    GitHub {
        token: String,
        owner: String,
        repo: String,
        path: String,
    },
    /// No persistence configured; saves fail with `NotConfigured`.
    Disabled,
}

#[derive(Debug, Clone)]
pub struct QuizStore {
    backend: Backend,
    client: Client,
}

impl QuizStore {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            client: Client::new(),
        }
    }

    pub fn disabled() -> Self {
        Self::new(Backend::Disabled)
    }

    pub fn is_configured(&self) -> bool {
        !matches!(self.backend, Backend::Disabled)
    }

    /// Human-readable backend name for diagnostics.
    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            Backend::Supabase { .. } => "supabase",
            Backend::GitHub { .. } => "github",
            Backend::Disabled => "disabled",
        }
    }

    /// Persist one quiz. The record id is assigned here so it is known to the
    /// caller whichever backend answered.
    #[instrument(target = "dquest::store", skip(self, quiz), fields(backend = self.backend_name(), topic))]
    pub async fn save(&self, topic: &str, quiz: &Quiz) -> Result<StoredQuizRecord, PersistError> {
        let record = StoredQuizRecord::new(Uuid::new_v4().to_string(), topic, quiz.clone());
        match &self.backend {
            Backend::Supabase { url, key } => self.save_supabase(url, key, &record).await?,
            Backend::GitHub {
                token,
                owner,
                repo,
                path,
            } => self.save_github(token, owner, repo, path, &record).await?,
            Backend::Disabled => return Err(PersistError::NotConfigured),
        }
        info!(target: "dquest::store", id = %record.id, "quiz persisted");
        Ok(record)
    }

    async fn save_supabase(
        &self,
        url: &str,
        key: &str,
        record: &StoredQuizRecord,
    ) -> Result<(), PersistError> {
        let row = json!({
            "id": record.id,
            "topic": record.topic,
            "content": record.content,
            "created_at": record.created_at,
        });

        let response = self
            .client
            .post(format!("{url}/rest/v1/quizzes"))
            .header("apikey", key)
            .header("Authorization", format!("Bearer {key}"))
            .header("Content-Type", "application/json")
            .json(&row)
            .send()
            .await
            .map_err(|e| PersistError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!(target: "dquest::store", status, body = %body, "Supabase write rejected");
            return Err(PersistError::Backend { status, body });
        }
        Ok(())
    }

    async fn save_github(
        &self,
        token: &str,
        owner: &str,
        repo: &str,
        path: &str,
        record: &StoredQuizRecord,
    ) -> Result<(), PersistError> {
        let content = serde_json::to_vec_pretty(&record.content)
            .map_err(|e| PersistError::Http(e.to_string()))?;
        let body = json!({
            "message": format!("Add quiz: {}", record.content.title),
            "content": BASE64.encode(content),
        });

        let response = self
            .client
            .put(format!(
                "https://api.github.com/repos/{owner}/{repo}/contents/{path}/{}.json",
                record.id
            ))
            .header("Authorization", format!("Bearer {token}"))
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", concat!("dquest/", env!("CARGO_PKG_VERSION")))
            .json(&body)
            .send()
            .await
            .map_err(|e| PersistError::Http(e.to_string()))?;

        match response.status().as_u16() {
            // Distinguished for error messaging only.
            404 => Err(PersistError::NotFound),
            401 | 403 => Err(PersistError::Auth),
            status if !response.status().is_success() => {
                let body = response.text().await.unwrap_or_default();
                error!(target: "dquest::store", status, body = %body, "GitHub write rejected");
                Err(PersistError::Backend { status, body })
            }
            _ => Ok(()),
        }
    }

    /// Server-side search: `topic` contains `query`, newest first. Supabase only.
    #[instrument(target = "dquest::store", skip(self))]
    pub async fn search_remote(&self, query: &str) -> Result<Vec<StoredQuizRecord>, PersistError> {
        self.query_rows(&[
            ("select", "*".to_string()),
            ("topic", format!("ilike.*{query}*")),
            ("order", "created_at.desc".to_string()),
        ])
        .await
    }

    /// All persisted rows, newest first. Supabase only.
    pub async fn list_remote(&self) -> Result<Vec<StoredQuizRecord>, PersistError> {
        self.query_rows(&[
            ("select", "*".to_string()),
            ("order", "created_at.desc".to_string()),
        ])
        .await
    }

    async fn query_rows(
        &self,
        params: &[(&str, String)],
    ) -> Result<Vec<StoredQuizRecord>, PersistError> {
        let Backend::Supabase { url, key } = &self.backend else {
            return Err(PersistError::NotConfigured);
        };

        let response = self
            .client
            .get(format!("{url}/rest/v1/quizzes"))
            .query(params)
            .header("apikey", key)
            .header("Authorization", format!("Bearer {key}"))
            .send()
            .await
            .map_err(|e| PersistError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(PersistError::Backend { status, body });
        }

        let rows: Vec<StoredQuizRecord> = response
            .json()
            .await
            .map_err(|e| PersistError::Http(e.to_string()))?;
        debug!(target: "dquest::store", rows = rows.len(), "fetched rows");
        Ok(rows)
    }

    /// Fetch a persisted quiz row by id. Supabase only; the GitHub backend is a
    /// write-only legacy path.
    #[instrument(target = "dquest::store", skip(self))]
    pub async fn fetch_by_id(&self, id: &str) -> Result<StoredQuizRecord, PersistError> {
        let mut rows = self
            .query_rows(&[("select", "*".to_string()), ("id", format!("eq.{id}"))])
            .await?;
        if rows.is_empty() {
            return Err(PersistError::MissingRecord(id.to_string()));
        }
        Ok(rows.remove(0))
    }
}
