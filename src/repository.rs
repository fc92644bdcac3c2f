//! Client-side quiz aggregation and search.
//!
//! Quizzes come from three places: a directory of static JSON files, a
//! session-local cache of ephemeral AI results, and the remote database. Remote
//! failures degrade to local-only results rather than failing the whole search.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use tracing::{debug, instrument, warn};

use crate::quiz::{Quiz, StoredQuizRecord};
use crate::store::QuizStore;

/// Timestamp attached to local static files, which carry no real creation time.
fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

#[derive(Debug)]
pub struct QuizRepository {
    quizzes_dir: Option<PathBuf>,
    store: QuizStore,
    /// Ephemeral AI results, keyed by generated id. Session-local only.
    session: HashMap<String, StoredQuizRecord>,
}

impl QuizRepository {
    pub fn new(quizzes_dir: Option<PathBuf>, store: QuizStore) -> Self {
        Self {
            quizzes_dir,
            store,
            session: HashMap::new(),
        }
    }

    pub fn store(&self) -> &QuizStore {
        &self.store
    }

    /// Cache an ephemeral record (generated but not yet, or never, persisted).
    pub fn remember(&mut self, record: StoredQuizRecord) {
        self.session.insert(record.id.clone(), record);
    }

    /// Look up a quiz by id across the session cache and remote rows.
    pub async fn get(&self, id: &str) -> Option<StoredQuizRecord> {
        if let Some(record) = self.session.get(id) {
            return Some(record.clone());
        }
        self.store.fetch_by_id(id).await.ok()
    }

    /// Everything we know about: local files, session cache, remote rows.
    #[instrument(target = "dquest::repository", skip(self))]
    pub async fn list(&self) -> Vec<StoredQuizRecord> {
        let mut results = self.local_quizzes();
        results.extend(self.session.values().cloned());
        match self.store.list_remote().await {
            Ok(rows) => results.extend(rows),
            Err(e) => warn!(target: "dquest::repository", error = %e, "remote listing unavailable"),
        }
        results
    }

    /// Case-insensitive substring match against titles (local and cached) plus a
    /// server-side contains filter (remote). Near-duplicate topics may miss and
    /// regenerate.
    #[instrument(target = "dquest::repository", skip(self))]
    pub async fn search(&self, query: &str) -> Vec<StoredQuizRecord> {
        let needle = query.to_lowercase();
        let mut results: Vec<StoredQuizRecord> = self
            .local_quizzes()
            .into_iter()
            .filter(|r| r.content.title.to_lowercase().contains(&needle))
            .collect();
        results.extend(
            self.session
                .values()
                .filter(|r| r.content.title.to_lowercase().contains(&needle))
                .cloned(),
        );
        match self.store.search_remote(query).await {
            Ok(rows) => results.extend(rows),
            Err(e) => warn!(target: "dquest::repository", error = %e, "remote search unavailable"),
        }
        debug!(target: "dquest::repository", hits = results.len(), "search complete");
        results
    }

    /// Static quiz files shipped alongside the app. Unreadable files are skipped
    /// with a warning; a missing directory just means no local quizzes.
    fn local_quizzes(&self) -> Vec<StoredQuizRecord> {
        let Some(dir) = &self.quizzes_dir else {
            return Vec::new();
        };
        let entries = match fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(target: "dquest::repository", dir = %dir.display(), error = %e, "quizzes dir unreadable");
                return Vec::new();
            }
        };

        let mut quizzes = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let raw = match fs::read_to_string(&path) {
                Ok(raw) => raw,
                Err(e) => {
                    warn!(target: "dquest::repository", file = %path.display(), error = %e, "skipping unreadable quiz file");
                    continue;
                }
            };
            match serde_json::from_str::<Quiz>(&raw) {
                Ok(quiz) => {
                    let id = quiz.id.clone().unwrap_or_else(|| {
                        path.file_stem()
                            .map(|s| s.to_string_lossy().into_owned())
                            .unwrap_or_else(|| "local".to_string())
                    });
                    let topic = quiz.title.clone();
                    quizzes.push(StoredQuizRecord {
                        id,
                        topic,
                        content: quiz,
                        created_at: epoch(),
                    });
                }
                Err(e) => {
                    warn!(target: "dquest::repository", file = %path.display(), error = %e, "skipping malformed quiz file");
                }
            }
        }
        quizzes
    }
}
