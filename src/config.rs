//! Runtime configuration.
//!
//! Credentials come exclusively from the environment (optionally via a `.env`
//! file loaded with dotenvy), never from source.

use std::env;
use std::path::PathBuf;

use tracing::info;

use crate::clients::cerebras::API_KEY_ENV;
use crate::store::Backend;

pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
pub const SUPABASE_KEY_ENV: &str = "SUPABASE_KEY";
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";
pub const GITHUB_REPO_ENV: &str = "GITHUB_REPO";
pub const QUIZZES_DIR_ENV: &str = "DQUEST_QUIZZES_DIR";
pub const MODEL_ENV: &str = "CEREBRAS_MODEL";

/// Read an environment variable, treating blank values as absent.
pub fn env_trimmed(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Completion provider key. Absent means generation fails with a config error.
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub quizzes_dir: Option<PathBuf>,
    pub backend: Backend,
}

impl Config {
    /// Load configuration from the environment, after a best-effort `.env` load.
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();

        let backend = if let (Some(url), Some(key)) =
            (env_trimmed(SUPABASE_URL_ENV), env_trimmed(SUPABASE_KEY_ENV))
        {
            Backend::Supabase { url, key }
        } else if let (Some(token), Some(repo)) =
            (env_trimmed(GITHUB_TOKEN_ENV), env_trimmed(GITHUB_REPO_ENV))
        {
            match repo.split_once('/') {
                Some((owner, repo)) => Backend::GitHub {
                    token,
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                    path: "quizzes".to_string(),
                },
                None => {
                    info!("{GITHUB_REPO_ENV} is not in owner/repo form, persistence disabled");
                    Backend::Disabled
                }
            }
        } else {
            Backend::Disabled
        };

        Self {
            api_key: env_trimmed(API_KEY_ENV),
            model: env_trimmed(MODEL_ENV),
            quizzes_dir: env_trimmed(QUIZZES_DIR_ENV).map(PathBuf::from),
            backend,
        }
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn api_key_length(&self) -> usize {
        self.api_key.as_deref().map(str::len).unwrap_or(0)
    }
}
