//! Configuration module
//!
//! Configuration is read from the process environment (and a `.env` file when present)
//! once at startup. Every value has a default except `DATABASE_URL`.

use std::env;
use std::path::PathBuf;

// Common constants
const SERVER_PORT: u16 = 3001;
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const MAX_UPLOAD_SIZE_MB: usize = 50;
const GENERATION_TIMEOUT_SECS: u64 = 300;
const GENERATION_MAX_CONCURRENCY: usize = 8;

const DEFAULT_UPLOAD_DIR: &str = "./uploads";
const DEFAULT_UPLOAD_FIELD_NAME: &str = "studyDocument";
const DEFAULT_OLLAMA_API_URL: &str = "http://localhost:11434/api/generate";
const DEFAULT_OLLAMA_MODEL: &str = "mistral";
const DEFAULT_ALLOWED_CONTENT_TYPES: &str = "application/pdf,application/msword,application/vnd.openxmlformats-officedocument.wordprocessingml.document,text/plain";
const DEFAULT_ALLOWED_EXTENSIONS: &str = "pdf,doc,docx,txt";

/// Server-level configuration
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    pub environment: String,
    pub log_format: String,
}

/// Study material pipeline configuration
#[derive(Clone, Debug)]
pub struct StudyConfig {
    pub base: BaseConfig,
    pub database_url: String,
    // Transient upload storage
    pub upload_dir: PathBuf,
    pub upload_field_name: String,
    pub max_upload_size_bytes: usize,
    pub allowed_content_types: Vec<String>,
    pub allowed_extensions: Vec<String>,
    // Generation service
    pub ollama_api_url: String,
    pub ollama_model: String,
    pub generation_timeout_secs: u64,
    pub generation_max_concurrency: usize,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<StudyConfig>);

impl Config {
    fn as_study(&self) -> &StudyConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_environment(&self.as_study().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = StudyConfig::from_lookup(|key| env::var(key).ok())?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_study().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.as_study().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_study().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_study().base.environment
    }

    pub fn log_format(&self) -> &str {
        &self.as_study().base.log_format
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_study().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_study().base.db_timeout_seconds
    }

    pub fn database_url(&self) -> &str {
        &self.as_study().database_url
    }

    pub fn upload_dir(&self) -> &std::path::Path {
        &self.as_study().upload_dir
    }

    pub fn upload_field_name(&self) -> &str {
        &self.as_study().upload_field_name
    }

    pub fn max_upload_size_bytes(&self) -> usize {
        self.as_study().max_upload_size_bytes
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.as_study().allowed_content_types
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.as_study().allowed_extensions
    }

    pub fn ollama_api_url(&self) -> &str {
        &self.as_study().ollama_api_url
    }

    pub fn ollama_model(&self) -> &str {
        &self.as_study().ollama_model
    }

    pub fn generation_timeout_secs(&self) -> u64 {
        self.as_study().generation_timeout_secs
    }

    pub fn generation_max_concurrency(&self) -> usize {
        self.as_study().generation_max_concurrency
    }
}

fn is_production_environment(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl StudyConfig {
    /// Build the configuration from a key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = lookup("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production_environment(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let base = BaseConfig {
            server_port: match lookup("PORT") {
                Some(port) => port
                    .parse()
                    .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
                None => SERVER_PORT,
            },
            cors_origins,
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: lookup("DB_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            environment,
            log_format: lookup("LOG_FORMAT")
                .map(|s| s.to_lowercase())
                .unwrap_or_else(|| "compact".to_string()),
        };

        let config = StudyConfig {
            base,
            database_url: lookup("DATABASE_URL")
                .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set"))?,
            upload_dir: PathBuf::from(
                lookup("UPLOAD_DIR").unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_string()),
            ),
            upload_field_name: lookup("UPLOAD_FIELD_NAME")
                .unwrap_or_else(|| DEFAULT_UPLOAD_FIELD_NAME.to_string()),
            max_upload_size_bytes: lookup("MAX_UPLOAD_SIZE_MB")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(MAX_UPLOAD_SIZE_MB)
                * 1024
                * 1024,
            allowed_content_types: split_list(
                &lookup("ALLOWED_CONTENT_TYPES")
                    .unwrap_or_else(|| DEFAULT_ALLOWED_CONTENT_TYPES.to_string()),
            ),
            allowed_extensions: split_list(
                &lookup("ALLOWED_EXTENSIONS")
                    .unwrap_or_else(|| DEFAULT_ALLOWED_EXTENSIONS.to_string()),
            )
            .into_iter()
            .map(|ext| ext.trim_start_matches('.').to_string())
            .collect(),
            ollama_api_url: lookup("OLLAMA_API_URL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_API_URL.to_string()),
            ollama_model: lookup("OLLAMA_MODEL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_MODEL.to_string()),
            generation_timeout_secs: lookup("GENERATION_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(GENERATION_TIMEOUT_SECS),
            generation_max_concurrency: lookup("GENERATION_MAX_CONCURRENCY")
                .and_then(|s| s.parse().ok())
                .unwrap_or(GENERATION_MAX_CONCURRENCY),
        };

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !(self.database_url.starts_with("postgres://")
            || self.database_url.starts_with("postgresql://"))
        {
            return Err(anyhow::anyhow!(
                "DATABASE_URL must be a valid PostgreSQL connection string"
            ));
        }

        let endpoint = url::Url::parse(&self.ollama_api_url)
            .map_err(|e| anyhow::anyhow!("OLLAMA_API_URL is not a valid URL: {}", e))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(anyhow::anyhow!("OLLAMA_API_URL must use http or https"));
        }

        if self.ollama_model.trim().is_empty() {
            return Err(anyhow::anyhow!("OLLAMA_MODEL must not be empty"));
        }

        if self.generation_timeout_secs == 0 {
            return Err(anyhow::anyhow!("GENERATION_TIMEOUT_SECS must be greater than 0"));
        }

        if self.generation_max_concurrency == 0 {
            return Err(anyhow::anyhow!(
                "GENERATION_MAX_CONCURRENCY must be greater than 0"
            ));
        }

        if self.upload_field_name.trim().is_empty() {
            return Err(anyhow::anyhow!("UPLOAD_FIELD_NAME must not be empty"));
        }

        if self.allowed_content_types.is_empty() && self.allowed_extensions.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_CONTENT_TYPES and ALLOWED_EXTENSIONS cannot both be empty"
            ));
        }

        if !matches!(self.base.log_format.as_str(), "compact" | "json") {
            return Err(anyhow::anyhow!("LOG_FORMAT must be 'compact' or 'json'"));
        }

        Ok(())
    }
}
