//! Run configuration for a migration export.
//!
//! The configuration is assumed pre-validated by the operator-facing tooling
//! that produced it; this crate never prompts and never performs credential
//! pre-flight checks. The secret access key is wrapped in
//! `secrecy::SecretString` so `Debug` output and logs cannot leak it, and it
//! is redacted when the configuration is persisted into the project directory.

use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;

/// File name the run configuration is persisted under inside the project dir.
pub const CONFIG_FILE_NAME: &str = "migration.config.json";

// ─────────────────────────────────────────────────────────────────────────────
// SourceKind
// ─────────────────────────────────────────────────────────────────────────────

/// The remote data source a run exports from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Cognito user pool, listed page by page.
    Cognito,
    /// S3 bucket, optionally restricted to a key prefix.
    S3,
    /// DynamoDB table, scanned page by page.
    DynamoDb,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Cognito => write!(f, "cognito"),
            SourceKind::S3 => write!(f, "s3"),
            SourceKind::DynamoDb => write!(f, "dynamodb"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MigrationConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration for one migration export run.
///
/// Exactly one of the variant identifiers is expected to be present,
/// matching `source`; the source dispatch reports `InvalidConfig` otherwise.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MigrationConfig {
    /// Project name; also the name of the output directory.
    pub project_name: String,
    /// Which remote source to export from.
    pub source: SourceKind,
    /// AWS region the source lives in.
    pub aws_region: String,
    /// AWS access key id.
    pub aws_access_key_id: String,
    /// AWS secret access key. Redacted on save and in `Debug` output.
    #[serde(
        serialize_with = "serialize_redacted",
        deserialize_with = "deserialize_secret"
    )]
    pub aws_secret_access_key: SecretString,
    /// Cognito user pool id (`source == cognito`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cognito_user_pool_id: Option<String>,
    /// S3 bucket name (`source == s3`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_bucket: Option<String>,
    /// Optional S3 key prefix (`source == s3`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3_prefix: Option<String>,
    /// DynamoDB table name (`source == dynamodb`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dynamo_table: Option<String>,
}

impl std::fmt::Debug for MigrationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationConfig")
            .field("project_name", &self.project_name)
            .field("source", &self.source)
            .field("aws_region", &self.aws_region)
            .field("aws_access_key_id", &self.aws_access_key_id)
            .field("aws_secret_access_key", &"[REDACTED]")
            .field("cognito_user_pool_id", &self.cognito_user_pool_id)
            .field("s3_bucket", &self.s3_bucket)
            .field("s3_prefix", &self.s3_prefix)
            .field("dynamo_table", &self.dynamo_table)
            .finish()
    }
}

fn serialize_redacted<S>(_secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str("[REDACTED]")
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: serde::Deserializer<'de>,
{
    String::deserialize(deserializer).map(SecretString::from)
}

impl MigrationConfig {
    /// Loads a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `AppError::InvalidConfig` if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, AppError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::InvalidConfig(format!("failed to read {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&raw).map_err(|e| {
            AppError::InvalidConfig(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Persists the configuration into the given directory as
    /// `migration.config.json`, with the secret access key redacted.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Filesystem` if the file cannot be written.
    pub fn save_into(&self, dir: &Path) -> Result<PathBuf, AppError> {
        let path = dir.join(CONFIG_FILE_NAME);

        let json = serde_json::to_string_pretty(self)
            .map_err(|e| AppError::Internal(format!("failed to serialize config: {}", e)))?;

        std::fs::write(&path, json).map_err(|e| {
            AppError::Filesystem(format!("failed to write {}: {}", path.display(), e))
        })?;

        info!("[CONFIG] Config file saved to {}", path.display());
        Ok(path)
    }

    /// The secret access key material, for building the AWS credentials
    /// provider. Never log the return value.
    pub fn secret_access_key(&self) -> &str {
        self.aws_secret_access_key.expose_secret()
    }
}
