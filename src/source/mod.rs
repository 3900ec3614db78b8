//! Record source adapters for the supported remote data sources.
//!
//! Every source variant is a [`PageSource`]: one page-fetch capability behind
//! a shared cursor-driven drain loop. Key properties:
//!
//! - **Single pagination loop** - `fetch_all` is implemented once and drives
//!   every variant; the loop terminates only on cursor exhaustion
//! - **Order preserving** - records accumulate in page order, within-page
//!   order intact; no deduplication or sorting
//! - **All-or-nothing** - any transport error aborts the whole fetch, the
//!   caller never receives a partial dataset

mod cognito;
mod dynamo;
mod s3;

use std::future::Future;
use std::pin::Pin;

use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::Credentials;
use tracing::info;

use crate::config::{MigrationConfig, SourceKind};
use crate::error::AppError;
use crate::record::Record;

pub use cognito::CognitoSource;
pub use dynamo::DynamoSource;
pub use s3::S3Source;

// ─────────────────────────────────────────────────────────────────────────────
// PageSource
// ─────────────────────────────────────────────────────────────────────────────

/// One page of flattened records plus the continuation marker for the next
/// request. An absent `next` means pagination is complete.
pub struct SourcePage<C> {
    pub records: Vec<Record>,
    pub next: Option<C>,
}

/// A paged remote record source.
///
/// The cursor is opaque to the drain loop and lives only between one response
/// and the next request. Implementations flatten their native items into
/// [`Record`]s; tests script fakes against this trait instead of a network.
pub trait PageSource: Send + Sync {
    type Cursor: Send + Sync;

    /// Fetches the page identified by `cursor` (`None` for the first page).
    fn fetch_page<'a>(
        &'a self,
        cursor: Option<&'a Self::Cursor>,
    ) -> Pin<Box<dyn Future<Output = Result<SourcePage<Self::Cursor>, AppError>> + Send + 'a>>;
}

/// Drains a source to exhaustion, returning all records in enumeration order.
///
/// Pages are fetched strictly sequentially; each request carries the cursor
/// extracted from the previous response and the loop has no iteration cap
/// other than cursor exhaustion.
///
/// # Errors
///
/// The first `AppError` from a page fetch aborts the drain; no partial
/// result is returned.
pub async fn fetch_all<S: PageSource>(source: &S) -> Result<Vec<Record>, AppError> {
    let mut records: Vec<Record> = Vec::new();
    let mut cursor: Option<S::Cursor> = None;
    let mut page_count: u32 = 0;

    loop {
        let page = source.fetch_page(cursor.as_ref()).await?;
        page_count += 1;
        records.extend(page.records);

        match page.next {
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    info!(
        "[SOURCE] Fetch complete: {} records across {} pages",
        records.len(),
        page_count
    );
    Ok(records)
}

// ─────────────────────────────────────────────────────────────────────────────
// Config dispatch
// ─────────────────────────────────────────────────────────────────────────────

/// Builds the shared AWS SDK config from the run's static credentials.
async fn aws_shared_config(config: &MigrationConfig) -> SdkConfig {
    let credentials = Credentials::new(
        config.aws_access_key_id.clone(),
        config.secret_access_key().to_string(),
        None,
        None,
        "migration-config",
    );

    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()))
        .credentials_provider(credentials)
        .load()
        .await
}

fn require(value: &Option<String>, what: &str, source: SourceKind) -> Result<String, AppError> {
    value.clone().ok_or_else(|| {
        AppError::InvalidConfig(format!("{} is required for the {} source", what, source))
    })
}

/// Fetches all records from the source variant selected by the config.
///
/// # Errors
///
/// - `AppError::InvalidConfig` - the variant's identifier is missing
/// - `AppError::Transport` - a page request failed; nothing is returned
pub async fn read_from_source(config: &MigrationConfig) -> Result<Vec<Record>, AppError> {
    info!("[SOURCE] Reading from {}...", config.source);
    let shared = aws_shared_config(config).await;

    match config.source {
        SourceKind::Cognito => {
            let user_pool_id = require(
                &config.cognito_user_pool_id,
                "cognitoUserPoolId",
                config.source,
            )?;
            fetch_all(&CognitoSource::new(&shared, user_pool_id)).await
        }
        SourceKind::S3 => {
            let bucket = require(&config.s3_bucket, "s3Bucket", config.source)?;
            fetch_all(&S3Source::new(&shared, bucket, config.s3_prefix.clone())).await
        }
        SourceKind::DynamoDb => {
            let table_name = require(&config.dynamo_table, "dynamoTable", config.source)?;
            fetch_all(&DynamoSource::new(&shared, table_name)).await
        }
    }
}
