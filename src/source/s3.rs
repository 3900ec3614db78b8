//! S3 bucket source: `ListObjectsV2`, one page per continuation token.

use std::future::Future;
use std::pin::Pin;

use aws_config::SdkConfig;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::types::Object;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::error::AppError;
use crate::record::{FieldValue, Record};
use crate::source::{PageSource, SourcePage};

/// Lists all objects of one bucket, optionally under a key prefix.
pub struct S3Source {
    client: Client,
    bucket: String,
    prefix: Option<String>,
}

impl S3Source {
    pub fn new(shared: &SdkConfig, bucket: String, prefix: Option<String>) -> Self {
        Self {
            client: Client::new(shared),
            bucket,
            prefix,
        }
    }
}

/// Projects one object to `{Key, LastModified, Size}`. An object without a
/// last-modified time gets an empty text cell rather than a fabricated one.
fn flatten_object(object: Object) -> Record {
    let mut record = Record::new();
    record.insert("Key", FieldValue::Text(object.key.unwrap_or_default()));

    let last_modified: Option<DateTime<Utc>> = object
        .last_modified
        .and_then(|dt| DateTime::from_timestamp(dt.secs(), dt.subsec_nanos()));
    record.insert(
        "LastModified",
        match last_modified {
            Some(ts) => FieldValue::Timestamp(ts),
            None => FieldValue::Text(String::new()),
        },
    );

    record.insert(
        "Size",
        FieldValue::Number(object.size.unwrap_or_default().into()),
    );

    record
}

impl PageSource for S3Source {
    type Cursor = String;

    fn fetch_page<'a>(
        &'a self,
        cursor: Option<&'a String>,
    ) -> Pin<Box<dyn Future<Output = Result<SourcePage<String>, AppError>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .set_prefix(self.prefix.clone())
                .set_continuation_token(cursor.cloned())
                .send()
                .await
                .map_err(|e| {
                    AppError::Transport(format!(
                        "S3 ListObjectsV2 failed: {}",
                        DisplayErrorContext(&e)
                    ))
                })?;

            let records: Vec<Record> = response
                .contents
                .unwrap_or_default()
                .into_iter()
                .map(flatten_object)
                .collect();

            info!("[S3] Page received: {} objects", records.len());

            // The continuation token is only honored while the response
            // reports truncation; a token on a final page must not loop.
            let next = if response.is_truncated.unwrap_or(false) {
                response.next_continuation_token
            } else {
                None
            };

            Ok(SourcePage { records, next })
        })
    }
}
