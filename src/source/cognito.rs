//! Cognito user pool source: `ListUsers`, one page per `PaginationToken`.

use std::future::Future;
use std::pin::Pin;

use aws_config::SdkConfig;
use aws_sdk_cognitoidentityprovider::error::DisplayErrorContext;
use aws_sdk_cognitoidentityprovider::types::UserType;
use aws_sdk_cognitoidentityprovider::Client;
use tracing::info;

use crate::error::AppError;
use crate::record::{FieldValue, Record};
use crate::source::{PageSource, SourcePage};

/// Lists all users of one user pool.
pub struct CognitoSource {
    client: Client,
    user_pool_id: String,
}

impl CognitoSource {
    pub fn new(shared: &SdkConfig, user_pool_id: String) -> Self {
        Self {
            client: Client::new(shared),
            user_pool_id,
        }
    }
}

/// Merges the fixed identity field with the user's dynamic attribute pairs
/// into one flat record: `Username` first, then each attribute under its own
/// name, in wire order.
fn flatten_user(user: UserType) -> Record {
    let mut record = Record::new();
    record.insert(
        "Username",
        FieldValue::Text(user.username.unwrap_or_default()),
    );

    for attribute in user.attributes.unwrap_or_default() {
        record.insert(
            attribute.name,
            FieldValue::Text(attribute.value.unwrap_or_default()),
        );
    }

    record
}

impl PageSource for CognitoSource {
    type Cursor = String;

    fn fetch_page<'a>(
        &'a self,
        cursor: Option<&'a String>,
    ) -> Pin<Box<dyn Future<Output = Result<SourcePage<String>, AppError>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .list_users()
                .user_pool_id(&self.user_pool_id)
                .set_pagination_token(cursor.cloned())
                .send()
                .await
                .map_err(|e| {
                    AppError::Transport(format!(
                        "Cognito ListUsers failed: {}",
                        DisplayErrorContext(&e)
                    ))
                })?;

            let records: Vec<Record> = response
                .users
                .unwrap_or_default()
                .into_iter()
                .map(flatten_user)
                .collect();

            info!("[COGNITO] Page received: {} users", records.len());

            Ok(SourcePage {
                records,
                next: response.pagination_token,
            })
        })
    }
}
