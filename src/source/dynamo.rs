//! DynamoDB table source: `Scan`, one page per `LastEvaluatedKey`.

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use aws_config::SdkConfig;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::AttributeValue;
use aws_sdk_dynamodb::Client;
use tracing::info;

use crate::error::AppError;
use crate::record::{FieldValue, Record};
use crate::source::{PageSource, SourcePage};

/// Scans all items of one table.
pub struct DynamoSource {
    client: Client,
    table_name: String,
}

impl DynamoSource {
    pub fn new(shared: &SdkConfig, table_name: String) -> Self {
        Self {
            client: Client::new(shared),
            table_name,
        }
    }
}

/// Flattens one scanned item. Keys are sorted before insertion so every
/// record shares one deterministic column order; the item map's iteration
/// order varies per item and would otherwise scramble the derived header.
fn flatten_item(item: HashMap<String, AttributeValue>) -> Record {
    let mut pairs: Vec<(String, AttributeValue)> = item.into_iter().collect();
    pairs.sort_by(|a, b| a.0.cmp(&b.0));

    let mut record = Record::new();
    for (name, value) in pairs {
        record.insert(name, attribute_to_field(value));
    }
    record
}

/// Maps an attribute value to a tagged scalar. Scalars map directly;
/// sets, lists, and maps serialize to their JSON text form.
fn attribute_to_field(value: AttributeValue) -> FieldValue {
    match value {
        AttributeValue::S(s) => FieldValue::Text(s),
        AttributeValue::N(n) => match n.parse::<serde_json::Number>() {
            Ok(number) => FieldValue::Number(number),
            Err(_) => FieldValue::Text(n),
        },
        AttributeValue::Bool(b) => FieldValue::Text(b.to_string()),
        AttributeValue::Null(_) => FieldValue::Text(String::new()),
        other => FieldValue::Text(
            serde_json::to_string(&attribute_to_json(&other)).unwrap_or_default(),
        ),
    }
}

fn attribute_to_json(value: &AttributeValue) -> serde_json::Value {
    use serde_json::Value;

    match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => n
            .parse::<serde_json::Number>()
            .map(Value::Number)
            .unwrap_or_else(|_| Value::String(n.clone())),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::L(items) => Value::Array(items.iter().map(attribute_to_json).collect()),
        AttributeValue::M(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            Value::Object(
                keys.into_iter()
                    .map(|key| (key.clone(), attribute_to_json(&map[key])))
                    .collect(),
            )
        }
        AttributeValue::Ss(values) => {
            Value::Array(values.iter().cloned().map(Value::String).collect())
        }
        AttributeValue::Ns(values) => Value::Array(
            values
                .iter()
                .map(|n| {
                    n.parse::<serde_json::Number>()
                        .map(Value::Number)
                        .unwrap_or_else(|_| Value::String(n.clone()))
                })
                .collect(),
        ),
        _ => Value::String("<binary>".to_string()),
    }
}

impl PageSource for DynamoSource {
    type Cursor = HashMap<String, AttributeValue>;

    fn fetch_page<'a>(
        &'a self,
        cursor: Option<&'a Self::Cursor>,
    ) -> Pin<Box<dyn Future<Output = Result<SourcePage<Self::Cursor>, AppError>> + Send + 'a>>
    {
        Box::pin(async move {
            let response = self
                .client
                .scan()
                .table_name(&self.table_name)
                .set_exclusive_start_key(cursor.cloned())
                .send()
                .await
                .map_err(|e| {
                    AppError::Transport(format!(
                        "DynamoDB Scan failed: {}",
                        DisplayErrorContext(&e)
                    ))
                })?;

            let records: Vec<Record> = response
                .items
                .unwrap_or_default()
                .into_iter()
                .map(flatten_item)
                .collect();

            info!("[DYNAMODB] Page received: {} items", records.len());

            // An empty key map also means the scan is complete.
            let next = response.last_evaluated_key.filter(|key| !key.is_empty());

            Ok(SourcePage { records, next })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_sorts_keys_for_deterministic_order() {
        let mut item = HashMap::new();
        item.insert("zeta".to_string(), AttributeValue::S("z".into()));
        item.insert("alpha".to_string(), AttributeValue::S("a".into()));
        item.insert("mid".to_string(), AttributeValue::N("5".into()));

        let record = flatten_item(item);

        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(keys, vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn scalar_attributes_map_to_tagged_values() {
        assert_eq!(
            attribute_to_field(AttributeValue::S("hello".into())).to_csv_field(),
            "hello"
        );
        assert_eq!(
            attribute_to_field(AttributeValue::N("120".into())).to_csv_field(),
            "120"
        );
        assert_eq!(
            attribute_to_field(AttributeValue::N("1.5".into())).to_csv_field(),
            "1.5"
        );
        assert_eq!(
            attribute_to_field(AttributeValue::Bool(true)).to_csv_field(),
            "true"
        );
        assert_eq!(
            attribute_to_field(AttributeValue::Null(true)).to_csv_field(),
            ""
        );
    }

    #[test]
    fn unparseable_number_falls_back_to_text() {
        assert_eq!(
            attribute_to_field(AttributeValue::N("not-a-number".into())).to_csv_field(),
            "not-a-number"
        );
    }

    #[test]
    fn nested_attributes_serialize_to_json_text() {
        let mut inner = HashMap::new();
        inner.insert("b".to_string(), AttributeValue::N("2".into()));
        inner.insert("a".to_string(), AttributeValue::S("x".into()));

        let field = attribute_to_field(AttributeValue::M(inner));

        assert_eq!(field.to_csv_field(), r#"{"a":"x","b":2}"#);
    }

    #[test]
    fn string_set_serializes_to_json_array() {
        let field =
            attribute_to_field(AttributeValue::Ss(vec!["a".to_string(), "b".to_string()]));
        assert_eq!(field.to_csv_field(), r#"["a","b"]"#);
    }
}
