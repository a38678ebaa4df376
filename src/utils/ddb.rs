use std::collections::HashMap;
use std::str::FromStr;
use std::time::Duration;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::config::{Credentials, Region};
use aws_sdk_dynamodb::error::SdkError;
use aws_sdk_dynamodb::operation::delete_item::DeleteItemError;
use aws_sdk_dynamodb::operation::get_item::GetItemError;
use aws_sdk_dynamodb::operation::put_item::PutItemError;
use aws_sdk_dynamodb::operation::scan::ScanError;
use aws_sdk_dynamodb::operation::update_item::UpdateItemError;
use aws_sdk_dynamodb::primitives::Blob;
use aws_sdk_dynamodb::types::{AttributeDefinition, AttributeValue, KeySchemaElement, KeyType, ProvisionedThroughput, ReturnValue, ScalarAttributeType, TableStatus};
use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use crate::core::library::{LibraryError, LibraryResult};
use crate::core::repository::RepositoryStore;
use crate::utils::date::DATE_FMT;

pub(crate) const SCAN_PAGE_SIZE: i32 = 500;

pub(crate) async fn create_table(client: &Client, table_name: &str,
                                 pk: &str, pk_type: ScalarAttributeType) -> LibraryResult<()> {
    match client
        .create_table()
        .table_name(table_name)
        .key_schema(
            KeySchemaElement::builder()
                .attribute_name(pk)
                .key_type(KeyType::Hash)
                .build(),
        )
        .attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name(pk)
                .attribute_type(pk_type)
                .build(),
        )
        .provisioned_throughput(
            ProvisionedThroughput::builder()
                .read_capacity_units(10)
                .write_capacity_units(10)
                .build(),
        )
        .send()
        .await
    {
        Ok(_k) => {
            wait_until_table_status_is_not(client, table_name, TableStatus::Creating).await;
            Ok(())
        }
        Err(err) => {
            Err(LibraryError::database_or_unavailable(format!("failed to create {} table due to {}",
                                                              table_name, err).as_str(), None, false))
        }
    }
}

pub(crate) async fn delete_table(client: &Client, table_name: &str) -> LibraryResult<()> {
    match client.delete_table().table_name(table_name).send().await {
        Ok(_k) => {
            wait_until_table_status_is_not(client, table_name, TableStatus::Deleting).await;
            Ok(())
        }
        Err(err) => {
            Err(LibraryError::database_or_unavailable(format!("failed to delete {} table due to {}",
                                                              table_name, err).as_str(), None, false))
        }
    }
}

async fn wait_until_table_status_is_not(client: &Client, table_name: &str, other_status: TableStatus) {
    for _i in 0..30 {
        if let Ok(status) = describe_table(client, table_name).await {
            if status != other_status {
                return;
            }
        }
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}

async fn describe_table(client: &Client, table_name: &str) -> LibraryResult<TableStatus> {
    match client
        .describe_table()
        .table_name(table_name)
        .send()
        .await
    {
        Ok(out) => {
            if let Some(table) = out.table() {
                if let Some(status) = table.table_status() {
                    return Ok(status.clone());
                }
            }
            Err(LibraryError::runtime(format!("failed to describe {} table",
                                              table_name).as_str(), None))
        }
        Err(err) => {
            Err(LibraryError::database_or_unavailable(format!("failed to describe {} table due to {}",
                                                              table_name, err).as_str(), None, false))
        }
    }
}

// Hands out the next identifier of a named sequence. DynamoDB has no auto-increment keys, so
// every sequence is a single counter item bumped with an atomic ADD.
pub(crate) async fn next_id(client: &Client, counters_table: &str, counter_name: &str) -> LibraryResult<i64> {
    let out = client
        .update_item()
        .table_name(counters_table)
        .key("counter_name", AttributeValue::S(counter_name.to_string()))
        .update_expression("ADD next_id :one")
        .expression_attribute_values(":one", AttributeValue::N("1".to_string()))
        .return_values(ReturnValue::UpdatedNew)
        .send()
        .await?;
    out.attributes()
        .map(|map| parse_number_attribute("next_id", map))
        .filter(|id| *id > 0)
        .ok_or_else(|| LibraryError::runtime(
            format!("counter {} returned no identifier", counter_name).as_str(), None))
}

pub(crate) fn parse_string_attribute(name: &str, map: &HashMap<String, AttributeValue>) -> Option<String> {
    if let Some(AttributeValue::S(str)) = map.get(name) {
        return Some(str.clone());
    }
    None
}

pub(crate) fn parse_date_attribute(name: &str, map: &HashMap<String, AttributeValue>) -> Option<NaiveDateTime> {
    if let Some(AttributeValue::S(str)) = map.get(name) {
        // e.g. 2022-09-24T04:40:35.726029
        if let Ok(date) = NaiveDateTime::parse_from_str(str, DATE_FMT) {
            return Some(date);
        }
    }
    None
}

pub(crate) fn string_date(date: NaiveDateTime) -> AttributeValue {
    AttributeValue::S(format!("{}", date.format(DATE_FMT)))
}

pub(crate) fn parse_number_attribute(name: &str, map: &HashMap<String, AttributeValue>) -> i64 {
    if let Some(AttributeValue::N(str)) = map.get(name) {
        if let Ok(n) = str.parse::<i64>() {
            return n;
        }
    }
    0
}

pub(crate) fn parse_decimal_attribute(name: &str, map: &HashMap<String, AttributeValue>) -> Decimal {
    if let Some(AttributeValue::N(str)) = map.get(name) {
        if let Ok(n) = Decimal::from_str(str) {
            return n;
        }
    }
    Decimal::ZERO
}

pub(crate) fn parse_binary_attribute(name: &str, map: &HashMap<String, AttributeValue>) -> Option<Vec<u8>> {
    if let Some(AttributeValue::B(blob)) = map.get(name) {
        return Some(blob.as_ref().to_vec());
    }
    None
}

pub(crate) fn opt_string(value: Option<&String>) -> AttributeValue {
    match value {
        Some(str) => AttributeValue::S(str.to_string()),
        None => AttributeValue::Null(true),
    }
}

pub(crate) fn opt_binary(value: Option<&Vec<u8>>) -> AttributeValue {
    match value {
        Some(bytes) => AttributeValue::B(Blob::new(bytes.clone())),
        None => AttributeValue::Null(true),
    }
}

// helper method to build db-client
pub(crate) async fn build_db_client(store: RepositoryStore, local_endpoint: &str) -> Client {
    match store {
        RepositoryStore::DynamoDB => {
            //Get config from environment.
            let config = aws_config::load_from_env().await;
            //Create the DynamoDB client.
            Client::new(&config)
        }
        RepositoryStore::LocalDynamoDB => {
            // See https://docs.aws.amazon.com/sdk-for-rust/latest/dg/dynamodb-local.html
            let dynamodb_local_config = aws_sdk_dynamodb::Config::builder()
                .region(Region::new("local"))
                .credentials_provider(
                    Credentials::new("AKIDLOCALSTACK", "localstacksecret", None, None, "faked"))
                .endpoint_url(local_endpoint)
                .build();
            Client::from_conf(dynamodb_local_config)
        }
    }
}

// required to enable CloudWatch error logging by the runtime
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        // disable printing the name of the module in every log line.
        .with_target(false)
        // this needs to be set to false, otherwise ANSI color codes will
        // show up in a confusing manner in CloudWatch logs.
        .with_ansi(false)
        // disabling time is handy because CloudWatch will add the ingestion time.
        .without_time()
        .json()
        .init();
}

pub(crate) fn is_conditional_put_failure(err: &SdkError<PutItemError>) -> bool {
    matches!(err, SdkError::ServiceError(ctx) if ctx.err().is_conditional_check_failed_exception())
}

pub(crate) fn is_conditional_update_failure(err: &SdkError<UpdateItemError>) -> bool {
    matches!(err, SdkError::ServiceError(ctx) if ctx.err().is_conditional_check_failed_exception())
}

impl From<SdkError<UpdateItemError>> for LibraryError {
    fn from(err: SdkError<UpdateItemError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

impl From<SdkError<PutItemError>> for LibraryError {
    fn from(err: SdkError<PutItemError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

impl From<SdkError<GetItemError>> for LibraryError {
    fn from(err: SdkError<GetItemError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

impl From<SdkError<DeleteItemError>> for LibraryError {
    fn from(err: SdkError<DeleteItemError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

impl From<SdkError<ScanError>> for LibraryError {
    fn from(err: SdkError<ScanError>) -> Self {
        let (retryable, reason) = retryable_sdk_error(&err);
        LibraryError::database_or_unavailable(format!("{:?}", err).as_str(), reason, retryable)
    }
}

fn retryable_sdk_error<T>(err: &SdkError<T>) -> (bool, Option<String>) {
    match err {
        SdkError::ConstructionFailure(_) => { (false, Some("ConstructionFailure".to_string())) }
        SdkError::TimeoutError(_) => { (true, Some("TimeoutError".to_string())) }
        SdkError::DispatchFailure(_) => { (true, Some("DispatchFailure".to_string())) }
        SdkError::ResponseError { .. } => { (true, Some("ResponseError".to_string())) }
        SdkError::ServiceError(ctx) => {
            (ctx.raw().http().status().is_server_error() || has_exceeded_limit(ctx.raw().http().body().bytes()), Some(ctx.raw().http().status().to_string()))
        }
        _ => { (true, Some("Unknown".to_string())) }
    }
}

// throughput errors read "...exceeded..." in the body and are worth retrying
fn has_exceeded_limit(opts: Option<&[u8]>) -> bool {
    opts.map(|b| b.windows(6).any(|w| w == b"ceeded")).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use aws_sdk_dynamodb::primitives::Blob;
    use aws_sdk_dynamodb::types::AttributeValue;
    use chrono::NaiveDateTime;
    use rust_decimal::Decimal;
    use crate::utils::date::DATE_FMT;
    use crate::utils::ddb::{has_exceeded_limit, opt_binary, opt_string, parse_binary_attribute, parse_date_attribute, parse_decimal_attribute, parse_number_attribute, parse_string_attribute, string_date};

    #[tokio::test]
    async fn test_should_parse_attributes() {
        let date = NaiveDateTime::parse_from_str("2022-09-24T04:40:35.726029", DATE_FMT).expect("should parse date");
        let map = HashMap::from([
            ("title".to_string(), AttributeValue::S("Dune".to_string())),
            ("book_id".to_string(), AttributeValue::N("42".to_string())),
            ("price".to_string(), AttributeValue::N("9.99".to_string())),
            ("cover_image_data".to_string(), AttributeValue::B(Blob::new(vec![0x01, 0x02]))),
            ("created_at".to_string(), string_date(date)),
        ]);
        assert_eq!(Some("Dune".to_string()), parse_string_attribute("title", &map));
        assert_eq!(42, parse_number_attribute("book_id", &map));
        assert_eq!(Decimal::new(999, 2), parse_decimal_attribute("price", &map));
        assert_eq!(Some(vec![0x01, 0x02]), parse_binary_attribute("cover_image_data", &map));
        assert_eq!(Some(date), parse_date_attribute("created_at", &map));
    }

    #[tokio::test]
    async fn test_should_default_missing_attributes() {
        let map = HashMap::new();
        assert_eq!(None, parse_string_attribute("title", &map));
        assert_eq!(0, parse_number_attribute("book_id", &map));
        assert_eq!(Decimal::ZERO, parse_decimal_attribute("price", &map));
        assert_eq!(None, parse_binary_attribute("cover_image_data", &map));
        assert_eq!(None, parse_date_attribute("created_at", &map));
    }

    #[tokio::test]
    async fn test_should_build_optional_attributes() {
        assert_eq!(AttributeValue::Null(true), opt_string(None));
        assert_eq!(AttributeValue::S("url".to_string()), opt_string(Some(&"url".to_string())));
        assert_eq!(AttributeValue::Null(true), opt_binary(None));
        assert_eq!(AttributeValue::B(Blob::new(vec![7])), opt_binary(Some(&vec![7])));
    }

    #[tokio::test]
    async fn test_should_detect_exceeded_limit() {
        assert!(has_exceeded_limit(Some(b"ProvisionedThroughputExceededException: rate exceeded")));
        assert!(!has_exceeded_limit(Some(b"short")));
        assert!(!has_exceeded_limit(None));
    }
}
