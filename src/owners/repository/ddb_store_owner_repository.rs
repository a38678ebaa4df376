use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use chrono::Utc;

use crate::core::library::{LibraryError, LibraryResult};
use crate::owners::domain::model::StoreOwnerEntity;
use crate::owners::repository::StoreOwnerRepository;
use crate::utils::ddb::{is_conditional_put_failure, next_id, parse_date_attribute, parse_number_attribute, parse_string_attribute, string_date, SCAN_PAGE_SIZE};

#[derive(Debug)]
pub struct DDBStoreOwnerRepository {
    client: Client,
    table_name: String,
    counters_table: String,
}

impl DDBStoreOwnerRepository {
    pub(crate) fn new(client: Client, table_name: &str, counters_table: &str) -> Self {
        Self {
            client,
            table_name: table_name.to_string(),
            counters_table: counters_table.to_string(),
        }
    }

    async fn scan_all(&self, projection: Option<&str>) -> LibraryResult<Vec<StoreOwnerEntity>> {
        let table_name: &str = self.table_name.as_ref();
        let mut records = vec![];
        let mut exclusive_start_key = None;
        loop {
            let out = self.client
                .scan()
                .table_name(table_name)
                .set_projection_expression(projection.map(str::to_string))
                .consistent_read(true)
                .set_exclusive_start_key(exclusive_start_key)
                .limit(SCAN_PAGE_SIZE)
                .send()
                .await?;
            if let Some(items) = out.items() {
                records.extend(items.iter().map(map_to_store_owner));
            }
            exclusive_start_key = out.last_evaluated_key().cloned();
            if exclusive_start_key.is_none() {
                return Ok(records);
            }
        }
    }

    // registers an owner and returns the identifier assigned by the counter
    pub async fn create(&self, entity: &StoreOwnerEntity) -> LibraryResult<i64> {
        let table_name: &str = self.table_name.as_ref();
        let store_owner_id = next_id(&self.client, self.counters_table.as_str(), table_name).await?;
        match self.client
            .put_item()
            .table_name(table_name)
            .item("store_owner_id", AttributeValue::N(store_owner_id.to_string()))
            .item("version", AttributeValue::N("0".to_string()))
            .item("name", AttributeValue::S(entity.name.to_string()))
            .item("created_at", string_date(entity.created_at))
            .item("updated_at", string_date(entity.updated_at))
            .condition_expression("attribute_not_exists(store_owner_id)")
            .send()
            .await {
            Ok(_) => Ok(store_owner_id),
            Err(err) if is_conditional_put_failure(&err) => {
                Err(LibraryError::duplicate_key(format!("store owner {} already exists", store_owner_id).as_str()))
            }
            Err(err) => Err(LibraryError::from(err)),
        }
    }
}

#[async_trait]
impl StoreOwnerRepository for DDBStoreOwnerRepository {
    async fn find(&self, id: i64) -> LibraryResult<Option<StoreOwnerEntity>> {
        let table_name: &str = self.table_name.as_ref();
        let out = self.client
            .get_item()
            .table_name(table_name)
            .key("store_owner_id", AttributeValue::N(id.to_string()))
            .consistent_read(true)
            .send()
            .await?;
        Ok(out.item().map(map_to_store_owner))
    }

    async fn find_all(&self) -> LibraryResult<Vec<StoreOwnerEntity>> {
        let mut owners = self.scan_all(None).await?;
        owners.sort_by_key(|owner| owner.store_owner_id);
        Ok(owners)
    }

    async fn find_ids(&self) -> LibraryResult<Vec<i64>> {
        let mut ids: Vec<i64> = self.scan_all(Some("store_owner_id")).await?
            .iter().map(|owner| owner.store_owner_id).collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

fn map_to_store_owner(map: &HashMap<String, AttributeValue>) -> StoreOwnerEntity {
    StoreOwnerEntity {
        store_owner_id: parse_number_attribute("store_owner_id", map),
        version: parse_number_attribute("version", map),
        name: parse_string_attribute("name", map).unwrap_or_default(),
        created_at: parse_date_attribute("created_at", map).unwrap_or(Utc::now().naive_utc()),
        updated_at: parse_date_attribute("updated_at", map).unwrap_or(Utc::now().naive_utc()),
    }
}
