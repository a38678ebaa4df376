use serde::Serialize;
use crate::owners::domain::model::StoreOwnerEntity;

// StoreOwnerDto is the read projection joined onto books
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreOwnerDto {
    pub store_owner_id: i64,
    pub name: String,
}

impl From<&StoreOwnerEntity> for StoreOwnerDto {
    fn from(other: &StoreOwnerEntity) -> Self {
        Self {
            store_owner_id: other.store_owner_id,
            name: other.name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::owners::domain::model::StoreOwnerEntity;
    use crate::owners::dto::StoreOwnerDto;

    #[tokio::test]
    async fn test_should_build_from_entity() {
        let mut owner = StoreOwnerEntity::new("Corner Books");
        owner.store_owner_id = 3;
        let dto = StoreOwnerDto::from(&owner);
        assert_eq!(3, dto.store_owner_id);
        assert_eq!("Corner Books", dto.name.as_str());
    }
}
