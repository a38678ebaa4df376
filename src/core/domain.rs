use serde::{Deserialize, Serialize};

// Identifiable defines common traits that can be shared by persistent objects
pub trait Identifiable: Sync + Send {
    fn id(&self) -> i64;
    fn version(&self) -> i64;
}

const DEFAULT_MAX_COVER_IMAGE_BYTES: u64 = 4 * 1024 * 1024;

// Configuration abstracts config options for the bookstore catalog
#[derive(Debug, PartialEq, Serialize, Deserialize, Clone)]
pub struct Configuration {
    pub books_table: String,
    pub owners_table: String,
    pub counters_table: String,
    pub local_endpoint: String,
    pub max_cover_image_bytes: u64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self::new()
    }
}

impl Configuration {
    pub fn new() -> Self {
        Configuration {
            books_table: "books".to_string(),
            owners_table: "store_owners".to_string(),
            counters_table: "counters".to_string(),
            local_endpoint: "http://localhost:8000".to_string(),
            max_cover_image_bytes: DEFAULT_MAX_COVER_IMAGE_BYTES,
        }
    }
}
