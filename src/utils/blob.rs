// Cover images travel through JSON as standard base64 strings.
pub mod serializer {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Serialize, Serializer};

    pub fn serialize<S: Serializer>(data: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
        data.as_ref().map(|bytes| STANDARD.encode(bytes)).serialize(serializer)
    }
}
