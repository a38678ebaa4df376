pub const DATE_FMT: &str = "%Y-%m-%dT%H:%M:%S%.f";

pub mod serializer {
    use chrono::NaiveDateTime;
    use serde::{Serialize, Serializer};
    use crate::utils::date::DATE_FMT;

    pub fn serialize<S: Serializer>(time: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        time.format(DATE_FMT).to_string().serialize(serializer)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDateTime;
    use serde::Serialize;
    use crate::utils::date::{serializer, DATE_FMT};

    #[derive(Debug, PartialEq, Serialize)]
    struct Stamped {
        #[serde(with = "serializer")]
        at: NaiveDateTime,
    }

    #[tokio::test]
    async fn test_should_serialize_with_date_format() {
        let at = NaiveDateTime::parse_from_str("2022-09-24T04:40:35.726029", DATE_FMT).expect("should parse date");
        let json = serde_json::to_string(&Stamped { at }).expect("should serialize");
        assert_eq!(r#"{"at":"2022-09-24T04:40:35.726029"}"#, json);
    }
}
