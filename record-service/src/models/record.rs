//! A record is any JSON object a caller posts. It is stored verbatim; the store
//! adds the `_id` field.

use mongodb::bson::{self, Bson, Document};
use serde_json::{Map, Value};
use service_core::error::AppError;

pub type Record = Map<String, Value>;

pub const ID_FIELD: &str = "_id";

/// Converts a caller's record into a BSON document without interpreting
/// extended-JSON keys.
pub fn to_document(record: &Record) -> Result<Document, AppError> {
    bson::to_document(record).map_err(|e| {
        AppError::BadRequest(anyhow::anyhow!("Record cannot be stored: {}", e))
    })
}

/// Renders a stored document as relaxed extended JSON, with an ObjectId
/// `_id` flattened to its hex string.
pub fn from_document(document: Document) -> Record {
    document
        .into_iter()
        .map(|(key, value)| {
            let value = if key == ID_FIELD {
                id_value(value)
            } else {
                value.into_relaxed_extjson()
            };
            (key, value)
        })
        .collect()
}

/// The identifier as returned to callers after an insert.
pub fn id_to_string(id: &Bson) -> String {
    match id {
        Bson::ObjectId(oid) => oid.to_hex(),
        Bson::String(s) => s.clone(),
        other => other.clone().into_relaxed_extjson().to_string(),
    }
}

fn id_value(id: Bson) -> Value {
    match id {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        other => other.into_relaxed_extjson(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{doc, oid::ObjectId};
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("not an object"),
        }
    }

    #[test]
    fn nested_values_survive_conversion() {
        let input = record(json!({
            "name": "test",
            "value": 1,
            "ratio": 0.5,
            "tags": ["a", "b"],
            "nested": { "flag": true, "missing": null }
        }));

        let document = to_document(&input).unwrap();
        assert_eq!(document.get_str("name").unwrap(), "test");
        assert_eq!(document.get_i64("value").unwrap(), 1);

        assert_eq!(from_document(document), input);
    }

    #[test]
    fn dollar_keys_are_kept_verbatim() {
        let input = record(json!({ "price": { "$oid": "not-an-object-id" } }));
        let document = to_document(&input).unwrap();
        let nested = document.get_document("price").unwrap();
        assert_eq!(nested.get_str("$oid").unwrap(), "not-an-object-id");
    }

    #[test]
    fn object_id_renders_as_hex() {
        let oid = ObjectId::new();
        let rendered = from_document(doc! { "_id": oid, "name": "test" });
        assert_eq!(rendered[ID_FIELD], json!(oid.to_hex()));
        assert_eq!(rendered["name"], json!("test"));
        assert_eq!(id_to_string(&Bson::ObjectId(oid)), oid.to_hex());
    }

    #[test]
    fn caller_supplied_ids_are_preserved() {
        assert_eq!(id_to_string(&Bson::String("abc".into())), "abc");
        assert_eq!(id_to_string(&Bson::Int32(7)), "7");

        let rendered = from_document(doc! { "_id": 7 });
        assert_eq!(rendered[ID_FIELD], json!(7));
    }

    #[test]
    fn out_of_range_integers_are_rejected() {
        let input = record(json!({ "big": u64::MAX }));
        let err = to_document(&input).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));
    }
}
