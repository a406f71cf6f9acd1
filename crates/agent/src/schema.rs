use maxim_core::vocabulary::{list_fields, list_types};
use serde_json::{json, Value};

pub const SCHEMA_NAME: &str = "ConceptRecord";

/// JSON Schema for the backend's `response_format`. The `field` and `type` enums are
/// read from the vocabulary tables, so they cannot drift from local validation.
pub fn concept_record_schema() -> Value {
    json!({
        "title": SCHEMA_NAME,
        "type": "object",
        "properties": {
            "name": {
                "type": "string",
                "description": "The name of the concept, law, effect, or theory."
            },
            "field": {
                "type": "string",
                "enum": list_fields(),
                "description": "The academic domain (must be one of the supported fields)."
            },
            "type": {
                "type": "string",
                "enum": list_types(),
                "description": "The classification of the entry."
            },
            "quote": {
                "type": "string",
                "description": "The actual quote, statement, or law text."
            },
            "summary": {
                "type": "string",
                "description": "A 1-3 sentence explanation of the statement."
            },
            "author": {
                "type": ["string", "null"],
                "description": "The person who proposed or inspired it, if known."
            },
            "time": {
                "type": ["string", "null"],
                "description": "Year or era when it was introduced."
            }
        },
        "required": ["name", "field", "type", "quote", "summary"],
        "additionalProperties": false
    })
}
