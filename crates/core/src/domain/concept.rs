use serde::{Deserialize, Serialize};

use crate::errors::{DomainValueOrigin, GenerationError, RecordSlot};
use crate::vocabulary::{ConceptType, Field};

/// A validated concept. `field` and `concept_type` are closed enums, and `name`,
/// `quote` and `summary` are guaranteed non-blank.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConceptRecord {
    pub name: String,
    pub field: Field,
    #[serde(rename = "type")]
    pub concept_type: ConceptType,
    pub quote: String,
    pub summary: String,
    pub author: Option<String>,
    pub time: Option<String>,
}

/// The shape the backend is asked to produce, before any semantic check.
///
/// `field` and `type` stay as text here so an out-of-vocabulary value surfaces as
/// `InvalidDomainValue` rather than as a parse failure. `author` and `time` must be
/// scalar strings or null; anything structured fails the parse.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RawConceptRecord {
    pub name: String,
    pub field: String,
    #[serde(rename = "type")]
    pub concept_type: String,
    pub quote: String,
    pub summary: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
}

impl TryFrom<RawConceptRecord> for ConceptRecord {
    type Error = GenerationError;

    fn try_from(raw: RawConceptRecord) -> Result<Self, Self::Error> {
        let field = Field::parse(&raw.field).ok_or_else(|| GenerationError::InvalidDomainValue {
            origin: DomainValueOrigin::Response,
            slot: RecordSlot::Field,
            value: raw.field.clone(),
        })?;
        let concept_type = ConceptType::parse(&raw.concept_type).ok_or_else(|| {
            GenerationError::InvalidDomainValue {
                origin: DomainValueOrigin::Response,
                slot: RecordSlot::Type,
                value: raw.concept_type.clone(),
            }
        })?;

        Ok(Self {
            name: required_text(raw.name, RecordSlot::Name)?,
            field,
            concept_type,
            quote: required_text(raw.quote, RecordSlot::Quote)?,
            summary: required_text(raw.summary, RecordSlot::Summary)?,
            author: optional_text(raw.author),
            time: optional_text(raw.time),
        })
    }
}

fn required_text(value: String, slot: RecordSlot) -> Result<String, GenerationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::IncompleteRecord { slot });
    }
    Ok(trimmed.to_string())
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.map(|text| text.trim().to_string()).filter(|text| !text.is_empty())
}
