use std::fmt;

use crate::vocabulary::{ConceptType, Field};

/// What the generated concept should be about.
///
/// Keywords come from the free-text search route and are passed to the backend as a
/// thematic seed without vocabulary validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Subject {
    Field(Field),
    Keyword(String),
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(field) => write!(f, "{field}"),
            Self::Keyword(keyword) => write!(f, "keyword:{keyword}"),
        }
    }
}

/// Approximate character count wanted for the `quote` text. Zero and negative
/// inputs collapse to "no constraint".
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LengthHint(Option<u32>);

impl LengthHint {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn from_raw(raw: Option<i64>) -> Self {
        match raw {
            Some(chars) if chars > 0 => Self(Some(u32::try_from(chars).unwrap_or(u32::MAX))),
            _ => Self(None),
        }
    }

    pub fn chars(&self) -> Option<u32> {
        self.0
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    pub subject: Subject,
    pub concept_type: ConceptType,
    pub length_hint: LengthHint,
}

impl GenerationRequest {
    pub fn new(subject: Subject, concept_type: ConceptType, length_hint: LengthHint) -> Self {
        Self { subject, concept_type, length_hint }
    }

    pub fn for_field(field: Field, concept_type: ConceptType) -> Self {
        Self::new(Subject::Field(field), concept_type, LengthHint::none())
    }

    pub fn requested_field(&self) -> Option<Field> {
        match self.subject {
            Subject::Field(field) => Some(field),
            Subject::Keyword(_) => None,
        }
    }
}
