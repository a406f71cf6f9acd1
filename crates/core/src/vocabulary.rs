//! Closed vocabularies for the `field` and `type` slots of a concept record.
//!
//! `Field::ALL` and `ConceptType::ALL` are the only tables of legal values. Request
//! validation, response validation, the prompt text and the response schema all read
//! from them, so adding or removing a value is a single edit here.
//!
//! Matching is case-sensitive and exact: `"Physics"` is not a field.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::VocabularyError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Psychology,
    Physics,
    Chemistry,
    Mathematics,
    Philosophy,
    Inspirational,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Self::Psychology,
        Self::Physics,
        Self::Chemistry,
        Self::Mathematics,
        Self::Philosophy,
        Self::Inspirational,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Psychology => "psychology",
            Self::Physics => "physics",
            Self::Chemistry => "chemistry",
            Self::Mathematics => "mathematics",
            Self::Philosophy => "philosophy",
            Self::Inspirational => "inspirational",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|field| field.as_str() == raw)
    }

    /// Uniform pick, drawn by the caller for every request that omits a field.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = VocabularyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| VocabularyError::UnsupportedField(value.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConceptType {
    Effect,
    Principle,
    Theory,
    Phenomenon,
    Quote,
    Syndrome,
}

impl ConceptType {
    pub const ALL: [ConceptType; 6] = [
        Self::Effect,
        Self::Principle,
        Self::Theory,
        Self::Phenomenon,
        Self::Quote,
        Self::Syndrome,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Effect => "effect",
            Self::Principle => "principle",
            Self::Theory => "theory",
            Self::Phenomenon => "phenomenon",
            Self::Quote => "quote",
            Self::Syndrome => "syndrome",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|concept_type| concept_type.as_str() == raw)
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }
}

impl fmt::Display for ConceptType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConceptType {
    type Err = VocabularyError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value).ok_or_else(|| VocabularyError::UnsupportedType(value.to_string()))
    }
}

pub fn is_valid_field(value: &str) -> bool {
    Field::parse(value).is_some()
}

pub fn is_valid_type(value: &str) -> bool {
    ConceptType::parse(value).is_some()
}

pub fn list_fields() -> Vec<&'static str> {
    Field::ALL.iter().map(Field::as_str).collect()
}

pub fn list_types() -> Vec<&'static str> {
    ConceptType::ALL.iter().map(ConceptType::as_str).collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::{
        is_valid_field, is_valid_type, list_fields, list_types, ConceptType, Field,
    };
    use crate::errors::VocabularyError;

    #[test]
    fn every_listed_value_is_valid() {
        for field in list_fields() {
            assert!(is_valid_field(field), "{field} should be a valid field");
        }
        for concept_type in list_types() {
            assert!(is_valid_type(concept_type), "{concept_type} should be a valid type");
        }
    }

    #[test]
    fn membership_is_case_sensitive_and_exact() {
        assert!(is_valid_field("physics"));
        assert!(!is_valid_field("Physics"));
        assert!(!is_valid_field(" physics"));
        assert!(!is_valid_field("astrology"));
        assert!(!is_valid_field(""));

        assert!(is_valid_type("syndrome"));
        assert!(!is_valid_type("SYNDROME"));
        assert!(!is_valid_type("law"));
    }

    #[test]
    fn listings_are_order_stable_and_free_of_duplicates() {
        assert_eq!(
            list_fields(),
            vec!["psychology", "physics", "chemistry", "mathematics", "philosophy", "inspirational"]
        );
        assert_eq!(
            list_types(),
            vec!["effect", "principle", "theory", "phenomenon", "quote", "syndrome"]
        );
        assert_eq!(list_fields(), list_fields());

        let unique_fields: HashSet<_> = list_fields().into_iter().collect();
        let unique_types: HashSet<_> = list_types().into_iter().collect();
        assert_eq!(unique_fields.len(), Field::ALL.len());
        assert_eq!(unique_types.len(), ConceptType::ALL.len());
    }

    #[test]
    fn from_str_reports_the_rejected_value() {
        assert_eq!("chemistry".parse::<Field>(), Ok(Field::Chemistry));
        assert_eq!(
            "alchemy".parse::<Field>(),
            Err(VocabularyError::UnsupportedField("alchemy".to_string()))
        );
        assert_eq!(
            "law".parse::<ConceptType>(),
            Err(VocabularyError::UnsupportedType("law".to_string()))
        );
    }

    #[test]
    fn serde_names_match_the_listed_values() {
        for field in Field::ALL {
            let encoded = serde_json::to_string(&field).expect("serialize field");
            assert_eq!(encoded, format!("\"{}\"", field.as_str()));
        }
        for concept_type in ConceptType::ALL {
            let encoded = serde_json::to_string(&concept_type).expect("serialize type");
            assert_eq!(encoded, format!("\"{}\"", concept_type.as_str()));
        }
    }

    #[test]
    fn random_choice_covers_the_vocabulary() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen_fields = HashSet::new();
        let mut seen_types = HashSet::new();
        for _ in 0..500 {
            seen_fields.insert(Field::random(&mut rng));
            seen_types.insert(ConceptType::random(&mut rng));
        }
        assert_eq!(seen_fields.len(), Field::ALL.len());
        assert_eq!(seen_types.len(), ConceptType::ALL.len());
    }
}
