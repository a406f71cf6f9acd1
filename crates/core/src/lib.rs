pub mod config;
pub mod domain;
pub mod errors;
pub mod vocabulary;

pub use domain::concept::{ConceptRecord, RawConceptRecord};
pub use domain::request::{GenerationRequest, LengthHint, Subject};
pub use errors::{
    DomainValueOrigin, GenerationError, InterfaceError, RecordSlot, VocabularyError,
};
pub use vocabulary::{
    is_valid_field, is_valid_type, list_fields, list_types, ConceptType, Field,
};
