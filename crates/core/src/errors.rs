use std::fmt;

use thiserror::Error;

use crate::vocabulary::{list_fields, list_types};

/// Rejection of a caller-supplied field or type, raised before any backend call.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum VocabularyError {
    #[error("unsupported field `{0}`")]
    UnsupportedField(String),
    #[error("unsupported type `{0}`")]
    UnsupportedType(String),
}

impl VocabularyError {
    pub fn reason(&self) -> &'static str {
        match self {
            Self::UnsupportedField(_) => "Field Not Supported",
            Self::UnsupportedType(_) => "Type Not Supported",
        }
    }

    pub fn detail(&self) -> String {
        match self {
            Self::UnsupportedField(value) => {
                format!("field `{value}` is not one of: {}", list_fields().join(", "))
            }
            Self::UnsupportedType(value) => {
                format!("type `{value}` is not one of: {}", list_types().join(", "))
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DomainValueOrigin {
    Request,
    Response,
}

impl fmt::Display for DomainValueOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Request => f.write_str("request"),
            Self::Response => f.write_str("backend response"),
        }
    }
}

/// Named slot of a concept record, used to point at the offending value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordSlot {
    Name,
    Field,
    Type,
    Quote,
    Summary,
}

impl fmt::Display for RecordSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Name => "name",
            Self::Field => "field",
            Self::Type => "type",
            Self::Quote => "quote",
            Self::Summary => "summary",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GenerationError {
    #[error("{origin} carried out-of-vocabulary {slot} `{value}`")]
    InvalidDomainValue { origin: DomainValueOrigin, slot: RecordSlot, value: String },
    #[error("backend response did not match the concept schema: {0}")]
    MalformedResponse(String),
    #[error("backend response left required `{slot}` empty")]
    IncompleteRecord { slot: RecordSlot },
    #[error("backend did not respond within {after_secs}s")]
    UpstreamTimeout { after_secs: u64 },
    #[error("backend unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl GenerationError {
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidDomainValue { origin: DomainValueOrigin::Request, .. })
    }

    /// Transport failures only. The pipeline never retries; callers decide.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::UpstreamTimeout { .. } | Self::UpstreamUnavailable(_))
    }

    pub fn error_class(&self) -> &'static str {
        match self {
            Self::InvalidDomainValue { origin: DomainValueOrigin::Request, .. } => {
                "invalid_domain_value"
            }
            Self::InvalidDomainValue { origin: DomainValueOrigin::Response, .. } => {
                "upstream_invalid_domain_value"
            }
            Self::MalformedResponse(_) => "malformed_response",
            Self::IncompleteRecord { .. } => "incomplete_record",
            Self::UpstreamTimeout { .. } => "upstream_timeout",
            Self::UpstreamUnavailable(_) => "upstream_unavailable",
        }
    }

    /// Upstream-caused errors carry only their `error_class` as message, so backend
    /// URLs and transport text stay in the logs.
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let message = self.error_class().to_string();
        match self {
            Self::InvalidDomainValue { origin: DomainValueOrigin::Request, slot, .. } => {
                let reason = if slot == RecordSlot::Type {
                    "Type Not Supported"
                } else {
                    "Field Not Supported"
                };
                InterfaceError::BadRequest { reason, message: self.to_string(), correlation_id }
            }
            Self::InvalidDomainValue { origin: DomainValueOrigin::Response, .. }
            | Self::MalformedResponse(_)
            | Self::IncompleteRecord { .. } => InterfaceError::BadGateway { message, correlation_id },
            Self::UpstreamTimeout { .. } => InterfaceError::GatewayTimeout { message, correlation_id },
            Self::UpstreamUnavailable(_) => {
                InterfaceError::ServiceUnavailable { message, correlation_id }
            }
        }
    }
}

impl From<VocabularyError> for GenerationError {
    fn from(value: VocabularyError) -> Self {
        match value {
            VocabularyError::UnsupportedField(value) => Self::InvalidDomainValue {
                origin: DomainValueOrigin::Request,
                slot: RecordSlot::Field,
                value,
            },
            VocabularyError::UnsupportedType(value) => Self::InvalidDomainValue {
                origin: DomainValueOrigin::Request,
                slot: RecordSlot::Type,
                value,
            },
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { reason: &'static str, message: String, correlation_id: String },
    #[error("bad gateway: {message}")]
    BadGateway { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("gateway timeout: {message}")]
    GatewayTimeout { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn rejected(error: &VocabularyError, correlation_id: impl Into<String>) -> Self {
        Self::BadRequest {
            reason: error.reason(),
            message: error.detail(),
            correlation_id: correlation_id.into(),
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            Self::BadRequest { reason, .. } => *reason,
            Self::BadGateway { .. } => "Upstream Response Invalid",
            Self::ServiceUnavailable { .. } => "Upstream Unavailable",
            Self::GatewayTimeout { .. } => "Upstream Timeout",
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::BadGateway { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::GatewayTimeout { correlation_id, .. } => correlation_id,
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::BadGateway { .. } => {
                "The generator returned an unusable concept. Please try again."
            }
            Self::ServiceUnavailable { .. } | Self::GatewayTimeout { .. } => {
                "The generator is temporarily unavailable. Please retry shortly."
            }
        }
    }
}
