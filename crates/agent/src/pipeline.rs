use std::sync::Arc;
use std::time::Duration;

use maxim_core::config::AppConfig;
use maxim_core::{ConceptRecord, GenerationError, GenerationRequest, RawConceptRecord};
use tracing::{info, warn};

use crate::llm::{CompletionRequest, LlmClient, LlmError};
use crate::prompts::{system_instruction, user_instruction};
use crate::schema::{concept_record_schema, SCHEMA_NAME};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeneratorSettings {
    pub temperature: f32,
    pub timeout: Duration,
}

impl GeneratorSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            temperature: config.generation.temperature,
            timeout: Duration::from_secs(config.llm.timeout_secs),
        }
    }
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Stateless generation pipeline. Cloning shares the backend client, which is
/// expected to be safe for concurrent use.
#[derive(Clone)]
pub struct ConceptGenerator {
    client: Arc<dyn LlmClient>,
    settings: GeneratorSettings,
}

impl ConceptGenerator {
    pub fn new(client: Arc<dyn LlmClient>, settings: GeneratorSettings) -> Self {
        Self { client, settings }
    }

    pub fn settings(&self) -> GeneratorSettings {
        self.settings
    }

    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<ConceptRecord, GenerationError> {
        let completion = CompletionRequest {
            system: system_instruction(),
            user: user_instruction(request),
            schema_name: SCHEMA_NAME,
            schema: concept_record_schema(),
            temperature: self.settings.temperature,
        };

        info!(
            event_name = "generation.request.dispatched",
            subject = %request.subject,
            concept_type = %request.concept_type,
            length_hint = ?request.length_hint.chars(),
            "dispatching concept generation"
        );

        let raw = match tokio::time::timeout(self.settings.timeout, self.client.complete(&completion))
            .await
        {
            Ok(Ok(raw)) => raw,
            Ok(Err(LlmError::Timeout)) | Err(_) => {
                let error =
                    GenerationError::UpstreamTimeout { after_secs: self.settings.timeout.as_secs() };
                warn!(
                    event_name = "generation.request.timeout",
                    error = %error,
                    "backend did not answer in time"
                );
                return Err(error);
            }
            Ok(Err(LlmError::Unavailable(detail))) => {
                warn!(
                    event_name = "generation.request.unavailable",
                    error = %detail,
                    "backend call failed"
                );
                return Err(GenerationError::UpstreamUnavailable(detail));
            }
        };

        let record = parse_record(&raw).map_err(|error| {
            warn!(
                event_name = "generation.response.rejected",
                error_class = error.error_class(),
                error = %error,
                "backend response rejected"
            );
            error
        })?;

        if let Some(requested) = request.requested_field() {
            if record.field != requested {
                warn!(
                    event_name = "generation.response.field_mismatch",
                    requested = %requested,
                    returned = %record.field,
                    "backend classified the concept under a different field"
                );
            }
        }
        if record.concept_type != request.concept_type {
            warn!(
                event_name = "generation.response.type_mismatch",
                requested = %request.concept_type,
                returned = %record.concept_type,
                "backend classified the concept under a different type"
            );
        }

        info!(
            event_name = "generation.request.completed",
            field = %record.field,
            concept_type = %record.concept_type,
            name = %record.name,
            "concept generated"
        );

        Ok(record)
    }
}

/// Structural parse into the declared shape, then semantic validation against the
/// vocabulary. Either phase failing rejects the whole record.
pub fn parse_record(raw: &str) -> Result<ConceptRecord, GenerationError> {
    let parsed: RawConceptRecord = serde_json::from_str(raw.trim())
        .map_err(|error| GenerationError::MalformedResponse(error.to_string()))?;
    ConceptRecord::try_from(parsed)
}
