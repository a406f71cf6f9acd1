use std::sync::Arc;

use maxim_agent::{ConceptGenerator, GeneratorSettings, OpenAiCompatClient};
use maxim_core::config::{AppConfig, LoadOptions};
use maxim_core::{
    ConceptRecord, ConceptType, Field, GenerationError, GenerationRequest, LengthHint, Subject,
    VocabularyError,
};
use rand::Rng;
use thiserror::Error;

use crate::commands::{CommandResult, EXIT_CONFIG, EXIT_INVALID_ARGUMENT, EXIT_UPSTREAM};

#[derive(Debug, Clone, Default)]
pub struct GenerateArgs {
    pub field: Option<String>,
    pub keyword: Option<String>,
    pub concept_type: Option<String>,
    pub length: Option<i64>,
    pub retries: u32,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgumentError {
    #[error(transparent)]
    Vocabulary(#[from] VocabularyError),
    #[error("keyword must not be blank")]
    BlankKeyword,
}

pub fn run(args: GenerateArgs) -> CommandResult {
    // Arguments are checked before config so a bad field never needs credentials
    let request = match build_request(&args, &mut rand::thread_rng()) {
        Ok(request) => request,
        Err(error) => {
            let message = match &error {
                ArgumentError::Vocabulary(vocabulary) => vocabulary.detail(),
                ArgumentError::BlankKeyword => error.to_string(),
            };
            return CommandResult::failure(
                "generate",
                "invalid_argument",
                message,
                EXIT_INVALID_ARGUMENT,
            );
        }
    };

    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "generate",
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG,
            );
        }
    };

    crate::logging::init_logging(&config);

    let client = match OpenAiCompatClient::from_config(&config.llm) {
        Ok(client) => client,
        Err(error) => {
            return CommandResult::failure(
                "generate",
                "backend_setup",
                error.to_string(),
                EXIT_UPSTREAM,
            );
        }
    };
    let settings = GeneratorSettings::from_config(&config);
    let generator = ConceptGenerator::new(Arc::new(client), settings);

    let runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                "generate",
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                1,
            );
        }
    };

    match runtime.block_on(generate_with_retries(&generator, &request, args.retries)) {
        Ok(record) => CommandResult::document("generate", &record),
        Err(error) => {
            let class = error.error_class();
            CommandResult::failure("generate", class, error.to_string(), EXIT_UPSTREAM)
        }
    }
}

/// Field is resolved before type, matching the HTTP routes. Omitted values are drawn
/// from `rng`.
pub fn build_request<R: Rng + ?Sized>(
    args: &GenerateArgs,
    rng: &mut R,
) -> Result<GenerationRequest, ArgumentError> {
    let subject = match (&args.keyword, &args.field) {
        (Some(keyword), _) => {
            let keyword = keyword.trim();
            if keyword.is_empty() {
                return Err(ArgumentError::BlankKeyword);
            }
            Subject::Keyword(keyword.to_string())
        }
        (None, Some(field)) => Subject::Field(field.parse::<Field>()?),
        (None, None) => Subject::Field(Field::random(rng)),
    };

    let concept_type = match &args.concept_type {
        Some(concept_type) => concept_type.parse::<ConceptType>()?,
        None => ConceptType::random(rng),
    };

    Ok(GenerationRequest::new(subject, concept_type, LengthHint::from_raw(args.length)))
}

/// Re-dispatches only failures the backend might not repeat: timeouts and transport
/// errors. Rejected records are returned at once.
pub async fn generate_with_retries(
    generator: &ConceptGenerator,
    request: &GenerationRequest,
    retries: u32,
) -> Result<ConceptRecord, GenerationError> {
    let mut attempt = 0;
    loop {
        match generator.generate(request).await {
            Err(error) if error.is_retryable() && attempt < retries => {
                attempt += 1;
                tracing::warn!(
                    event_name = "cli.generate.retry",
                    attempt,
                    retries,
                    error = %error,
                    "retrying concept generation"
                );
            }
            result => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use maxim_agent::{CompletionRequest, ConceptGenerator, GeneratorSettings, LlmClient, LlmError};
    use maxim_core::{
        ConceptType, Field, GenerationError, GenerationRequest, Subject, VocabularyError,
    };
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::{build_request, generate_with_retries, ArgumentError, GenerateArgs};

    struct QueuedClient {
        replies: Mutex<VecDeque<Result<String, LlmError>>>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LlmClient for QueuedClient {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.replies
                .lock()
                .expect("replies mutex")
                .pop_front()
                .unwrap_or(Err(LlmError::Unavailable("script exhausted".to_string())))
        }
    }

    fn queued(replies: Vec<Result<String, LlmError>>) -> Arc<QueuedClient> {
        Arc::new(QueuedClient {
            replies: Mutex::new(replies.into()),
            calls: AtomicUsize::new(0),
        })
    }

    fn valid_reply() -> String {
        serde_json::json!({
            "name": "Occam's Razor",
            "field": "philosophy",
            "type": "principle",
            "quote": "Entities should not be multiplied beyond necessity.",
            "summary": "Prefer the simplest explanation that accounts for the evidence.",
            "author": "William of Ockham",
            "time": null
        })
        .to_string()
    }

    fn request() -> GenerationRequest {
        GenerationRequest::for_field(Field::Philosophy, ConceptType::Principle)
    }

    #[test]
    fn explicit_arguments_are_validated_field_first() {
        let mut rng = StdRng::seed_from_u64(3);
        let args = GenerateArgs {
            field: Some("astrology".to_string()),
            concept_type: Some("law".to_string()),
            ..GenerateArgs::default()
        };

        assert_eq!(
            build_request(&args, &mut rng),
            Err(ArgumentError::Vocabulary(VocabularyError::UnsupportedField(
                "astrology".to_string()
            )))
        );
    }

    #[test]
    fn omitted_arguments_are_drawn_at_random() {
        let mut rng = StdRng::seed_from_u64(3);
        let request = build_request(&GenerateArgs::default(), &mut rng).expect("valid request");

        assert!(matches!(request.subject, Subject::Field(_)));
        assert!(ConceptType::ALL.contains(&request.concept_type));
        assert_eq!(request.length_hint.chars(), None);
    }

    #[test]
    fn keyword_and_length_are_carried_through() {
        let mut rng = StdRng::seed_from_u64(3);
        let args = GenerateArgs {
            keyword: Some("  entropy ".to_string()),
            concept_type: Some("theory".to_string()),
            length: Some(90),
            ..GenerateArgs::default()
        };

        let request = build_request(&args, &mut rng).expect("valid request");
        assert_eq!(request.subject, Subject::Keyword("entropy".to_string()));
        assert_eq!(request.concept_type, ConceptType::Theory);
        assert_eq!(request.length_hint.chars(), Some(90));

        let blank = GenerateArgs { keyword: Some("   ".to_string()), ..GenerateArgs::default() };
        assert_eq!(build_request(&blank, &mut rng), Err(ArgumentError::BlankKeyword));
    }

    #[tokio::test]
    async fn retryable_failures_are_retried_up_to_the_limit() {
        let client = queued(vec![Err(LlmError::Timeout), Ok(valid_reply())]);
        let generator = ConceptGenerator::new(client.clone(), GeneratorSettings::default());

        let record = generate_with_retries(&generator, &request(), 1).await.expect("second try");

        assert_eq!(record.field, Field::Philosophy);
        assert_eq!(client.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn zero_retries_surfaces_the_first_failure() {
        let client = queued(vec![Err(LlmError::Timeout), Ok(valid_reply())]);
        let generator = ConceptGenerator::new(client.clone(), GeneratorSettings::default());

        let error = generate_with_retries(&generator, &request(), 0).await.expect_err("no retry");

        assert!(matches!(error, GenerationError::UpstreamTimeout { .. }));
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejected_records_are_not_retried() {
        let client = queued(vec![Ok("not json".to_string()), Ok(valid_reply())]);
        let generator = ConceptGenerator::new(client.clone(), GeneratorSettings::default());

        let error = generate_with_retries(&generator, &request(), 3).await.expect_err("rejected");

        assert!(matches!(error, GenerationError::MalformedResponse(_)));
        assert_eq!(client.calls.load(Ordering::SeqCst), 1);
    }
}
