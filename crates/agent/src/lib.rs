//! Concept generation runtime.
//!
//! This crate turns a validated [`GenerationRequest`](maxim_core::GenerationRequest)
//! into a validated [`ConceptRecord`](maxim_core::ConceptRecord) through a single
//! call to a text-generation backend:
//!
//! 1. **Prompt assembly** (`prompts`) - fixed curator instruction plus a per-call
//!    instruction naming the subject, type and optional length.
//! 2. **Schema-constrained dispatch** (`schema`, `llm`) - the request carries a JSON
//!    Schema whose enums come from the vocabulary tables.
//! 3. **Structural parse, then semantic validation** (`pipeline`) - the backend's
//!    declared compliance is never trusted as a substitute for local checks.
//!
//! # Key Types
//!
//! - `ConceptGenerator` - the pipeline (see `pipeline` module)
//! - `LlmClient` - pluggable backend trait, mocked in tests
//! - `OpenAiCompatClient` - chat-completions client for Groq, OpenAI and Ollama
//!
//! The pipeline performs exactly one backend call per invocation and never retries.

pub mod llm;
pub mod openai;
pub mod pipeline;
pub mod prompts;
pub mod schema;

pub use llm::{CompletionRequest, LlmClient, LlmError};
pub use openai::OpenAiCompatClient;
pub use pipeline::{parse_record, ConceptGenerator, GeneratorSettings};
