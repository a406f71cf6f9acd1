use std::sync::Arc;

use maxim_agent::{ConceptGenerator, GeneratorSettings, LlmError, OpenAiCompatClient};
use maxim_core::config::{AppConfig, ConfigError};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub generator: ConceptGenerator,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("backend client setup failed: {0}")]
    Backend(#[source] LlmError),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    config.validate()?;

    let client = OpenAiCompatClient::from_config(&config.llm).map_err(BootstrapError::Backend)?;
    info!(
        event_name = "system.bootstrap.backend_configured",
        correlation_id = "bootstrap",
        provider = client.provider().as_str(),
        model = %config.llm.model,
        endpoint = %client.endpoint(),
        "generation backend configured"
    );

    let settings = GeneratorSettings::from_config(&config);
    let generator = ConceptGenerator::new(Arc::new(client), settings);
    Ok(Application { config, generator })
}
