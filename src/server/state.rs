use crate::config::StudioConfig;
use crate::enhance::create_enhancer;
use crate::error::Result;
use crate::pipeline::ImagePipeline;
use crate::segmentation::create_remover;
use crate::services::HttpImageFetcher;
use std::sync::Arc;

/// Shared application state accessible to all handlers
#[derive(Clone, Debug)]
pub struct AppState {
    /// Orchestrator with its collaborators already wired
    pub pipeline: Arc<ImagePipeline>,

    /// Configuration
    pub config: Arc<StudioConfig>,
}

impl AppState {
    #[must_use]
    pub fn new(pipeline: ImagePipeline, config: StudioConfig) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            config: Arc::new(config),
        }
    }

    /// Wire the production collaborators for `config`
    ///
    /// A missing segmentation model does not fail startup; removal requests
    /// fail individually instead.
    ///
    /// # Errors
    /// - Failed to create an HTTP client
    pub fn from_config(config: StudioConfig) -> Result<Self> {
        let remover = create_remover(&config);
        let enhancer = create_enhancer(&config)?;
        let fetcher = Arc::new(HttpImageFetcher::new(config.fetch_timeout)?);
        Ok(Self::new(ImagePipeline::new(remover, enhancer, fetcher), config))
    }
}
