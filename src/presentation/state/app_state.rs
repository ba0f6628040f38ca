use std::sync::Arc;

use crate::application::ports::MediaStore;
use crate::application::services::PipelineService;
use crate::presentation::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<PipelineService>,
    pub media_store: Arc<dyn MediaStore>,
    pub settings: Settings,
}
