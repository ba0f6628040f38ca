mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    AnalysisSettings, AsrSettings, SegmenterSettings, ServerSettings, Settings, StorageSettings,
};
