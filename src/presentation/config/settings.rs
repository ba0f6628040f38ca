use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub asr: AsrSettings,
    pub analysis: AnalysisSettings,
    pub storage: StorageSettings,
    pub segmenter: SegmenterSettings,
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_upload_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct AsrSettings {
    pub base_url: String,
    pub api_key: String,
    pub language: String,
    pub poll_max_attempts: u32,
    pub poll_interval: Duration,
    pub download_timeout: Duration,
    pub max_download_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct AnalysisSettings {
    pub api_key: String,
    pub model: String,
    pub max_segments: usize,
    pub call_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct StorageSettings {
    pub base_dir: String,
    pub public_base_url: String,
}

#[derive(Debug, Clone)]
pub struct SegmenterSettings {
    pub min_streak_tokens: usize,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Settings {
    /// Builds settings from the process environment, falling back to local
    /// development defaults for everything but the API keys.
    pub fn from_env() -> Self {
        Self {
            server: ServerSettings {
                host: env_or("SERVER_HOST", "0.0.0.0"),
                port: env_parse("SERVER_PORT", 3000),
                max_upload_bytes: env_parse("MAX_UPLOAD_MB", 50u64) * 1024 * 1024,
            },
            asr: AsrSettings {
                base_url: env_or("DAGLO_BASE_URL", "https://apis.daglo.ai"),
                api_key: env_or("DAGLO_API_KEY", ""),
                language: env_or("ASR_LANGUAGE", "ko-KR"),
                poll_max_attempts: env_parse("ASR_POLL_MAX_ATTEMPTS", 9),
                poll_interval: Duration::from_millis(env_parse("ASR_POLL_INTERVAL_MS", 6000)),
                download_timeout: Duration::from_secs(env_parse(
                    "AUDIO_DOWNLOAD_TIMEOUT_SECS",
                    30,
                )),
                max_download_bytes: env_parse("MAX_AUDIO_DOWNLOAD_MB", 50u64) * 1024 * 1024,
            },
            analysis: AnalysisSettings {
                api_key: env_or("GEMINI_API_KEY", ""),
                model: env_or("GEMINI_MODEL", "gemini-2.0-flash"),
                max_segments: env_parse("ANALYSIS_MAX_SEGMENTS", 50),
                call_timeout: Duration::from_secs(env_parse("ANALYSIS_TIMEOUT_SECS", 30)),
            },
            storage: StorageSettings {
                base_dir: env_or("STORAGE_DIR", "tmp/media"),
                public_base_url: env_or("STORAGE_PUBLIC_URL", "http://localhost:3000/media"),
            },
            segmenter: SegmenterSettings {
                min_streak_tokens: env_parse("SEGMENT_MIN_STREAK_TOKENS", 2),
            },
        }
    }
}
