// LLM backend configuration, resolved once at startup

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_FAL_BASE_URL: &str = "https://fal.run";
pub const DEFAULT_FAL_MODEL: &str = "google/gemini-flash-1.5";

/// Which backend answers chat turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// OpenAI-compatible streaming chat completions.
    OpenAi,
    /// fal.ai `any-llm`, single-shot completion.
    Fal,
}

#[derive(Clone)]
pub struct LlmConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub use_fal: bool,
    pub fal_api_key: Option<String>,
    pub fal_model: String,
    pub fal_base_url: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            use_fal: false,
            fal_api_key: None,
            fal_model: DEFAULT_FAL_MODEL.to_string(),
            fal_base_url: DEFAULT_FAL_BASE_URL.to_string(),
        }
    }
}

impl LlmConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get("LLM_API_KEY").or_else(|| get("OPENAI_API_KEY"));

        let base_url = get("LLM_BASE_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let model = get("LLM_MODEL_NAME").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let use_fal = get("USE_FAL_LLM").as_deref() == Some("1");

        let fal_api_key = get("FAL_KEY");

        let fal_model = get("FAL_LLM_MODEL").unwrap_or_else(|| DEFAULT_FAL_MODEL.to_string());

        let fal_base_url = get("FAL_BASE_URL")
            .map(|u| u.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_FAL_BASE_URL.to_string());

        Self {
            api_key,
            base_url,
            model,
            use_fal,
            fal_api_key,
            fal_model,
            fal_base_url,
        }
    }

    /// Backend the configuration asks for, before any fallback.
    pub fn requested_provider(&self) -> LlmProvider {
        if self.use_fal {
            LlmProvider::Fal
        } else {
            LlmProvider::OpenAi
        }
    }
}

/// First few characters of a credential, for logs.
pub fn mask_secret(secret: Option<&str>) -> String {
    match secret {
        Some(s) => format!("{}...", s.chars().take(10).collect::<String>()),
        None => "None".to_string(),
    }
}

// Keys never reach Debug output
impl std::fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &mask_secret(self.api_key.as_deref()))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("use_fal", &self.use_fal)
            .field("fal_api_key", &mask_secret(self.fal_api_key.as_deref()))
            .field("fal_model", &self.fal_model)
            .field("fal_base_url", &self.fal_base_url)
            .finish()
    }
}
