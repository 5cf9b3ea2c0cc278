use std::env;

const DEFAULT_MODEL_ID: &str = "anthropic.claude-sonnet-4-20250514-v1:0";
const DEFAULT_REGION: &str = "us-west-2";
const DEFAULT_SYSTEM_TEMPLATE: &str = "You are a helpful chatbot. Respond in {language}.";
const DEFAULT_LANGUAGES: &str = "english,spanish,french";
const DEFAULT_TEMPERATURE: f64 = 0.9;
const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 2000;
const DEFAULT_TOP_P: f64 = 1.0;
const DEFAULT_MAX_QUESTION_CHARS: usize = 4000;
const DEFAULT_BLOCKED_PATTERNS: &str = "<script,javascript:,data:text/html";
const DEFAULT_RETRY_MAX_ATTEMPTS: u32 = 10;
const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_READ_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeShape {
    Legacy,
    Structured,
}

impl EnvelopeShape {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Structured => "structured",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SamplingConfig {
    pub temperature: f64,
    pub max_output_tokens: u32,
    pub top_p: f64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_output_tokens: DEFAULT_MAX_OUTPUT_TOKENS,
            top_p: DEFAULT_TOP_P,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationRules {
    pub max_chars: usize,
    /// Stored lowercased; matching is case-insensitive.
    pub blocked_patterns: Vec<String>,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_QUESTION_CHARS,
            blocked_patterns: split_list(DEFAULT_BLOCKED_PATTERNS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub connect_timeout_secs: u64,
    pub read_timeout_secs: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_RETRY_MAX_ATTEMPTS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub model_id: String,
    pub region: String,
    pub endpoint: String,
    pub envelope: EnvelopeShape,
    pub system_template: String,
    pub languages: Vec<String>,
    pub sampling: SamplingConfig,
    pub validation: ValidationRules,
    pub access_secret: Option<String>,
    pub retry: RetryConfig,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_env_with(|key| env::var(key).ok())
    }

    fn from_env_with(mut get_var: impl FnMut(&str) -> Option<String>) -> Self {
        let region = get_var("REGION")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_REGION.to_string());
        let endpoint = get_var("ENDPOINT_URL")
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| default_endpoint(&region));
        let sampling = SamplingConfig {
            temperature: parse_temperature(get_var("TEMPERATURE").as_deref()),
            max_output_tokens: parse_max_output_tokens(get_var("MAX_OUTPUT_TOKENS").as_deref()),
            top_p: parse_top_p(get_var("TOP_P").as_deref()),
        };
        let validation = ValidationRules {
            max_chars: parse_max_question_chars(get_var("MAX_QUESTION_CHARS").as_deref()),
            blocked_patterns: parse_blocked_patterns(get_var("BLOCKED_PATTERNS").as_deref()),
        };
        let retry = RetryConfig {
            max_attempts: parse_positive_u32(
                get_var("RETRY_MAX_ATTEMPTS").as_deref(),
                DEFAULT_RETRY_MAX_ATTEMPTS,
            ),
            connect_timeout_secs: parse_positive_u64(
                get_var("CONNECT_TIMEOUT_SECS").as_deref(),
                DEFAULT_CONNECT_TIMEOUT_SECS,
            ),
            read_timeout_secs: parse_positive_u64(
                get_var("READ_TIMEOUT_SECS").as_deref(),
                DEFAULT_READ_TIMEOUT_SECS,
            ),
        };

        Self {
            model_id: get_var("MODEL_ID")
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
                .unwrap_or_else(|| DEFAULT_MODEL_ID.to_string()),
            region,
            endpoint,
            envelope: parse_envelope(get_var("ENVELOPE").as_deref()),
            system_template: get_var("SYSTEM_TEMPLATE")
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_SYSTEM_TEMPLATE.to_string()),
            languages: parse_languages(get_var("LANGUAGES").as_deref()),
            sampling,
            validation,
            access_secret: get_var("ACCESS_SECRET").filter(|value| !value.is_empty()),
            retry,
        }
    }

    pub fn default_language(&self) -> &str {
        self.languages
            .first()
            .map(String::as_str)
            .unwrap_or("english")
    }

    pub fn supports_language(&self, name: &str) -> bool {
        self.languages
            .iter()
            .any(|language| language.eq_ignore_ascii_case(name))
    }
}

fn default_endpoint(region: &str) -> String {
    format!("https://bedrock-runtime.{region}.amazonaws.com")
}

fn parse_envelope(raw: Option<&str>) -> EnvelopeShape {
    match raw
        .unwrap_or("structured")
        .trim()
        .to_ascii_lowercase()
        .as_str()
    {
        "legacy" => EnvelopeShape::Legacy,
        _ => EnvelopeShape::Structured,
    }
}

fn parse_temperature(raw: Option<&str>) -> f64 {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| (0.0..=1.0).contains(value))
        .unwrap_or(DEFAULT_TEMPERATURE)
}

fn parse_top_p(raw: Option<&str>) -> f64 {
    raw.and_then(|value| value.trim().parse::<f64>().ok())
        .filter(|value| *value > 0.0 && *value <= 1.0)
        .unwrap_or(DEFAULT_TOP_P)
}

fn parse_max_output_tokens(raw: Option<&str>) -> u32 {
    parse_positive_u32(raw, DEFAULT_MAX_OUTPUT_TOKENS)
}

fn parse_max_question_chars(raw: Option<&str>) -> usize {
    raw.and_then(|value| value.trim().parse::<usize>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(DEFAULT_MAX_QUESTION_CHARS)
}

fn parse_positive_u32(raw: Option<&str>, default: u32) -> u32 {
    raw.and_then(|value| value.trim().parse::<u32>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn parse_positive_u64(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(|value| value.trim().parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|entry| entry.trim().to_lowercase())
        .filter(|entry| !entry.is_empty())
        .collect()
}

fn parse_blocked_patterns(raw: Option<&str>) -> Vec<String> {
    let patterns = split_list(raw.unwrap_or(DEFAULT_BLOCKED_PATTERNS));
    if patterns.is_empty() {
        split_list(DEFAULT_BLOCKED_PATTERNS)
    } else {
        patterns
    }
}

fn parse_languages(raw: Option<&str>) -> Vec<String> {
    let languages = split_list(raw.unwrap_or(DEFAULT_LANGUAGES));
    if languages.is_empty() {
        split_list(DEFAULT_LANGUAGES)
    } else {
        languages
    }
}
