use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::path::Path;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub cors: CorsSettings,
    #[serde(default)]
    pub gemini: GeminiSettings,
    #[serde(default)]
    pub sheets: SheetsSettings,
    #[serde(default)]
    pub email: EmailSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub workers: Option<usize>,
    #[serde(default = "default_service_name")]
    pub service_name: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: None,
            service_name: default_service_name(),
        }
    }
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }
fn default_service_name() -> String { "Scholarship Finder API".to_string() }

#[derive(Debug, Clone, Deserialize)]
pub struct CorsSettings {
    pub frontend_url: Option<String>,
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsSettings {
    fn default() -> Self {
        Self {
            frontend_url: None,
            allowed_origins: default_allowed_origins(),
        }
    }
}

impl CorsSettings {
    /// Frontend URL first, then the static allow-list, without duplicates
    pub fn origins(&self) -> Vec<String> {
        let mut origins: Vec<String> = Vec::new();
        let candidates = self.frontend_url.iter().chain(self.allowed_origins.iter());
        for origin in candidates {
            let origin = origin.trim().trim_end_matches('/');
            if !origin.is_empty() && !origins.iter().any(|o| o == origin) {
                origins.push(origin.to_string());
            }
        }
        origins
    }

    /// Every origin must be a bare `http(s)://host[:port]`
    pub fn validate(&self) -> Result<(), ConfigError> {
        for origin in self.origins() {
            check_origin(&origin)
                .map_err(|reason| ConfigError::Message(format!("invalid CORS origin {:?}: {}", origin, reason)))?;
        }
        Ok(())
    }
}

fn check_origin(origin: &str) -> Result<(), String> {
    let url = reqwest::Url::parse(origin).map_err(|e| e.to_string())?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(format!("unsupported scheme {}", url.scheme()));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err("missing host".to_string());
    }
    if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
        return Err("origins carry no path, query or fragment".to_string());
    }
    if !url.username().is_empty() || url.password().is_some() {
        return Err("origins carry no credentials".to_string());
    }
    Ok(())
}

fn default_allowed_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:3001".to_string(),
        "https://scholarship-finder2-seven.vercel.app".to_string(),
    ]
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiSettings {
    #[serde(default = "default_gemini_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_gemini_model")]
    pub model: String,
    #[serde(default = "default_true")]
    pub search_grounding: bool,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_gemini_timeout")]
    pub timeout_secs: u64,
}

impl Default for GeminiSettings {
    fn default() -> Self {
        Self {
            endpoint: default_gemini_endpoint(),
            api_key: String::new(),
            model: default_gemini_model(),
            search_grounding: true,
            temperature: default_temperature(),
            max_results: default_max_results(),
            timeout_secs: default_gemini_timeout(),
        }
    }
}

fn default_gemini_endpoint() -> String { "https://generativelanguage.googleapis.com/v1beta".to_string() }
fn default_gemini_model() -> String { "gemini-2.0-flash".to_string() }
fn default_temperature() -> f32 { 0.4 }
fn default_max_results() -> usize { 10 }
fn default_gemini_timeout() -> u64 { 60 }
fn default_true() -> bool { true }

#[derive(Debug, Clone, Deserialize)]
pub struct SheetsSettings {
    #[serde(default = "default_sheets_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub spreadsheet_id: String,
    #[serde(default = "default_sheets_range")]
    pub range: String,
    /// Pre-issued OAuth bearer token; takes precedence over `credentials_json`
    pub access_token: Option<String>,
    /// Service account key file contents
    pub credentials_json: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default = "default_sheets_timeout")]
    pub timeout_secs: u64,
}

impl Default for SheetsSettings {
    fn default() -> Self {
        Self {
            endpoint: default_sheets_endpoint(),
            spreadsheet_id: String::new(),
            range: default_sheets_range(),
            access_token: None,
            credentials_json: None,
            token_uri: default_token_uri(),
            timeout_secs: default_sheets_timeout(),
        }
    }
}

fn default_sheets_endpoint() -> String { "https://sheets.googleapis.com/v4".to_string() }
fn default_sheets_range() -> String { "Leads!A:I".to_string() }
fn default_token_uri() -> String { "https://oauth2.googleapis.com/token".to_string() }
fn default_sheets_timeout() -> u64 { 15 }

#[derive(Debug, Clone, Deserialize)]
pub struct EmailSettings {
    #[serde(default = "default_email_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_from_address")]
    pub from_address: String,
    #[serde(default = "default_from_name")]
    pub from_name: String,
    #[serde(default = "default_email_timeout")]
    pub timeout_secs: u64,
}

impl Default for EmailSettings {
    fn default() -> Self {
        Self {
            endpoint: default_email_endpoint(),
            api_key: String::new(),
            from_address: default_from_address(),
            from_name: default_from_name(),
            timeout_secs: default_email_timeout(),
        }
    }
}

fn default_email_endpoint() -> String { "https://api.sendgrid.com/v3/mail/send".to_string() }
fn default_from_address() -> String { "reports@scholarshipfinder.in".to_string() }
fn default_from_name() -> String { "Scholarship Finder".to_string() }
fn default_email_timeout() -> u64 { 20 }

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

fn default_log_level() -> String { "info".to_string() }
fn default_log_format() -> String { "json".to_string() }

impl Settings {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values in the struct
    /// 2. Configuration file (config/default.toml)
    /// 3. Local overrides (config/local.toml)
    /// 4. Environment variables (prefixed with SCHOLAR__)
    /// 5. Well-known deployment variables (PORT, GEMINI_API_KEY, ...)
    pub fn load() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // e.g., SCHOLAR__SERVER__PORT -> server.port
            .add_source(
                Environment::with_prefix("SCHOLAR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings =
            apply_deployment_env(settings, |name| std::env::var(name).ok())?.try_deserialize()?;
        settings.cors.validate()?;
        Ok(settings)
    }

    /// Load configuration from a custom path
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix("SCHOLAR")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = settings.try_deserialize()?;
        settings.cors.validate()?;
        Ok(settings)
    }
}

/// Variables hosting platforms set directly, mapped onto their config keys
const DEPLOYMENT_ENV: &[(&str, &str)] = &[
    ("PORT", "server.port"),
    ("FRONTEND_URL", "cors.frontend_url"),
    ("GEMINI_API_KEY", "gemini.api_key"),
    ("SENDGRID_API_KEY", "email.api_key"),
    ("GOOGLE_SHEETS_ID", "sheets.spreadsheet_id"),
    ("GOOGLE_CREDENTIALS_JSON", "sheets.credentials_json"),
];

fn apply_deployment_env<F>(settings: Config, lookup: F) -> Result<Config, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = Config::builder().add_source(settings);

    for &(var, key) in DEPLOYMENT_ENV {
        if let Some(value) = lookup(var).filter(|v| !v.trim().is_empty()) {
            builder = builder.set_override(key, value)?;
        }
    }

    builder.build()
}
