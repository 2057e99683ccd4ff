use crate::oauth::OAuthProvider;
use serde::{Deserialize, Serialize};
use std::fs;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct MemogateSettings {
    pub application: ApplicationSettings,
    pub backend: BackendSettings,
    pub static_files: StaticFilesSettings,
    pub cookies: CookieSettings,
    pub logging: LoggingSettings,
    pub providers: Vec<ProviderSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    /// Public origin of this service, used to build OAuth redirect URIs
    pub app_url: String,
    pub cors_origins: String,
    /// `development` or `production`
    pub environment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendSettings {
    pub api_base_url: String,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StaticFilesSettings {
    pub assets_folder: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CookieSettings {
    /// Explicit override for the `Secure` flag. When unset the flag follows the environment.
    pub secure: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    pub name: String,
    pub authorization_endpoint: Option<String>,
    pub token_endpoint: Option<String>,
    pub userinfo_endpoint: Option<String>,
    pub scopes: Vec<String>,

    // Direct values (can be overridden by environment variables)
    pub client_id: Option<String>,
    pub client_secret: Option<String>,

    // Environment variable names for overrides
    pub client_id_env: Option<String>,
    pub client_secret_env: Option<String>,

    pub enabled: bool,
}

impl Default for ApplicationSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            app_url: "http://localhost:3000".to_string(),
            cors_origins: "http://localhost:3000".to_string(),
            environment: "development".to_string(),
        }
    }
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8080".to_string(),
            timeout_seconds: 10,
        }
    }
}

impl Default for StaticFilesSettings {
    fn default() -> Self {
        Self {
            assets_folder: "static".to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            name: String::new(),
            authorization_endpoint: None,
            token_endpoint: None,
            userinfo_endpoint: None,
            scopes: Vec::new(),
            client_id: None,
            client_secret: None,
            client_id_env: None,
            client_secret_env: None,
            enabled: true,
        }
    }
}

impl ProviderSettings {
    /// Settings for a provider with the conventional credential variable names
    #[must_use]
    pub fn for_provider(provider: OAuthProvider) -> Self {
        let (client_id_env, client_secret_env) = match provider {
            OAuthProvider::Google => ("GOOGLE_CLIENT_ID", None),
            OAuthProvider::Kakao => ("KAKAO_APP_KEY", Some("KAKAO_CLIENT_SECRET")),
            OAuthProvider::Naver => ("NAVER_CLIENT_ID", Some("NAVER_CLIENT_SECRET")),
        };

        Self {
            name: provider.slug().to_string(),
            client_id_env: Some(client_id_env.to_string()),
            client_secret_env: client_secret_env.map(ToString::to_string),
            ..Default::default()
        }
    }

    /// Provider kind named by this entry, if the name is one we support
    #[must_use]
    pub fn provider(&self) -> Option<OAuthProvider> {
        OAuthProvider::from_slug(&self.name)
    }

    /// Get the client ID, checking environment variable first, then falling back to direct value
    #[must_use]
    pub fn get_client_id(&self) -> Option<String> {
        Self::env_or_value(self.client_id_env.as_deref(), self.client_id.as_ref())
    }

    /// Get the client secret, checking environment variable first, then falling back to direct value
    #[must_use]
    pub fn get_client_secret(&self) -> Option<String> {
        Self::env_or_value(self.client_secret_env.as_deref(), self.client_secret.as_ref())
    }

    fn env_or_value(env_var: Option<&str>, value: Option<&String>) -> Option<String> {
        if let Some(env_var) = env_var {
            if let Ok(value) = std::env::var(env_var) {
                if !value.is_empty() {
                    return Some(value);
                }
            }
        }
        value.filter(|v| !v.is_empty()).cloned()
    }
}

impl MemogateSettings {
    /// Load settings from configuration files and environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Settings file cannot be read or parsed
    /// - Logger initialization fails
    pub fn load() -> anyhow::Result<Self> {
        Self::load_env_file();

        let mut settings = Self::load_base_settings()?;
        Self::apply_env_overrides(&mut settings);

        Self::initialize_logging(&settings.logging)?;
        Ok(settings)
    }

    /// Default settings with one entry per supported provider
    #[must_use]
    pub fn with_default_providers() -> Self {
        Self {
            providers: OAuthProvider::ALL
                .iter()
                .map(|provider| ProviderSettings::for_provider(*provider))
                .collect(),
            ..Default::default()
        }
    }

    fn initialize_logging(logging: &LoggingSettings) -> anyhow::Result<()> {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&logging.level))
            .try_init()?;
        Ok(())
    }

    /// Load base settings from TOML file(s) or use defaults
    /// Settings are loaded with the following priority (highest to lowest):
    /// 1. Environment variables (applied separately after loading base settings)
    /// 2. Settings.toml in `MEMOGATE_SECRETS_DIR` (if specified and exists)
    /// 3. Settings.toml in current directory (if exists)
    /// 4. Default settings
    fn load_base_settings() -> anyhow::Result<Self> {
        let mut settings = Self::with_default_providers();

        let default_config_path = std::path::PathBuf::from("Settings.toml");
        if default_config_path.exists() {
            settings = Self::from_toml_file(&default_config_path)?;
            println!(
                "✓ Loaded base settings from {}",
                default_config_path.display()
            );
        }

        if let Ok(secrets_dir) = std::env::var("MEMOGATE_SECRETS_DIR") {
            let secrets_path = std::path::Path::new(&secrets_dir).join("Settings.toml");
            if secrets_path.exists() {
                settings = Self::from_toml_file(&secrets_path)?;
                println!("✓ Overriding settings from {}", secrets_path.display());
            } else {
                println!(
                    "ℹ MEMOGATE_SECRETS_DIR set but no Settings.toml found at: {}",
                    secrets_path.display()
                );
            }
        }

        Ok(settings)
    }

    /// Parse a settings file. A file without any `[[providers]]` keeps the default provider list.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML for these settings
    pub fn from_toml_file(path: &std::path::Path) -> anyhow::Result<Self> {
        let toml_content = fs::read_to_string(path)?;
        Self::from_toml_str(&toml_content)
    }

    /// Parse settings from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for these settings
    pub fn from_toml_str(toml_content: &str) -> anyhow::Result<Self> {
        let mut settings: Self = basic_toml::from_str(toml_content)?;
        if settings.providers.is_empty() {
            settings.providers = Self::with_default_providers().providers;
        }
        Ok(settings)
    }

    /// Apply environment variable overrides to settings
    pub fn apply_env_overrides(settings: &mut Self) {
        Self::apply_application_env_overrides(&mut settings.application);
        Self::apply_backend_env_overrides(&mut settings.backend);
        if let Ok(assets_folder) = std::env::var("STATIC_FOLDER_PATH") {
            settings.static_files.assets_folder = assets_folder;
        }
        if let Ok(cookie_secure) = std::env::var("COOKIE_SECURE") {
            if let Ok(secure) = cookie_secure.parse::<bool>() {
                settings.cookies.secure = Some(secure);
            }
        }
        if let Ok(log_level) = std::env::var("RUST_LOG") {
            settings.logging.level = log_level;
        }
    }

    fn apply_application_env_overrides(app_settings: &mut ApplicationSettings) {
        if let Ok(host) = std::env::var("HOST") {
            app_settings.host = host;
        }
        if let Ok(port_str) = std::env::var("PORT") {
            if let Ok(port) = port_str.parse::<u16>() {
                app_settings.port = port;
            }
        }
        if let Ok(app_url) = std::env::var("APP_URL") {
            app_settings.app_url = app_url;
        }
        if let Ok(cors_origins) = std::env::var("CORS_ORIGINS") {
            app_settings.cors_origins = cors_origins;
        }
        if let Ok(environment) = std::env::var("APP_ENV") {
            app_settings.environment = environment;
        }
    }

    fn apply_backend_env_overrides(backend_settings: &mut BackendSettings) {
        if let Ok(api_base_url) = std::env::var("API_BASE_URL") {
            backend_settings.api_base_url = api_base_url;
        }
        if let Ok(timeout) = std::env::var("BACKEND_TIMEOUT_SECONDS") {
            if let Ok(timeout) = timeout.parse::<u64>() {
                backend_settings.timeout_seconds = timeout;
            }
        }
    }

    /// Load environment variables from .env file
    fn load_env_file() {
        if let Ok(contents) = std::fs::read_to_string(".env") {
            for line in contents.lines() {
                let line = line.trim();
                if line.starts_with('#') {
                    continue;
                }
                if let Some((key, value)) = line.split_once('=') {
                    std::env::set_var(key.trim(), value.trim());
                }
            }
        }
    }

    /// Get the bind address for the server
    #[must_use]
    pub fn get_bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }

    /// Get CORS origins as a vector of strings
    #[must_use]
    pub fn get_cors_origins(&self) -> Vec<String> {
        self.application
            .cors_origins
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        self.application.environment.eq_ignore_ascii_case("development")
    }

    /// Whether session cookies carry the `Secure` flag
    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.cookies.secure.unwrap_or(!self.is_development())
    }

    /// Redirect URI registered with the code-flow providers
    #[must_use]
    pub fn callback_url(&self) -> String {
        format!(
            "{}{}",
            self.application.app_url.trim_end_matches('/'),
            crate::routes::AUTH_CALLBACK
        )
    }

    /// Redirect URI registered with Google for the token flow
    #[must_use]
    pub fn google_callback_url(&self) -> String {
        format!(
            "{}{}",
            self.application.app_url.trim_end_matches('/'),
            crate::routes::GOOGLE_CALLBACK
        )
    }

    /// Backend endpoint that trades an OAuth identity for an application session
    #[must_use]
    pub fn oauth_login_url(&self) -> String {
        format!(
            "{}/api/users/oauth-login",
            self.backend.api_base_url.trim_end_matches('/')
        )
    }

    /// Get provider by name
    #[must_use]
    pub fn get_provider(&self, name: &str) -> Option<&ProviderSettings> {
        self.providers.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clean_env_vars() {
        for var in [
            "HOST",
            "PORT",
            "APP_URL",
            "APP_ENV",
            "API_BASE_URL",
            "BACKEND_TIMEOUT_SECONDS",
            "COOKIE_SECURE",
            "KAKAO_APP_KEY",
        ] {
            std::env::remove_var(var);
        }
    }

    #[test]
    fn test_default_settings() {
        let settings = MemogateSettings::with_default_providers();
        assert_eq!(settings.get_bind_address(), "0.0.0.0:3000");
        assert_eq!(settings.callback_url(), "http://localhost:3000/auth/callback");
        assert_eq!(
            settings.oauth_login_url(),
            "http://localhost:8080/api/users/oauth-login"
        );
        assert_eq!(settings.providers.len(), 3);
        assert!(settings.is_development());
        assert!(!settings.cookie_secure());
    }

    #[test]
    fn test_cookie_secure_follows_environment() {
        let mut settings = MemogateSettings::default();
        settings.application.environment = "production".to_string();
        assert!(settings.cookie_secure());

        settings.cookies.secure = Some(false);
        assert!(!settings.cookie_secure());
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clean_env_vars();
        std::env::set_var("PORT", "4100");
        std::env::set_var("API_BASE_URL", "https://api.example.com/");
        std::env::set_var("APP_ENV", "production");
        std::env::set_var("COOKIE_SECURE", "false");

        let mut settings = MemogateSettings::default();
        MemogateSettings::apply_env_overrides(&mut settings);

        assert_eq!(settings.application.port, 4100);
        assert_eq!(
            settings.oauth_login_url(),
            "https://api.example.com/api/users/oauth-login"
        );
        assert!(!settings.is_development());
        assert_eq!(settings.cookies.secure, Some(false));

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_invalid_port_is_ignored() {
        clean_env_vars();
        std::env::set_var("PORT", "not-a-port");

        let mut settings = MemogateSettings::default();
        MemogateSettings::apply_env_overrides(&mut settings);
        assert_eq!(settings.application.port, 3000);

        clean_env_vars();
    }

    #[test]
    #[serial]
    fn test_client_id_prefers_environment() {
        clean_env_vars();
        let mut provider = ProviderSettings::for_provider(OAuthProvider::Kakao);
        provider.client_id = Some("from-file".to_string());
        assert_eq!(provider.get_client_id().as_deref(), Some("from-file"));

        std::env::set_var("KAKAO_APP_KEY", "from-env");
        assert_eq!(provider.get_client_id().as_deref(), Some("from-env"));

        clean_env_vars();
    }

    #[test]
    fn test_toml_without_providers_keeps_defaults() {
        let settings = MemogateSettings::from_toml_str(
            r#"
            [application]
            app_url = "https://memo.example.com/"
            environment = "production"

            [backend]
            api_base_url = "https://api.example.com"
            "#,
        )
        .unwrap();

        assert_eq!(settings.callback_url(), "https://memo.example.com/auth/callback");
        assert_eq!(settings.application.port, 3000);
        assert_eq!(settings.providers.len(), 3);
        assert!(settings.get_provider("naver").is_some());
    }

    #[test]
    fn test_toml_providers_replace_defaults() {
        let settings = MemogateSettings::from_toml_str(
            r#"
            [[providers]]
            name = "kakao"
            client_id = "kakao-app"
            client_secret = "kakao-secret"
            "#,
        )
        .unwrap();

        assert_eq!(settings.providers.len(), 1);
        let kakao = settings.get_provider("kakao").unwrap();
        assert_eq!(kakao.provider(), Some(OAuthProvider::Kakao));
        assert_eq!(kakao.get_client_secret().as_deref(), Some("kakao-secret"));
        assert!(kakao.enabled);
    }

    #[test]
    fn test_settings_file_in_secrets_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Settings.toml");
        std::fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();

        let settings = MemogateSettings::from_toml_file(&path).unwrap();
        assert_eq!(settings.logging.level, "debug");
    }
}
