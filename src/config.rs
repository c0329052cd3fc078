//! Configuration management for storefront-pom
//!
//! One `Config` is built at scenario start and handed to the browser handle and
//! the page objects. Values come from defaults, an optional TOML file and
//! `STOREFRONT_*` environment variables, in that order of precedence.

use crate::{Error, Result};
use serde::Deserialize;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Supported browser variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum BrowserKind {
    #[default]
    Chrome,
    Chromium,
    Edge,
    Firefox,
}

impl BrowserKind {
    /// Product prefix reported by the browser's `/json/version` endpoint
    pub fn product_prefix(&self) -> &'static str {
        match self {
            BrowserKind::Chrome | BrowserKind::Chromium => "Chrome",
            BrowserKind::Edge => "Edg",
            BrowserKind::Firefox => "Firefox",
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Chromium => "chromium",
            BrowserKind::Edge => "edge",
            BrowserKind::Firefox => "firefox",
        };
        f.write_str(name)
    }
}

impl FromStr for BrowserKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "chrome" => Ok(BrowserKind::Chrome),
            "chromium" => Ok(BrowserKind::Chromium),
            "edge" | "msedge" => Ok(BrowserKind::Edge),
            "firefox" => Ok(BrowserKind::Firefox),
            other => Err(Error::configuration(format!("Unsupported browser: {}", other))),
        }
    }
}

impl TryFrom<String> for BrowserKind {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// Test account used by login scenarios
#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    /// Account from `STOREFRONT_EMAIL` and `STOREFRONT_PASSWORD`, when both are set
    pub fn from_env() -> Option<Self> {
        match (env::var("STOREFRONT_EMAIL"), env::var("STOREFRONT_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(Self { email, password }),
            _ => None,
        }
    }
}

/// Scenario configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the storefront under test
    pub base_url: String,

    /// Browser variant the endpoint is expected to serve
    pub browser: BrowserKind,

    /// CDP endpoint of a browser started with remote debugging
    pub cdp_endpoint: String,

    /// Window width
    pub window_width: u32,

    /// Window height
    pub window_height: u32,

    /// Default timeout for wait calls in milliseconds
    pub wait_timeout_ms: u64,

    /// Timeout for slow transitions (checkout, payment) in milliseconds
    pub long_wait_timeout_ms: u64,

    /// Delay between two polling ticks in milliseconds
    pub poll_interval_ms: u64,

    /// Upper bound for a single remote command in milliseconds
    pub command_timeout_ms: u64,

    /// Directory screenshots are written to
    pub screenshot_dir: PathBuf,

    /// Optional test account
    pub credentials: Option<Credentials>,

    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            browser: BrowserKind::Chrome,
            cdp_endpoint: "ws://localhost:9222".to_string(),
            window_width: 1920,
            window_height: 1080,
            wait_timeout_ms: 10_000,
            long_wait_timeout_ms: 30_000,
            poll_interval_ms: 100,
            command_timeout_ms: 30_000,
            screenshot_dir: PathBuf::from("screenshots"),
            credentials: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let mut config = Config::default();

        if let Ok(base_url) = env::var("STOREFRONT_BASE_URL") {
            config.base_url = base_url;
        }

        if let Ok(browser) = env::var("STOREFRONT_BROWSER") {
            config.browser = browser.parse()?;
        }

        if let Ok(endpoint) = env::var("STOREFRONT_CDP_ENDPOINT") {
            config.cdp_endpoint = endpoint;
        }

        if let Ok(timeout) = env::var("STOREFRONT_WAIT_TIMEOUT_MS") {
            config.wait_timeout_ms = timeout
                .parse()
                .map_err(|_| Error::configuration("Invalid STOREFRONT_WAIT_TIMEOUT_MS"))?;
        }

        if let Ok(timeout) = env::var("STOREFRONT_LONG_WAIT_TIMEOUT_MS") {
            config.long_wait_timeout_ms = timeout
                .parse()
                .map_err(|_| Error::configuration("Invalid STOREFRONT_LONG_WAIT_TIMEOUT_MS"))?;
        }

        if let Ok(interval) = env::var("STOREFRONT_POLL_INTERVAL_MS") {
            config.poll_interval_ms = interval
                .parse()
                .map_err(|_| Error::configuration("Invalid STOREFRONT_POLL_INTERVAL_MS"))?;
        }

        if let Ok(dir) = env::var("STOREFRONT_SCREENSHOT_DIR") {
            config.screenshot_dir = PathBuf::from(dir);
        }

        if let Some(credentials) = Credentials::from_env() {
            config.credentials = Some(credentials);
        }

        if let Ok(log_level) = env::var("STOREFRONT_LOG_LEVEL") {
            config.log_level = log_level;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::configuration(format!("Failed to read config file: {}", e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Layer defaults, an optional file and `STOREFRONT_*` variables
    ///
    /// Nested keys use a double underscore (`STOREFRONT_CREDENTIALS__EMAIL`).
    /// `STOREFRONT_EMAIL` and `STOREFRONT_PASSWORD` are honoured as in
    /// [`Config::from_env`] and win over the file.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        let mut config: Config = builder
            .add_source(
                config::Environment::with_prefix("STOREFRONT")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(|e| Error::configuration(format!("Failed to load config: {}", e)))?;

        if let Some(credentials) = Credentials::from_env() {
            config.credentials = Some(credentials);
        }

        config.validate()?;
        Ok(config)
    }

    /// Reject values the browser handle cannot work with
    pub fn validate(&self) -> Result<()> {
        reqwest::Url::parse(&self.base_url)
            .map_err(|e| Error::configuration(format!("Invalid base_url '{}': {}", self.base_url, e)))?;

        if self.poll_interval_ms == 0 {
            return Err(Error::configuration("poll_interval_ms must be greater than zero"));
        }

        if self.wait_timeout_ms < self.poll_interval_ms {
            return Err(Error::configuration(
                "wait_timeout_ms must not be shorter than poll_interval_ms",
            ));
        }

        Ok(())
    }

    /// Join a site path onto the base URL
    pub fn page_url(&self, path: &str) -> Result<String> {
        let base = reqwest::Url::parse(&self.base_url)
            .map_err(|e| Error::configuration(format!("Invalid base_url: {}", e)))?;
        base.join(path)
            .map(|url| url.to_string())
            .map_err(|e| Error::configuration(format!("Invalid page path '{}': {}", path, e)))
    }

    /// Default wait timeout
    pub fn wait_timeout(&self) -> Duration {
        Duration::from_millis(self.wait_timeout_ms)
    }

    /// Timeout for slow transitions
    pub fn long_wait_timeout(&self) -> Duration {
        Duration::from_millis(self.long_wait_timeout_ms)
    }

    /// Polling delay
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Timestamped screenshot path for a scenario
    pub fn screenshot_path(&self, scenario: &str) -> PathBuf {
        let stamp = chrono::Utc::now().format("%Y%m%d-%H%M%S");
        let name: String = scenario
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
            .collect();
        self.screenshot_dir.join(format!("{}-{}.png", name, stamp))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.wait_timeout(), Duration::from_secs(10));
        assert_eq!(config.long_wait_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_page_url_joins_base() {
        let config = Config {
            base_url: "https://example.test/".to_string(),
            ..Default::default()
        };
        assert_eq!(config.page_url("/cart").unwrap(), "https://example.test/cart");
        assert_eq!(
            config.page_url("account/login").unwrap(),
            "https://example.test/account/login"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config = Config {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(Error::Configuration(_))));
    }

    #[test]
    fn test_zero_poll_interval_rejected() {
        let config = Config {
            poll_interval_ms: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_browser_kind_parsing() {
        assert_eq!("Chrome".parse::<BrowserKind>().unwrap(), BrowserKind::Chrome);
        assert_eq!("msedge".parse::<BrowserKind>().unwrap(), BrowserKind::Edge);
        assert_eq!("firefox".parse::<BrowserKind>().unwrap(), BrowserKind::Firefox);
        assert!("netscape".parse::<BrowserKind>().is_err());
    }

    #[test]
    fn test_from_toml() {
        let config: Config = toml::from_str(
            r#"
            base_url = "https://shop.example.test"
            browser = "firefox"
            wait_timeout_ms = 5000

            [credentials]
            email = "qa@example.test"
            password = "hunter2"
            "#,
        )
        .unwrap();

        assert_eq!(config.browser, BrowserKind::Firefox);
        assert_eq!(config.wait_timeout_ms, 5000);
        assert_eq!(config.poll_interval_ms, 100);
        assert_eq!(config.credentials.unwrap().email, "qa@example.test");
    }

    #[test]
    fn test_browser_kind_alias_in_toml() {
        let config: Config = toml::from_str(r#"browser = "msedge""#).unwrap();
        assert_eq!(config.browser, BrowserKind::Edge);
        assert!(toml::from_str::<Config>(r#"browser = "netscape""#).is_err());
    }

    // Only test touching process env; keep every STOREFRONT_* variable here.
    #[test]
    fn test_load_layers_environment() {
        let dir = std::env::temp_dir().join(format!("pom-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join("storefront.toml");
        std::fs::write(
            &file,
            "base_url = \"https://shop.example.test\"\nwait_timeout_ms = 4000\n",
        )
        .unwrap();
        let path = file.to_string_lossy().to_string();

        env::set_var("STOREFRONT_EMAIL", "qa@example.test");
        env::set_var("STOREFRONT_PASSWORD", "hunter2");
        env::set_var("STOREFRONT_BROWSER", "msedge");
        env::set_var("STOREFRONT_POLL_INTERVAL_MS", "50");

        let loaded = Config::load(Some(&path));
        let from_env = Config::from_env();

        for key in [
            "STOREFRONT_EMAIL",
            "STOREFRONT_PASSWORD",
            "STOREFRONT_BROWSER",
            "STOREFRONT_POLL_INTERVAL_MS",
        ] {
            env::remove_var(key);
        }
        let _ = std::fs::remove_dir_all(&dir);

        let loaded = loaded.unwrap();
        assert_eq!(loaded.base_url, "https://shop.example.test");
        assert_eq!(loaded.wait_timeout_ms, 4000);
        assert_eq!(loaded.poll_interval_ms, 50);
        assert_eq!(loaded.browser, BrowserKind::Edge);
        let credentials = loaded.credentials.unwrap();
        assert_eq!(credentials.email, "qa@example.test");
        assert_eq!(credentials.password, "hunter2");

        let from_env = from_env.unwrap();
        assert_eq!(from_env.browser, loaded.browser);
        assert_eq!(from_env.credentials.unwrap().email, "qa@example.test");
    }

    #[test]
    fn test_screenshot_path_is_sanitized() {
        let config = Config::default();
        let path = config.screenshot_path("add to cart / guest");
        let file = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(file.starts_with("add_to_cart___guest-"));
        assert!(file.ends_with(".png"));
    }
}
