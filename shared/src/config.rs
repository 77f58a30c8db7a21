/// Runtime settings read from the environment (and `.env` via dotenvy in the binaries).
///
/// Every value has a default, so an empty environment gives the stock
/// behavior: `videos.json` next to the process, files under `videos/`,
/// listener on port 3000.
use std::path::PathBuf;

pub const DEFAULT_MANIFEST_PATH: &str = "videos.json";
pub const DEFAULT_DOWNLOAD_DIR: &str = "videos";
pub const DEFAULT_API_HOST: &str = "127.0.0.1";
pub const DEFAULT_API_PORT: u16 = 3000;
pub const DEFAULT_CONTENT_TYPE: &str = "video/mp4";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub manifest_path: PathBuf,
    pub download_dir: PathBuf,
    pub api_host: String,
    pub api_port: u16,
    pub enable_trigger_route: bool,
    pub continue_on_error: bool,
    pub expected_content_type: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            manifest_path: PathBuf::from(DEFAULT_MANIFEST_PATH),
            download_dir: PathBuf::from(DEFAULT_DOWNLOAD_DIR),
            api_host: DEFAULT_API_HOST.to_string(),
            api_port: DEFAULT_API_PORT,
            enable_trigger_route: false,
            continue_on_error: false,
            expected_content_type: DEFAULT_CONTENT_TYPE.to_string(),
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let manifest_path = lookup("MANIFEST_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.manifest_path);
        let download_dir = lookup("DOWNLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.download_dir);
        let api_host = lookup("API_HOST").unwrap_or(defaults.api_host);
        let api_port: u16 = lookup("API_PORT")
            .unwrap_or_else(|| DEFAULT_API_PORT.to_string())
            .parse()
            .unwrap_or(DEFAULT_API_PORT);
        let enable_trigger_route = lookup("ENABLE_TRIGGER_ROUTE")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        let continue_on_error = lookup("CONTINUE_ON_ERROR")
            .map(|v| parse_flag(&v))
            .unwrap_or(false);
        let expected_content_type =
            lookup("EXPECTED_CONTENT_TYPE").unwrap_or(defaults.expected_content_type);

        Self {
            manifest_path,
            download_dir,
            api_host,
            api_port,
            enable_trigger_route,
            continue_on_error,
            expected_content_type,
        }
    }

    /// `host:port` for the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
