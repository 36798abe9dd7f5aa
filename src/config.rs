use log::info;
use std::collections::HashMap;
use std::env;
use url::Url;

use crate::display::render::RenderMode;

const DEFAULT_SERVER_URL: &str = "http://iotgarden.local:8080/";
const DEFAULT_POLL_INTERVAL_MS: u64 = 30_000;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_OUTPUT_PATH: &str = "sensors.html";

#[derive(Debug, Clone)]
pub struct DisplayConfig {
    pub server_url: Url,
    pub poll_interval_ms: u64,
    pub http_timeout_secs: u64,
    pub output_path: String,
    pub render_mode: RenderMode,
    pub escape_markup: bool,
}

impl DisplayConfig {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        // Load environment variables
        dotenv::dotenv().ok();

        let vars: HashMap<String, String> = env::vars().collect();
        let config = Self::from_vars(&vars)?;

        info!("Server URL: {}", config.server_url);
        info!("Poll interval: {} ms", config.poll_interval_ms);
        info!("Output path: {}", config.output_path);
        info!(
            "Render mode: {:?}, escaping {}",
            config.render_mode,
            if config.escape_markup { "on" } else { "off" }
        );

        Ok(config)
    }

    /// Build a configuration from a variable map, applying defaults for
    /// anything unset.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, Box<dyn std::error::Error>> {
        let raw_url = vars
            .get("SERVER_URL")
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SERVER_URL);

        // Url::join drops the last path segment unless the base ends in '/'
        let raw_url = if raw_url.ends_with('/') {
            raw_url.to_string()
        } else {
            format!("{}/", raw_url)
        };

        let server_url =
            Url::parse(&raw_url).map_err(|e| format!("Invalid SERVER_URL '{}': {}", raw_url, e))?;
        if server_url.scheme() != "http" && server_url.scheme() != "https" {
            return Err(format!("SERVER_URL must be http or https, got '{}'", server_url.scheme()).into());
        }

        let poll_interval_ms = parse_positive(vars, "POLL_INTERVAL_MS", DEFAULT_POLL_INTERVAL_MS)?;
        let http_timeout_secs =
            parse_positive(vars, "HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?;

        let output_path = vars
            .get("OUTPUT_PATH")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_OUTPUT_PATH.to_string());

        let render_mode = if parse_flag(vars, "RENDER_ALL_DEVICES", false)? {
            RenderMode::All
        } else {
            RenderMode::LastOnly
        };
        let escape_markup = parse_flag(vars, "ESCAPE_MARKUP", true)?;

        Ok(DisplayConfig {
            server_url,
            poll_interval_ms,
            http_timeout_secs,
            output_path,
            render_mode,
            escape_markup,
        })
    }
}

fn parse_positive(
    vars: &HashMap<String, String>,
    key: &str,
    default: u64,
) -> Result<u64, Box<dyn std::error::Error>> {
    match vars.get(key) {
        None => Ok(default),
        Some(value) => {
            let parsed: u64 = value
                .trim()
                .parse()
                .map_err(|e| format!("Invalid {} '{}': {}", key, value, e))?;
            if parsed == 0 {
                return Err(format!("{} must be greater than zero", key).into());
            }
            Ok(parsed)
        }
    }
}

fn parse_flag(
    vars: &HashMap<String, String>,
    key: &str,
    default: bool,
) -> Result<bool, Box<dyn std::error::Error>> {
    match vars.get(key).map(|s| s.trim().to_ascii_lowercase()) {
        None => Ok(default),
        Some(value) => match value.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(format!("Invalid {} '{}': expected true or false", key, value).into()),
        },
    }
}
