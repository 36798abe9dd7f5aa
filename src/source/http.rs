/// HTTP retrieval of the device list from the garden server
use log::debug;
use std::future::Future;
use tokio::time::Duration;
use url::Url;

use crate::models::DeviceList;
use crate::source::DeviceSource;

// Relative path of the device list endpoint
const THDATA_PATH: &str = "thdata";

pub struct HttpSource {
    client: reqwest::Client,
    thdata_url: Url,
}

impl HttpSource {
    /// Create a source polling `<server_url>/thdata`
    ///
    /// # Arguments
    /// * `server_url` - Base URL of the garden server, ending in '/'
    /// * `timeout_secs` - Upper bound on a single request
    pub fn new(server_url: &Url, timeout_secs: u64) -> Result<Self, String> {
        let thdata_url = server_url
            .join(THDATA_PATH)
            .map_err(|e| format!("URL join error: {}", e))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| format!("HTTP client error: {}", e))?;

        Ok(HttpSource { client, thdata_url })
    }

    pub fn thdata_url(&self) -> &Url {
        &self.thdata_url
    }
}

impl DeviceSource for HttpSource {
    fn fetch(&self) -> impl Future<Output = Result<DeviceList, String>> + Send {
        async move {
            debug!("GET {}", self.thdata_url);

            let response = self
                .client
                .get(self.thdata_url.clone())
                .send()
                .await
                .map_err(|e| format!("Request error: {}", e))?;

            let status = response.status();
            if !status.is_success() {
                return Err(format!("Bad status: {}", status));
            }

            let body = response
                .bytes()
                .await
                .map_err(|e| format!("Body read error: {}", e))?;

            decode_device_list(&body)
        }
    }
}

/// Decode a `thdata` response body
pub fn decode_device_list(body: &[u8]) -> Result<DeviceList, String> {
    serde_json::from_slice(body).map_err(|e| format!("JSON decode error: {}", e))
}
