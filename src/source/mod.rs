pub mod http;

use std::future::Future;

use crate::models::DeviceList;

pub use http::HttpSource;

/// Anything that can produce the current device list.
pub trait DeviceSource {
    fn fetch(&self) -> impl Future<Output = Result<DeviceList, String>> + Send;
}
