/// Periodic refresh of the sensors panel
use log::{debug, error, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::time::{interval, Duration, MissedTickBehavior};

use crate::display::{render_devices, RenderOptions, RenderTarget};
use crate::source::DeviceSource;
use crate::utils::now_millis;

#[derive(Debug, Clone, PartialEq)]
pub enum RefreshOutcome {
    /// The target now shows the fetched list
    Rendered { devices: usize },
    /// Another refresh was still in flight; nothing was done
    Skipped,
    /// Fetch or write failed; the target keeps its previous content
    Failed(String),
}

pub struct Poller<S, T> {
    source: S,
    target: T,
    options: RenderOptions,
    in_flight: AtomicBool,
}

// Clears the in-flight flag even if the refresh future is dropped mid-way
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: DeviceSource, T: RenderTarget> Poller<S, T> {
    pub fn new(source: S, target: T, options: RenderOptions) -> Self {
        Poller {
            source,
            target,
            options,
            in_flight: AtomicBool::new(false),
        }
    }

    #[cfg(test)]
    pub fn target(&self) -> &T {
        &self.target
    }

    /// Fetch the device list and replace the target's content
    ///
    /// Only one refresh runs at a time; a call made while another is in
    /// flight returns `Skipped` without touching the target.
    pub async fn refresh(&self) -> RefreshOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return RefreshOutcome::Skipped;
        }
        let _guard = InFlightGuard(&self.in_flight);

        let list = match self.source.fetch().await {
            Ok(list) => list,
            Err(e) => return RefreshOutcome::Failed(e),
        };

        let ts = now_millis();
        info!("updating HTML...");
        for device in &list.devices {
            debug!(
                "{} ({}): T={}°C, H={}%",
                device.name, device.macid, device.temperature, device.humidity
            );
        }
        if list.devices.is_empty() {
            warn!("Server returned no devices");
        }

        let markup = render_devices(&list.devices, ts, self.options);
        match self.target.replace(markup).await {
            Ok(()) => RefreshOutcome::Rendered {
                devices: list.devices.len(),
            },
            Err(e) => RefreshOutcome::Failed(e),
        }
    }

    /// Refresh immediately, then every `period` for as long as the future is polled
    pub async fn run(&self, period: Duration) {
        info!("Polling every {} ms", period.as_millis());

        // First tick completes immediately
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            match self.refresh().await {
                RefreshOutcome::Rendered { devices } => {
                    debug!("Rendered {} device(s)", devices);
                }
                RefreshOutcome::Skipped => {
                    warn!("Previous refresh still in flight, skipping tick");
                }
                RefreshOutcome::Failed(e) => {
                    error!("Refresh failed: {}", e);
                }
            }
        }
    }
}
