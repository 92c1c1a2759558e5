//! Time-boxed mDNS discovery of WLED controllers.
//!
//! A scan browses for the fixed `_wled._tcp.local.` service type for exactly
//! the requested duration, merging every resolved announcement into a map
//! keyed by instance name. The map's values are the scan result; a device
//! that never answers within the window is simply absent.

use mdns_sd::{ServiceDaemon, ServiceEvent, ServiceInfo};
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::types::device::DeviceRecord;
use crate::types::errors::ScanError;

/// Service type advertised by WLED controllers.
pub const WLED_SERVICE_TYPE: &str = "_wled._tcp.local.";

/// How long a single channel wait may block, so the deadline is checked
/// at a reasonable granularity.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Browses the local network for WLED controllers.
pub struct DiscoveryEngine {
    service_type: &'static str,
}

impl DiscoveryEngine {
    pub fn new() -> Self {
        Self {
            service_type: WLED_SERVICE_TYPE,
        }
    }

    /// Listens for service announcements for exactly `duration`, then returns
    /// the deduplicated set of devices seen.
    ///
    /// Announcements arriving while the window is open are merged
    /// last-write-wins by instance name, so a device that re-announces with a
    /// new address updates its record rather than duplicating it. The browse
    /// is stopped before the results are read, so no merge races the return.
    ///
    /// # Errors
    /// `InvalidDuration` for a zero duration; `Daemon` if the mDNS daemon
    /// cannot be started or the browse request fails.
    pub fn scan(&self, duration: Duration) -> Result<Vec<DeviceRecord>, ScanError> {
        if duration.is_zero() {
            return Err(ScanError::InvalidDuration(duration.as_secs()));
        }

        info!(
            duration_secs = duration.as_secs_f32(),
            service_type = self.service_type,
            "Scanning for WLED controllers"
        );

        let daemon = ServiceDaemon::new().map_err(|e| ScanError::Daemon(e.to_string()))?;
        let receiver = daemon
            .browse(self.service_type)
            .map_err(|e| ScanError::Daemon(e.to_string()))?;

        let mut devices: HashMap<String, DeviceRecord> = HashMap::new();
        let deadline = Instant::now() + duration;

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            match receiver.recv_timeout(remaining.min(POLL_INTERVAL)) {
                Ok(ServiceEvent::ServiceResolved(service)) => {
                    if let Some(record) = record_from_service(self.service_type, &service) {
                        debug!(name = %record.name, url = %record.url, "Controller resolved");
                        merge_announcement(&mut devices, record);
                    }
                }
                Ok(ServiceEvent::ServiceRemoved(_, fullname)) => {
                    debug!(name = %fullname, "Service removed during scan");
                }
                Ok(_) => {}
                // Timeout: loop around and re-check the deadline.
                Err(_) => {}
            }
        }

        // Stop listening before reading results. Both calls are safe to fail
        // on an already-stopped daemon, so shutdown is idempotent.
        if let Err(e) = daemon.stop_browse(self.service_type) {
            warn!(error = %e, "stop_browse after scan window");
        }
        let _ = daemon.shutdown();

        let mut result: Vec<DeviceRecord> = devices.into_values().collect();
        result.sort_by(|a, b| a.name.cmp(&b.name));

        info!(count = result.len(), "Scan completed");
        Ok(result)
    }
}

impl Default for DiscoveryEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Merges one announcement into the scan result, keyed by instance name.
/// A repeated name overwrites the previous host/port (last-write-wins).
pub fn merge_announcement(devices: &mut HashMap<String, DeviceRecord>, record: DeviceRecord) {
    devices.insert(record.name.clone(), record);
}

/// Strips the service-type suffix from an mDNS fullname, leaving the
/// instance name (`kitchen._wled._tcp.local.` → `kitchen`).
pub fn instance_name<'a>(fullname: &'a str, service_type: &str) -> &'a str {
    fullname
        .strip_suffix(service_type)
        .map(|n| n.trim_end_matches('.'))
        .unwrap_or(fullname)
}

/// Converts a resolved mDNS service into a `DeviceRecord`, preferring a
/// concrete address over the advertised hostname. Returns `None` when the
/// announcement carries neither.
fn record_from_service(service_type: &str, service: &ServiceInfo) -> Option<DeviceRecord> {
    let name = instance_name(service.get_fullname(), service_type).to_string();
    let host = service
        .get_addresses()
        .iter()
        .min()
        .map(|addr| addr.to_string())
        .or_else(|| {
            let h = service.get_hostname().trim_end_matches('.');
            if h.is_empty() {
                None
            } else {
                Some(h.to_string())
            }
        })?;
    Some(DeviceRecord::new(name, host, service.get_port()))
}
