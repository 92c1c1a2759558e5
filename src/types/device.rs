use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One WLED controller discovered during a scan.
///
/// `name` is the mDNS instance name and acts as the dedup key: a later
/// announcement with the same name replaces the host/port of an earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub url: String,
}

impl DeviceRecord {
    /// Builds a record with the control-page URL derived from host and port.
    pub fn new(name: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        let name = name.into();
        let host = host.into();
        let url = format!("http://{}:{}/", host, port);
        Self { name, host, port, url }
    }
}

/// Address fields of a device as written to the export file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRecord {
    pub host: String,
    pub port: u16,
    pub url: String,
}

/// Top-level shape of the export file: a mapping from instance name to
/// address fields, wrapped under a `discovered_services` key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    pub discovered_services: BTreeMap<String, ExportRecord>,
}

impl ExportDocument {
    /// Converts a scan result into the export document shape.
    pub fn from_devices(devices: &[DeviceRecord]) -> Self {
        let discovered_services = devices
            .iter()
            .map(|d| {
                (
                    d.name.clone(),
                    ExportRecord {
                        host: d.host.clone(),
                        port: d.port,
                        url: d.url.clone(),
                    },
                )
            })
            .collect();
        Self { discovered_services }
    }
}
