//! Property-based tests for device records and scan-result merging.

use proptest::prelude::*;
use std::collections::HashMap;

use wledmark::services::discovery::merge_announcement;
use wledmark::types::device::{DeviceRecord, ExportDocument};

fn arb_host() -> impl Strategy<Value = String> {
    prop_oneof![
        // Dotted-quad addresses
        (0u8.., 0u8.., 0u8.., 0u8..).prop_map(|(a, b, c, d)| format!("{}.{}.{}.{}", a, b, c, d)),
        // mDNS hostnames
        "[a-z][a-z0-9-]{0,15}".prop_map(|h| format!("{}.local", h)),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(30))]

    // The derived URL always has the http scheme, the exact host, the exact
    // port, and a trailing slash.
    #[test]
    fn url_derivation_is_canonical(
        name in "[a-zA-Z0-9-]{1,20}",
        host in arb_host(),
        port in 1u16..,
    ) {
        let record = DeviceRecord::new(name, host.clone(), port);
        prop_assert_eq!(record.url, format!("http://{}:{}/", host, port));
    }

    // Merging any sequence of announcements leaves one record per distinct
    // name, carrying the values of that name's last announcement.
    #[test]
    fn merge_keeps_last_announcement_per_name(
        announcements in proptest::collection::vec(
            ("[a-d]", arb_host(), 1u16..),
            1..30,
        )
    ) {
        let mut devices = HashMap::new();
        for (name, host, port) in &announcements {
            merge_announcement(
                &mut devices,
                DeviceRecord::new(name.clone(), host.clone(), *port),
            );
        }

        // Expected: last occurrence wins for each name.
        let mut expected: HashMap<String, (String, u16)> = HashMap::new();
        for (name, host, port) in &announcements {
            expected.insert(name.clone(), (host.clone(), *port));
        }

        prop_assert_eq!(devices.len(), expected.len());
        for (name, (host, port)) in &expected {
            let record = &devices[name];
            prop_assert_eq!(&record.host, host);
            prop_assert_eq!(record.port, *port);
        }
    }

    // The export document is keyed by name and survives a JSON round trip.
    #[test]
    fn export_document_roundtrips(
        names in proptest::collection::hash_set("[a-z]{1,8}", 0..10),
    ) {
        let devices: Vec<DeviceRecord> = names
            .iter()
            .map(|n| DeviceRecord::new(n.clone(), "10.0.0.5", 80))
            .collect();

        let document = ExportDocument::from_devices(&devices);
        prop_assert_eq!(document.discovered_services.len(), devices.len());

        let json = serde_json::to_string(&document).unwrap();
        let parsed: ExportDocument = serde_json::from_str(&json).unwrap();
        for device in &devices {
            let record = &parsed.discovered_services[&device.name];
            prop_assert_eq!(&record.url, &device.url);
        }
    }
}
