//! Network advertisements of KiLight devices.

use std::collections::BTreeMap;
use std::net::IpAddr;

use kilight_session::DEFAULT_PORT;
use serde::{Deserialize, Serialize};

/// TXT property carrying the device's hardware id
pub const HARDWARE_ID_PROPERTY: &str = "hwid";

/// A single zeroconf service advertisement.
///
/// Addresses can change between advertisements of the same device; the
/// `hwid` property is what identifies it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advertisement {
    /// mDNS hostname, e.g. `kilight-7f3a.local.`
    pub hostname: String,
    /// Service instance name
    pub name: String,
    /// Address the advertisement resolved to
    pub address: IpAddr,
    /// Advertised port, if any
    pub port: Option<u16>,
    /// TXT record properties
    pub properties: BTreeMap<String, String>,
}

impl Advertisement {
    pub fn new(hostname: impl Into<String>, address: IpAddr) -> Self {
        let hostname = hostname.into();
        Self {
            name: hostname.clone(),
            hostname,
            address,
            port: None,
            properties: BTreeMap::new(),
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Shorthand for setting the `hwid` property
    pub fn with_hardware_id(self, hardware_id: impl Into<String>) -> Self {
        self.with_property(HARDWARE_ID_PROPERTY, hardware_id)
    }

    /// Hardware id from the TXT record; empty values count as missing
    pub fn hardware_id(&self) -> Option<&str> {
        self.properties
            .get(HARDWARE_ID_PROPERTY)
            .map(String::as_str)
            .filter(|id| !id.is_empty())
    }

    pub fn is_ipv6(&self) -> bool {
        self.address.is_ipv6()
    }

    /// Host to connect to, as text
    pub fn host(&self) -> String {
        self.address.to_string()
    }

    /// Advertised port, or [`DEFAULT_PORT`]
    pub fn port_or_default(&self) -> u16 {
        self.port.filter(|port| *port != 0).unwrap_or(DEFAULT_PORT)
    }
}
