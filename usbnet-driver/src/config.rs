use crate::error::DriverError;
use std::net::Ipv4Addr;
use std::time::Duration;

/// Settings a port is created with. Built by chaining setters onto `DriverConfig::new()`.
///
/// An unconfigured port answers to 255.255.255.255/32, so nothing is routable until
/// the host assigns an address and mask.
#[derive(Clone, Debug, PartialEq)]
pub struct DriverConfig {
    pub name: String,
    pub ip_address: Ipv4Addr,
    pub subnet_mask: Ipv4Addr,
    pub mtu: u16,
    pub arp_cache_capacity: usize,
    pub trace_capacity: usize,
    pub datagram_ttl: Duration,
}

impl DriverConfig {
    pub fn new() -> Self {
        DriverConfig {
            name: String::from("USB0"),
            ip_address: Ipv4Addr::BROADCAST,
            subnet_mask: Ipv4Addr::BROADCAST,
            mtu: 1500,
            arp_cache_capacity: 32,
            trace_capacity: 0,
            datagram_ttl: Duration::from_secs(30),
        }
    }

    pub fn name(self, name: &str) -> Self {
        DriverConfig {
            name: name.to_string(),
            ..self
        }
    }

    pub fn ip_address(self, ip_address: Ipv4Addr) -> Self {
        DriverConfig { ip_address, ..self }
    }

    pub fn subnet_mask(self, subnet_mask: Ipv4Addr) -> Self {
        DriverConfig {
            subnet_mask,
            ..self
        }
    }

    pub fn mtu(self, mtu: u16) -> Self {
        DriverConfig { mtu, ..self }
    }

    pub fn arp_cache_capacity(self, arp_cache_capacity: usize) -> Self {
        DriverConfig {
            arp_cache_capacity,
            ..self
        }
    }

    /// Number of transport events kept for diagnostics. Zero turns tracing off.
    pub fn trace_capacity(self, trace_capacity: usize) -> Self {
        DriverConfig {
            trace_capacity,
            ..self
        }
    }

    /// How long a datagram may sit in one of the port's queues before it is discarded.
    pub fn datagram_ttl(self, datagram_ttl: Duration) -> Self {
        DriverConfig {
            datagram_ttl,
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), DriverError> {
        if self.arp_cache_capacity == 0 {
            return Err(DriverError::Config("arp_cache_capacity must be at least 1"));
        }
        if self.mtu == 0 || self.mtu > 1500 {
            return Err(DriverError::Config("mtu must be between 1 and 1500"));
        }
        if self.name.is_empty() {
            return Err(DriverError::Config("port name must not be empty"));
        }
        Ok(())
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::new()
    }
}
