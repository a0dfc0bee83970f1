use crate::arp_cache::ArpEntry;
use crate::error::DriverError;
use crate::port::Port;
use crate::stats::Statistics;
use crate::trace::TraceEntry;
use crate::transport::Transport;
use std::net::Ipv4Addr;
use tracing::{info, warn};
use usbnet_packets::MacAddr;

/// Hardware selections the driver can report. Index 0 means nothing was chosen.
pub const SUPPORTED_HARDWARE: &[&str] = &["No selection", "USB Network"];

/// Requests the host can make of a port outside the data path
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    GetMac,
    SetMac(MacAddr),
    InquireSupportedTypes,
    SetType(u8),
    GetType,
    GetStats,
    ClearStats,
    GetArpTable,
    ClearArpTable,
    GetTrace,
    ClearTrace,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ControlReply {
    Done,
    Mac(MacAddr),
    SupportedTypes(&'static [&'static str]),
    /// `None` until the host selects one
    Type(Option<u8>),
    Stats(StatsReport),
    ArpTable(Vec<ArpEntry>),
    Trace(Vec<TraceEntry>),
}

/// Counters plus the port details a status display wants alongside them
#[derive(Clone, Debug, PartialEq)]
pub struct StatsReport {
    pub statistics: Statistics,
    pub hardware_address: MacAddr,
    pub mac_address: MacAddr,
    pub ip_address: Ipv4Addr,
    pub subnet_mask: Ipv4Addr,
    pub arp_entries: usize,
    pub trace_entries: usize,
}

impl<T: Transport> Port<T> {
    pub fn control(&mut self, request: Control) -> Result<ControlReply, DriverError> {
        let reply = match request {
            Control::GetMac => {
                // The override stays in force even if the adapter can't be asked
                match self.device.read_hardware_address(self.clock.now()) {
                    Ok(mac) => self.hardware_address = mac,
                    Err(error) => {
                        warn!(port = %self.config.name, %error, "keeping last known hardware address")
                    }
                }
                ControlReply::Mac(self.mac_address)
            }
            Control::SetMac(mac) => {
                info!(port = %self.config.name, %mac, "mac address set");
                self.mac_address = mac;
                ControlReply::Done
            }
            Control::InquireSupportedTypes => ControlReply::SupportedTypes(SUPPORTED_HARDWARE),
            Control::SetType(selection) => {
                self.hardware_type = Some(selection & 0x07);
                ControlReply::Done
            }
            Control::GetType => ControlReply::Type(self.hardware_type),
            Control::GetStats => ControlReply::Stats(StatsReport {
                statistics: self.stats,
                hardware_address: self.hardware_address,
                mac_address: self.mac_address,
                ip_address: self.config.ip_address,
                subnet_mask: self.config.subnet_mask,
                arp_entries: self.arp_cache.count(),
                trace_entries: self.device.trace().capacity(),
            }),
            Control::ClearStats => {
                self.stats.clear();
                ControlReply::Done
            }
            Control::GetArpTable => {
                let mut table = vec![
                    ArpEntry {
                        ip: Ipv4Addr::UNSPECIFIED,
                        mac: MacAddr::default(),
                    };
                    self.arp_cache.count()
                ];
                let written = self.arp_cache.snapshot(&mut table);
                table.truncate(written);
                ControlReply::ArpTable(table)
            }
            Control::ClearArpTable => {
                self.arp_cache.reset();
                info!(port = %self.config.name, "ARP cache cleared");
                ControlReply::Done
            }
            Control::GetTrace => ControlReply::Trace(self.device.trace().entries()),
            Control::ClearTrace => {
                self.device.trace_mut().clear();
                ControlReply::Done
            }
        };
        Ok(reply)
    }
}
