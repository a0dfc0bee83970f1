use crate::datagram::Datagram;
use crate::error::Reject;
use crate::port::Port;
use crate::transport::Transport;
use std::net::Ipv4Addr;
use tracing::{debug, warn};
use usbnet_packets::{MacAddr, ETHER_MAX_LEN, IPV4_MAX_OPTIONS_LEN};

/// What became of a datagram that made it past validation and routing
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Output {
    /// Written to the device; carries the IP length
    Sent(usize),
    /// The next hop has no cache entry yet. An ARP request went out and the datagram
    /// was left with the caller to queue.
    Deferred,
}

impl<T: Transport> Port<T> {
    /// Validates, routes and, if the next hop is known, transmits one datagram.
    ///
    /// The datagram is only borrowed. On `Deferred` the caller keeps it and is expected
    /// to queue it; on `Err` it should be released.
    pub fn process_output(&mut self, datagram: &Datagram) -> Result<Output, Reject> {
        let frame_len = datagram.frame_len();
        if frame_len > ETHER_MAX_LEN || datagram.ip_len() > usize::from(self.config.mtu) {
            self.stats.send.bad_length += 1;
            return Err(Reject::BadLength(frame_len));
        }
        // The header length field counts 32 bit words and tops out at 60 bytes
        let options_len = datagram.options.len();
        if options_len > IPV4_MAX_OPTIONS_LEN || options_len % 4 != 0 {
            self.stats.send.bad_options += 1;
            return Err(Reject::BadOptions(options_len));
        }

        let mask = u32::from(self.config.subnet_mask);
        let destination = datagram.destination();
        let host = u32::from(destination) & !mask;
        // Network and broadcast addresses are never unicast destinations.
        // TODO: a datagram for a host that becomes valid after a mask change is dropped
        // here rather than held for revalidation.
        if host == 0 || host == !mask {
            self.stats.send.bad_host += 1;
            return Err(Reject::BadHost);
        }

        let next_hop = match self.next_hop(datagram) {
            Some(next_hop) => next_hop,
            None => {
                self.stats.send.bad_network += 1;
                return Err(Reject::BadNetwork);
            }
        };

        let dest_mac = match self.arp_cache.lookup(next_hop) {
            Some(mac) => mac,
            None => {
                debug!(port = %self.config.name, %next_hop, "next hop unresolved, deferring");
                self.send_arp_request(next_hop);
                return Ok(Output::Deferred);
            }
        };

        let now = self.clock.now();
        let frame = self.builder.ip_frame(dest_mac, self.mac_address, datagram);
        self.device.write(&mut self.stats.write, now, frame)?;
        self.stats.send.ip_packets += 1;
        Ok(Output::Sent(datagram.ip_len()))
    }

    /// The destination when it sits on our subnet, else the datagram's gateway when
    /// that does. There is no default route.
    fn next_hop(&self, datagram: &Datagram) -> Option<Ipv4Addr> {
        let destination = datagram.destination();
        if self.on_subnet(destination) {
            return Some(destination);
        }
        datagram.gateway.filter(|gateway| self.on_subnet(*gateway))
    }

    fn on_subnet(&self, ip: Ipv4Addr) -> bool {
        let mask = u32::from(self.config.subnet_mask);
        u32::from(ip) & mask == u32::from(self.config.ip_address) & mask
    }

    pub(crate) fn send_arp_request(&mut self, target_ip: Ipv4Addr) {
        let now = self.clock.now();
        let frame = self
            .builder
            .arp_request(self.mac_address, self.config.ip_address, target_ip);
        let length = frame.len();
        let result = self.device.write(&mut self.stats.write, now, frame);
        self.account_arp_send(result.is_ok(), length);
    }

    pub(crate) fn send_arp_reply(&mut self, dest_mac: MacAddr, dest_ip: Ipv4Addr) {
        let now = self.clock.now();
        let frame = self
            .builder
            .arp_reply(self.mac_address, self.config.ip_address, dest_mac, dest_ip);
        let length = frame.len();
        let result = self.device.write(&mut self.stats.write, now, frame);
        self.account_arp_send(result.is_ok(), length);
    }

    fn account_arp_send(&mut self, written: bool, length: usize) {
        self.stats.send.arp_packets += 1;
        if written {
            self.stats.port.sent_bytes += length as u64;
        } else {
            self.stats.send.arp_packets_err += 1;
            warn!(port = %self.config.name, "ARP frame not sent");
        }
    }
}
