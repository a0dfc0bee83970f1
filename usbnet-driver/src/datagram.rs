use std::net::Ipv4Addr;
use std::time::Instant;
use usbnet_packets::{Ipv4Header, ETHER_HEADER_LEN, IPV4_HEADER_LEN};

/// An IPv4 datagram as the host stack hands it over: fixed header, options and payload
/// kept apart, plus the bookkeeping the port needs while the datagram sits in a queue.
///
/// A datagram has exactly one owner at a time. Moving it into or out of a queue moves
/// ownership; dropping it releases it.
#[derive(Clone, Debug, PartialEq)]
pub struct Datagram {
    pub header: Ipv4Header,
    pub options: Vec<u8>,
    pub payload: Vec<u8>,
    /// Next hop the host picked for off-subnet destinations. Inbound datagrams have none.
    pub gateway: Option<Ipv4Addr>,
    /// Set when a queue takes the datagram; `None` never expires.
    pub expiry: Option<Instant>,
}

impl Datagram {
    /// Builds a datagram whose header length, total length and checksum agree with
    /// the options and payload given.
    pub fn new(mut header: Ipv4Header, options: Vec<u8>, payload: Vec<u8>) -> Self {
        let header_len = IPV4_HEADER_LEN + options.len();
        header.set_ihl(header_len);
        header.set_total_len((header_len + payload.len()) as u16);
        header.set_checksum(&options);
        Datagram {
            header,
            options,
            payload,
            gateway: None,
            expiry: None,
        }
    }

    /// Takes the header exactly as received, without touching length or checksum fields
    pub fn from_parts(header: Ipv4Header, options: Vec<u8>, payload: Vec<u8>) -> Self {
        Datagram {
            header,
            options,
            payload,
            gateway: None,
            expiry: None,
        }
    }

    pub fn with_gateway(self, gateway: Ipv4Addr) -> Self {
        Datagram {
            gateway: Some(gateway),
            ..self
        }
    }

    pub fn destination(&self) -> Ipv4Addr {
        self.header.dest_addr()
    }

    /// Bytes this datagram occupies on the IP layer
    pub fn ip_len(&self) -> usize {
        IPV4_HEADER_LEN + self.options.len() + self.payload.len()
    }

    /// Bytes of the unpadded Ethernet frame that would carry it
    pub fn frame_len(&self) -> usize {
        ETHER_HEADER_LEN + self.ip_len()
    }

    pub fn is_expired(&self, now: Instant) -> bool {
        self.expiry.map_or(false, |expiry| now >= expiry)
    }
}
