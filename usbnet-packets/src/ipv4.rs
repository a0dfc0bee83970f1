use crate::*;
use std::borrow::Cow;
use std::convert::{TryFrom, TryInto};
use std::net::Ipv4Addr;

/// The fixed 20 byte part of an IPv4 header. Options travel separately.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Ipv4Header {
    data: [u8; IPV4_HEADER_LEN],
}

impl Default for Ipv4Header {
    fn default() -> Self {
        Ipv4Header::new()
    }
}

impl Ipv4Header {
    /// Version 4, no options, a TTL of 64, everything else zero.
    pub fn new() -> Ipv4Header {
        let mut data = [0; IPV4_HEADER_LEN];
        data[0] = 0x45;
        data[8] = 64;
        data[3] = IPV4_HEADER_LEN as u8;
        Ipv4Header { data }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Ipv4Header, &'static str> {
        let data: [u8; IPV4_HEADER_LEN] = bytes
            .get(..IPV4_HEADER_LEN)
            .and_then(|b| b.try_into().ok())
            .ok_or("Data is too short to be an IPv4 header")?;
        Ok(Ipv4Header { data })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn version(&self) -> u8 {
        (self.data[0] & 0xF0) >> 4
    }

    /// Header length in 32bit words, options included
    pub fn ihl(&self) -> u8 {
        self.data[0] & 0x0F
    }

    pub fn set_ihl(&mut self, header_length: usize) {
        self.data[0] &= 0xF0; // Clear least sig 4 bits
        self.data[0] |= 0x0F & ((header_length / 4) as u8);
    }

    pub fn total_len(&self) -> u16 {
        u16::from_be_bytes([self.data[2], self.data[3]])
    }

    pub fn set_total_len(&mut self, len: u16) {
        self.data[2..4].copy_from_slice(&len.to_be_bytes());
    }

    pub fn dscp(&self) -> u8 {
        self.data[1] >> 2
    }

    pub fn ecn(&self) -> u8 {
        self.data[1] & 0x03
    }

    pub fn identification(&self) -> u16 {
        u16::from_be_bytes([self.data[4], self.data[5]])
    }

    pub fn set_identification(&mut self, id: u16) {
        self.data[4..6].copy_from_slice(&id.to_be_bytes());
    }

    /// Returns tuple of (Don't Fragment, More Fragments)
    pub fn flags(&self) -> (bool, bool) {
        let df = (self.data[6] & 0x40) != 0;
        let mf = (self.data[6] & 0x20) != 0;
        (df, mf)
    }

    pub fn fragment_offset(&self) -> u16 {
        u16::from_be_bytes([self.data[6] & 0x1F, self.data[7]])
    }

    pub fn ttl(&self) -> u8 {
        self.data[8]
    }

    pub fn protocol(&self) -> u8 {
        self.data[9]
    }

    pub fn set_protocol(&mut self, protocol: u8) {
        self.data[9] = protocol;
    }

    pub fn checksum(&self) -> u16 {
        u16::from_be_bytes([self.data[10], self.data[11]])
    }

    pub fn src_addr(&self) -> Ipv4Addr {
        Ipv4Addr::new(self.data[12], self.data[13], self.data[14], self.data[15])
    }

    pub fn set_src_addr(&mut self, addr: Ipv4Addr) {
        self.data[12..16].copy_from_slice(&addr.octets());
    }

    pub fn dest_addr(&self) -> Ipv4Addr {
        Ipv4Addr::new(self.data[16], self.data[17], self.data[18], self.data[19])
    }

    pub fn set_dest_addr(&mut self, addr: Ipv4Addr) {
        self.data[16..20].copy_from_slice(&addr.octets());
    }

    /// Calculates what the checksum should be set to given the current header and
    /// options. The checksum field itself is skipped.
    pub fn calculate_checksum(&self, options: &[u8]) -> u16 {
        let header_sum = self
            .data
            .chunks_exact(2)
            .enumerate()
            .filter(|x| x.0 != 5)
            .fold(0, |acc: u32, x| {
                acc + u32::from(u16::from_be_bytes([x.1[0], x.1[1]]))
            });
        let full_sum = options.chunks(2).fold(header_sum, |acc, x| {
            acc + u32::from(u16::from_be_bytes([x[0], *x.get(1).unwrap_or(&0)]))
        });
        !fold_carries(full_sum)
    }

    /// Sets checksum field to valid value
    pub fn set_checksum(&mut self, options: &[u8]) {
        let new_checksum = self.calculate_checksum(options);
        self.data[10..12].copy_from_slice(&new_checksum.to_be_bytes());
    }

    pub fn validate_checksum(&self, options: &[u8]) -> bool {
        self.checksum() == self.calculate_checksum(options)
    }
}

fn fold_carries(mut sum: u32) -> u16 {
    while sum > 0xFFFF {
        sum = (sum & 0xFFFF) + (sum >> 16);
    }
    sum as u16
}

/// An IPv4 datagram carried in an Ethernet frame, checked against the limits the link
/// layer enforces before anything is copied out of it.
#[derive(Clone, Debug)]
pub struct Ipv4Packet {
    frame: EthernetFrame,
    header_len: usize,
    total_len: usize,
}

impl Ipv4Packet {
    pub fn header(&self) -> Ipv4Header {
        Ipv4Header {
            data: self.ip_data()[..IPV4_HEADER_LEN]
                .try_into()
                .unwrap_or([0; IPV4_HEADER_LEN]),
        }
    }

    /// Header length in bytes, options included
    pub fn header_len(&self) -> usize {
        self.header_len
    }

    pub fn total_len(&self) -> usize {
        self.total_len
    }

    pub fn options(&self) -> Cow<[u8]> {
        Cow::from(&self.ip_data()[IPV4_HEADER_LEN..self.header_len])
    }

    /// The payload up to the IPv4 total length. Ethernet padding is not part of it.
    pub fn payload(&self) -> Cow<[u8]> {
        Cow::from(&self.ip_data()[self.header_len..self.total_len])
    }

    // Move ownership of the frame back to the caller
    pub fn frame(self) -> EthernetFrame {
        self.frame
    }

    fn ip_data(&self) -> &[u8] {
        &self.frame.data[ETHER_HEADER_LEN..]
    }
}

impl TryFrom<EthernetFrame> for Ipv4Packet {
    type Error = &'static str;

    ///
    /// Validates
    /// - The frame length lies within the Ethernet minimum and maximum
    /// - The version field is 4
    /// - The total length field fits inside the frame
    /// - The header length covers at least the fixed header and does not run past the
    ///   total length
    ///
    fn try_from(frame: EthernetFrame) -> Result<Self, Self::Error> {
        let frame_len = frame.len();
        if frame_len < ETHER_MIN_LEN || frame_len > ETHER_MAX_LEN {
            return Err("Frame length is outside Ethernet limits");
        }

        let ip_data = &frame.data[ETHER_HEADER_LEN..];
        let version = (ip_data[0] & 0xF0) >> 4;
        if version != 4 {
            return Err("Packet has incorrect version, is not Ipv4Packet");
        }

        let total_len = u16::from_be_bytes([ip_data[2], ip_data[3]]) as usize;
        if total_len > ip_data.len() {
            return Err("Packet has invalid total length field");
        }

        // This is the header length in 32bit words
        let header_len = (ip_data[0] & 0x0F) as usize * 4;
        if header_len < IPV4_HEADER_LEN || header_len > total_len {
            return Err("Packet has invalid header length field");
        }

        Ok(Ipv4Packet {
            frame,
            header_len,
            total_len,
        })
    }
}
