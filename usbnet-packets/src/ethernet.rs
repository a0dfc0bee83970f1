use crate::*;
use std::borrow::Cow;

/// An Ethernet II frame, header first, as it is read from or written to the adapter.
///
/// 0                    6                    12                      14
/// |---6 byte Dest_MAC--|---6 byte Src_MAC---|--2 Byte EtherType---|
#[derive(Clone, Debug)]
pub struct EthernetFrame {
    pub data: PacketData,
}

impl EthernetFrame {
    pub fn from_buffer(frame: PacketData) -> Result<EthernetFrame, &'static str> {
        if frame.len() < ETHER_HEADER_LEN {
            return Err("Frame is less than the minimum of 14 bytes");
        }

        Ok(EthernetFrame { data: frame })
    }

    /// Returns an EthernetFrame holding only a zeroed header. The buffer is allocated
    /// with room for the largest frame so it can be reused without growing.
    pub fn empty() -> EthernetFrame {
        let mut data = Vec::with_capacity(ETHER_MAX_LEN);
        data.resize(ETHER_HEADER_LEN, 0);
        EthernetFrame { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn has_empty_payload(&self) -> bool {
        self.data.len() == ETHER_HEADER_LEN
    }

    pub fn dest_mac(&self) -> MacAddr {
        self.mac_at(0)
    }

    pub fn src_mac(&self) -> MacAddr {
        self.mac_at(6)
    }

    pub fn set_dest_mac(&mut self, mac: MacAddr) {
        self.data[..6].copy_from_slice(&mac.bytes);
    }

    pub fn set_src_mac(&mut self, mac: MacAddr) {
        self.data[6..12].copy_from_slice(&mac.bytes);
    }

    pub fn ether_type(&self) -> u16 {
        u16::from_be_bytes([self.data[12], self.data[13]])
    }

    pub fn set_ether_type(&mut self, ether_type: u16) {
        self.data[12..14].copy_from_slice(&ether_type.to_be_bytes());
    }

    // This gives you a cow of a slice of the payload.
    pub fn payload(&self) -> Cow<[u8]> {
        Cow::from(&self.data[ETHER_HEADER_LEN..])
    }

    pub fn set_payload(&mut self, payload: &[u8]) {
        self.data.truncate(ETHER_HEADER_LEN);
        self.data.extend_from_slice(payload);
    }

    /// Appends to the payload without touching what is already there.
    pub fn extend_payload(&mut self, bytes: &[u8]) {
        self.data.extend_from_slice(bytes);
    }

    /// Zero-fills the frame up to the Ethernet minimum. Longer frames are left alone.
    pub fn pad_to_min(&mut self) {
        if self.data.len() < ETHER_MIN_LEN {
            self.data.resize(ETHER_MIN_LEN, 0);
        }
    }

    fn mac_at(&self, start: usize) -> MacAddr {
        let mut bytes = [0; 6];
        bytes.copy_from_slice(&self.data[start..start + ETHER_ADDR_LEN]);
        MacAddr::new(bytes)
    }
}

/// EthernetFrames are considered the same if they carry the same bytes.
impl PartialEq for EthernetFrame {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Eq for EthernetFrame {}
