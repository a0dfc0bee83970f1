use std::convert::TryFrom;
use std::fmt;

/// The common datatype that all packet structures share to represent their data
pub type PacketData = Vec<u8>;

pub const IPV4_ETHER_TYPE: u16 = 0x0800;
pub const ARP_ETHER_TYPE: u16 = 0x0806;

pub const ETHER_ADDR_LEN: usize = 6;
pub const ETHER_HEADER_LEN: usize = 14;

/// Shortest frame we put on the wire, header included, frame check sequence excluded.
pub const ETHER_MIN_LEN: usize = 60;
/// Longest frame we accept or emit, header included, frame check sequence excluded.
pub const ETHER_MAX_LEN: usize = 1514;

/// Length of an IPv4 header without options
pub const IPV4_HEADER_LEN: usize = 20;
/// Options can add at most 40 bytes, since IHL is a 4 bit count of 32 bit words
pub const IPV4_MAX_OPTIONS_LEN: usize = 40;

// Most significant byte is 0th
#[derive(Eq, Clone, Copy, Hash, PartialEq, Default)]
pub struct MacAddr {
    pub bytes: [u8; 6],
}

impl MacAddr {
    pub const BROADCAST: MacAddr = MacAddr { bytes: [0xff; 6] };

    pub fn new(bytes: [u8; 6]) -> MacAddr {
        MacAddr { bytes }
    }

    pub fn is_broadcast(&self) -> bool {
        *self == MacAddr::BROADCAST
    }
}

impl TryFrom<&[u8]> for MacAddr {
    type Error = &'static str;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        if bytes.len() != ETHER_ADDR_LEN {
            return Err("Hardware address must be 6 bytes");
        }
        let mut mac = [0; 6];
        mac.copy_from_slice(bytes);
        Ok(MacAddr::new(mac))
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let b = &self.bytes;
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "MacAddr({})", self)
    }
}
