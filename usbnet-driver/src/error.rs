use thiserror::Error;

/// Failure reported by the transport collaborator. The core never retries.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("device is not attached")]
    Detached,
    #[error("transfer failed: {0}")]
    Io(String),
}

/// Errors surfaced to whoever builds or controls a port.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    #[error("invalid configuration: {0}")]
    Config(&'static str),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Terminal reason a frame or datagram was dropped. Every variant is counted by the
/// pipeline that produced it; none of them leave the port unusable.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Reject {
    #[error("malformed frame: {0}")]
    Malformed(&'static str),
    #[error("frame of {0} bytes exceeds the Ethernet frame or port MTU")]
    BadLength(usize),
    #[error("IPv4 options of {0} bytes are not whole words up to 40 bytes")]
    BadOptions(usize),
    #[error("destination is a network or broadcast address")]
    BadHost,
    #[error("no next hop on the local network")]
    BadNetwork,
    #[error("ARP packet is not Ethernet/IPv4")]
    ArpHardware,
    #[error("unsupported ARP opcode {0}")]
    ArpOpcode(u16),
    #[error("out of memory for datagram")]
    Allocation,
    #[error(transparent)]
    Transport(#[from] TransportError),
}

impl From<&'static str> for Reject {
    fn from(reason: &'static str) -> Self {
        Reject::Malformed(reason)
    }
}
