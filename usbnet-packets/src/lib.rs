//! Wire formats spoken by the USB network port: Ethernet II framing, ARP for
//! Ethernet/IPv4, and the IPv4 header as seen by the link layer.
mod types;
pub use self::types::*;

mod ethernet;
pub use self::ethernet::*;

mod arp;
pub use self::arp::*;

mod ipv4;
pub use self::ipv4::*;
