/// A port is one network interface on top of a USB adapter. It owns the ARP cache, the
/// send, receive and deferred queues and the counters, and runs the output and input
/// pipelines when the host polls it. Nothing here is shared between ports.
mod port;
pub use self::port::*;

/// The output pipeline: length and routing checks, ARP lookup, and either a frame on
/// the wire or a request for the next hop's address.
mod output;
pub use self::output::*;

/// IPv4 acceptance for inbound frames.
mod input;

/// ARP: cache learning, answering requests for our address, and retrying datagrams
/// that were waiting on a resolution.
mod arp_handler;

/// Control requests the host issues outside the data path.
mod control;
pub use self::control::*;

mod arp_cache;
pub use self::arp_cache::*;

/// FIFO of datagrams with lifetimes that are checked as entries are taken off the head.
mod queue;
pub use self::queue::*;

mod datagram;
pub use self::datagram::*;

mod frame;
pub use self::frame::*;

mod classifier;
pub use self::classifier::*;

/// The link layer seam. Real adapters implement `Transport`; `ChannelTransport` stands
/// in for one in tests and demos.
mod transport;
pub use self::transport::*;

mod device;

mod clock;
pub use self::clock::*;

mod config;
pub use self::config::*;

mod error;
pub use self::error::*;

mod stats;
pub use self::stats::*;

mod trace;
pub use self::trace::*;
