use crate::arp_cache::ArpCache;
use crate::classifier::{ByEtherType, Classifier, EtherType};
use crate::clock::Clock;
use crate::config::DriverConfig;
use crate::datagram::Datagram;
use crate::device::Device;
use crate::error::{DriverError, Reject};
use crate::frame::FrameBuilder;
use crate::output::Output;
use crate::queue::DatagramQueue;
use crate::stats::Statistics;
use crate::trace::TraceBuffer;
use crate::transport::Transport;
use std::net::Ipv4Addr;
use tracing::{debug, info};
use usbnet_packets::{EthernetFrame, MacAddr};

/// Everything the driver knows about one network interface: addresses, the ARP cache,
/// the three datagram queues, counters and the device underneath.
///
/// A port is driven by the host one call at a time. None of its operations block, and
/// none of them may be entered again while one is running.
pub struct Port<T: Transport> {
    pub(crate) config: DriverConfig,
    pub(crate) device: Device<T>,
    pub(crate) clock: Box<dyn Clock>,
    pub(crate) up: bool,
    /// What the adapter reports as its burned-in address
    pub(crate) hardware_address: MacAddr,
    /// What goes out as our source address; the host may override it
    pub(crate) mac_address: MacAddr,
    pub(crate) hardware_type: Option<u8>,
    pub(crate) arp_cache: ArpCache,
    pub(crate) builder: FrameBuilder,
    pub(crate) deferred: DatagramQueue,
    pub(crate) send_queue: DatagramQueue,
    pub(crate) receive_queue: DatagramQueue,
    pub(crate) stats: Statistics,
}

impl<T: Transport> Port<T> {
    /// Validates the config and reads the factory address off the adapter. The port
    /// starts down.
    pub fn new<C>(config: DriverConfig, transport: T, clock: C) -> Result<Self, DriverError>
    where
        C: Clock + 'static,
    {
        config.validate()?;

        let clock: Box<dyn Clock> = Box::new(clock);
        let mut device = Device::new(transport, TraceBuffer::new(config.trace_capacity));
        let hardware_address = device.read_hardware_address(clock.now())?;
        info!(port = %config.name, mac = %hardware_address, "port created");

        Ok(Port {
            arp_cache: ArpCache::new(config.arp_cache_capacity),
            config,
            device,
            clock,
            up: false,
            hardware_address,
            mac_address: hardware_address,
            hardware_type: None,
            builder: FrameBuilder::new(),
            deferred: DatagramQueue::new(),
            send_queue: DatagramQueue::new(),
            receive_queue: DatagramQueue::new(),
            stats: Statistics::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn is_up(&self) -> bool {
        self.up
    }

    pub fn ip_address(&self) -> Ipv4Addr {
        self.config.ip_address
    }

    pub fn subnet_mask(&self) -> Ipv4Addr {
        self.config.subnet_mask
    }

    pub fn mtu(&self) -> u16 {
        self.config.mtu
    }

    pub fn set_ip_address(&mut self, ip_address: Ipv4Addr) {
        info!(port = %self.config.name, %ip_address, "ip address set");
        self.config.ip_address = ip_address;
    }

    pub fn set_subnet_mask(&mut self, subnet_mask: Ipv4Addr) {
        info!(port = %self.config.name, %subnet_mask, "subnet mask set");
        self.config.subnet_mask = subnet_mask;
    }

    pub fn hardware_address(&self) -> MacAddr {
        self.hardware_address
    }

    pub fn mac_address(&self) -> MacAddr {
        self.mac_address
    }

    pub fn statistics(&self) -> &Statistics {
        &self.stats
    }

    pub fn arp_cache(&self) -> &ArpCache {
        &self.arp_cache
    }

    pub fn deferred_len(&self) -> usize {
        self.deferred.len()
    }

    pub fn send_queue_len(&self) -> usize {
        self.send_queue.len()
    }

    pub fn receive_queue_len(&self) -> usize {
        self.receive_queue.len()
    }

    /// Taking the port down releases everything still queued in either direction,
    /// including datagrams waiting on address resolution.
    pub fn set_state(&mut self, up: bool) {
        if up {
            self.up = true;
            info!(port = %self.config.name, "port up");
            return;
        }

        self.up = false;
        let released = self.send_queue.drain_all()
            + self.receive_queue.drain_all()
            + self.deferred.drain_all();
        info!(port = %self.config.name, released, "port down");
    }

    /// Hands a datagram from the host to the port. It stays queued until the next
    /// `send_datagrams` or until its lifetime runs out.
    pub fn submit(&mut self, mut datagram: Datagram) {
        datagram.expiry = Some(self.clock.now() + self.config.datagram_ttl);
        self.send_queue.enqueue(datagram);
    }

    /// The oldest received datagram that is still within its lifetime
    pub fn take_received(&mut self) -> Option<Datagram> {
        let dequeued = self.receive_queue.dequeue_unexpired(self.clock.now());
        self.stats.port.expired += dequeued.expired as u64;
        dequeued.datagram
    }

    /// Pushes the whole send queue through the output pipeline. Datagrams waiting on
    /// ARP move to the deferred queue; rejected ones are released.
    pub fn send_datagrams(&mut self) {
        if !self.up {
            return;
        }

        loop {
            let dequeued = self.send_queue.dequeue_unexpired(self.clock.now());
            self.stats.port.expired += dequeued.expired as u64;
            let datagram = match dequeued.datagram {
                Some(datagram) => datagram,
                None => break,
            };
            self.stats.send.dequeued += 1;

            match self.process_output(&datagram) {
                Ok(Output::Sent(length)) => self.stats.port.sent_bytes += length as u64,
                Ok(Output::Deferred) => {
                    self.stats.arp.wait_queued += 1;
                    self.deferred.enqueue(datagram);
                }
                Err(reason) => {
                    self.stats.port.dropped += 1;
                    debug!(port = %self.config.name, %reason, dest = %datagram.destination(), "outbound datagram dropped");
                }
            }
        }
    }

    /// Reads frames until the adapter runs dry or a read fails, dispatching each one
    /// by its ether type.
    pub fn receive_datagrams(&mut self) {
        if !self.up {
            return;
        }

        loop {
            let now = self.clock.now();
            let data = match self.device.read(&mut self.stats.read, now) {
                Ok(Some(data)) => data,
                Ok(None) | Err(_) => break,
            };
            let length = data.len();
            self.stats.receive.total_packets += 1;

            match self.dispatch(data) {
                Ok(()) => self.stats.port.received_bytes += length as u64,
                Err(reason) => {
                    self.stats.port.dropped += 1;
                    debug!(port = %self.config.name, %reason, length, "inbound frame dropped");
                }
            }
        }
    }

    fn dispatch(&mut self, data: Vec<u8>) -> Result<(), Reject> {
        let frame = match EthernetFrame::from_buffer(data) {
            Ok(frame) => frame,
            Err(reason) => {
                self.stats.receive.bad_packets += 1;
                return Err(Reject::Malformed(reason));
            }
        };

        match ByEtherType::default().classify(&frame) {
            EtherType::Ipv4Broadcast => {
                self.stats.receive.good_packets += 1;
                self.stats.process.broadcast_ip_packets += 1;
                Ok(())
            }
            EtherType::Ipv4 => {
                self.stats.receive.good_packets += 1;
                self.stats.process.normal_ip_packets += 1;
                let result = self.process_ip(frame);
                if result.is_err() {
                    self.stats.process.bad_ip_packets += 1;
                }
                result
            }
            EtherType::Arp => {
                self.stats.receive.good_packets += 1;
                self.stats.process.arp_packets += 1;
                let result = self.process_arp(frame);
                if result.is_err() {
                    self.stats.process.bad_arp_packets += 1;
                }
                result
            }
            EtherType::Unsupported(_) => {
                self.stats.receive.bad_packets += 1;
                Err(Reject::Malformed("Frame carries an unsupported ether type"))
            }
        }
    }
}
