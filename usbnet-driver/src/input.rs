use crate::datagram::Datagram;
use crate::error::Reject;
use crate::port::Port;
use crate::transport::Transport;
use std::convert::TryFrom;
use usbnet_packets::{EthernetFrame, Ipv4Packet};

impl<T: Transport> Port<T> {
    /// Validates an inbound IPv4 frame and queues a copy of its datagram for the host.
    /// Nothing is queued unless the whole datagram could be copied.
    pub fn process_ip(&mut self, frame: EthernetFrame) -> Result<(), Reject> {
        let packet = Ipv4Packet::try_from(frame)?;
        let options = copy_bytes(&packet.options())?;
        let payload = copy_bytes(&packet.payload())?;

        let mut datagram = Datagram::from_parts(packet.header(), options, payload);
        datagram.expiry = Some(self.clock.now() + self.config.datagram_ttl);
        self.receive_queue.enqueue(datagram);
        Ok(())
    }
}

fn copy_bytes(bytes: &[u8]) -> Result<Vec<u8>, Reject> {
    let mut copy = Vec::new();
    copy.try_reserve_exact(bytes.len())
        .map_err(|_| Reject::Allocation)?;
    copy.extend_from_slice(bytes);
    Ok(copy)
}
