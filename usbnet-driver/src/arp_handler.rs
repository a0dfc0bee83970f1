use crate::error::Reject;
use crate::output::Output;
use crate::port::Port;
use crate::queue::DatagramQueue;
use crate::transport::Transport;
use std::convert::TryFrom;
use std::mem;
use tracing::debug;
use usbnet_packets::{ArpFrame, ArpOp, EthernetFrame};

impl<T: Transport> Port<T> {
    /// Handles one inbound ARP frame.
    ///
    /// Any well formed Ethernet/IPv4 request or reply teaches the cache the sender's
    /// address, whoever it was meant for. Requests for our address are answered. The
    /// deferred queue is then retried in full, since the new entry may resolve some of it.
    pub fn process_arp(&mut self, frame: EthernetFrame) -> Result<(), Reject> {
        let arp = match ArpFrame::try_from(frame) {
            Ok(arp) => arp,
            Err(reason) => {
                self.stats.arp.input_errors += 1;
                return Err(Reject::Malformed(reason));
            }
        };

        if !arp.is_ethernet_ipv4() {
            self.stats.arp.input_errors += 1;
            return Err(Reject::ArpHardware);
        }

        let opcode = arp.opcode();
        let op = if opcode == ArpOp::Request as u16 {
            ArpOp::Request
        } else if opcode == ArpOp::Reply as u16 {
            ArpOp::Reply
        } else {
            self.stats.arp.opcode_errors += 1;
            return Err(Reject::ArpOpcode(opcode));
        };

        let sender_mac = arp.sender_mac_addr()?;
        let sender_ip = arp.sender_ipv4_addr()?;
        let target_ip = arp.target_ipv4_addr()?;

        // Probes carry no sender address worth remembering
        if !sender_ip.is_unspecified() {
            self.arp_cache.insert_or_update(sender_ip, sender_mac);
        }

        if target_ip == self.config.ip_address {
            match op {
                ArpOp::Request => {
                    self.stats.arp.requests_received += 1;
                    debug!(port = %self.config.name, %sender_ip, %sender_mac, "answering ARP request");
                    self.send_arp_reply(sender_mac, sender_ip);
                }
                ArpOp::Reply => {
                    self.stats.arp.answers_received += 1;
                    debug!(port = %self.config.name, %sender_ip, %sender_mac, "ARP reply received");
                }
            }
        }

        self.retry_deferred();
        Ok(())
    }

    /// Runs every deferred datagram through the output pipeline once. Those that still
    /// miss the cache collect in a fresh queue which then replaces the old one, so a
    /// datagram is never retried twice in one pass.
    fn retry_deferred(&mut self) {
        let mut pending = mem::take(&mut self.deferred);
        let mut still_waiting = DatagramQueue::new();

        loop {
            let dequeued = pending.dequeue_unexpired(self.clock.now());
            self.stats.port.expired += dequeued.expired as u64;
            let datagram = match dequeued.datagram {
                Some(datagram) => datagram,
                None => break,
            };
            self.stats.arp.wait_dequeued += 1;

            match self.process_output(&datagram) {
                Ok(Output::Sent(length)) => self.stats.port.sent_bytes += length as u64,
                Ok(Output::Deferred) => {
                    self.stats.arp.wait_requeued += 1;
                    still_waiting.enqueue(datagram);
                }
                Err(reason) => {
                    self.stats.port.dropped += 1;
                    debug!(port = %self.config.name, %reason, dest = %datagram.destination(), "deferred datagram dropped");
                }
            }
        }

        self.deferred = still_waiting;
    }
}
