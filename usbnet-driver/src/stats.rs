//! Counters kept by a port. They only ever go up; `Port::control(Control::ClearStats)`
//! is the one way back to zero.

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TransferCounters {
    pub total_packets: u64,
    pub failed: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReceiveCounters {
    pub total_packets: u64,
    pub good_packets: u64,
    pub bad_packets: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ProcessCounters {
    pub broadcast_ip_packets: u64,
    pub normal_ip_packets: u64,
    pub arp_packets: u64,
    pub bad_ip_packets: u64,
    pub bad_arp_packets: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SendCounters {
    pub dequeued: u64,
    pub bad_length: u64,
    pub bad_options: u64,
    pub bad_host: u64,
    pub bad_network: u64,
    pub ip_packets: u64,
    pub arp_packets: u64,
    pub arp_packets_err: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArpCounters {
    pub input_errors: u64,
    pub opcode_errors: u64,
    pub requests_received: u64,
    pub answers_received: u64,
    pub wait_queued: u64,
    pub wait_dequeued: u64,
    pub wait_requeued: u64,
}

/// Byte and drop totals as the host stack sees them
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PortCounters {
    pub sent_bytes: u64,
    pub received_bytes: u64,
    pub dropped: u64,
    pub expired: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Statistics {
    pub read: TransferCounters,
    pub write: TransferCounters,
    pub receive: ReceiveCounters,
    pub process: ProcessCounters,
    pub send: SendCounters,
    pub arp: ArpCounters,
    pub port: PortCounters,
}

impl Statistics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Datagrams parked on the deferred queue right now, as far as the counters can tell.
    /// Expired datagrams released from that queue are not subtracted.
    pub fn awaiting_resolution(&self) -> u64 {
        (self.arp.wait_queued + self.arp.wait_requeued).saturating_sub(self.arp.wait_dequeued)
    }
}
