use crate::error::TransportError;
use crate::stats::TransferCounters;
use crate::trace::{TraceBuffer, TraceKind, TraceOutcome};
use crate::transport::Transport;
use std::time::Instant;
use tracing::{trace, warn};
use usbnet_packets::MacAddr;

/// The transport together with the trace ring that watches it. Every transfer goes
/// through here so the counters and the trace see the same traffic.
pub(crate) struct Device<T: Transport> {
    transport: T,
    trace: TraceBuffer,
}

impl<T: Transport> Device<T> {
    pub(crate) fn new(transport: T, trace: TraceBuffer) -> Self {
        Device { transport, trace }
    }

    pub(crate) fn write(
        &mut self,
        counters: &mut TransferCounters,
        now: Instant,
        frame: &[u8],
    ) -> Result<(), TransportError> {
        counters.total_packets += 1;
        let result = self.transport.transmit(frame);
        match &result {
            Ok(()) => {
                trace!(length = frame.len(), "frame written");
                self.trace.record(now, TraceKind::Write, TraceOutcome::Ok, frame);
            }
            Err(error) => {
                counters.failed += 1;
                warn!(%error, length = frame.len(), "write failed");
                self.trace.record(now, TraceKind::Write, TraceOutcome::Failed, frame);
            }
        }
        result
    }

    /// `Ok(None)` once the adapter has nothing more to hand over. A zero length read
    /// counts as nothing.
    pub(crate) fn read(
        &mut self,
        counters: &mut TransferCounters,
        now: Instant,
    ) -> Result<Option<Vec<u8>>, TransportError> {
        counters.total_packets += 1;
        match self.transport.receive() {
            Ok(Some(frame)) if !frame.is_empty() => {
                trace!(length = frame.len(), "frame read");
                self.trace.record(now, TraceKind::Read, TraceOutcome::Ok, &frame);
                Ok(Some(frame))
            }
            Ok(_) => Ok(None),
            Err(error) => {
                counters.failed += 1;
                warn!(%error, "read failed");
                self.trace.record(now, TraceKind::Read, TraceOutcome::Failed, &[]);
                Err(error)
            }
        }
    }

    pub(crate) fn read_hardware_address(&mut self, now: Instant) -> Result<MacAddr, TransportError> {
        let result = self.transport.read_hardware_address();
        match &result {
            Ok(mac) => self.trace.record(now, TraceKind::MacGet, TraceOutcome::Ok, &mac.bytes),
            Err(error) => {
                warn!(%error, "hardware address read failed");
                self.trace.record(now, TraceKind::MacGet, TraceOutcome::Failed, &[]);
            }
        }
        result
    }

    pub(crate) fn trace(&self) -> &TraceBuffer {
        &self.trace
    }

    pub(crate) fn trace_mut(&mut self) -> &mut TraceBuffer {
        &mut self.trace
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ChannelTransport;

    fn device(trace_capacity: usize) -> (Device<ChannelTransport>, crate::transport::Wire) {
        let (transport, wire) = ChannelTransport::new(MacAddr::new([2, 0, 0, 0, 0, 1]));
        (Device::new(transport, TraceBuffer::new(trace_capacity)), wire)
    }

    #[test]
    fn write_counts_and_traces() {
        let (mut device, wire) = device(4);
        let mut counters = TransferCounters::default();
        let now = Instant::now();

        device.write(&mut counters, now, &[1; 60]).unwrap();
        wire.fail_transmit(true);
        assert!(device.write(&mut counters, now, &[2; 60]).is_err());

        assert_eq!(counters.total_packets, 2);
        assert_eq!(counters.failed, 1);
        assert_eq!(wire.collect_sent(), vec![vec![1; 60]]);

        let entries = device.trace().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].outcome, TraceOutcome::Ok);
        assert_eq!(entries[1].outcome, TraceOutcome::Failed);
    }

    #[test]
    fn empty_reads_end_the_batch_without_tracing() {
        let (mut device, wire) = device(4);
        let mut counters = TransferCounters::default();
        let now = Instant::now();

        wire.inject.send(vec![]).unwrap();
        wire.inject.send(vec![7; 64]).unwrap();

        assert_eq!(device.read(&mut counters, now), Ok(None));
        assert_eq!(device.read(&mut counters, now), Ok(Some(vec![7; 64])));
        assert_eq!(device.read(&mut counters, now), Ok(None));
        assert_eq!(counters.total_packets, 3);
        assert_eq!(device.trace().len(), 1);
    }

    #[test]
    fn hardware_address_reads_are_traced() {
        let (mut device, wire) = device(4);
        let now = Instant::now();

        assert_eq!(
            device.read_hardware_address(now),
            Ok(MacAddr::new([2, 0, 0, 0, 0, 1]))
        );
        wire.fail_hardware_address(true);
        assert!(device.read_hardware_address(now).is_err());

        let entries = device.trace().entries();
        assert_eq!(entries[0].kind, TraceKind::MacGet);
        assert_eq!(entries[0].data, vec![2, 0, 0, 0, 0, 1]);
        assert_eq!(entries[1].outcome, TraceOutcome::Failed);

        device.trace_mut().clear();
        assert!(device.trace().is_empty());
    }
}
