use crate::error::TransportError;
use crossbeam::channel::{unbounded, Receiver, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use usbnet_packets::MacAddr;

/// The link layer under a port: one adapter, one frame at a time, never blocking.
pub trait Transport {
    fn transmit(&mut self, frame: &[u8]) -> Result<(), TransportError>;

    /// Returns `Ok(None)` when no frame is waiting.
    fn receive(&mut self) -> Result<Option<Vec<u8>>, TransportError>;

    fn read_hardware_address(&mut self) -> Result<MacAddr, TransportError>;
}

/// An adapter simulated with crossbeam channels. Frames the port transmits come out of
/// the paired `Wire`, and frames pushed into the `Wire` are what the port receives.
pub struct ChannelTransport {
    mac: MacAddr,
    outbound: Sender<Vec<u8>>,
    inbound: Receiver<Vec<u8>>,
    faults: Arc<Faults>,
}

/// The far side of a `ChannelTransport`
pub struct Wire {
    pub sent: Receiver<Vec<u8>>,
    pub inject: Sender<Vec<u8>>,
    faults: Arc<Faults>,
}

#[derive(Default)]
struct Faults {
    transmit: AtomicBool,
    receive: AtomicBool,
    hardware_address: AtomicBool,
}

impl ChannelTransport {
    pub fn new(mac: MacAddr) -> (ChannelTransport, Wire) {
        let (outbound, sent) = unbounded();
        let (inject, inbound) = unbounded();
        let faults = Arc::new(Faults::default());
        (
            ChannelTransport {
                mac,
                outbound,
                inbound,
                faults: faults.clone(),
            },
            Wire {
                sent,
                inject,
                faults,
            },
        )
    }

    /// Two adapters cabled to each other
    pub fn pair(mac_a: MacAddr, mac_b: MacAddr) -> (ChannelTransport, ChannelTransport) {
        let (a_to_b, b_from_a) = unbounded();
        let (b_to_a, a_from_b) = unbounded();
        (
            ChannelTransport {
                mac: mac_a,
                outbound: a_to_b,
                inbound: a_from_b,
                faults: Arc::new(Faults::default()),
            },
            ChannelTransport {
                mac: mac_b,
                outbound: b_to_a,
                inbound: b_from_a,
                faults: Arc::new(Faults::default()),
            },
        )
    }
}

impl Transport for ChannelTransport {
    fn transmit(&mut self, frame: &[u8]) -> Result<(), TransportError> {
        if self.faults.transmit.load(Ordering::Relaxed) {
            return Err(TransportError::Io(String::from("bulk out stalled")));
        }
        self.outbound
            .send(frame.to_vec())
            .map_err(|_| TransportError::Detached)
    }

    fn receive(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        if self.faults.receive.load(Ordering::Relaxed) {
            return Err(TransportError::Io(String::from("bulk in stalled")));
        }
        match self.inbound.try_recv() {
            Ok(frame) => Ok(Some(frame)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(TransportError::Detached),
        }
    }

    fn read_hardware_address(&mut self) -> Result<MacAddr, TransportError> {
        if self.faults.hardware_address.load(Ordering::Relaxed) {
            return Err(TransportError::Io(String::from("control transfer failed")));
        }
        Ok(self.mac)
    }
}

impl Wire {
    /// Every frame transmitted so far that has not been collected yet
    pub fn collect_sent(&self) -> Vec<Vec<u8>> {
        self.sent.try_iter().collect()
    }

    pub fn fail_transmit(&self, fail: bool) {
        self.faults.transmit.store(fail, Ordering::Relaxed);
    }

    pub fn fail_receive(&self, fail: bool) {
        self.faults.receive.store(fail, Ordering::Relaxed);
    }

    pub fn fail_hardware_address(&self, fail: bool) {
        self.faults.hardware_address.store(fail, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transmitted_frames_reach_the_wire() {
        let (mut transport, wire) = ChannelTransport::new(MacAddr::new([2, 0, 0, 0, 0, 1]));
        transport.transmit(&[1, 2, 3]).unwrap();
        transport.transmit(&[4]).unwrap();
        assert_eq!(wire.collect_sent(), vec![vec![1, 2, 3], vec![4]]);
    }

    #[test]
    fn injected_frames_are_received_once() {
        let (mut transport, wire) = ChannelTransport::new(MacAddr::default());
        wire.inject.send(vec![9, 9]).unwrap();
        assert_eq!(transport.receive(), Ok(Some(vec![9, 9])));
        assert_eq!(transport.receive(), Ok(None));
    }

    #[test]
    fn faults_surface_as_errors() {
        let mac = MacAddr::new([2, 0, 0, 0, 0, 1]);
        let (mut transport, wire) = ChannelTransport::new(mac);
        wire.fail_transmit(true);
        wire.fail_receive(true);
        wire.fail_hardware_address(true);
        assert!(transport.transmit(&[1]).is_err());
        assert!(transport.receive().is_err());
        assert!(transport.read_hardware_address().is_err());

        wire.fail_hardware_address(false);
        assert_eq!(transport.read_hardware_address(), Ok(mac));
    }

    #[test]
    fn detached_wire() {
        let (mut transport, wire) = ChannelTransport::new(MacAddr::default());
        drop(wire);
        assert_eq!(transport.transmit(&[1]), Err(TransportError::Detached));
        assert_eq!(transport.receive(), Err(TransportError::Detached));
    }

    #[test]
    fn paired_transports_see_each_other() {
        let (mut a, mut b) =
            ChannelTransport::pair(MacAddr::new([2, 0, 0, 0, 0, 1]), MacAddr::new([2, 0, 0, 0, 0, 2]));
        a.transmit(&[1]).unwrap();
        b.transmit(&[2]).unwrap();
        assert_eq!(b.receive(), Ok(Some(vec![1])));
        assert_eq!(a.receive(), Ok(Some(vec![2])));
    }
}
