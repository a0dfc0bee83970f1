//! Classifiers look at an inbound frame by reference and decide which pipeline it goes
//! down. They never modify or consume the frame.
use usbnet_packets::{EthernetFrame, ARP_ETHER_TYPE, IPV4_ETHER_TYPE};

pub trait Classifier {
    type Packet: Sized;
    type Class: Sized;

    fn classify(&self, packet: &Self::Packet) -> Self::Class;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EtherType {
    /// IPv4 addressed to the broadcast hardware address
    Ipv4Broadcast,
    Ipv4,
    Arp,
    Unsupported(u16),
}

#[derive(Default)]
pub struct ByEtherType {}

impl Classifier for ByEtherType {
    type Packet = EthernetFrame;
    type Class = EtherType;

    fn classify(&self, packet: &Self::Packet) -> Self::Class {
        match packet.ether_type() {
            IPV4_ETHER_TYPE if packet.dest_mac().is_broadcast() => EtherType::Ipv4Broadcast,
            IPV4_ETHER_TYPE => EtherType::Ipv4,
            ARP_ETHER_TYPE => EtherType::Arp,
            other => EtherType::Unsupported(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use usbnet_packets::MacAddr;

    fn frame(dest: MacAddr, ether_type: u16) -> EthernetFrame {
        let mut frame = EthernetFrame::empty();
        frame.set_dest_mac(dest);
        frame.set_ether_type(ether_type);
        frame
    }

    #[test]
    fn by_ether_type() {
        let unicast = MacAddr::new([0x02, 0, 0, 0, 0, 0x01]);
        let classifier = ByEtherType::default();

        assert_eq!(classifier.classify(&frame(unicast, 0x0800)), EtherType::Ipv4);
        assert_eq!(
            classifier.classify(&frame(MacAddr::BROADCAST, 0x0800)),
            EtherType::Ipv4Broadcast
        );
        assert_eq!(classifier.classify(&frame(MacAddr::BROADCAST, 0x0806)), EtherType::Arp);
        assert_eq!(
            classifier.classify(&frame(unicast, 0x86DD)),
            EtherType::Unsupported(0x86DD)
        );
    }
}
