use std::convert::TryFrom;
use std::net::Ipv4Addr;
use usbnet_driver::{ChannelTransport, Datagram, DriverConfig, FrameBuilder, ManualClock, Port, Wire};
use usbnet_packets::{ArpFrame, ArpOp, EthernetFrame, Ipv4Header, MacAddr};

pub const LOCAL_MAC: MacAddr = MacAddr {
    bytes: [0x02, 0x00, 0x00, 0x00, 0x00, 0x01],
};
pub const PEER_MAC: MacAddr = MacAddr {
    bytes: [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff],
};

pub const OTHER_MAC: MacAddr = MacAddr {
    bytes: [0x02, 0x11, 0x22, 0x33, 0x44, 0x55],
};

pub fn local_ip() -> Ipv4Addr {
    Ipv4Addr::new(192, 168, 1, 10)
}

pub fn peer_ip() -> Ipv4Addr {
    Ipv4Addr::new(192, 168, 1, 50)
}

pub fn subnet_mask() -> Ipv4Addr {
    Ipv4Addr::new(255, 255, 255, 0)
}

pub struct TestPort {
    pub port: Port<ChannelTransport>,
    pub wire: Wire,
    pub clock: ManualClock,
}

pub fn config() -> DriverConfig {
    DriverConfig::new()
        .ip_address(local_ip())
        .subnet_mask(subnet_mask())
}

/// A port on 192.168.1.10/24 that is already up
pub fn test_port() -> TestPort {
    test_port_with(config())
}

pub fn test_port_with(config: DriverConfig) -> TestPort {
    let (transport, wire) = ChannelTransport::new(LOCAL_MAC);
    let clock = ManualClock::new();
    let mut port = Port::new(config, transport, clock.clone()).unwrap();
    port.set_state(true);
    TestPort { port, wire, clock }
}

pub fn datagram_to(dest: Ipv4Addr, payload_len: usize) -> Datagram {
    let mut header = Ipv4Header::new();
    header.set_protocol(17);
    header.set_src_addr(local_ip());
    header.set_dest_addr(dest);
    let payload = (0..payload_len).map(|i| i as u8).collect();
    Datagram::new(header, vec![], payload)
}

/// An Ethernet/IPv4 ARP frame as another station would put it on the wire, padded
/// to the minimum frame length.
pub fn arp_frame(
    op: ArpOp,
    sender_mac: MacAddr,
    sender_ip: Ipv4Addr,
    target_mac: MacAddr,
    target_ip: Ipv4Addr,
) -> EthernetFrame {
    let mut arp = ArpFrame::ethernet_ipv4();
    arp.set_dest_mac(match op {
        ArpOp::Request => MacAddr::BROADCAST,
        ArpOp::Reply => target_mac,
    });
    arp.set_src_mac(sender_mac);
    arp.set_opcode(op);
    arp.set_sender_hardware_addr(sender_mac);
    arp.set_sender_protocol_addr(sender_ip);
    arp.set_target_hardware_addr(target_mac);
    arp.set_target_protocol_addr(target_ip);
    let mut frame = arp.frame();
    frame.pad_to_min();
    frame
}

pub fn reply_from(sender_mac: MacAddr, sender_ip: Ipv4Addr) -> EthernetFrame {
    arp_frame(ArpOp::Reply, sender_mac, sender_ip, LOCAL_MAC, local_ip())
}

/// An IPv4 frame from the peer addressed to us
pub fn ip_frame_from_peer(datagram: &Datagram) -> Vec<u8> {
    FrameBuilder::new()
        .ip_frame(LOCAL_MAC, PEER_MAC, datagram)
        .to_vec()
}

pub fn parse_arp(bytes: &[u8]) -> ArpFrame {
    let frame = EthernetFrame::from_buffer(bytes.to_vec()).unwrap();
    ArpFrame::try_from(frame).unwrap()
}

pub fn is_arp(bytes: &[u8]) -> bool {
    bytes[12..14] == [0x08, 0x06]
}
