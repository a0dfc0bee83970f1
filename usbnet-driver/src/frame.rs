use crate::datagram::Datagram;
use std::net::Ipv4Addr;
use usbnet_packets::{ArpFrame, ArpOp, EthernetFrame, MacAddr, IPV4_ETHER_TYPE};

/// Assembles outbound frames into two buffers that live as long as the port: one for
/// IP traffic and one ARP template whose fixed fields are written once.
///
/// Each build overwrites the buffer in place and hands back a borrow of it, so the
/// bytes from one call are gone by the next. The builder is not reentrant; holding
/// on to a frame across builds is rejected by the borrow checker.
#[derive(Debug)]
pub struct FrameBuilder {
    ip_frame: EthernetFrame,
    arp_template: ArpFrame,
}

impl FrameBuilder {
    pub fn new() -> Self {
        let mut ip_frame = EthernetFrame::empty();
        ip_frame.set_ether_type(IPV4_ETHER_TYPE);
        FrameBuilder {
            ip_frame,
            arp_template: ArpFrame::ethernet_ipv4(),
        }
    }

    /// Header, options and payload behind an Ethernet header, zero-padded to the
    /// minimum frame length.
    pub fn ip_frame(&mut self, dest_mac: MacAddr, src_mac: MacAddr, datagram: &Datagram) -> &[u8] {
        let frame = &mut self.ip_frame;
        frame.set_dest_mac(dest_mac);
        frame.set_src_mac(src_mac);
        frame.set_payload(datagram.header.as_bytes());
        frame.extend_payload(&datagram.options);
        frame.extend_payload(&datagram.payload);
        frame.pad_to_min();
        &frame.data
    }

    /// A broadcast who-has for `target_ip`
    pub fn arp_request(&mut self, src_mac: MacAddr, src_ip: Ipv4Addr, target_ip: Ipv4Addr) -> &[u8] {
        self.fill_arp(ArpOp::Request, src_mac, src_ip, MacAddr::BROADCAST, target_ip)
    }

    /// A unicast is-at answering `dest_mac`/`dest_ip`
    pub fn arp_reply(
        &mut self,
        src_mac: MacAddr,
        src_ip: Ipv4Addr,
        dest_mac: MacAddr,
        dest_ip: Ipv4Addr,
    ) -> &[u8] {
        self.fill_arp(ArpOp::Reply, src_mac, src_ip, dest_mac, dest_ip)
    }

    fn fill_arp(
        &mut self,
        op: ArpOp,
        src_mac: MacAddr,
        src_ip: Ipv4Addr,
        dest_mac: MacAddr,
        dest_ip: Ipv4Addr,
    ) -> &[u8] {
        let arp = &mut self.arp_template;
        arp.set_dest_mac(dest_mac);
        arp.set_src_mac(src_mac);
        arp.set_opcode(op);
        arp.set_sender_hardware_addr(src_mac);
        arp.set_sender_protocol_addr(src_ip);
        arp.set_target_hardware_addr(dest_mac);
        arp.set_target_protocol_addr(dest_ip);
        &arp.as_frame().data
    }
}

impl Default for FrameBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use std::convert::TryFrom;
    use usbnet_packets::{
        Ipv4Header, Ipv4Packet, ARP_ETHERNET_IPV4_LEN, ETHER_HEADER_LEN, ETHER_MAX_LEN,
        ETHER_MIN_LEN, IPV4_HEADER_LEN,
    };

    const LOCAL: MacAddr = MacAddr {
        bytes: [0x02, 0, 0, 0, 0, 0x01],
    };
    const REMOTE: MacAddr = MacAddr {
        bytes: [0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff],
    };

    fn datagram(options: Vec<u8>, payload: Vec<u8>) -> Datagram {
        let mut header = Ipv4Header::new();
        header.set_protocol(17);
        header.set_src_addr(Ipv4Addr::new(192, 168, 1, 10));
        header.set_dest_addr(Ipv4Addr::new(192, 168, 1, 50));
        Datagram::new(header, options, payload)
    }

    #[test]
    fn short_ip_frame_is_padded() {
        let mut builder = FrameBuilder::new();
        let frame = builder.ip_frame(REMOTE, LOCAL, &datagram(vec![], vec![1, 2, 3]));
        assert_eq!(frame.len(), ETHER_MIN_LEN);
        assert_eq!(&frame[..6], &REMOTE.bytes);
        assert_eq!(&frame[6..12], &LOCAL.bytes);
        assert_eq!(&frame[12..14], &[0x08, 0x00]);
        assert_eq!(&frame[34..37], &[1, 2, 3]);
        assert!(frame[37..].iter().all(|b| *b == 0));
    }

    #[test]
    fn buffer_is_reused_between_builds() {
        let mut builder = FrameBuilder::new();
        let long = builder.ip_frame(REMOTE, LOCAL, &datagram(vec![], vec![9; 500])).len();
        assert_eq!(long, ETHER_HEADER_LEN + IPV4_HEADER_LEN + 500);

        let short = builder.ip_frame(REMOTE, LOCAL, &datagram(vec![], vec![])).to_vec();
        assert_eq!(short.len(), ETHER_MIN_LEN);
        assert!(short[34..].iter().all(|b| *b == 0));
    }

    #[test]
    fn encoded_frame_decodes_to_the_same_datagram() {
        let mut rng = rand::thread_rng();
        let mut builder = FrameBuilder::new();
        let options = vec![0x94, 0x04, 0x00, 0x00];
        let max_payload = ETHER_MAX_LEN - ETHER_HEADER_LEN - IPV4_HEADER_LEN - options.len();

        let mut lengths: Vec<usize> = (0..64).map(|_| rng.gen_range(0, max_payload + 1)).collect();
        lengths.extend_from_slice(&[0, 1, max_payload]);

        for len in lengths {
            let mut payload = vec![0; len];
            rng.fill(&mut payload[..]);
            let sent = datagram(options.clone(), payload);

            let bytes = builder.ip_frame(REMOTE, LOCAL, &sent).to_vec();
            let frame = EthernetFrame::from_buffer(bytes).unwrap();
            let packet = Ipv4Packet::try_from(frame).unwrap();

            assert_eq!(packet.header(), sent.header);
            assert_eq!(packet.options().as_ref(), &sent.options[..]);
            assert_eq!(packet.payload().as_ref(), &sent.payload[..]);
            assert!(packet.header().validate_checksum(&packet.options()));
        }
    }

    #[test]
    fn arp_request_is_broadcast() {
        let mut builder = FrameBuilder::new();
        let bytes = builder
            .arp_request(LOCAL, Ipv4Addr::new(192, 168, 1, 10), Ipv4Addr::new(192, 168, 1, 50))
            .to_vec();
        assert_eq!(bytes.len(), ETHER_HEADER_LEN + ARP_ETHERNET_IPV4_LEN);

        let arp = ArpFrame::try_from(EthernetFrame::from_buffer(bytes).unwrap()).unwrap();
        assert!(arp.as_frame().dest_mac().is_broadcast());
        assert_eq!(arp.opcode(), ArpOp::Request as u16);
        assert_eq!(arp.sender_mac_addr(), Ok(LOCAL));
        assert_eq!(arp.sender_ipv4_addr(), Ok(Ipv4Addr::new(192, 168, 1, 10)));
        assert_eq!(arp.target_ipv4_addr(), Ok(Ipv4Addr::new(192, 168, 1, 50)));
    }

    #[test]
    fn arp_reply_overwrites_the_template() {
        let mut builder = FrameBuilder::new();
        builder.arp_request(LOCAL, Ipv4Addr::new(10, 0, 0, 1), Ipv4Addr::new(10, 0, 0, 9));
        let bytes = builder
            .arp_reply(LOCAL, Ipv4Addr::new(10, 0, 0, 1), REMOTE, Ipv4Addr::new(10, 0, 0, 2))
            .to_vec();

        let arp = ArpFrame::try_from(EthernetFrame::from_buffer(bytes).unwrap()).unwrap();
        assert_eq!(arp.as_frame().dest_mac(), REMOTE);
        assert_eq!(arp.opcode(), ArpOp::Reply as u16);
        assert_eq!(arp.target_mac_addr(), Ok(REMOTE));
        assert_eq!(arp.target_ipv4_addr(), Ok(Ipv4Addr::new(10, 0, 0, 2)));
    }
}
