use crate::subscriber::LineSubscriber;
use clap::{value_t, App, Arg};
use std::net::Ipv4Addr;
use usbnet_driver::{
    ChannelTransport, Control, ControlReply, Datagram, DriverConfig, Port, Statistics, SystemClock,
};
use usbnet_packets::{Ipv4Header, MacAddr};

extern crate tracing;
use tracing::{info, Level};

mod subscriber;

const HOST_MAC: MacAddr = MacAddr {
    bytes: [0x02, 0x00, 0x00, 0x00, 0x00, 0x01],
};
const PEER_MAC: MacAddr = MacAddr {
    bytes: [0x02, 0x00, 0x00, 0x00, 0x00, 0x02],
};

fn main() {
    // Collect arguments from user
    let matches = App::new("Loopback Port")
        .version("0.1")
        .author("usbnet Contributors")
        .about("Runs two USB network ports cabled back to back and echoes datagrams between them")
        .arg(
            Arg::with_name("count")
                .short("c")
                .long("count")
                .value_name("N")
                .help("Datagrams the host port sends")
                .default_value("4")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("payload")
                .short("p")
                .long("payload")
                .value_name("BYTES")
                .help("Payload length of each datagram")
                .default_value("64")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("trace")
                .short("t")
                .long("trace")
                .value_name("ENTRIES")
                .help("Transfers each port keeps in its trace ring")
                .default_value("0")
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .help("Log every frame"),
        )
        .get_matches();

    let count = value_t!(matches, "count", usize).unwrap_or_else(|e| e.exit());
    let payload_len = value_t!(matches, "payload", usize).unwrap_or_else(|e| e.exit());
    let trace_capacity = value_t!(matches, "trace", usize).unwrap_or_else(|e| e.exit());
    let level = if matches.is_present("verbose") {
        Level::TRACE
    } else {
        Level::INFO
    };

    if let Err(err) = tracing::subscriber::set_global_default(LineSubscriber::new(level)) {
        eprintln!("setting tracing default failed: {}", err);
    }

    let host_ip = Ipv4Addr::new(192, 168, 7, 1);
    let peer_ip = Ipv4Addr::new(192, 168, 7, 2);
    let config = DriverConfig::new()
        .subnet_mask(Ipv4Addr::new(255, 255, 255, 0))
        .trace_capacity(trace_capacity);

    let (host_transport, peer_transport) = ChannelTransport::pair(HOST_MAC, PEER_MAC);
    let ports = Port::new(
        config.clone().name("USB0").ip_address(host_ip),
        host_transport,
        SystemClock,
    )
    .and_then(|host| {
        Port::new(
            config.name("USB1").ip_address(peer_ip),
            peer_transport,
            SystemClock,
        )
        .map(|peer| (host, peer))
    });
    let (mut host, mut peer) = match ports {
        Ok(ports) => ports,
        Err(err) => {
            eprintln!("could not bring up ports: {}", err);
            std::process::exit(1);
        }
    };
    host.set_state(true);
    peer.set_state(true);

    for id in 0..count {
        host.submit(datagram(id as u16, host_ip, peer_ip, payload_len));
    }

    // A few rounds are enough for resolution in both directions
    let mut echoed = 0;
    let mut returned = 0;
    for _ in 0..4 {
        host.send_datagrams();
        peer.receive_datagrams();
        while let Some(received) = peer.take_received() {
            peer.submit(echo(received));
            echoed += 1;
        }
        peer.send_datagrams();
        host.receive_datagrams();
        while host.take_received().is_some() {
            returned += 1;
        }
    }

    info!(sent = count, echoed, returned, "loopback finished");
    report(&mut host);
    report(&mut peer);
}

fn datagram(id: u16, src: Ipv4Addr, dest: Ipv4Addr, payload_len: usize) -> Datagram {
    let mut header = Ipv4Header::new();
    header.set_identification(id);
    header.set_protocol(17);
    header.set_src_addr(src);
    header.set_dest_addr(dest);
    let payload = (0..payload_len).map(|n| n as u8).collect();
    Datagram::new(header, vec![], payload)
}

fn echo(received: Datagram) -> Datagram {
    let mut header = received.header;
    header.set_src_addr(received.header.dest_addr());
    header.set_dest_addr(received.header.src_addr());
    Datagram::new(header, received.options, received.payload)
}

fn report<T: usbnet_driver::Transport>(port: &mut Port<T>) {
    println!("{} ({} at {})", port.name(), port.mac_address(), port.ip_address());
    print_statistics(port.statistics());

    if let Ok(ControlReply::ArpTable(table)) = port.control(Control::GetArpTable) {
        for entry in table {
            println!("  arp {:<15} {}", entry.ip.to_string(), entry.mac);
        }
    }
    if let Ok(ControlReply::Trace(entries)) = port.control(Control::GetTrace) {
        for entry in entries {
            println!(
                "  trace {:?} {:?} {} bytes",
                entry.kind, entry.outcome, entry.length
            );
        }
    }
}

fn print_statistics(stats: &Statistics) {
    println!(
        "  read {}/{} failed, write {}/{} failed",
        stats.read.failed, stats.read.total_packets, stats.write.failed, stats.write.total_packets
    );
    println!(
        "  receive {} good {} bad, ip {} broadcast {} arp {}",
        stats.receive.good_packets,
        stats.receive.bad_packets,
        stats.process.normal_ip_packets,
        stats.process.broadcast_ip_packets,
        stats.process.arp_packets
    );
    println!(
        "  send ip {} arp {}, rejected length {} options {} host {} network {}",
        stats.send.ip_packets,
        stats.send.arp_packets,
        stats.send.bad_length,
        stats.send.bad_options,
        stats.send.bad_host,
        stats.send.bad_network
    );
    println!(
        "  arp requests {} answers {}, awaiting resolution {}",
        stats.arp.requests_received,
        stats.arp.answers_received,
        stats.awaiting_resolution()
    );
    println!(
        "  bytes out {} in {}, dropped {} expired {}",
        stats.port.sent_bytes, stats.port.received_bytes, stats.port.dropped, stats.port.expired
    );
}
