mod common;
use common::*;

use pktlayers::ether::{EtherAddr, EtherType, Ethernet};
use pktlayers::icmpv4::{IcmpType, Icmpv4};
use pktlayers::ipv4::{IpProtocol, Ipv4, Ipv4Addr};
use pktlayers::mpls::Mpls;
use pktlayers::{LayerType, LinkType, Packet};

const EXPECTED: [LayerType; 6] = [
    LayerType::ETHERNET,
    LayerType::MPLS,
    LayerType::MPLS,
    LayerType::IPV4,
    LayerType::ICMPV4,
    LayerType::PAYLOAD,
];

#[test]
fn mpls_in_mpls_all_modes() {
    let frame = file_to_packet("MplsIcmp.dat");
    assert_eq!(frame.len(), 122);

    for opts in ALL_MODES {
        let mut pkt = Packet::decode(&frame[..], LinkType::ETHERNET.layer_type(), opts);
        assert!(pkt.error_layer().is_none(), "{:?}", opts);
        assert_eq!(pkt.layer_types(), EXPECTED, "{:?}", opts);

        let layers = pkt.layers();

        let outer = &layers[1];
        assert_eq!(outer.offset(), 14);
        assert_eq!(outer.contents(), &[0x00, 0x01, 0x10, 0xfe]);
        assert_eq!(outer.payload(), &frame[18..]);
        assert_eq!(
            outer.get::<Mpls>(),
            Some(&Mpls {
                label: 17,
                traffic_class: 0,
                stack_bottom: false,
                ttl: 254,
            })
        );

        let inner = &layers[2];
        assert_eq!(inner.offset(), 18);
        assert_eq!(inner.contents(), &[0x00, 0x01, 0x31, 0xfe]);
        assert_eq!(inner.payload(), &frame[22..]);
        assert_eq!(
            inner.get::<Mpls>(),
            Some(&Mpls {
                label: 19,
                traffic_class: 0,
                stack_bottom: true,
                ttl: 254,
            })
        );

        // ICMP echo data after the 8-byte ICMP header.
        let data = &layers[5];
        assert_eq!(data.offset(), 50);
        assert_eq!(data.contents().len(), 72);
        assert_eq!(data.contents(), &frame[50..]);
        assert!(data.payload().is_empty());
        assert_eq!(reassemble(&mut pkt), frame);
    }
}

#[test]
fn mpls_in_mpls_fields() {
    let frame = file_to_packet("MplsIcmp.dat");
    let mut pkt = Packet::decode(&frame[..], LayerType::ETHERNET, ALL_MODES[0]);

    let eth = *pkt.layer_of::<Ethernet>().unwrap();
    assert_eq!(eth.dst_addr, EtherAddr::parse_from("cc:13:14:64:00:01").unwrap());
    assert_eq!(eth.src_addr, EtherAddr::parse_from("cc:15:14:64:00:00").unwrap());
    assert_eq!(eth.ethertype, EtherType::MPLS_UNICAST);

    // `layer_of` returns the first MPLS entry of the stack.
    assert_eq!(pkt.layer_of::<Mpls>().map(|m| m.label), Some(17));

    let ip = *pkt.layer_of::<Ipv4>().unwrap();
    assert_eq!(ip.header_len, 20);
    assert_eq!(ip.packet_len, 100);
    assert_eq!(ip.ttl, 254);
    assert_eq!(ip.protocol, IpProtocol::ICMP);
    assert_eq!(ip.src_addr, Ipv4Addr::new(12, 0, 0, 1));
    assert_eq!(ip.dst_addr, Ipv4Addr::new(2, 2, 2, 2));

    let icmp = *pkt.layer_of::<Icmpv4>().unwrap();
    assert_eq!(icmp.icmp_type, IcmpType::ECHO_REQUEST);
    assert_eq!(icmp.checksum, 0x3a6b);
    assert_eq!(icmp.ident, 0x0b);
    assert_eq!(icmp.seq_num, 2);
}

#[test]
fn bottom_of_stack_picks_the_next_layer() {
    let frame = file_to_packet("MplsIcmp.dat");

    // Start at the inner label: the first nibble after it is 4.
    let mut pkt = Packet::decode(&frame[18..], LayerType::MPLS, ALL_MODES[2]);
    assert_eq!(
        pkt.layer_types(),
        [
            LayerType::MPLS,
            LayerType::IPV4,
            LayerType::ICMPV4,
            LayerType::PAYLOAD
        ]
    );

    // Clear the bottom-of-stack bit and the parser keeps reading labels from
    // the IPv4 header.
    let mut frame = frame[18..].to_vec();
    frame[2] &= !0x01;
    let mut pkt = Packet::decode(&frame[..], LayerType::MPLS, ALL_MODES[2]);
    assert_eq!(pkt.layer_at(1).map(|l| l.layer_type()), Some(LayerType::MPLS));
    assert_eq!(
        pkt.layer_at(1).and_then(|l| l.get::<Mpls>()).map(|m| m.label),
        Some(0x45000)
    );
}

#[test]
fn short_label_stack_is_an_error() {
    let frame = file_to_packet("MplsIcmp.dat");
    for opts in ALL_MODES {
        let mut pkt = Packet::decode(&frame[..17], LayerType::ETHERNET, opts);
        let err = pkt.error_layer().cloned().unwrap();
        assert_eq!(err.offset(), 14);
        assert_eq!(err.contents(), &frame[14..17]);
        assert_eq!(
            err.error().map(|e| e.to_string()),
            Some("MPLS: truncated header (need 4 bytes, have 3)".to_string())
        );
        assert_eq!(pkt.layer_types(), [LayerType::ETHERNET, LayerType::ERROR]);
    }
}
