mod common;
use common::*;

use pktlayers::icmpv4::{IcmpType, Icmpv4, Icmpv4Packet};
use pktlayers::ipv4::{Ipv4, Ipv4Packet};
use pktlayers::{DecodeOptions, LayerType, LinkType, Packet};
use smoltcp::wire;

// Byte offset of the IPv4 header in MplsIcmp.dat.
const IP_START: usize = 22;

#[test]
fn ipv4_fields_match_smoltcp() {
    let frame = file_to_packet("MplsIcmp.dat");
    let smol = wire::Ipv4Packet::new_checked(&frame[IP_START..]).unwrap();

    let mut pkt = Packet::decode(&frame[..], LayerType::ETHERNET, DecodeOptions::NO_COPY);
    let ip: Ipv4 = *pkt.layer_of::<Ipv4>().unwrap();

    assert_eq!(ip.header_len, smol.header_len());
    assert_eq!(ip.dscp, smol.dscp());
    assert_eq!(ip.ecn, smol.ecn());
    assert_eq!(ip.packet_len, smol.total_len());
    assert_eq!(ip.ident, smol.ident());
    assert_eq!(ip.dont_frag, smol.dont_frag());
    assert_eq!(ip.more_frag, smol.more_frags());
    assert_eq!(ip.frag_offset, smol.frag_offset());
    assert_eq!(ip.ttl, smol.hop_limit());
    assert_eq!(ip.protocol.raw(), u8::from(smol.protocol()));
    assert_eq!(ip.checksum, smol.checksum());
    assert_eq!(ip.src_addr.octets(), smol.src_addr().0);
    assert_eq!(ip.dst_addr.octets(), smol.dst_addr().0);
    assert!(smol.verify_checksum());

    let layer = pkt.layer(LayerType::IPV4).unwrap();
    assert_eq!(layer.contents(), &frame[IP_START..IP_START + 20]);
    assert_eq!(layer.payload(), smol.payload());
}

#[test]
fn icmpv4_fields_match_smoltcp() {
    let frame = file_to_packet("MplsIcmp.dat");
    let icmp_start = IP_START + 20;
    let smol = wire::Icmpv4Packet::new_checked(&frame[icmp_start..]).unwrap();

    let mut pkt = Packet::decode(&frame[..], LayerType::ETHERNET, DecodeOptions::LAZY);
    let icmp: Icmpv4 = *pkt.layer_of::<Icmpv4>().unwrap();

    assert_eq!(icmp.icmp_type, IcmpType::ECHO_REQUEST);
    assert_eq!(u8::from(smol.msg_type()), icmp.icmp_type.raw());
    assert_eq!(icmp.code, smol.msg_code());
    assert_eq!(icmp.checksum, smol.checksum());
    assert_eq!(icmp.ident, smol.echo_ident());
    assert_eq!(icmp.seq_num, smol.echo_seq_no());
    assert!(smol.verify_checksum());

    let layer = pkt.layer(LayerType::ICMPV4).unwrap();
    assert_eq!(layer.payload(), smol.data());
}

#[test]
fn header_views_walk_the_frame() {
    let frame = file_to_packet("MplsIcmp.dat");

    let ip = Ipv4Packet::parse(&frame[IP_START..]).unwrap();
    assert_eq!(ip.header_slice(), &frame[IP_START..IP_START + 20]);
    let icmp = Icmpv4Packet::parse(ip.payload()).unwrap();
    assert_eq!(icmp.icmp_type(), IcmpType::ECHO_REQUEST);
    assert_eq!(icmp.payload().len(), 72);
}

#[test]
fn raw_ip_link_type() {
    let frame = file_to_packet("MplsIcmp.dat");
    let mut pkt = Packet::decode(
        &frame[IP_START..],
        LinkType::RAW.layer_type(),
        DecodeOptions::DEFAULT,
    );
    assert_eq!(
        pkt.layer_types(),
        [LayerType::IPV4, LayerType::ICMPV4, LayerType::PAYLOAD]
    );
}

#[test]
fn corrupted_ipv4_ends_in_error_layer() {
    let mut frame = file_to_packet("MplsIcmp.dat");
    // Header length of 16 bytes.
    frame[IP_START] = 0x44;

    for opts in ALL_MODES {
        let mut pkt = Packet::decode(&frame[..], LayerType::ETHERNET, opts);
        assert_eq!(
            pkt.layer_types(),
            [
                LayerType::ETHERNET,
                LayerType::MPLS,
                LayerType::MPLS,
                LayerType::ERROR
            ]
        );
        let err = pkt.error_layer().unwrap();
        assert_eq!(err.offset(), IP_START);
        assert_eq!(err.contents(), &frame[IP_START..]);
        assert_eq!(err.error().unwrap().protocol(), "IPv4");
        assert_eq!(reassemble(&mut pkt), frame);
    }
}
