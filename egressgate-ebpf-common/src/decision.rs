// Per-packet egress decision.
//
// Single shot and stateless: the same packet bytes and bounds always give
// the same verdict.

use crate::packet::{parse, PacketView, ParseResult};
use crate::policy::NodeSet;

/// What happens to the packet. The discriminants are the values a
/// cgroup/skb program returns to the kernel.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Verdict {
    Deny = 0,
    Allow = 1,
}

impl Verdict {
    #[inline(always)]
    pub const fn as_ret(self) -> i32 {
        self as i32
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Verdict::Allow => "allow",
            Verdict::Deny => "deny",
        }
    }
}

/// The branch of the decision that produced a verdict.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Reason {
    /// Not enough data to inspect. Fails open.
    Truncated,
    /// Not an IPv4 frame. Passed through unfiltered.
    NonIpv4,
    /// Destination in `127.0.0.0/8`.
    Loopback,
    /// Destination is in the node set.
    AllowedNode,
    /// IPv4 destination outside the node set.
    NotAllowed,
}

impl Reason {
    #[inline(always)]
    pub const fn verdict(self) -> Verdict {
        match self {
            Reason::NotAllowed => Verdict::Deny,
            Reason::Truncated | Reason::NonIpv4 | Reason::Loopback | Reason::AllowedNode => {
                Verdict::Allow
            }
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Reason::Truncated => "truncated",
            Reason::NonIpv4 => "non-ipv4",
            Reason::Loopback => "loopback",
            Reason::AllowedNode => "allowed-node",
            Reason::NotAllowed => "not-allowed",
        }
    }
}

/// Classifies one packet against `nodes`.
#[inline(always)]
pub fn evaluate<const N: usize>(view: &PacketView<'_>, nodes: &NodeSet<N>) -> Reason {
    let dest = match parse(view) {
        ParseResult::NotEnoughData => return Reason::Truncated,
        ParseResult::NonIpv4 => return Reason::NonIpv4,
        ParseResult::Ipv4 { dest, .. } => dest,
    };

    if dest.is_loopback() {
        return Reason::Loopback;
    }

    // No port-level inspection: TCP and UDP (DNS included) reach the node
    // set check like every other protocol.
    if nodes.is_allowed_node(dest) {
        Reason::AllowedNode
    } else {
        Reason::NotAllowed
    }
}

/// Verdict for one packet against `nodes`.
#[inline(always)]
pub fn decide<const N: usize>(view: &PacketView<'_>, nodes: &NodeSet<N>) -> Verdict {
    evaluate(view, nodes).verdict()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{EthHdr, Ipv4Hdr};
    use crate::policy::{NetAddr, TESTNET_NODES};
    use crate::testutil::FrameBuilder;
    use crate::{IPPROTO_ICMP, IPPROTO_TCP, IPPROTO_UDP};
    use std::net::Ipv4Addr;

    fn decide_frame(frame: &[u8]) -> Verdict {
        decide(&PacketView::new(frame), &TESTNET_NODES)
    }

    #[test]
    fn first_node_over_tcp_is_allowed() {
        let frame = FrameBuilder::new()
            .dest(Ipv4Addr::new(34, 94, 106, 61))
            .protocol(IPPROTO_TCP)
            .build();
        assert_eq!(decide_frame(&frame), Verdict::Allow);
        assert_eq!(
            evaluate(&PacketView::new(&frame), &TESTNET_NODES),
            Reason::AllowedNode
        );
    }

    #[test]
    fn public_resolver_over_udp_is_denied() {
        let frame = FrameBuilder::new()
            .dest(Ipv4Addr::new(8, 8, 8, 8))
            .protocol(IPPROTO_UDP)
            .build();
        assert_eq!(decide_frame(&frame), Verdict::Deny);
    }

    #[test]
    fn dns_gets_no_exception() {
        // UDP to port 53 is still just traffic to an unlisted address.
        let mut payload = vec![0u8; 8];
        payload[2..4].copy_from_slice(&53u16.to_be_bytes());
        let frame = FrameBuilder::new()
            .dest(Ipv4Addr::new(1, 1, 1, 1))
            .protocol(IPPROTO_UDP)
            .payload(payload)
            .build();
        assert_eq!(decide_frame(&frame), Verdict::Deny);
    }

    #[test]
    fn raw_ipv4_without_ethernet_header_passes_as_non_ipv4() {
        // cgroup/skb hands over data starting at the IP header. Bytes 12..14
        // are then the first two source octets (0x0a00), not an EtherType.
        let frame = FrameBuilder::new()
            .source(Ipv4Addr::new(10, 0, 0, 5))
            .dest(Ipv4Addr::new(8, 8, 8, 8))
            .protocol(IPPROTO_UDP)
            .build();
        let l3 = &frame[EthHdr::LEN..];
        assert_eq!(&l3[12..14], &[10, 0]);

        let view = PacketView::new(l3);
        assert_eq!(evaluate(&view, &TESTNET_NODES), Reason::NonIpv4);
        assert_eq!(decide(&view, &TESTNET_NODES), Verdict::Allow);
        // The same packet with its Ethernet header is denied.
        assert_eq!(decide_frame(&frame), Verdict::Deny);
    }

    #[test]
    fn every_node_allowed_for_any_protocol() {
        for node in TESTNET_NODES.as_slice() {
            for proto in [IPPROTO_TCP, IPPROTO_UDP, IPPROTO_ICMP] {
                let frame = FrameBuilder::new()
                    .dest(Ipv4Addr::from(*node))
                    .protocol(proto)
                    .build();
                assert_eq!(decide_frame(&frame), Verdict::Allow, "{node} proto {proto}");
            }
        }
    }

    #[test]
    fn loopback_allowed_regardless_of_policy() {
        let empty: NodeSet<0> = NodeSet::new([]);
        for dest in [
            Ipv4Addr::new(127, 0, 0, 1),
            Ipv4Addr::new(127, 1, 2, 3),
            Ipv4Addr::new(127, 255, 255, 254),
        ] {
            for proto in [IPPROTO_TCP, IPPROTO_UDP, IPPROTO_ICMP, 132] {
                let frame = FrameBuilder::new().dest(dest).protocol(proto).build();
                let view = PacketView::new(&frame);
                assert_eq!(evaluate(&view, &empty), Reason::Loopback);
                assert_eq!(decide(&view, &TESTNET_NODES), Verdict::Allow);
            }
        }
    }

    #[test]
    fn non_ipv4_passes_through() {
        let frame = FrameBuilder::new()
            .ethertype(0x0806)
            .dest(Ipv4Addr::new(8, 8, 8, 8))
            .build();
        let view = PacketView::new(&frame);
        assert_eq!(evaluate(&view, &TESTNET_NODES), Reason::NonIpv4);
        assert_eq!(decide(&view, &TESTNET_NODES), Verdict::Allow);
    }

    #[test]
    fn truncated_frame_fails_open() {
        assert_eq!(decide_frame(&[0u8; 10]), Verdict::Allow);
        assert_eq!(decide_frame(&[]), Verdict::Allow);
    }

    #[test]
    fn truncated_ip_header_fails_open() {
        let frame = FrameBuilder::new().dest(Ipv4Addr::new(8, 8, 8, 8)).build();
        let short = &frame[..EthHdr::LEN + Ipv4Hdr::LEN - 1];
        assert_eq!(
            evaluate(&PacketView::new(short), &TESTNET_NODES),
            Reason::Truncated
        );
        assert_eq!(decide_frame(short), Verdict::Allow);
        // The full frame is denied, so the truncation alone flipped the verdict.
        assert_eq!(decide_frame(&frame), Verdict::Deny);
    }

    #[test]
    fn decision_is_deterministic() {
        let frame = FrameBuilder::new().dest(Ipv4Addr::new(8, 8, 8, 8)).build();
        let first = decide_frame(&frame);
        for _ in 0..16 {
            assert_eq!(decide_frame(&frame), first);
        }
    }

    #[test]
    fn custom_node_set() {
        let nodes = NodeSet::new([NetAddr::new(10, 0, 0, 7)]);
        let allowed = FrameBuilder::new().dest(Ipv4Addr::new(10, 0, 0, 7)).build();
        let denied = FrameBuilder::new()
            .dest(Ipv4Addr::new(34, 94, 106, 61))
            .build();
        assert_eq!(decide(&PacketView::new(&allowed), &nodes), Verdict::Allow);
        assert_eq!(decide(&PacketView::new(&denied), &nodes), Verdict::Deny);
    }

    #[test]
    fn total_over_arbitrary_bytes() {
        // Every prefix of a noisy buffer must produce a verdict without panicking.
        let noise: Vec<u8> = (0..128u32).map(|i| (i * 37 + 11) as u8).collect();
        for end in 0..=noise.len() {
            for start in [0, 1, 7, end] {
                let _ = decide(&PacketView::with_bounds(&noise, start, end), &TESTNET_NODES);
            }
        }
    }

    #[test]
    fn verdict_return_codes() {
        assert_eq!(Verdict::Allow.as_ret(), 1);
        assert_eq!(Verdict::Deny.as_ret(), 0);
        assert_eq!(Verdict::Allow.as_str(), "allow");
        assert_eq!(Verdict::Deny.as_str(), "deny");
    }

    #[test]
    fn only_not_allowed_denies() {
        for reason in [
            Reason::Truncated,
            Reason::NonIpv4,
            Reason::Loopback,
            Reason::AllowedNode,
        ] {
            assert_eq!(reason.verdict(), Verdict::Allow, "{}", reason.as_str());
        }
        assert_eq!(Reason::NotAllowed.verdict(), Verdict::Deny);
    }
}
