// Offline evaluation of the egress decision.
//
// Runs the same parser and decision code the kernel program uses, on a
// frame synthesized from a destination address or decoded from hex.

use std::net::Ipv4Addr;

use serde::Serialize;

use egressgate_ebpf_common::{
    evaluate, parse, EthHdr, Ipv4Hdr, NodeSet, PacketView, ParseResult, ETH_P_IP,
};

use crate::error::GateError;

/// Result of evaluating one frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// Destination, when the frame parsed as IPv4.
    pub dest: Option<Ipv4Addr>,
    /// IP protocol number, when the frame parsed as IPv4.
    pub protocol: Option<u8>,
    pub frame_len: usize,
    pub verdict: &'static str,
    pub reason: &'static str,
}

/// Evaluate a raw Ethernet frame against `nodes`.
pub fn check_frame<const N: usize>(frame: &[u8], nodes: &NodeSet<N>) -> CheckReport {
    let view = PacketView::new(frame);
    let (dest, protocol) = match parse(&view) {
        ParseResult::Ipv4 { protocol, dest } => (Some(Ipv4Addr::from(dest)), Some(protocol)),
        ParseResult::NotEnoughData | ParseResult::NonIpv4 => (None, None),
    };
    let reason = evaluate(&view, nodes);

    CheckReport {
        dest,
        protocol,
        frame_len: frame.len(),
        verdict: reason.verdict().as_str(),
        reason: reason.as_str(),
    }
}

/// Build a minimal Ethernet + IPv4 frame addressed to `dest`.
///
/// Exactly one Ethernet header plus one option-less IPv4 header; nothing
/// after the IPv4 header is needed for the decision.
pub fn synth_frame(dest: Ipv4Addr, protocol: u8) -> Vec<u8> {
    let mut frame = Vec::with_capacity(EthHdr::LEN + Ipv4Hdr::LEN);

    frame.extend_from_slice(&[0xFF; 6]); // dst MAC
    frame.extend_from_slice(&[0x02, 0, 0, 0, 0, 0x01]); // src MAC, locally administered
    frame.extend_from_slice(&ETH_P_IP.to_be_bytes());

    frame.push(0x45); // v4, IHL 5
    frame.push(0); // TOS
    frame.extend_from_slice(&(Ipv4Hdr::LEN as u16).to_be_bytes());
    frame.extend_from_slice(&[0, 0]); // identification
    frame.extend_from_slice(&[0x40, 0]); // DF
    frame.push(64); // TTL
    frame.push(protocol);
    frame.extend_from_slice(&[0, 0]); // checksum
    frame.extend_from_slice(&Ipv4Addr::UNSPECIFIED.octets());
    frame.extend_from_slice(&dest.octets());

    frame
}

/// Decode a hex frame. An optional `0x` prefix, whitespace and `:`/`-`
/// separators are accepted.
pub fn decode_frame(input: &str) -> Result<Vec<u8>, GateError> {
    let trimmed = input.trim();
    let body = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    let digits: String = body
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':' && *c != '-')
        .collect();

    hex::decode(&digits).map_err(|e| GateError::InvalidFrame(e.to_string()))
}
