//! Raw frame construction for tests.

use std::net::Ipv4Addr;

use crate::{ETH_P_IP, IPPROTO_TCP};

/// Builds an Ethernet II frame carrying an IPv4 header and optional payload.
pub(crate) struct FrameBuilder {
    src_mac: [u8; 6],
    dst_mac: [u8; 6],
    ethertype: u16,
    src: Ipv4Addr,
    dst: Ipv4Addr,
    protocol: u8,
    // Extra bytes after the standard 20-byte header; IHL follows their length.
    ip_options: Vec<u8>,
    payload: Vec<u8>,
}

impl FrameBuilder {
    pub(crate) fn new() -> Self {
        Self {
            src_mac: [0x02, 0x00, 0x00, 0x00, 0x00, 0x01],
            dst_mac: [0x02, 0x00, 0x00, 0x00, 0x00, 0x02],
            ethertype: ETH_P_IP,
            src: Ipv4Addr::new(10, 0, 0, 1),
            dst: Ipv4Addr::new(10, 0, 0, 2),
            protocol: IPPROTO_TCP,
            ip_options: Vec::new(),
            payload: Vec::new(),
        }
    }

    pub(crate) fn ethertype(mut self, et: u16) -> Self {
        self.ethertype = et;
        self
    }

    pub(crate) fn source(mut self, src: Ipv4Addr) -> Self {
        self.src = src;
        self
    }

    pub(crate) fn dest(mut self, dst: Ipv4Addr) -> Self {
        self.dst = dst;
        self
    }

    pub(crate) fn protocol(mut self, proto: u8) -> Self {
        self.protocol = proto;
        self
    }

    pub(crate) fn ip_options(mut self, opts: Vec<u8>) -> Self {
        self.ip_options = opts;
        self
    }

    pub(crate) fn payload(mut self, payload: Vec<u8>) -> Self {
        self.payload = payload;
        self
    }

    pub(crate) fn build(&self) -> Vec<u8> {
        let mut pkt = Vec::new();

        pkt.extend_from_slice(&self.dst_mac);
        pkt.extend_from_slice(&self.src_mac);
        pkt.extend_from_slice(&self.ethertype.to_be_bytes());

        let ip_hdr_len = 20 + self.ip_options.len();
        let ihl = (ip_hdr_len / 4) as u8;
        let total_len = (ip_hdr_len + self.payload.len()) as u16;

        pkt.push(0x40 | ihl);
        pkt.push(0); // TOS
        pkt.extend_from_slice(&total_len.to_be_bytes());
        pkt.extend_from_slice(&[0x12, 0x34]); // identification
        pkt.extend_from_slice(&[0x40, 0x00]); // DF, offset 0
        pkt.push(64); // TTL
        pkt.push(self.protocol);
        pkt.extend_from_slice(&[0, 0]); // checksum, not validated
        pkt.extend_from_slice(&self.src.octets());
        pkt.extend_from_slice(&self.dst.octets());
        pkt.extend_from_slice(&self.ip_options);
        pkt.extend_from_slice(&self.payload);

        pkt
    }
}
