//! Egress decision core shared between the eBPF kernel program and userspace.
//!
//! Everything here is `no_std`, allocation-free and loop-bounded so that the
//! exact same code can be compiled for `bpfel-unknown-none` (where the
//! verifier must prove every packet access in-bounds) and for the host
//! (where the CLI and the tests exercise it on ordinary byte slices).
//!
//! Layout:
//! - [`packet`]: header types, [`PacketView`], and the header parser.
//! - [`policy`]: [`NetAddr`] and the compiled-in [`NodeSet`].
//! - [`decision`]: the verdict for one packet.

#![cfg_attr(not(test), no_std)]

pub mod decision;
pub mod packet;
pub mod policy;

#[cfg(test)]
mod testutil;

pub use decision::{decide, evaluate, Reason, Verdict};
pub use packet::{parse, EthHdr, Ipv4Hdr, PacketView, ParseResult};
pub use policy::{NetAddr, NodeSet, TESTNET_NODES, TESTNET_NODE_COUNT};

/// Name of the cgroup/skb program inside the compiled eBPF object.
pub const PROGRAM_NAME: &str = "filter_egress";

/// EtherType for IPv4.
pub const ETH_P_IP: u16 = 0x0800;

/// IP protocol numbers.
pub const IPPROTO_ICMP: u8 = 1;
pub const IPPROTO_TCP: u8 = 6;
pub const IPPROTO_UDP: u8 = 17;
