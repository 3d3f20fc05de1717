//! egressgate eBPF kernel program: cgroup/skb egress filter.
//!
//! Attached to a cgroup v2 directory on the egress side. For every packet
//! leaving a socket of that cgroup the kernel calls [`filter_egress`], which
//! returns 1 to let the packet through and 0 to drop it.
//!
//! The decision itself lives in `egressgate-ebpf-common` so the host can
//! test it; this crate only adapts the `__sk_buff` bounds to a
//! [`PacketView`].
//!
//! # Link layer
//!
//! On a cgroup/skb hook `skb->data` points at the IPv4 header; there is no
//! Ethernet header in front of it. The shared parser still reads one, so
//! the "EtherType" it sees is bytes 12..14 of the IP header, the first two
//! octets of the source address. Unless the source happens to start with
//! `8.0`, the packet is classified non-IPv4 and allowed. In practice most
//! egress passes unfiltered.
//!
//! # Verifier notes
//!
//! `PacketView::header` compares `data + offset + size` with `data_end`
//! before each read. The node scan runs over a fixed-size array, so its trip
//! count is known at load time. Nothing here touches maps or per-packet
//! state.
//!
//! Cross-compiled on its own (see the `[workspace]` table in Cargo.toml):
//! `cargo +nightly build -Z build-std=core --target bpfel-unknown-none --release`.

#![no_std]
#![no_main]

use aya_ebpf::macros::cgroup_skb;
use aya_ebpf::programs::SkBuffContext;

use egressgate_ebpf_common::{decide, PacketView, TESTNET_NODES};

/// cgroup/skb egress hook.
#[cgroup_skb(egress)]
pub fn filter_egress(ctx: SkBuffContext) -> i32 {
    let data = ctx.skb.data();
    let data_end = ctx.skb.data_end();

    // SAFETY: the kernel guarantees [data, data_end) is the readable linear
    // part of the skb for the duration of this call.
    let view = unsafe { PacketView::from_raw(data, data_end) };

    decide(&view, &TESTNET_NODES).as_ret()
}

#[link_section = "license"]
#[no_mangle]
static LICENSE: [u8; 4] = *b"GPL\0";

// The verifier rejects any path that could reach here.
#[panic_handler]
fn panic(_info: &core::panic::PanicInfo) -> ! {
    unsafe { core::hint::unreachable_unchecked() }
}
