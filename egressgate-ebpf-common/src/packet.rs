// Link-layer and IPv4 header layouts plus the bounds-checked header parser.
//
// Every read goes through `PacketView::header`, which compares the end of the
// requested header against the view's end before handing out a reference.
// In the kernel program that comparison is the pointer check the verifier
// needs to accept the access.

use core::marker::PhantomData;
use core::mem;

use crate::policy::NetAddr;
use crate::ETH_P_IP;

// ---------------------------------------------------------------------------
// Header layouts
// ---------------------------------------------------------------------------

/// Marker for header layouts that may be read directly out of packet memory.
///
/// # Safety
///
/// Implementors must be `#[repr(C)]`, have an alignment of 1 and be valid for
/// every bit pattern.
pub unsafe trait Header: Sized {}

/// Ethernet II header. Multi-byte fields are kept as raw network-order bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EthHdr {
    pub h_dest: [u8; 6],
    pub h_source: [u8; 6],
    pub h_proto: [u8; 2],
}

impl EthHdr {
    pub const LEN: usize = mem::size_of::<EthHdr>();

    /// EtherType in host byte order.
    #[inline(always)]
    pub fn ethertype(&self) -> u16 {
        u16::from_be_bytes(self.h_proto)
    }
}

/// IPv4 header in its fixed, option-less 20-byte form.
///
/// The IHL nibble is not honored: options-bearing headers are read as if
/// they had this layout. Only `protocol` and `daddr` feed the decision.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ipv4Hdr {
    pub version_ihl: u8,
    pub tos: u8,
    pub tot_len: [u8; 2],
    pub id: [u8; 2],
    pub frag_off: [u8; 2],
    pub ttl: u8,
    pub protocol: u8,
    pub check: [u8; 2],
    pub saddr: [u8; 4],
    pub daddr: [u8; 4],
}

impl Ipv4Hdr {
    pub const LEN: usize = mem::size_of::<Ipv4Hdr>();

    #[inline(always)]
    pub fn version(&self) -> u8 {
        self.version_ihl >> 4
    }

    /// Header length in bytes as declared by the IHL field.
    #[inline(always)]
    pub fn ihl_bytes(&self) -> usize {
        ((self.version_ihl & 0x0F) as usize) * 4
    }

    #[inline(always)]
    pub fn total_len(&self) -> u16 {
        u16::from_be_bytes(self.tot_len)
    }

    #[inline(always)]
    pub fn source(&self) -> NetAddr {
        NetAddr::from_octets(self.saddr)
    }

    #[inline(always)]
    pub fn dest(&self) -> NetAddr {
        NetAddr::from_octets(self.daddr)
    }
}

unsafe impl Header for EthHdr {}
unsafe impl Header for Ipv4Hdr {}

// Compile-time layout assertions; the parser offsets depend on them.
const _: () = assert!(EthHdr::LEN == 14);
const _: () = assert!(Ipv4Hdr::LEN == 20);
const _: () = assert!(mem::align_of::<EthHdr>() == 1);
const _: () = assert!(mem::align_of::<Ipv4Hdr>() == 1);

// ---------------------------------------------------------------------------
// PacketView
// ---------------------------------------------------------------------------

/// Read-only view of one packet, bounded by `[data, data_end)`.
///
/// The view borrows the packet for the duration of a single decision.
/// No byte at or beyond `data_end` is ever read.
#[derive(Clone, Copy, Debug)]
pub struct PacketView<'a> {
    data: usize,
    data_end: usize,
    _packet: PhantomData<&'a [u8]>,
}

impl<'a> PacketView<'a> {
    /// View over a whole host buffer.
    pub fn new(buf: &'a [u8]) -> Self {
        let data = buf.as_ptr() as usize;
        Self {
            data,
            data_end: data + buf.len(),
            _packet: PhantomData,
        }
    }

    /// View over `buf[data_start..data_end]`.
    ///
    /// `data_end` is clamped to the buffer length and `data_start` to
    /// `data_end`, so an inverted or oversized pair yields a shorter (possibly
    /// empty) view instead of a panic.
    pub fn with_bounds(buf: &'a [u8], data_start: usize, data_end: usize) -> Self {
        let end = data_end.min(buf.len());
        let start = data_start.min(end);
        Self::new(buf.get(start..end).unwrap_or(&[]))
    }

    /// View over raw packet addresses, as handed out by the kernel.
    ///
    /// # Safety
    ///
    /// Every byte in `[data, data_end)` must be readable for `'a`.
    #[inline(always)]
    pub unsafe fn from_raw(data: usize, data_end: usize) -> Self {
        Self {
            data,
            data_end,
            _packet: PhantomData,
        }
    }

    pub fn len(&self) -> usize {
        self.data_end.saturating_sub(self.data)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Header of type `T` starting `offset` bytes into the packet, or `None`
    /// if it would extend past the end of the view.
    #[inline(always)]
    pub fn header<T: Header>(&self, offset: usize) -> Option<&'a T> {
        let start = self.data + offset;
        if start + mem::size_of::<T>() > self.data_end {
            return None;
        }
        // SAFETY: `[start, start + size_of::<T>())` lies inside the view,
        // and `Header` guarantees alignment 1 and no invalid bit patterns.
        Some(unsafe { &*(start as *const T) })
    }
}

// ---------------------------------------------------------------------------
// Parser
// ---------------------------------------------------------------------------

/// Outcome of inspecting the link and network headers of one packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ParseResult {
    /// The view ends before a header the parser needed.
    NotEnoughData,
    /// The EtherType is not IPv4.
    NonIpv4,
    /// An IPv4 packet; `dest` stays in network byte order.
    Ipv4 { protocol: u8, dest: NetAddr },
}

/// Parses the Ethernet header and, for IPv4 frames, the fixed IPv4 header.
#[inline(always)]
pub fn parse(view: &PacketView<'_>) -> ParseResult {
    let Some(eth) = view.header::<EthHdr>(0) else {
        return ParseResult::NotEnoughData;
    };

    // Both sides in network byte order.
    if eth.h_proto != ETH_P_IP.to_be_bytes() {
        return ParseResult::NonIpv4;
    }

    let Some(ip) = view.header::<Ipv4Hdr>(EthHdr::LEN) else {
        return ParseResult::NotEnoughData;
    };

    ParseResult::Ipv4 {
        protocol: ip.protocol,
        dest: ip.dest(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
