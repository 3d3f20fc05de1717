// Allowed-destination policy: network-order addresses and the node set.

use core::fmt;
use core::net::Ipv4Addr;

/// An IPv4 address held in network byte order.
///
/// The wrapped `u32` has the same in-memory bytes as the address on the
/// wire, so it compares directly against a destination field read out of a
/// packet. [`NetAddr::to_host`] is the only conversion to host order.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NetAddr(u32);

impl NetAddr {
    pub const fn new(a: u8, b: u8, c: u8, d: u8) -> Self {
        Self::from_octets([a, b, c, d])
    }

    pub const fn from_octets(octets: [u8; 4]) -> Self {
        Self(u32::from_ne_bytes(octets))
    }

    pub const fn octets(self) -> [u8; 4] {
        self.0.to_ne_bytes()
    }

    /// The address as a host-order integer (`a.b.c.d` -> `0xaabbccdd`).
    pub const fn to_host(self) -> u32 {
        u32::from_be(self.0)
    }

    /// `127.0.0.0/8`.
    #[inline(always)]
    pub const fn is_loopback(self) -> bool {
        (self.to_host() & 0xFF00_0000) == 0x7F00_0000
    }
}

impl From<Ipv4Addr> for NetAddr {
    fn from(addr: Ipv4Addr) -> Self {
        Self::from_octets(addr.octets())
    }
}

impl From<NetAddr> for Ipv4Addr {
    fn from(addr: NetAddr) -> Self {
        Ipv4Addr::from(addr.octets())
    }
}

impl fmt::Display for NetAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.octets();
        write!(f, "{a}.{b}.{c}.{d}")
    }
}

impl fmt::Debug for NetAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NetAddr({self})")
    }
}

// ---------------------------------------------------------------------------
// NodeSet
// ---------------------------------------------------------------------------

/// Fixed, read-only set of destinations egress is allowed to reach.
///
/// `N` is a compile-time constant, which bounds the membership scan.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeSet<const N: usize> {
    nodes: [NetAddr; N],
}

impl<const N: usize> NodeSet<N> {
    pub const fn new(nodes: [NetAddr; N]) -> Self {
        Self { nodes }
    }

    /// Linear scan in network byte order; stops at the first match.
    #[inline(always)]
    pub fn is_allowed_node(&self, dest: NetAddr) -> bool {
        self.nodes.iter().any(|node| *node == dest)
    }

    pub fn as_slice(&self) -> &[NetAddr] {
        &self.nodes
    }

    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }
}

/// Number of entries in [`TESTNET_NODES`].
pub const TESTNET_NODE_COUNT: usize = 15;

/// Hedera testnet consensus nodes.
pub static TESTNET_NODES: NodeSet<TESTNET_NODE_COUNT> = NodeSet::new([
    NetAddr::new(34, 94, 106, 61),
    NetAddr::new(50, 18, 132, 211),
    NetAddr::new(35, 237, 119, 55),
    NetAddr::new(3, 212, 6, 13),
    NetAddr::new(35, 245, 27, 193),
    NetAddr::new(52, 20, 18, 86),
    NetAddr::new(34, 83, 112, 116),
    NetAddr::new(54, 70, 192, 33),
    NetAddr::new(34, 94, 160, 4),
    NetAddr::new(54, 176, 199, 109),
    NetAddr::new(34, 106, 102, 218),
    NetAddr::new(35, 155, 49, 147),
    NetAddr::new(34, 133, 197, 230),
    NetAddr::new(52, 14, 252, 207),
    NetAddr::new(35, 186, 230, 203),
]);
