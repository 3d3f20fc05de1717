use std::net::Ipv4Addr;
use std::path::PathBuf;

use clap::{ArgGroup, Args, Parser, Subcommand, ValueEnum};

use egressgate_ebpf_common::{IPPROTO_ICMP, IPPROTO_TCP, IPPROTO_UDP};

/// Where `cargo +nightly build --target bpfel-unknown-none --release` leaves
/// the kernel object when run inside `egressgate-ebpf/`.
pub const DEFAULT_OBJECT: &str =
    "egressgate-ebpf/target/bpfel-unknown-none/release/egressgate-ebpf";

#[derive(Parser, Debug)]
#[command(
    name = "egressgate",
    version,
    about = "Confine a cgroup's IPv4 egress to a fixed set of network nodes"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Attach the egress filter to a cgroup and hold it until interrupted
    ///
    /// Limitation: on a cgroup/skb hook the packet data starts at the IPv4
    /// header, not at an Ethernet header. The filter still parses an
    /// Ethernet header first, so most egress reads as non-IPv4 and is
    /// passed through unfiltered.
    Attach(AttachArgs),
    /// Evaluate the filter offline for one destination or raw frame
    Check(CheckArgs),
    /// List the compiled-in node set
    Nodes(NodesArgs),
}

#[derive(Args, Debug, Clone)]
pub struct AttachArgs {
    /// cgroup v2 directory whose sockets are filtered (e.g. /sys/fs/cgroup/sandbox)
    #[arg(long)]
    pub cgroup: PathBuf,

    /// Compiled eBPF object containing the filter_egress program
    #[arg(long, default_value = DEFAULT_OBJECT)]
    pub object: PathBuf,
}

#[derive(Args, Debug, Clone)]
#[command(group(ArgGroup::new("input").required(true).args(["dest", "frame"])))]
pub struct CheckArgs {
    /// Destination IPv4 address of a synthesized Ethernet + IPv4 frame
    #[arg(long)]
    pub dest: Option<Ipv4Addr>,

    /// IP protocol of the synthesized frame: tcp, udp, icmp or a number
    #[arg(long, default_value = "tcp", value_parser = parse_protocol, requires = "dest")]
    pub proto: u8,

    /// Raw Ethernet frame as hex; whitespace and ':' separators are ignored
    #[arg(long)]
    pub frame: Option<String>,

    /// Output format [default: tsv]
    #[arg(long, default_value = "tsv")]
    pub format: OutputFormat,
}

#[derive(Args, Debug, Clone)]
pub struct NodesArgs {
    /// Output format [default: tsv]
    #[arg(long, default_value = "tsv")]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Tsv,
    Json,
}

fn parse_protocol(s: &str) -> Result<u8, String> {
    match s.to_ascii_lowercase().as_str() {
        "tcp" => Ok(IPPROTO_TCP),
        "udp" => Ok(IPPROTO_UDP),
        "icmp" => Ok(IPPROTO_ICMP),
        other => other
            .parse()
            .map_err(|_| format!("'{s}' is not tcp, udp, icmp or a protocol number 0-255")),
    }
}
