use std::io::Write;
use std::net::Ipv4Addr;

use egressgate_ebpf_common::NetAddr;

use crate::error::GateError;
use crate::inspect::CheckReport;

/// Write a check report as pretty-printed JSON.
pub fn write_check_json(report: &CheckReport, writer: &mut impl Write) -> Result<(), GateError> {
    serde_json::to_writer_pretty(&mut *writer, report)
        .map_err(|e| GateError::Serialization(std::io::Error::other(e.to_string())))?;
    writeln!(writer).map_err(GateError::Serialization)
}

/// Write the node set as a JSON array of dotted-quad strings.
pub fn write_nodes_json(nodes: &[NetAddr], writer: &mut impl Write) -> Result<(), GateError> {
    let addrs: Vec<Ipv4Addr> = nodes.iter().map(|n| Ipv4Addr::from(*n)).collect();
    serde_json::to_writer_pretty(&mut *writer, &addrs)
        .map_err(|e| GateError::Serialization(std::io::Error::other(e.to_string())))?;
    writeln!(writer).map_err(GateError::Serialization)
}
