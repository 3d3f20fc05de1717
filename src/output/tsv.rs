use std::io::Write;

use egressgate_ebpf_common::NetAddr;

use crate::error::GateError;
use crate::inspect::CheckReport;

/// Write a check report as TSV: a header row and one data row.
///
/// Columns: verdict, reason, dest, protocol, frame_len. Fields the frame
/// did not yield are written as `-`.
pub fn write_check_tsv(report: &CheckReport, writer: &mut impl Write) -> Result<(), GateError> {
    writeln!(writer, "verdict\treason\tdest\tprotocol\tframe_len").map_err(GateError::Serialization)?;

    let dest = report
        .dest
        .map(|d| d.to_string())
        .unwrap_or_else(|| "-".to_string());
    let protocol = report
        .protocol
        .map(|p| p.to_string())
        .unwrap_or_else(|| "-".to_string());

    writeln!(
        writer,
        "{}\t{}\t{}\t{}\t{}",
        report.verdict, report.reason, dest, protocol, report.frame_len
    )
    .map_err(GateError::Serialization)
}

/// Write the node set as TSV, in policy order.
pub fn write_nodes_tsv(nodes: &[NetAddr], writer: &mut impl Write) -> Result<(), GateError> {
    writeln!(writer, "index\taddress").map_err(GateError::Serialization)?;
    for (i, node) in nodes.iter().enumerate() {
        writeln!(writer, "{i}\t{node}").map_err(GateError::Serialization)?;
    }
    Ok(())
}
