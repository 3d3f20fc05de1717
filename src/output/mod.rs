pub mod json;
pub mod tsv;

use std::io::Write;

use egressgate_ebpf_common::NetAddr;

use crate::cli::OutputFormat;
use crate::error::GateError;
use crate::inspect::CheckReport;

/// Write the result of `egressgate check` in the specified format.
pub fn write_check(
    report: &CheckReport,
    format: OutputFormat,
    writer: &mut impl Write,
) -> Result<(), GateError> {
    match format {
        OutputFormat::Tsv => tsv::write_check_tsv(report, writer),
        OutputFormat::Json => json::write_check_json(report, writer),
    }
}

/// Write the node set in the specified format.
pub fn write_nodes(
    nodes: &[NetAddr],
    format: OutputFormat,
    writer: &mut impl Write,
) -> Result<(), GateError> {
    match format {
        OutputFormat::Tsv => tsv::write_nodes_tsv(nodes, writer),
        OutputFormat::Json => json::write_nodes_json(nodes, writer),
    }
}
