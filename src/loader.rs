// Loads the compiled kernel object and attaches filter_egress to a cgroup.
//
// Requires: Linux 5.3+, cgroup v2, CAP_BPF + CAP_NET_ADMIN.

use std::fs::File;
use std::path::Path;

use aya::programs::{CgroupAttachMode, CgroupSkb, CgroupSkbAttachType};
use aya::Ebpf;

use egressgate_ebpf_common::PROGRAM_NAME;

use crate::error::GateError;

/// An egress filter attached to one cgroup.
///
/// The program stays attached for as long as this value lives; dropping it
/// releases the link and the kernel detaches the filter.
pub struct EgressFilter {
    _ebpf: Ebpf,
}

impl EgressFilter {
    /// Load `object`, pass it through the verifier and attach it to the
    /// egress side of `cgroup`.
    pub fn attach(object: &Path, cgroup: &Path) -> Result<Self, GateError> {
        let bytes = std::fs::read(object).map_err(GateError::ObjectRead)?;
        log::debug!("loader: read {} ({} bytes)", object.display(), bytes.len());

        let mut ebpf = Ebpf::load(&bytes)
            .map_err(|e| GateError::EbpfProgram(format!("parse {}: {e}", object.display())))?;

        let program: &mut CgroupSkb = ebpf
            .program_mut(PROGRAM_NAME)
            .ok_or_else(|| {
                GateError::EbpfProgram(format!("program '{PROGRAM_NAME}' not found in object"))
            })?
            .try_into()
            .map_err(|e| {
                GateError::EbpfProgram(format!("'{PROGRAM_NAME}' is not a cgroup/skb program: {e}"))
            })?;

        // Verifier rejection surfaces here, before anything is attached.
        program
            .load()
            .map_err(|e| GateError::EbpfProgram(format!("load '{PROGRAM_NAME}': {e}")))?;

        let cgroup_file = File::open(cgroup)
            .map_err(|e| GateError::Cgroup(format!("open {}: {e}", cgroup.display())))?;

        program
            .attach(
                cgroup_file,
                CgroupSkbAttachType::Egress,
                CgroupAttachMode::Single,
            )
            .map_err(|e| {
                GateError::EbpfProgram(format!("attach to {}: {e}", cgroup.display()))
            })?;

        log::info!(
            "attached '{}' to egress of {}",
            PROGRAM_NAME,
            cgroup.display()
        );
        Ok(Self { _ebpf: ebpf })
    }
}
