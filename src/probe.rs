// Environment checks run before the filter is attached.
//
// The kernel program relies on bounded loops and read-only global data
// (the node set lives in .rodata), which together need Linux 5.3+. The
// attach target must be a cgroup v2 directory.

use std::path::Path;

use crate::error::GateError;

/// Oldest kernel that accepts the program.
pub const MIN_KERNEL: (u32, u32) = (5, 3);

/// Check that the running kernel can load the filter.
pub fn check_kernel() -> Result<(), GateError> {
    let release = std::fs::read_to_string(OSRELEASE).map_err(|e| {
        GateError::KernelUnsupported(format!("cannot read {OSRELEASE}: {e}"))
    })?;

    let (major, minor) = parse_release(&release).ok_or_else(|| {
        GateError::KernelUnsupported(format!("unrecognized release {:?}", release.trim()))
    })?;
    if (major, minor) < MIN_KERNEL {
        return Err(GateError::KernelUnsupported(format!(
            "kernel {major}.{minor} is older than {}.{}",
            MIN_KERNEL.0, MIN_KERNEL.1
        )));
    }
    log::debug!("probe: kernel {major}.{minor} ok");
    Ok(())
}

const OSRELEASE: &str = "/proc/sys/kernel/osrelease";

/// `(major, minor)` from a release string such as `6.1.0-17-amd64` or
/// `5.10-rc3`. Anything after the minor number's digits is ignored.
fn parse_release(release: &str) -> Option<(u32, u32)> {
    let (major, rest) = release.trim().split_once('.')?;
    let digits = rest
        .find(|c: char| !c.is_ascii_digit())
        .map_or(rest, |end| &rest[..end]);
    Some((major.parse().ok()?, digits.parse().ok()?))
}

/// Check that `path` is a cgroup v2 directory.
///
/// Only the unified hierarchy exposes `cgroup.controllers`, so its presence
/// distinguishes v2 from a v1 controller directory.
pub fn check_cgroup_dir(path: &Path) -> Result<(), GateError> {
    let meta = std::fs::metadata(path)
        .map_err(|e| GateError::Cgroup(format!("{}: {e}", path.display())))?;
    if !meta.is_dir() {
        return Err(GateError::Cgroup(format!(
            "{} is not a directory",
            path.display()
        )));
    }
    if !path.join("cgroup.controllers").exists() {
        return Err(GateError::Cgroup(format!(
            "{} is not a cgroup v2 directory (no cgroup.controllers)",
            path.display()
        )));
    }
    log::debug!("probe: cgroup {} ok", path.display());
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
