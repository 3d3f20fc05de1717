use crate::error::GateError;

/// Check that we are running as root. Loading and attaching cgroup programs
/// needs CAP_BPF and CAP_NET_ADMIN, which in practice means root.
pub fn check_root() -> Result<(), GateError> {
    if unsafe { libc::getuid() } != 0 {
        return Err(GateError::NotRoot);
    }
    Ok(())
}

/// Lift RLIMIT_MEMLOCK so program and map allocations are not refused on
/// kernels that still charge BPF memory against it (before 5.11).
///
/// Failure is only logged; from 5.11 BPF memory is charged to the cgroup.
pub fn raise_memlock_rlimit() {
    let rlim = libc::rlimit {
        rlim_cur: libc::RLIM_INFINITY,
        rlim_max: libc::RLIM_INFINITY,
    };
    let ret = unsafe { libc::setrlimit(libc::RLIMIT_MEMLOCK, &rlim) };
    if ret != 0 {
        log::warn!(
            "setrlimit(RLIMIT_MEMLOCK) failed: {}",
            std::io::Error::last_os_error()
        );
    }
}
