#[derive(Debug, thiserror::Error)]
pub enum GateError {
    #[error("egressgate attach must run as root")]
    NotRoot,
    #[error("cgroup error: {0}")]
    Cgroup(String),
    #[error("unsupported kernel: {0}")]
    KernelUnsupported(String),
    #[error("cannot read eBPF object: {0}")]
    ObjectRead(#[source] std::io::Error),
    #[error("eBPF program error: {0}")]
    EbpfProgram(String),
    #[error("invalid frame: {0}")]
    InvalidFrame(String),
    #[error("serialization error: {0}")]
    Serialization(#[source] std::io::Error),
    #[error("fatal: {0}")]
    Fatal(String),
}
