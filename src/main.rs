use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use clap::Parser;

use egressgate::cli::{AttachArgs, CheckArgs, Cli, Command, NodesArgs};
use egressgate::error::GateError;
use egressgate::inspect;
use egressgate::output;
use egressgate_ebpf_common::TESTNET_NODES;

/// Global shutdown flag, set by signal handlers.
static SHUTDOWN_REQUESTED: AtomicBool = AtomicBool::new(false);

extern "C" fn signal_handler(_sig: libc::c_int) {
    SHUTDOWN_REQUESTED.store(true, Ordering::Relaxed);
}

#[cfg_attr(not(feature = "ebpf"), allow(dead_code))]
fn install_signal_handlers() -> Result<(), GateError> {
    for sig in [libc::SIGTERM, libc::SIGINT] {
        let prev = unsafe { libc::signal(sig, signal_handler as *const () as libc::sighandler_t) };
        if prev == libc::SIG_ERR {
            return Err(GateError::Fatal(format!(
                "install handler for signal {sig}: {}",
                io::Error::last_os_error()
            )));
        }
    }
    Ok(())
}

fn exit_code(err: &GateError) -> i32 {
    match err {
        GateError::NotRoot => 1,
        GateError::Cgroup(_)
        | GateError::KernelUnsupported(_)
        | GateError::ObjectRead(_)
        | GateError::EbpfProgram(_) => 2,
        GateError::InvalidFrame(_) => 3,
        GateError::Serialization(_) | GateError::Fatal(_) => 4,
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| run(cli)));

    match result {
        Ok(Ok(())) => std::process::exit(0),
        Ok(Err(e)) => {
            eprintln!("error: {e}");
            std::process::exit(exit_code(&e));
        }
        Err(_) => {
            eprintln!("error: fatal: unexpected panic");
            std::process::exit(4);
        }
    }
}

fn run(cli: Cli) -> Result<(), GateError> {
    match cli.command {
        Command::Attach(args) => run_attach(&args),
        Command::Check(args) => run_check(&args),
        Command::Nodes(args) => run_nodes(&args),
    }
}

// ---------------------------------------------------------------------------
// attach
// ---------------------------------------------------------------------------

#[cfg(not(feature = "ebpf"))]
fn run_attach(_args: &AttachArgs) -> Result<(), GateError> {
    Err(GateError::EbpfProgram(
        "eBPF support not compiled in (build with --features ebpf)".to_string(),
    ))
}

#[cfg(feature = "ebpf")]
fn run_attach(args: &AttachArgs) -> Result<(), GateError> {
    use std::time::Duration;

    use egressgate::loader::EgressFilter;
    use egressgate::{privilege, probe};

    privilege::check_root()?;
    probe::check_kernel()?;
    probe::check_cgroup_dir(&args.cgroup)?;
    install_signal_handlers()?;
    privilege::raise_memlock_rlimit();

    log::info!(
        "Loading {} for cgroup {} ({} allowed nodes)",
        args.object.display(),
        args.cgroup.display(),
        TESTNET_NODES.len()
    );
    log::warn!(
        "cgroup/skb data starts at the IPv4 header; the filter parses an Ethernet \
         header first, so most egress is seen as non-IPv4 and allowed"
    );
    let filter = EgressFilter::attach(&args.object, &args.cgroup)?;

    while !SHUTDOWN_REQUESTED.load(Ordering::Relaxed) {
        std::thread::sleep(Duration::from_millis(200));
    }

    log::info!("Shutdown requested, detaching filter");
    drop(filter);
    Ok(())
}

// ---------------------------------------------------------------------------
// check / nodes
// ---------------------------------------------------------------------------

fn run_check(args: &CheckArgs) -> Result<(), GateError> {
    let frame = match (&args.frame, args.dest) {
        (Some(hex), _) => inspect::decode_frame(hex)?,
        (None, Some(dest)) => inspect::synth_frame(dest, args.proto),
        (None, None) => {
            return Err(GateError::InvalidFrame(
                "either --dest or --frame is required".to_string(),
            ))
        }
    };

    let report = inspect::check_frame(&frame, &TESTNET_NODES);
    log::debug!("check: {} byte frame -> {}", frame.len(), report.reason);
    output::write_check(&report, args.format, &mut io::stdout().lock())
}

fn run_nodes(args: &NodesArgs) -> Result<(), GateError> {
    output::write_nodes(TESTNET_NODES.as_slice(), args.format, &mut io::stdout().lock())
}
