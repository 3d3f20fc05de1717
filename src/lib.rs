pub mod cli;
pub mod error;
pub mod inspect;
pub mod output;
pub mod privilege;
pub mod probe;

#[cfg(feature = "ebpf")]
pub mod loader;
