// Mon Jan 19 2026 - Alex

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MemoryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Access denied opening process {pid} (os error {code})")]
    AccessDenied { pid: u32, code: i64 },
    #[error("Process not found: {0}")]
    ProcessNotFound(u32),
    #[error("Failed to close process handle 0x{handle:x} (os error {code})")]
    CloseFailure { handle: u64, code: i64 },
    #[error("Read failed at address 0x{address:x} (os error {code})")]
    ReadFailed { address: u64, code: i64 },
    #[error("Malformed region record: expected {expected} bytes, got {actual}")]
    MalformedRecord { expected: usize, actual: usize },
    #[error("Invalid search pattern: {0}")]
    InvalidPattern(String),
    #[error("Unknown process handle 0x{0:x}")]
    UnknownHandle(u64),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Thread pool error: {0}")]
    ThreadPool(String),
}

/// Outcome of a failed region query.
///
/// `EndOfAddressSpace` is how a walk normally finishes; `Failed` carries an OS
/// code the backend could not classify as the end of mapped space.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryError {
    #[error("end of address space")]
    EndOfAddressSpace,
    #[error("region query failed (os error {0})")]
    Failed(i64),
}
