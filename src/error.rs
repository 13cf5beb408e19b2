/*
 * Error type shared by the rich-text helpers and the Win32 form layer.
 * Native failures are surfaced as-is; nothing in this crate retries a failed
 * native call, so every variant is final for the call that produced it.
 */
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The native messaging facility is missing, or a native call reported failure.
    UnsupportedPlatform(String),
    /// A native buffer contract was violated (e.g. more text returned than announced).
    ResourceExhausted(String),
    InvalidHandle(String),
    OperationFailed(String),
    InitializationFailed(String),
    WindowCreationFailed(String),
}

impl fmt::Display for PlatformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlatformError::UnsupportedPlatform(msg) => write!(f, "Unsupported platform: {msg}"),
            PlatformError::ResourceExhausted(msg) => write!(f, "Resource exhausted: {msg}"),
            PlatformError::InvalidHandle(msg) => write!(f, "Invalid handle: {msg}"),
            PlatformError::OperationFailed(msg) => write!(f, "Operation failed: {msg}"),
            PlatformError::InitializationFailed(msg) => {
                write!(f, "Initialization failed: {msg}")
            }
            PlatformError::WindowCreationFailed(msg) => {
                write!(f, "Window creation failed: {msg}")
            }
        }
    }
}

impl std::error::Error for PlatformError {}

#[cfg(target_os = "windows")]
impl From<windows::core::Error> for PlatformError {
    fn from(err: windows::core::Error) -> Self {
        PlatformError::OperationFailed(format!(
            "Win32 call failed ({:#010x}): {}",
            err.code().0 as u32,
            err.message()
        ))
    }
}

pub type Result<T> = std::result::Result<T, PlatformError>;
