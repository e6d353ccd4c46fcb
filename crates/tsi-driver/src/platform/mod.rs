//! Hardware-backed line and pointer implementations.

#[cfg(target_os = "linux")]
pub mod linux;
