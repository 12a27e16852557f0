//! Host-side pieces of SysGuard: the `sysinfo` metrics collector, the OS
//! action executor and the `sysguard` command-line interface.

pub mod actions;
pub mod cli;
pub mod collector;
pub mod monitor;
pub mod render;
