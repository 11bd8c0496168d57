//! Memory reclamation hooks around engine startup.
//!
//! Engine construction parses configuration and loads geo assets, which
//! leaves a large transient allocation footprint behind. The manager calls
//! [`MemoryReclaimer::prime`] before construction and
//! [`MemoryReclaimer::reclaim`] once after a successful start. Neither hook
//! participates in lifecycle invariants; both must be infallible.

/// Hooks invoked around engine startup to return memory to the OS.
pub trait MemoryReclaimer: Send + Sync {
    /// Called once before engine construction.
    fn prime(&self) {}

    /// Called once after a successful start.
    fn reclaim(&self) {}
}

/// Reclaimer that trims the allocator's free lists back to the OS.
///
/// On Linux this calls `malloc_trim(0)`; elsewhere both hooks are no-ops.
#[derive(Debug, Default, Clone, Copy)]
pub struct MallocTrim;

impl MemoryReclaimer for MallocTrim {
    fn reclaim(&self) {
        #[cfg(target_os = "linux")]
        // SAFETY: malloc_trim only walks the allocator's own free lists.
        unsafe {
            libc::malloc_trim(0);
        }
    }
}

/// Reclaimer that does nothing. Useful in tests and on hosts that manage
/// memory pressure themselves.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopReclaimer;

impl MemoryReclaimer for NoopReclaimer {}
