//! Debugging feature flags.
//!
//! Toggle individual diagnostics here; keep them `false` by default so
//! normal runs stay quiet. Callers additionally gate on
//! `cfg(debug_assertions)` where the log would be hot.

pub struct DebugFlags {
    /// Emit per-fetch session transitions (begin/supersede/complete).
    pub print_fetch_sessions: bool,
    /// Emit every render command issued to the surface.
    pub print_render_commands: bool,
    /// Emit viewport classification changes.
    pub print_viewport_events: bool,
    /// Emit background poll ticks, including silent refresh failures.
    pub print_poll_ticks: bool,
}

pub const DEBUG_FLAGS: DebugFlags = DebugFlags {
    print_fetch_sessions: false,
    print_render_commands: false,
    print_viewport_events: true,
    print_poll_ticks: false,
};
