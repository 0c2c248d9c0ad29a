// Copyright 2024 Keel Contributors
// SPDX-License-Identifier: Apache-2.0

//! CONTEXT: Minimal structured logging with severity levels
//! OWNERS: @port-team
//! STATUS: Functional
//! API_STABILITY: Unstable
//! TEST_COVERAGE: Unit tests for level gating and line framing
//! PUBLIC API: log_* macros, emit(level,target,args), install(sink)
//! DEPENDS_ON: spin::Once
//! INVARIANTS: Debug/Trace only in debug builds; single-line emission; silent until a sink exists

use core::fmt::Arguments;

/// Logging severity used by the port.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Level {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl Level {
    pub const fn tag(self) -> &'static str {
        match self {
            Level::Error => "ERROR",
            Level::Warn => "WARN",
            Level::Info => "INFO",
            Level::Debug => "DEBUG",
            Level::Trace => "TRACE",
        }
    }

    pub const fn enabled(self) -> bool {
        match self {
            Level::Debug | Level::Trace => cfg!(debug_assertions),
            _ => true,
        }
    }
}

/// Destination for formatted log lines.
///
/// Implementations must not block on a resource the caller may already hold.
pub trait Sink: Sync {
    fn write_line(&self, level: Level, target: &'static str, args: Arguments<'_>);
}

static SINK: spin::Once<&'static dyn Sink> = spin::Once::new();

/// Installs the process-wide sink. Only the first call has an effect.
pub fn install(sink: &'static dyn Sink) {
    SINK.call_once(|| sink);
}

/// Emits a structured log line if the level is enabled for the current build.
pub fn emit(level: Level, target: &'static str, args: Arguments<'_>) {
    if !level.enabled() {
        return;
    }
    if let Some(sink) = SINK.get() {
        sink.write_line(level, target, args);
    }
}

/// Writes `[LEVEL target] message\n` to `out`.
pub fn frame<W: core::fmt::Write>(
    out: &mut W,
    level: Level,
    target: &'static str,
    args: Arguments<'_>,
) -> core::fmt::Result {
    out.write_fmt(format_args!("[{} {}] ", level.tag(), target))?;
    out.write_fmt(args)?;
    out.write_char('\n')
}

#[macro_export]
macro_rules! log_error {
    (target: $target:expr, $($arg:tt)+) => {{
        $crate::log::emit($crate::log::Level::Error, $target, format_args!($($arg)+));
    }};
    ($($arg:tt)+) => {{
        $crate::log::emit($crate::log::Level::Error, module_path!(), format_args!($($arg)+));
    }};
}

#[macro_export]
macro_rules! log_warn {
    (target: $target:expr, $($arg:tt)+) => {{
        $crate::log::emit($crate::log::Level::Warn, $target, format_args!($($arg)+));
    }};
    ($($arg:tt)+) => {{
        $crate::log::emit($crate::log::Level::Warn, module_path!(), format_args!($($arg)+));
    }};
}

#[macro_export]
macro_rules! log_info {
    (target: $target:expr, $($arg:tt)+) => {{
        $crate::log::emit($crate::log::Level::Info, $target, format_args!($($arg)+));
    }};
    ($($arg:tt)+) => {{
        $crate::log::emit($crate::log::Level::Info, module_path!(), format_args!($($arg)+));
    }};
}

#[macro_export]
macro_rules! log_debug {
    (target: $target:expr, $($arg:tt)+) => {{
        $crate::log::emit($crate::log::Level::Debug, $target, format_args!($($arg)+));
    }};
    ($($arg:tt)+) => {{
        $crate::log::emit($crate::log::Level::Debug, module_path!(), format_args!($($arg)+));
    }};
}

#[macro_export]
macro_rules! log_trace {
    (target: $target:expr, $($arg:tt)+) => {{
        $crate::log::emit($crate::log::Level::Trace, $target, format_args!($($arg)+));
    }};
    ($($arg:tt)+) => {{
        $crate::log::emit($crate::log::Level::Trace, module_path!(), format_args!($($arg)+));
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_levels_follow_build_profile() {
        assert!(Level::Error.enabled());
        assert!(Level::Info.enabled());
        assert_eq!(Level::Trace.enabled(), cfg!(debug_assertions));
    }

    #[test]
    fn frame_prefixes_level_and_target() {
        let mut out = String::new();
        frame(&mut out, Level::Warn, "boot", format_args!("tick {}", 1)).unwrap();
        assert_eq!(out, "[WARN boot] tick 1\n");
    }
}
