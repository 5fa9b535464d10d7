//! Utilities for logging messages from the library.

use once_cell::sync::Lazy;

/// Writes a log line for a [`Session`](crate::session::Session) if logging is enabled for it.
///
/// Output goes to stderr, so that operation listings printed on stdout stay clean.
#[doc(hidden)]
#[macro_export]
macro_rules! svgops_log {
    (
        $session:expr,
        $($arg:tt)+
    ) => {
        if $session.log_enabled() {
            eprintln!("svgops: {}", format_args!($($arg)+));
        }
    };
}

/// Whether the `SVGOPS_LOG` environment variable was set when the library first looked.
pub fn log_enabled() -> bool {
    static ENABLED: Lazy<bool> = Lazy::new(|| ::std::env::var_os("SVGOPS_LOG").is_some());

    *ENABLED
}
