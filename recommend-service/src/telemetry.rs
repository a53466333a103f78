use std::io::{self, IsTerminal};
use std::str::FromStr;

use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::FormatTime;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{EnvFilter, Layer, filter, fmt};

/// Target prefix of every event emitted by this crate.
pub const TARGET_PREFIX: &str = "recommend_service";

/// RFC3339 UTC timer, e.g. `2026-10-18T10:20:30Z`.
#[derive(Clone, Debug, Default)]
struct ChronoRfc3339Utc;

impl FormatTime for ChronoRfc3339Utc {
    fn format_time(&self, w: &mut Writer<'_>) -> std::fmt::Result {
        let s = chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true);
        w.write_str(&s)
    }
}

/// Formatting layer that renders only `recommend_service` events.
///
/// Compact single-line output with `file:line`, span close timings (so
/// `recommend` reports its duration) and ANSI colors only on a terminal.
/// Compose it in the binary next to the global subscriber.
pub fn layer<S>() -> impl Layer<S> + Send + Sync
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let only_this_crate = filter::filter_fn(|meta| meta.target().starts_with(TARGET_PREFIX));

    fmt::layer()
        .with_timer(ChronoRfc3339Utc)
        .with_level(true)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(io::stdout().is_terminal())
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .event_format(fmt::format().compact().with_source_location(true))
        .with_filter(only_this_crate)
}

/// Env var overriding the level of `recommend_service` events.
pub const LOG_LEVEL_ENV: &str = "RECOMMEND_LOG_LEVEL";

/// Level named by `value` (`trace`..`error`, any case), else `default`.
pub fn parse_level(value: Option<&str>, default: Level) -> Level {
    value
        .map(str::trim)
        .and_then(|v| Level::from_str(v).ok())
        .unwrap_or(default)
}

/// [`parse_level`] applied to [`LOG_LEVEL_ENV`].
pub fn level_from_env(default: Level) -> Level {
    parse_level(std::env::var(LOG_LEVEL_ENV).ok().as_deref(), default)
}

/// `recommend_service=<level>` directive.
///
/// Returns `None` only if the directive fails to parse, which does not happen
/// for a `Level`.
pub fn level_directive(level: Level) -> Option<Directive> {
    let s = format!("{TARGET_PREFIX}={}", level.as_str().to_lowercase());
    Directive::from_str(&s).ok()
}

/// `RUST_LOG` (or `default` when unset/invalid) plus a level override for this crate.
pub fn env_filter_with_level(default: &str, level: Level) -> EnvFilter {
    let base = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    match level_directive(level) {
        Some(d) => base.add_directive(d),
        None => base,
    }
}
