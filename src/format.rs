//! `TIMEFMT` template rendering.
//!
//! Templates use zsh's percent escapes. A `%` consumes the following
//! character and substitutes a value from [`Metrics`]; everything else is
//! copied through unchanged. The one two-character escape is `%*E`, which
//! renders elapsed time as a clock. Unknown escapes are kept as written, so
//! rendering never fails.

use std::fmt::Write;
use std::time::Duration;

use crate::metrics::Metrics;

const SECS_PER_MINUTE: u64 = 60;
const SECS_PER_HOUR: u64 = 60 * SECS_PER_MINUTE;

/// A single-character escape recognized after `%`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Specifier {
    Percent,
    Command,
    UserTime,
    SystemTime,
    ElapsedTime,
    CpuPercent,
    MaxRss,
    Swaps,
    SharedRss,
    UnsharedTotal,
    MemoryTotal,
    PageFaults,
    PageReclaims,
    BlockInput,
    BlockOutput,
    MsgsRecv,
    MsgsSent,
    Signals,
    VoluntarySwitches,
    InvoluntarySwitches,
}

impl Specifier {
    fn from_char(c: char) -> Option<Self> {
        let spec = match c {
            '%' => Specifier::Percent,
            'J' => Specifier::Command,
            'U' => Specifier::UserTime,
            'S' => Specifier::SystemTime,
            'E' => Specifier::ElapsedTime,
            'P' => Specifier::CpuPercent,
            'M' => Specifier::MaxRss,
            'W' => Specifier::Swaps,
            'X' => Specifier::SharedRss,
            'D' => Specifier::UnsharedTotal,
            'K' => Specifier::MemoryTotal,
            'F' => Specifier::PageFaults,
            'R' => Specifier::PageReclaims,
            'I' => Specifier::BlockInput,
            'O' => Specifier::BlockOutput,
            'r' => Specifier::MsgsRecv,
            's' => Specifier::MsgsSent,
            'k' => Specifier::Signals,
            'w' => Specifier::VoluntarySwitches,
            'c' => Specifier::InvoluntarySwitches,
            _ => return None,
        };
        Some(spec)
    }

    fn write(self, out: &mut String, metrics: &Metrics) {
        let counters = metrics.counters();
        let count = match self {
            Specifier::Percent => {
                out.push('%');
                return;
            }
            Specifier::Command => {
                out.push_str(metrics.command());
                return;
            }
            Specifier::UserTime => return write_seconds(out, metrics.user_time()),
            Specifier::SystemTime => return write_seconds(out, metrics.system_time()),
            Specifier::ElapsedTime => return write_seconds(out, metrics.elapsed_time()),
            Specifier::CpuPercent => {
                let _ = write!(out, "{}%", metrics.cpu_percent());
                return;
            }
            Specifier::MaxRss => counters.max_rss,
            Specifier::Swaps => counters.swaps,
            Specifier::SharedRss => counters.shared_rss,
            Specifier::UnsharedTotal => counters.unshared_total(),
            Specifier::MemoryTotal => counters.memory_total(),
            Specifier::PageFaults => counters.page_faults,
            Specifier::PageReclaims => counters.page_reclaims,
            Specifier::BlockInput => counters.block_input,
            Specifier::BlockOutput => counters.block_output,
            Specifier::MsgsRecv => counters.msgs_recv,
            Specifier::MsgsSent => counters.msgs_sent,
            Specifier::Signals => counters.signals,
            Specifier::VoluntarySwitches => counters.v_ctx_switches,
            Specifier::InvoluntarySwitches => counters.i_ctx_switches,
        };
        let _ = write!(out, "{count}");
    }
}

/// Renders `template` against `metrics`.
///
/// Pure and infallible: unknown escapes come out as `%` followed by the
/// character, a trailing `%` comes out as `%`, and `%*` not followed by `E`
/// comes out as `*`.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use ztime::{render, Metrics, ProcessUsage};
///
/// let metrics = Metrics::new("make", Duration::from_millis(2500), ProcessUsage::default());
/// assert_eq!(render("%J took %*E", &metrics), "make took 0:02.50");
/// ```
pub fn render(template: &str, metrics: &Metrics) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        match chars.next() {
            None => out.push('%'),
            Some('*') => {
                if chars.next_if_eq(&'E').is_some() {
                    write_clock(&mut out, metrics.elapsed_time());
                } else {
                    out.push('*');
                }
            }
            Some(c) => match Specifier::from_char(c) {
                Some(spec) => spec.write(&mut out, metrics),
                None => {
                    out.push('%');
                    out.push(c);
                }
            },
        }
    }

    out
}

/// Seconds with two decimals and an `s` suffix, e.g. `0.50s`.
fn write_seconds(out: &mut String, duration: Duration) {
    let _ = write!(out, "{:.2}s", duration.as_secs_f64());
}

/// `H:MM:SS.SS` from one hour up, `M:SS.SS` below that.
fn write_clock(out: &mut String, duration: Duration) {
    let whole_minutes = duration.as_secs() / SECS_PER_MINUTE;
    let hours = duration.as_secs() / SECS_PER_HOUR;
    let minutes = whole_minutes % 60;
    let seconds = duration.as_secs_f64() - (whole_minutes * SECS_PER_MINUTE) as f64;

    let _ = if hours > 0 {
        write!(out, "{hours}:{minutes:02}:{seconds:05.2}")
    } else {
        write!(out, "{minutes}:{seconds:05.2}")
    };
}
