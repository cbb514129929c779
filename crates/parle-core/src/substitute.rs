//! Placeholder expansion in reply and action templates.
//!
//! Recognized placeholders: `?0` `?1` `?2` (captures), `?name`, `?prop`,
//! `?date`, `?hour` and `?dt`. Any other `?` is kept as is. The scan is a
//! single left-to-right pass; expanded text is never rescanned.

use crate::capture::Captures;
use chrono::{Locale, NaiveDateTime};

const DATE_FORMAT: &str = "%A %d %B %Y";
const HOUR_FORMAT: &str = "%H:%M:%S";
const DATE_TIME_FORMAT: &str = "%A %d %B %Y %H:%M";

/// Source of the current local time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Wall clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        chrono::Local::now().naive_local()
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Live values read by the runtime placeholders.
#[derive(Debug, Clone)]
pub struct RuntimeValues<'a> {
    pub user_name: &'a str,
    pub propositions_enabled: bool,
    pub enabled_label: &'a str,
    pub disabled_label: &'a str,
    pub now: NaiveDateTime,
    /// Names of weekdays and months in `?date` and `?dt`
    pub locale: Locale,
}

/// Expand every placeholder of `template`.
#[must_use]
pub fn substitute(template: &str, captures: &Captures, values: &RuntimeValues<'_>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('?') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        match expand(after, captures, values) {
            Some((text, consumed)) => {
                out.push_str(&text);
                rest = &after[consumed..];
            }
            None => {
                out.push('?');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

/// Expansion of the placeholder at the start of `after` and the bytes it spans.
fn expand(after: &str, captures: &Captures, values: &RuntimeValues<'_>) -> Option<(String, usize)> {
    if let Some(digit @ '0'..='2') = after.chars().next() {
        let index = (digit as usize) - ('0' as usize);
        let text = captures.get(index).unwrap_or_default().to_string();
        return Some((text, 1));
    }

    if after.starts_with("name") {
        return Some((values.user_name.to_string(), 4));
    }
    if after.starts_with("prop") {
        let label = if values.propositions_enabled {
            values.enabled_label
        } else {
            values.disabled_label
        };
        return Some((label.to_string(), 4));
    }
    if after.starts_with("date") {
        return Some((localized(values, DATE_FORMAT), 4));
    }
    if after.starts_with("hour") {
        return Some((values.now.format(HOUR_FORMAT).to_string(), 4));
    }
    if after.starts_with("dt") {
        return Some((localized(values, DATE_TIME_FORMAT), 2));
    }

    None
}

fn localized(values: &RuntimeValues<'_>, format: &str) -> String {
    values
        .now
        .and_utc()
        .format_localized(format, values.locale)
        .to_string()
}
