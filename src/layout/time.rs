// Copyright 2024 FastLabs Developers
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use jiff::Timestamp;
use jiff::fmt::strtime;
use jiff::tz::TimeZone;

use crate::Error;
use crate::Trap;
use crate::config::Config;
use crate::config::DateTimeOutput;

const CACHE_BUCKET_MILLIS: i64 = 10_000;

// "S.mmm": the seconds digit, the dot and the milliseconds
const SECONDS_AND_MILLIS_LEN: usize = 5;

/// Formats event timestamps according to the configured output kind.
///
/// With the default pattern of [`DateTimeOutput::DateTime`] or [`DateTimeOutput::Time`], the
/// text up to the tens-of-seconds digit is cached for each ten second bucket and the rest is
/// derived arithmetically. The last full text is cached for its exact millisecond. A custom
/// pattern only uses the exact millisecond cache.
///
/// # Examples
///
/// ```
/// use jiff::tz::TimeZone;
/// use plainlog::config::Config;
/// use plainlog::layout::TimestampFormatter;
/// use plainlog::trap::DefaultTrap;
///
/// let config = Config::default().timezone(TimeZone::UTC);
/// let formatter = TimestampFormatter::new(&config, &DefaultTrap::default());
/// assert_eq!(formatter.format(1_700_000_000_123), "2023-11-14T22:13:20.123");
/// ```
#[derive(Debug)]
pub struct TimestampFormatter {
    output: DateTimeOutput,
    pattern: Option<String>,
    timezone: TimeZone,
    start_millis: i64,
    cache: ArcSwapOption<TimeCache>,
}

#[derive(Debug)]
struct TimeCache {
    millis: i64,
    formatted: String,
    prefix: Option<(i64, Arc<str>)>,
}

impl TimestampFormatter {
    /// Create a formatter for `config`.
    ///
    /// A custom pattern that cannot be formatted is reported to `trap` and replaced by the
    /// default pattern.
    pub fn new(config: &Config, trap: &dyn Trap) -> Self {
        let pattern = match (&config.date_time_pattern, config.date_time_output) {
            (Some(pattern), DateTimeOutput::DateTime | DateTimeOutput::Time) => {
                let sample = Timestamp::UNIX_EPOCH.to_zoned(config.timezone.clone());
                match strtime::format(pattern, &sample) {
                    Ok(_) => Some(pattern.clone()),
                    Err(err) => {
                        trap.trap(
                            &Error::bad_config("date_time_pattern", pattern, "default pattern")
                                .with_source(err),
                        );
                        None
                    }
                }
            }
            _ => None,
        };

        Self {
            output: config.date_time_output,
            pattern,
            timezone: config.timezone.clone(),
            start_millis: config.start_millis,
            cache: ArcSwapOption::empty(),
        }
    }

    /// Format `millis` since the Unix epoch, using the cache.
    pub fn format(&self, millis: i64) -> String {
        match self.output {
            DateTimeOutput::UnixTime | DateTimeOutput::MillisFromStart => {
                return self.format_uncached(millis);
            }
            DateTimeOutput::DateTime | DateTimeOutput::Time => {}
        }

        let cached = self.cache.load();
        if let Some(cache) = cached.as_deref() {
            if cache.millis == millis {
                return cache.formatted.clone();
            }
        }

        // buckets follow the local wall clock, whose seconds need not align with UTC
        let Some(local) = self.local_millis(millis) else {
            return self.format_uncached(millis);
        };
        let bucket = local.div_euclid(CACHE_BUCKET_MILLIS);
        if let Some((cached_bucket, prefix)) = cached.as_deref().and_then(|c| c.prefix.as_ref()) {
            if *cached_bucket == bucket {
                let rest = local.rem_euclid(CACHE_BUCKET_MILLIS);
                let formatted = format!("{prefix}{}.{:03}", rest / 1000, rest % 1000);
                self.cache.store(Some(Arc::new(TimeCache {
                    millis,
                    formatted: formatted.clone(),
                    prefix: Some((bucket, prefix.clone())),
                })));
                return formatted;
            }
        }

        let formatted = self.format_uncached(millis);
        let prefix = if self.pattern.is_none() && formatted.len() >= SECONDS_AND_MILLIS_LEN {
            let end = formatted.len() - SECONDS_AND_MILLIS_LEN;
            Some((bucket, Arc::from(&formatted[..end])))
        } else {
            None
        };
        self.cache.store(Some(Arc::new(TimeCache {
            millis,
            formatted: formatted.clone(),
            prefix,
        })));
        formatted
    }

    fn local_millis(&self, millis: i64) -> Option<i64> {
        let ts = Timestamp::from_millisecond(millis).ok()?;
        let offset = self.timezone.to_offset(ts);
        Some(millis + i64::from(offset.seconds()) * 1000)
    }

    /// Format `millis` since the Unix epoch from scratch.
    pub fn format_uncached(&self, millis: i64) -> String {
        match self.output {
            DateTimeOutput::UnixTime => return millis.to_string(),
            DateTimeOutput::MillisFromStart => return (millis - self.start_millis).to_string(),
            DateTimeOutput::DateTime | DateTimeOutput::Time => {}
        }

        let Ok(ts) = Timestamp::from_millisecond(millis) else {
            return millis.to_string();
        };

        if let Some(pattern) = &self.pattern {
            let zoned = ts.to_zoned(self.timezone.clone());
            if let Ok(formatted) = strtime::format(pattern, &zoned) {
                return formatted;
            }
        }

        let dt = self.timezone.to_datetime(ts);
        match self.output {
            DateTimeOutput::DateTime => format!(
                "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}",
                dt.year(),
                dt.month(),
                dt.day(),
                dt.hour(),
                dt.minute(),
                dt.second(),
                dt.millisecond()
            ),
            _ => format!(
                "{:02}:{:02}:{:02}.{:03}",
                dt.hour(),
                dt.minute(),
                dt.second(),
                dt.millisecond()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::tz::Offset;
    use rand::Rng;

    use super::*;
    use crate::trap::tests::RecordingTrap;

    const NOV_14_2023: i64 = 1_700_000_000_123;

    fn formatter(config: Config) -> TimestampFormatter {
        TimestampFormatter::new(&config.timezone(TimeZone::UTC), &RecordingTrap::default())
    }

    #[test]
    fn default_patterns() {
        let f = formatter(Config::default());
        assert_eq!(f.format(NOV_14_2023), "2023-11-14T22:13:20.123");
        assert_eq!(f.format(0), "1970-01-01T00:00:00.000");
        assert_eq!(f.format(-1), "1969-12-31T23:59:59.999");

        let f = formatter(Config::default().date_time_output(DateTimeOutput::Time));
        assert_eq!(f.format(NOV_14_2023), "22:13:20.123");
    }

    #[test]
    fn numeric_outputs() {
        let f = formatter(Config::default().date_time_output(DateTimeOutput::UnixTime));
        assert_eq!(f.format(NOV_14_2023), "1700000000123");

        let f = formatter(
            Config::default()
                .date_time_output(DateTimeOutput::MillisFromStart)
                .start_millis(NOV_14_2023 - 250),
        );
        assert_eq!(f.format(NOV_14_2023), "250");
    }

    #[test]
    fn custom_pattern() {
        let f = formatter(Config::default().date_time_pattern("%Y/%m/%d %H:%M"));
        assert_eq!(f.format(NOV_14_2023), "2023/11/14 22:13");
        assert_eq!(f.format(NOV_14_2023 + 1), "2023/11/14 22:13");
    }

    #[test]
    fn bad_pattern_falls_back() {
        let trap = RecordingTrap::default();
        let config = Config::default()
            .timezone(TimeZone::UTC)
            .date_time_pattern("%Y-%");
        let f = TimestampFormatter::new(&config, &trap);
        assert_eq!(f.format(NOV_14_2023), "2023-11-14T22:13:20.123");
        assert_eq!(trap.messages().len(), 1);
    }

    #[test]
    fn cache_matches_uncached() {
        for output in [DateTimeOutput::DateTime, DateTimeOutput::Time] {
            let f = formatter(Config::default().date_time_output(output));
            let mut millis = NOV_14_2023;
            let mut rng = rand::rng();
            for _ in 0..2_000 {
                millis += rng.random_range(0..1_500);
                assert_eq!(f.format(millis), f.format_uncached(millis));
                assert_eq!(f.format(millis), f.format_uncached(millis));
            }
        }
    }

    #[test]
    fn cache_follows_offsets_off_ten_seconds() {
        let zones = [
            TimeZone::fixed(Offset::from_seconds(5).unwrap()),
            TimeZone::fixed(Offset::from_seconds(19 * 60 + 32).unwrap()),
            TimeZone::fixed(Offset::from_seconds(-3).unwrap()),
        ];
        for tz in zones {
            let config = Config::default().timezone(tz);
            let f = TimestampFormatter::new(&config, &RecordingTrap::default());
            let base = 1_700_000_000_000;
            for millis in [base + 1_000, base + 6_000, base + 9_999, base + 14_000, base + 15_000] {
                assert_eq!(f.format(millis), f.format_uncached(millis));
            }
        }

        let config = Config::default().timezone(TimeZone::fixed(Offset::from_seconds(5).unwrap()));
        let f = TimestampFormatter::new(&config, &RecordingTrap::default());
        assert_eq!(f.format(1_700_000_001_000), "2023-11-14T22:13:26.000");
        assert_eq!(f.format(1_700_000_006_000), "2023-11-14T22:13:31.000");
    }

    #[test]
    fn cache_crosses_bucket_boundaries() {
        let f = formatter(Config::default());
        let base = 1_700_000_009_998;
        for millis in base..base + 5 {
            assert_eq!(f.format(millis), f.format_uncached(millis));
        }
        assert_eq!(f.format(1_700_000_010_001), "2023-11-14T22:13:30.001");
    }
}
