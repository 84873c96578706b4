//! Night-time chat throttle.
//!
//! Between `nightStartHour` and `nightEndHour` (local time) each user may
//! send one chat message per `minIntervalSecs`. Daytime traffic is never
//! throttled and does not touch the map.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, FixedOffset, Offset, Timelike, Utc};
use tracing::warn;

use kairo_core::config::ThrottleConfig;

/// Part of the day, which selects throttling and reply length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimeMode {
    Day,
    Night,
}

/// Outcome of a throttle check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThrottleDecision {
    Allowed,
    Limited { retry_after_secs: i64 },
}

pub struct ChatThrottle {
    config: ThrottleConfig,
    offset: FixedOffset,
    last_contact: Mutex<HashMap<String, DateTime<FixedOffset>>>,
}

impl ChatThrottle {
    pub fn new(config: ThrottleConfig) -> Self {
        let offset = FixedOffset::east_opt(config.utc_offset_hours * 3600).unwrap_or_else(|| {
            warn!(hours = config.utc_offset_hours, "Invalid UTC offset, using UTC");
            Utc.fix()
        });
        Self {
            config,
            offset,
            last_contact: Mutex::new(HashMap::new()),
        }
    }

    /// Convert a UTC instant to the configured local time.
    pub fn local_time(&self, now: DateTime<Utc>) -> DateTime<FixedOffset> {
        now.with_timezone(&self.offset)
    }

    /// Day or night for a local hour (0–23).
    pub fn time_mode(&self, hour: u32) -> TimeMode {
        let start = self.config.night_start_hour;
        let end = self.config.night_end_hour;
        let is_day = if end <= start {
            end <= hour && hour < start
        } else {
            hour >= end || hour < start
        };
        if is_day {
            TimeMode::Day
        } else {
            TimeMode::Night
        }
    }

    /// Decide whether `user_id` may chat at local time `now`, recording the
    /// contact when allowed at night.
    pub fn check(&self, user_id: &str, now: DateTime<FixedOffset>) -> ThrottleDecision {
        if self.time_mode(now.hour()) == TimeMode::Day {
            return ThrottleDecision::Allowed;
        }

        let interval = Duration::seconds(self.config.min_interval_secs);
        let mut last_contact = self
            .last_contact
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(last) = last_contact.get(user_id) {
            let elapsed = now - *last;
            if elapsed < interval {
                let remaining = self.config.min_interval_secs - elapsed.num_seconds();
                return ThrottleDecision::Limited {
                    retry_after_secs: remaining.max(0),
                };
            }
        }

        last_contact.retain(|_, seen| now - *seen < interval);
        last_contact.insert(user_id.to_string(), now);
        ThrottleDecision::Allowed
    }

    /// User-facing text for a limited request, built from the configured window.
    pub fn limited_message(&self, retry_after_secs: i64) -> String {
        let interval = match self.config.min_interval_secs {
            60 => "1 tin nhắn mỗi phút".to_string(),
            secs if secs > 0 && secs % 60 == 0 => format!("1 tin nhắn mỗi {} phút", secs / 60),
            secs => format!("1 tin nhắn mỗi {secs} giây"),
        };
        format!(
            "Từ {start}h đến trước {end}h sáng, mỗi tài khoản chỉ gửi {interval} để tiết kiệm tài nguyên. \
             Bạn chờ khoảng {retry_after_secs} giây nữa rồi nhắn lại giúp mình nhé.",
            start = self.config.night_start_hour,
            end = self.config.night_end_hour,
        )
    }
}
