//! Class scheduling drafts and the upcoming-class agenda.

use crate::{RescheduleRequest, ScheduleClassRequest, ScheduleError, ScheduledClass};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Time of day preselected for a new class.
pub const DEFAULT_CLASS_TIME: &str = "12:00";

/// A topic, a calendar date and an `HH:MM` time, as picked in the
/// scheduler. Dates and times are local to the caller's time zone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassScheduleDraft {
    topic: Option<String>,
    date: Option<NaiveDate>,
    time: String,
}

impl Default for ClassScheduleDraft {
    fn default() -> Self {
        Self {
            topic: None,
            date: None,
            time: DEFAULT_CLASS_TIME.to_string(),
        }
    }
}

impl ClassScheduleDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select_topic(&mut self, topic_id: impl Into<String>) {
        self.topic = Some(topic_id.into());
    }

    pub fn select_date(&mut self, date: NaiveDate) {
        self.date = Some(date);
    }

    pub fn set_time(&mut self, time: impl Into<String>) {
        self.time = time.into();
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.date
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    /// Resolve date and time in `tz` to an instant strictly after `now`.
    pub fn resolve<Tz: TimeZone>(
        &self,
        tz: &Tz,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, ScheduleError> {
        let date = self.date.ok_or(ScheduleError::MissingDate)?;
        let time = NaiveTime::parse_from_str(self.time.trim(), "%H:%M")
            .map_err(|_| ScheduleError::InvalidTime(self.time.clone()))?;

        let local = tz
            .from_local_datetime(&date.and_time(time))
            .single()
            .ok_or_else(|| ScheduleError::AmbiguousTime(format!("{} {}", date, self.time)))?;
        let at = local.with_timezone(&Utc);

        if at <= now {
            return Err(ScheduleError::PastSchedule);
        }
        Ok(at)
    }

    /// Build the body for a new class. Topic and date are both required.
    pub fn to_request<Tz: TimeZone>(
        &self,
        tz: &Tz,
        now: DateTime<Utc>,
    ) -> Result<ScheduleClassRequest, ScheduleError> {
        let topic = match (self.topic.as_deref().map(str::trim), self.date) {
            (Some(topic), Some(_)) if !topic.is_empty() => topic.to_string(),
            _ => return Err(ScheduleError::MissingTopicOrDate),
        };

        Ok(ScheduleClassRequest {
            topic,
            schedule: self.resolve(tz, now)?,
        })
    }

    /// Build the body for moving `class_id` to this draft's date and time.
    /// The topic is not used.
    pub fn to_reschedule<Tz: TimeZone>(
        &self,
        class_id: &str,
        tz: &Tz,
        now: DateTime<Utc>,
    ) -> Result<RescheduleRequest, ScheduleError> {
        let class_id = validate_class_id(class_id)?;

        Ok(RescheduleRequest {
            class_id: class_id.to_string(),
            schedule: self.resolve(tz, now)?,
        })
    }
}

/// Trim `class_id` and check it is safe to use as one URL path segment.
pub(crate) fn validate_class_id(class_id: &str) -> Result<&str, ScheduleError> {
    let class_id = class_id.trim();
    if class_id.is_empty() {
        return Err(ScheduleError::MissingClassId);
    }
    if !class_id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ScheduleError::InvalidClassId(class_id.to_string()));
    }
    Ok(class_id)
}

/// Classes falling on one local calendar day, earliest first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayAgenda {
    pub date: NaiveDate,
    pub classes: Vec<ScheduledClass>,
}

/// Group classes by local day in `tz`. Days and the classes within them are
/// in chronological order.
pub fn group_by_day<Tz: TimeZone>(classes: &[ScheduledClass], tz: &Tz) -> Vec<DayAgenda> {
    let mut days: BTreeMap<NaiveDate, Vec<ScheduledClass>> = BTreeMap::new();
    for class in classes {
        let day = class.scheduled_at.with_timezone(tz).date_naive();
        days.entry(day).or_default().push(class.clone());
    }

    days.into_iter()
        .map(|(date, mut classes)| {
            classes.sort_by_key(|c| c.scheduled_at);
            DayAgenda { date, classes }
        })
        .collect()
}

/// Classes on local day `date` in `tz`, earliest first.
pub fn classes_on<'a, Tz: TimeZone>(
    classes: &'a [ScheduledClass],
    date: NaiveDate,
    tz: &Tz,
) -> Vec<&'a ScheduledClass> {
    let mut matching: Vec<_> = classes
        .iter()
        .filter(|c| c.scheduled_at.with_timezone(tz).date_naive() == date)
        .collect();
    matching.sort_by_key(|c| c.scheduled_at);
    matching
}
