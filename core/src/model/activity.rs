use serde::{Deserialize, Serialize};
use chrono::Local;

/// Most entries kept in the feed; older ones are evicted.
pub const ACTIVITY_CAP: usize = 50;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    #[default]
    Info,
    Success,
    Error,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Info => "info",
            ActivityKind::Success => "success",
            ActivityKind::Error => "error",
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Activity {
    pub message: String,
    #[serde(rename = "type", default)]
    pub kind: ActivityKind,
    #[serde(default)]
    pub timestamp: String,
}

impl Activity {
    pub fn new(message: String, kind: ActivityKind) -> Self {
        Self {
            message,
            kind,
            timestamp: Local::now().format("%d/%m/%Y %H:%M:%S").to_string(),
        }
    }
}

/// Append-only feed, most recent first, never longer than [`ACTIVITY_CAP`].
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(transparent)]
pub struct ActivityLog {
    entries: Vec<Activity>,
}

impl ActivityLog {
    pub fn from_entries(mut entries: Vec<Activity>) -> Self {
        entries.truncate(ACTIVITY_CAP);
        Self { entries }
    }

    pub fn push(&mut self, activity: Activity) {
        self.entries.insert(0, activity);
        self.entries.truncate(ACTIVITY_CAP);
    }

    pub fn recent(&self, n: usize) -> &[Activity] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn entries(&self) -> &[Activity] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_most_recent_first_and_caps() {
        let mut log = ActivityLog::default();
        for i in 0..60 {
            log.push(Activity::new(format!("event {}", i), ActivityKind::Info));
        }
        assert_eq!(log.len(), ACTIVITY_CAP);
        assert_eq!(log.entries()[0].message, "event 59");
        assert_eq!(log.entries()[49].message, "event 10");
    }

    #[test]
    fn test_recent_is_bounded_by_len() {
        let mut log = ActivityLog::default();
        log.push(Activity::new("one".into(), ActivityKind::Success));
        assert_eq!(log.recent(10).len(), 1);
    }

    #[test]
    fn test_from_entries_truncates_oversized_history() {
        let entries = (0..70)
            .map(|i| Activity::new(i.to_string(), ActivityKind::Info))
            .collect();
        assert_eq!(ActivityLog::from_entries(entries).len(), ACTIVITY_CAP);
    }

    #[test]
    fn test_serialized_kind_uses_type_key() {
        let activity = Activity::new("Timer finished".into(), ActivityKind::Info);
        let json = serde_json::to_value(&activity).unwrap();
        assert_eq!(json["type"], "info");
    }
}
