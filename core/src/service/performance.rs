use tracing::{debug, info};

use crate::error::Result;
use crate::input::normalize_date;
use crate::model::activity::ActivityKind;
use crate::model::robot::PerformanceEntry;
use crate::model::selector::Selector;
use crate::repository::KeyValueStore;
use crate::service::store::DataStore;

impl<S: KeyValueStore> DataStore<S> {
    /// Stores the result for `date`, replacing any earlier entry for that
    /// exact date. Returns `false` for the team selector.
    pub fn record_performance(
        &mut self,
        selector: &Selector,
        date: &str,
        successes: u32,
        failures: u32,
    ) -> Result<bool> {
        let date = normalize_date(date)?;
        let Some(robot) = self.target_mut(selector)? else {
            debug!(%date, "performance needs a single robot");
            return Ok(false);
        };
        let replaced = robot
            .performance
            .insert(date.clone(), PerformanceEntry { successes, failures });
        let robot_id = robot.id.clone();

        self.record(
            format!(
                "Performance recorded: {} successes, {} failures",
                successes, failures
            ),
            ActivityKind::Success,
        );
        self.save()?;

        info!(robot = %robot_id, %date, successes, failures, overwrite = replaced.is_some(), "performance recorded");
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryKeyValueStore;

    #[test]
    fn test_same_date_overwrites() {
        let mut store = DataStore::load(MemoryKeyValueStore::new());
        let atlas = Selector::robot("robot1");
        store.record_performance(&atlas, "2024-01-01", 3, 1).unwrap();
        store.record_performance(&atlas, "2024-01-01", 7, 2).unwrap();

        let log = &store.robot("robot1").unwrap().performance;
        assert_eq!(log.len(), 1);
        assert_eq!(
            log["2024-01-01"],
            PerformanceEntry { successes: 7, failures: 2 }
        );
    }

    #[test]
    fn test_empty_date_rejected_without_mutation() {
        let mut store = DataStore::load(MemoryKeyValueStore::new());
        let err = store
            .record_performance(&Selector::robot("robot1"), " ", 1, 1)
            .unwrap_err();
        assert!(err.is_validation());
        assert!(store.robot("robot1").unwrap().performance.is_empty());
        assert!(store.activities().is_empty());
    }

    #[test]
    fn test_team_selector_is_a_no_op() {
        let mut store = DataStore::load(MemoryKeyValueStore::new());
        assert!(!store
            .record_performance(&Selector::Team, "2024-01-01", 1, 0)
            .unwrap());
        assert!(store.robots().iter().all(|r| r.performance.is_empty()));
    }

    #[test]
    fn test_records_activity() {
        let mut store = DataStore::load(MemoryKeyValueStore::new());
        store
            .record_performance(&Selector::robot("robot2"), "2024-02-10", 4, 0)
            .unwrap();
        assert_eq!(
            store.activities().entries()[0].message,
            "Performance recorded: 4 successes, 0 failures"
        );
    }
}
