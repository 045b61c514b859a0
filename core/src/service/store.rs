use chrono::Utc;
use serde::de::DeserializeOwned;
use tracing::{error, info, warn};

use crate::error::{Error, Result};
use crate::model::activity::{Activity, ActivityKind, ActivityLog};
use crate::model::robot::{seed_robots, Robot};
use crate::model::selector::Selector;
use crate::repository::KeyValueStore;

pub const ROBOTS_KEY: &str = "robots";
pub const ACTIVITIES_KEY: &str = "activities";

const DEFAULT_CATEGORY: &str = "General";
const ROBOT_ID_PREFIX: &str = "robot_";

/// Sole owner of the robot records and the activity feed. Every mutation is
/// written through to the backing [`KeyValueStore`] before it returns.
///
/// Mutating methods take `&mut self`, so there is exactly one writer at a
/// time; share it across threads behind a `Mutex` if ever needed.
#[derive(Debug)]
pub struct DataStore<S: KeyValueStore> {
    storage: S,
    pub(crate) robots: Vec<Robot>,
    activities: ActivityLog,
    selection: Selector,
}

impl<S: KeyValueStore> DataStore<S> {
    /// Reads persisted state. Unreadable values are treated as absent, and an
    /// empty robot list is replaced by the demonstration robots.
    pub fn load(storage: S) -> Self {
        let robots: Vec<Robot> = read_key(&storage, ROBOTS_KEY)
            .unwrap_or_else(|e| {
                warn!(error = %e, "discarding stored robots");
                None
            })
            .unwrap_or_default();

        let activities = read_key(&storage, ACTIVITIES_KEY)
            .unwrap_or_else(|e| {
                warn!(error = %e, "discarding stored activities");
                None
            })
            .map(ActivityLog::from_entries)
            .unwrap_or_default();

        let mut store = Self {
            storage,
            robots,
            activities,
            selection: Selector::Team,
        };

        if store.robots.is_empty() {
            info!("no robots stored, seeding demonstration robots");
            store.robots = seed_robots();
            if let Err(e) = store.save() {
                error!(error = %e, "failed to persist seed robots");
            }
        }

        store
    }

    pub fn save(&self) -> Result<()> {
        let robots = serde_json::to_string_pretty(&self.robots)?;
        let activities = serde_json::to_string_pretty(&self.activities)?;
        self.storage.set(ROBOTS_KEY, &robots)?;
        self.storage.set(ACTIVITIES_KEY, &activities)?;
        Ok(())
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn robots(&self) -> &[Robot] {
        &self.robots
    }

    pub fn robot(&self, id: &str) -> Result<&Robot> {
        self.robots
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::robot_not_found(id))
    }

    pub(crate) fn robot_mut(&mut self, id: &str) -> Result<&mut Robot> {
        self.robots
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| Error::robot_not_found(id))
    }

    /// `Ok(None)` for the team selector, which owns nothing it could mutate.
    pub(crate) fn target_mut(&mut self, selector: &Selector) -> Result<Option<&mut Robot>> {
        match selector {
            Selector::Team => Ok(None),
            Selector::Robot(id) => self.robot_mut(id).map(Some),
        }
    }

    pub fn add_robot(&mut self, name: &str, category: &str, description: &str) -> Result<String> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation("Robot name is required"));
        }
        let category = match category.trim() {
            "" => DEFAULT_CATEGORY,
            c => c,
        };

        let id = self.next_robot_id();
        self.robots.push(Robot::new(
            id.clone(),
            name.to_string(),
            category.to_string(),
            description.trim().to_string(),
        ));
        self.record(format!("New robot created: {}", name), ActivityKind::Success);
        self.save()?;

        info!(robot = %id, name, "robot created");
        Ok(id)
    }

    /// Removes the robot and everything it owns.
    pub fn delete_robot(&mut self, id: &str) -> Result<Robot> {
        let pos = self
            .robots
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| Error::robot_not_found(id))?;
        let removed = self.robots.remove(pos);

        if self.selection == Selector::Robot(removed.id.clone()) {
            self.selection = Selector::Team;
        }
        self.record(format!("Robot deleted: {}", removed.name), ActivityKind::Error);
        self.save()?;

        info!(robot = %removed.id, name = %removed.name, "robot deleted");
        Ok(removed)
    }

    pub fn select(&mut self, selector: Selector) -> Result<()> {
        if let Selector::Robot(id) = &selector {
            self.robot(id)?;
        }
        self.selection = selector;
        Ok(())
    }

    pub fn selection(&self) -> &Selector {
        &self.selection
    }

    pub fn add_activity(&mut self, message: impl Into<String>, kind: ActivityKind) -> Result<()> {
        self.record(message.into(), kind);
        self.save()
    }

    pub fn activities(&self) -> &ActivityLog {
        &self.activities
    }

    /// Appends to the feed without persisting; the caller saves once.
    pub(crate) fn record(&mut self, message: String, kind: ActivityKind) {
        self.activities.push(Activity::new(message, kind));
    }

    fn next_robot_id(&self) -> String {
        let mut millis = Utc::now().timestamp_millis();
        loop {
            let id = format!("{}{}", ROBOT_ID_PREFIX, millis);
            if !self.robots.iter().any(|r| r.id == id) {
                return id;
            }
            millis += 1;
        }
    }
}

fn read_key<S: KeyValueStore, T: DeserializeOwned>(storage: &S, key: &str) -> Result<Option<T>> {
    let Some(raw) = storage.get(key)? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| Error::PersistenceRead {
            key: key.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::activity::ACTIVITY_CAP;
    use crate::repository::MemoryKeyValueStore;
    use crate::usecase::dashboard::DashboardUseCase;

    fn empty_store() -> DataStore<MemoryKeyValueStore> {
        let mut store = DataStore::load(MemoryKeyValueStore::new());
        store.robots.clear();
        store
    }

    #[test]
    fn test_first_run_seeds_and_persists() {
        let store = DataStore::load(MemoryKeyValueStore::new());
        assert_eq!(store.robots().len(), 2);
        assert_eq!(store.robots()[0].name, "Atlas MK-I");

        let raw = store.storage().get(ROBOTS_KEY).unwrap().unwrap();
        let persisted: Vec<Robot> = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted.len(), 2);
    }

    #[test]
    fn test_unparseable_robots_fall_back_to_seed() {
        let storage = MemoryKeyValueStore::with_value(ROBOTS_KEY, "{not json");
        let store = DataStore::load(storage);
        assert_eq!(store.robots().len(), 2);
        assert!(store.activities().is_empty());
    }

    #[test]
    fn test_unparseable_activities_fall_back_to_empty() {
        let storage = MemoryKeyValueStore::with_value(ACTIVITIES_KEY, "nope");
        let store = DataStore::load(storage);
        assert!(store.activities().is_empty());
    }

    #[test]
    fn test_add_robot_trims_and_defaults_category() {
        let mut store = empty_store();
        let id = store.add_robot("  Scout  ", "", " fast ").unwrap();
        let robot = store.robot(&id).unwrap();
        assert!(id.starts_with("robot_"));
        assert_eq!(robot.name, "Scout");
        assert_eq!(robot.category, "General");
        assert_eq!(robot.description, "fast");
        assert!(robot.swot.is_empty());
        assert_eq!(store.activities().entries()[0].message, "New robot created: Scout");
    }

    #[test]
    fn test_add_robot_rejects_blank_name_without_mutation() {
        let mut store = empty_store();
        let err = store.add_robot("   ", "Combat", "").unwrap_err();
        assert!(err.is_validation());
        assert!(store.robots().is_empty());
        assert!(store.activities().is_empty());
    }

    #[test]
    fn test_generated_ids_are_unique() {
        let mut store = empty_store();
        let a = store.add_robot("A", "", "").unwrap();
        let b = store.add_robot("B", "", "").unwrap();
        let c = store.add_robot("C", "", "").unwrap();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
    }

    #[test]
    fn test_delete_robot_keeps_order_of_others() {
        let mut store = DataStore::load(MemoryKeyValueStore::new());
        let id = store.add_robot("Third", "", "").unwrap();
        store.delete_robot("robot1").unwrap();

        let ids: Vec<&str> = store.robots().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["robot2", id.as_str()]);
        assert_eq!(store.activities().entries()[0].kind, ActivityKind::Error);
    }

    #[test]
    fn test_robot_totals_drop_deleted_robot() {
        let mut store = DataStore::load(MemoryKeyValueStore::new());
        let third = store.add_robot("Third", "", "").unwrap();
        for (id, successes) in [("robot1", 4), ("robot2", 7), (third.as_str(), 2)] {
            let robot = Selector::robot(id);
            store.record_performance(&robot, "2024-03-01", successes, 1).unwrap();
        }
        store.delete_robot("robot2").unwrap();

        let totals = DashboardUseCase::new(store.robots()).robot_totals();
        let rows: Vec<(&str, u64, u64)> = totals
            .iter()
            .map(|s| (s.id.as_str(), s.successes, s.failures))
            .collect();
        assert_eq!(rows, vec![("robot1", 4, 1), (third.as_str(), 2, 1)]);
    }

    #[test]
    fn test_delete_missing_robot_is_not_found() {
        let mut store = DataStore::load(MemoryKeyValueStore::new());
        let err = store.delete_robot("ghost").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.robots().len(), 2);
    }

    #[test]
    fn test_deleting_selected_robot_resets_selection() {
        let mut store = DataStore::load(MemoryKeyValueStore::new());
        store.select(Selector::robot("robot2")).unwrap();
        store.delete_robot("robot2").unwrap();
        assert_eq!(store.selection(), &Selector::Team);
    }

    #[test]
    fn test_select_unknown_robot_fails() {
        let mut store = DataStore::load(MemoryKeyValueStore::new());
        assert!(store.select(Selector::robot("ghost")).is_err());
        assert_eq!(store.selection(), &Selector::Team);
    }

    #[test]
    fn test_activity_cap_after_sixty_entries() {
        let mut store = DataStore::load(MemoryKeyValueStore::new());
        for i in 0..60 {
            store.add_activity(format!("event {}", i), ActivityKind::Info).unwrap();
        }
        let entries = store.activities().entries();
        assert_eq!(entries.len(), ACTIVITY_CAP);
        assert_eq!(entries[0].message, "event 59");
        assert_eq!(entries[ACTIVITY_CAP - 1].message, "event 10");
    }

    #[test]
    fn test_state_survives_reload() {
        let mut store = DataStore::load(MemoryKeyValueStore::new());
        store.add_robot("Scout", "Recon", "").unwrap();
        let storage = store.storage;

        let reloaded = DataStore::load(storage);
        assert_eq!(reloaded.robots().len(), 3);
        assert_eq!(reloaded.activities().len(), 1);
    }
}
