use tracing::info;

use crate::error::{Error, Result};
use crate::model::activity::ActivityKind;
use crate::model::robot::Robot;
use crate::model::selector::Selector;
use crate::model::task::{Priority, Task};
use crate::repository::KeyValueStore;
use crate::service::dto::TaskView;
use crate::service::store::DataStore;

/// Maps a position in the virtual team list (every robot's tasks laid end to
/// end in robot order) to `(robot position, local task index)`.
///
/// Always recomputed from the current robots; never cache the result across
/// mutations.
pub fn resolve_team_index(robots: &[Robot], index: usize) -> Option<(usize, usize)> {
    let mut remaining = index;
    for (pos, robot) in robots.iter().enumerate() {
        if remaining < robot.tasks.len() {
            return Some((pos, remaining));
        }
        remaining -= robot.tasks.len();
    }
    None
}

impl<S: KeyValueStore> DataStore<S> {
    /// Adds a task to one robot, or an independent copy to every robot for
    /// the team selector. Returns how many tasks were created.
    pub fn add_task(&mut self, selector: &Selector, text: &str, priority: Priority) -> Result<usize> {
        let text = text.trim();
        if text.is_empty() {
            return Err(Error::validation("Task text cannot be empty"));
        }
        let task = Task::new(text.to_string(), priority);

        let created = match self.target_mut(selector)? {
            Some(robot) => {
                robot.tasks.push(task);
                1
            }
            None => {
                for robot in &mut self.robots {
                    robot.tasks.push(task.clone());
                }
                self.robots.len()
            }
        };

        if created > 0 {
            self.record(format!("New task created: {}", text), ActivityKind::Success);
        }
        self.save()?;

        info!(%selector, created, "task added");
        Ok(created)
    }

    /// Flips the completion flag and returns the new value.
    pub fn toggle_task(&mut self, selector: &Selector, index: usize) -> Result<bool> {
        let (pos, local) = self.locate_task(selector, index)?;
        let completed = self.robots[pos].tasks[local].toggle();
        self.save()?;
        Ok(completed)
    }

    pub fn delete_task(&mut self, selector: &Selector, index: usize) -> Result<Task> {
        let (pos, local) = self.locate_task(selector, index)?;
        let removed = self.robots[pos].tasks.remove(local);
        self.save()?;

        info!(robot = %self.robots[pos].id, text = %removed.text, "task deleted");
        Ok(removed)
    }

    /// Tasks as addressed under `selector`: `TaskView::index` is what
    /// [`toggle_task`](Self::toggle_task) and [`delete_task`](Self::delete_task) expect.
    pub fn tasks_view(&self, selector: &Selector) -> Result<Vec<TaskView>> {
        let robots: Vec<&Robot> = match selector {
            Selector::Robot(id) => vec![self.robot(id)?],
            Selector::Team => self.robots.iter().collect(),
        };
        Ok(robots
            .into_iter()
            .flat_map(|robot| robot.tasks.iter().map(move |task| (robot, task)))
            .enumerate()
            .map(|(index, (robot, task))| TaskView {
                index,
                robot_id: robot.id.clone(),
                robot_name: robot.name.clone(),
                task: task.clone(),
            })
            .collect())
    }

    fn locate_task(&self, selector: &Selector, index: usize) -> Result<(usize, usize)> {
        match selector {
            Selector::Robot(id) => {
                let pos = self
                    .robots
                    .iter()
                    .position(|r| &r.id == id)
                    .ok_or_else(|| Error::robot_not_found(id))?;
                if index < self.robots[pos].tasks.len() {
                    Ok((pos, index))
                } else {
                    Err(Error::TaskNotFound { index })
                }
            }
            Selector::Team => {
                resolve_team_index(&self.robots, index).ok_or(Error::TaskNotFound { index })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryKeyValueStore;

    /// robot1 gets two tasks, robot2 three.
    fn store_with_tasks() -> DataStore<MemoryKeyValueStore> {
        let mut store = DataStore::load(MemoryKeyValueStore::new());
        let a = Selector::robot("robot1");
        let b = Selector::robot("robot2");
        store.add_task(&a, "A0", Priority::Low).unwrap();
        store.add_task(&a, "A1", Priority::Low).unwrap();
        store.add_task(&b, "B0", Priority::High).unwrap();
        store.add_task(&b, "B1", Priority::High).unwrap();
        store.add_task(&b, "B2", Priority::High).unwrap();
        store
    }

    #[test]
    fn test_resolve_team_index() {
        let store = store_with_tasks();
        let robots = store.robots();
        assert_eq!(resolve_team_index(robots, 0), Some((0, 0)));
        assert_eq!(resolve_team_index(robots, 1), Some((0, 1)));
        assert_eq!(resolve_team_index(robots, 2), Some((1, 0)));
        assert_eq!(resolve_team_index(robots, 4), Some((1, 2)));
        assert_eq!(resolve_team_index(robots, 5), None);
    }

    #[test]
    fn test_resolve_skips_robots_without_tasks() {
        let mut store = store_with_tasks();
        store.robots[0].tasks.clear();
        assert_eq!(resolve_team_index(store.robots(), 0), Some((1, 0)));
    }

    #[test]
    fn test_team_toggle_flips_only_the_resolved_task() {
        let mut store = store_with_tasks();
        assert!(store.toggle_task(&Selector::Team, 2).unwrap());

        let a = &store.robot("robot1").unwrap().tasks;
        let b = &store.robot("robot2").unwrap().tasks;
        assert!(a.iter().all(|t| !t.completed));
        assert!(b[0].completed);
        assert!(!b[1].completed && !b[2].completed);
    }

    #[test]
    fn test_team_add_is_an_independent_copy_per_robot() {
        let mut store = DataStore::load(MemoryKeyValueStore::new());
        assert_eq!(
            store.add_task(&Selector::Team, "Charge batteries", Priority::Medium).unwrap(),
            2
        );
        store.toggle_task(&Selector::robot("robot1"), 0).unwrap();

        assert!(store.robot("robot1").unwrap().tasks[0].completed);
        assert!(!store.robot("robot2").unwrap().tasks[0].completed);
        assert_eq!(store.robot("robot2").unwrap().tasks[0].text, "Charge batteries");
    }

    #[test]
    fn test_blank_task_rejected() {
        let mut store = DataStore::load(MemoryKeyValueStore::new());
        let err = store.add_task(&Selector::Team, "  ", Priority::High).unwrap_err();
        assert!(err.is_validation());
        assert!(store.robots().iter().all(|r| r.tasks.is_empty()));
    }

    #[test]
    fn test_team_delete_uses_fresh_resolution() {
        let mut store = store_with_tasks();
        let removed = store.delete_task(&Selector::Team, 1).unwrap();
        assert_eq!(removed.text, "A1");
        // index 1 now lands on robot2's first task
        let removed = store.delete_task(&Selector::Team, 1).unwrap();
        assert_eq!(removed.text, "B0");
    }

    #[test]
    fn test_deleting_robot_removes_its_tasks_from_team_view() {
        let mut store = store_with_tasks();
        store.delete_robot("robot1").unwrap();
        let view = store.tasks_view(&Selector::Team).unwrap();
        let texts: Vec<&str> = view.iter().map(|v| v.task.text.as_str()).collect();
        assert_eq!(texts, vec!["B0", "B1", "B2"]);
        assert_eq!(resolve_team_index(store.robots(), 0), Some((0, 0)));
    }

    #[test]
    fn test_out_of_range_index() {
        let mut store = store_with_tasks();
        assert!(matches!(
            store.toggle_task(&Selector::robot("robot1"), 2),
            Err(Error::TaskNotFound { index: 2 })
        ));
        assert!(store.delete_task(&Selector::Team, 9).unwrap_err().is_not_found());
    }

    #[test]
    fn test_team_view_indices_and_owners() {
        let store = store_with_tasks();
        let view = store.tasks_view(&Selector::Team).unwrap();
        assert_eq!(view.len(), 5);
        assert_eq!(view[3].index, 3);
        assert_eq!(view[3].robot_name, "Titan Pro");
        assert_eq!(view[3].task.text, "B1");

        let single = store.tasks_view(&Selector::robot("robot2")).unwrap();
        assert_eq!(single[0].index, 0);
        assert_eq!(single[0].task.text, "B0");
    }
}
