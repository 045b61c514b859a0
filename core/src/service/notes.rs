use tracing::debug;

use crate::error::Result;
use crate::model::selector::Selector;
use crate::repository::KeyValueStore;
use crate::service::store::DataStore;

const EMPTY_NOTES: &str = "No notes";

impl<S: KeyValueStore> DataStore<S> {
    /// Returns `false` for the team selector, whose notes view is generated.
    pub fn set_notes(&mut self, selector: &Selector, text: &str) -> Result<bool> {
        let Some(robot) = self.target_mut(selector)? else {
            debug!("team notes are read-only");
            return Ok(false);
        };
        robot.notes = text.to_string();
        self.save()?;
        Ok(true)
    }

    pub fn notes(&self, selector: &Selector) -> Result<String> {
        match selector {
            Selector::Robot(id) => Ok(self.robot(id)?.notes.clone()),
            Selector::Team => Ok(self
                .robots
                .iter()
                .map(|robot| {
                    let notes = if robot.notes.is_empty() {
                        EMPTY_NOTES
                    } else {
                        robot.notes.as_str()
                    };
                    format!("=== {} ===\n{}\n", robot.name, notes)
                })
                .collect::<Vec<_>>()
                .join("\n")),
        }
    }
}
