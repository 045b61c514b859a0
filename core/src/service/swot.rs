use tracing::debug;

use crate::error::{Error, Result};
use crate::model::robot::{Swot, SwotCategory};
use crate::model::selector::Selector;
use crate::repository::KeyValueStore;
use crate::service::store::DataStore;

impl<S: KeyValueStore> DataStore<S> {
    /// A robot's lists verbatim, or for the team each category concatenated
    /// across robots in list order. The team view is read-only.
    pub fn swot(&self, selector: &Selector) -> Result<Swot> {
        match selector {
            Selector::Robot(id) => Ok(self.robot(id)?.swot.clone()),
            Selector::Team => {
                let mut merged = Swot::default();
                for robot in &self.robots {
                    for category in SwotCategory::ALL {
                        merged
                            .items_mut(category)
                            .extend(robot.swot.items(category).iter().cloned());
                    }
                }
                Ok(merged)
            }
        }
    }

    /// Replaces one category wholesale. Blank items are dropped.
    /// Returns `false` for the team selector, which is not editable.
    pub fn set_swot(
        &mut self,
        selector: &Selector,
        category: SwotCategory,
        items: Vec<String>,
    ) -> Result<bool> {
        let Some(robot) = self.target_mut(selector)? else {
            debug!(%category, "team SWOT is read-only");
            return Ok(false);
        };
        *robot.swot.items_mut(category) = items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect();
        self.save()?;
        Ok(true)
    }

    pub fn add_swot_item(
        &mut self,
        selector: &Selector,
        category: SwotCategory,
        item: &str,
    ) -> Result<bool> {
        let item = item.trim();
        if item.is_empty() {
            return Err(Error::validation("SWOT item cannot be empty"));
        }
        let Some(robot) = self.target_mut(selector)? else {
            debug!(%category, "ignoring SWOT item for team");
            return Ok(false);
        };
        robot.swot.items_mut(category).push(item.to_string());
        self.save()?;
        Ok(true)
    }
}
