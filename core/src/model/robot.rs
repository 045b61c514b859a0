use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::input::expand_key;
use crate::model::task::Task;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SwotCategory {
    Strengths,
    Weaknesses,
    Opportunities,
    Threats,
}

impl SwotCategory {
    pub const ALL: [SwotCategory; 4] = [
        SwotCategory::Strengths,
        SwotCategory::Weaknesses,
        SwotCategory::Opportunities,
        SwotCategory::Threats,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SwotCategory::Strengths => "strengths",
            SwotCategory::Weaknesses => "weaknesses",
            SwotCategory::Opportunities => "opportunities",
            SwotCategory::Threats => "threats",
        }
    }
}

impl fmt::Display for SwotCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwotCategory {
    type Err = Error;

    /// Accepts any unambiguous prefix: "s", "weak", "opp", ...
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let names: Vec<&str> = Self::ALL.iter().map(|c| c.as_str()).collect();
        let full = expand_key(&s.trim().to_lowercase(), &names)?;
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == full)
            .ok_or_else(|| Error::validation(format!("Unknown SWOT category: '{}'", s)))
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Swot {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub opportunities: Vec<String>,
    #[serde(default)]
    pub threats: Vec<String>,
}

impl Swot {
    pub fn items(&self, category: SwotCategory) -> &[String] {
        match category {
            SwotCategory::Strengths => &self.strengths,
            SwotCategory::Weaknesses => &self.weaknesses,
            SwotCategory::Opportunities => &self.opportunities,
            SwotCategory::Threats => &self.threats,
        }
    }

    pub fn items_mut(&mut self, category: SwotCategory) -> &mut Vec<String> {
        match category {
            SwotCategory::Strengths => &mut self.strengths,
            SwotCategory::Weaknesses => &mut self.weaknesses,
            SwotCategory::Opportunities => &mut self.opportunities,
            SwotCategory::Threats => &mut self.threats,
        }
    }

    pub fn is_empty(&self) -> bool {
        SwotCategory::ALL.iter().all(|c| self.items(*c).is_empty())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerformanceEntry {
    #[serde(default)]
    pub successes: u32,
    #[serde(default)]
    pub failures: u32,
}

/// Date key (YYYY-MM-DD) to the result of that day's tests. Ordered so that
/// iteration is chronological.
pub type PerformanceLog = BTreeMap<String, PerformanceEntry>;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Robot {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub swot: Swot,
    #[serde(default)]
    pub performance: PerformanceLog,
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub notes: String,
}

impl Robot {
    pub fn new(id: String, name: String, category: String, description: String) -> Self {
        Self {
            id,
            name,
            category,
            description,
            swot: Swot::default(),
            performance: PerformanceLog::new(),
            tasks: Vec::new(),
            notes: String::new(),
        }
    }

    pub fn total_successes(&self) -> u64 {
        self.performance.values().map(|p| u64::from(p.successes)).sum()
    }

    pub fn total_failures(&self) -> u64 {
        self.performance.values().map(|p| u64::from(p.failures)).sum()
    }

    pub fn completed_tasks(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }
}

/// The two demonstration robots written on first run.
pub fn seed_robots() -> Vec<Robot> {
    vec![
        Robot::new(
            "robot1".to_string(),
            "Atlas MK-I".to_string(),
            "Autonomous".to_string(),
            "Main robot for autonomous navigation competitions".to_string(),
        ),
        Robot::new(
            "robot2".to_string(),
            "Titan Pro".to_string(),
            "Combat".to_string(),
            "Robot specialised in combat competitions".to_string(),
        ),
    ]
}
