pub mod chart;
pub mod config;
pub mod error;
pub mod export;
pub mod input;
pub mod model;
pub mod repository;
pub mod service;
pub mod timer;
pub mod usecase;

pub use chart::{render_bar_chart, ChartArea, ChartData, ChartGeometry, DrawSurface, Legend};
pub use config::Config;
pub use error::{Error, Result};
pub use export::{export_data, ExportFormat, ExportScope};
pub use input::{expand_key, normalize_date, parse_count};
pub use model::activity::{Activity, ActivityKind, ActivityLog};
pub use model::robot::{PerformanceEntry, Robot, Swot, SwotCategory};
pub use model::selector::Selector;
pub use model::task::{Priority, Task};
pub use repository::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};
pub use service::dto::{DatePerformance, Kpis, RobotSummary, TaskView};
pub use service::store::DataStore;
pub use service::tasks::resolve_team_index;
pub use timer::{CountdownTimer, TickSchedule, TimerEvent, TimerState, Urgency};
pub use usecase::dashboard::{performance_history, DashboardUseCase};
