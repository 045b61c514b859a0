pub mod dto;
pub mod notes;
pub mod performance;
pub mod store;
pub mod swot;
pub mod tasks;
