pub mod activity;
pub mod robot;
pub mod selector;
pub mod task;
