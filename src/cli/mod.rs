pub mod analyze;
pub mod memo;
pub mod setup;
pub mod ui;
