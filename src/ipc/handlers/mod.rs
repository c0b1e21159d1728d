pub mod analytics;
pub mod backup_exchange;
pub mod core;
pub mod groups;
pub mod marksheets;
pub mod meets;
pub mod reports;
pub mod roster;
