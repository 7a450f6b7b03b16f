pub mod directory;
pub mod notes;
pub mod schedule;
