pub mod bells;
pub mod calendars;
pub mod core;
pub mod generate;
pub mod master;
