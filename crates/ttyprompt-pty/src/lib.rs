pub mod raw_mode;
pub mod terminal;
