pub mod display;
pub mod format;
pub mod graph;
pub mod menu;
pub mod table;
