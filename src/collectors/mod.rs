pub mod battery;
pub mod collector;
pub mod connections;
pub mod cpu;
pub mod disk;
pub mod memory;
pub mod network;
pub mod process;
pub mod system;
