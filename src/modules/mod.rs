pub mod agent;
pub mod collector;
pub mod config;
pub mod explorer;
pub mod grid;
pub mod knowledge;
pub mod recorder;
pub mod report;
pub mod scheduler;
pub mod spawner;
pub mod state;
pub mod stats;
pub mod world;
