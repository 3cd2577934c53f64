pub mod ascii;
pub mod bots;
pub mod config;
pub mod runner;
pub mod story;
pub mod util;
