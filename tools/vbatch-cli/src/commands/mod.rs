pub mod config;
pub mod nodes;
pub mod run;
