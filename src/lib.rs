pub mod cli;
pub mod config;
pub mod nav;
pub mod panels;
