pub mod activity;
pub mod config;
pub mod propose;
pub mod schedule;
