// Library for tests to access modules

pub mod aggregator;
pub mod config;
pub mod merge;
pub mod models;
