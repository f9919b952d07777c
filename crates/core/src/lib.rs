#![forbid(unsafe_code)]

pub mod aggregate;
pub mod catalog;
pub mod model;
pub mod policy;
pub mod recommend;
pub mod time;

#[cfg(test)]
mod test_support;

pub use aggregate::{CommitOutcome, commit};
pub use catalog::{Catalog, format_topic_name};
pub use policy::ProgressPolicy;
pub use time::Clock;
