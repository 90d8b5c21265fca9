//! Game search aggregation.
//!
//! A search checks the local game cache first, then enriches the results
//! from the external catalog through the relay chain, merges both by guid
//! with the cache winning, and writes newly discovered records back.

mod aggregator;
mod merge;
mod supervisor;
mod types;

pub use aggregator::SearchAggregator;
pub use merge::{attach_cached, merge_results};
pub use supervisor::{SearchSupervisor, SearchTicket};
pub use types::*;
