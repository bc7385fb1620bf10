//! Resource counting and IP-space deduplication engine for Universal DDI
//! licensing estimates.
//!
//! Discovery walkers (external) produce [`resource::ResourceRecord`] lists;
//! the [`counter::ResourceCounter`] classifies them and deduplicates active
//! IPs across overlapping private address spaces; the
//! [`licensing::LicensingCalculator`] converts the counts into Management
//! Token requirements and [`export`] renders the audit artifacts.

pub mod cli;
pub mod counter;
pub mod export;
pub mod ip_extract;
pub mod ip_space;
pub mod licensing;
pub mod provider;
pub mod reservation;
pub mod resource;
pub mod token_free;

pub use counter::{ResourceCount, ResourceCounter};
pub use licensing::{LicensingCalculator, LicensingReport};
pub use provider::Provider;
pub use resource::ResourceRecord;
