pub mod api;
pub mod browser;
pub mod cli;
pub mod error;
pub mod logger;
pub mod page;
pub mod report;
pub mod scenario;

pub use error::{SuiteError, SuiteResult};
