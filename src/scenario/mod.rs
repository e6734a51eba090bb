pub mod catalog;
pub mod context;
pub mod expect;
pub mod model;
pub mod runner;
pub mod trace;
