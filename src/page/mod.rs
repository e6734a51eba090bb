pub mod home;
pub mod selectors;
pub mod stabilize;
