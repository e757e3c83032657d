pub mod capture;
pub mod monitors;
