pub mod checkin;
pub mod orders;
pub mod payments;
pub mod reports;
pub mod roles;
