pub mod client;
pub mod invoice;
pub mod organization;
pub mod payment;
