pub mod bid;
pub mod identity;
pub mod review;
pub mod tender;
pub mod versioning;
