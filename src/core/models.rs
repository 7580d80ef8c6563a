pub mod bid;
pub mod common;
pub mod review;
pub mod tender;
pub mod user;
