pub mod access;
pub mod albaran;
pub mod client;
pub mod company;
pub mod pdf;
pub mod project;
pub mod user;
