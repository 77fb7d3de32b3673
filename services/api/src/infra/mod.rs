pub mod db;
pub mod password;
pub mod pdf;
pub mod signature;
pub mod storage;
