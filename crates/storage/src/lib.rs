#![forbid(unsafe_code)]

pub mod repository;
pub mod session;
pub mod sqlite;
