pub mod config;
pub mod memory;
pub mod records;
pub mod repository;
pub mod rest;
