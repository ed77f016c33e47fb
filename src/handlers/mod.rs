// src/handlers/mod.rs

pub mod coverage;
pub mod quiz;
pub mod session;
pub mod study;
