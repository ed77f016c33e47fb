// src/quiz/mod.rs

pub mod feedback;
pub mod registry;
pub mod scoring;
pub mod session;
