// src/handlers/mod.rs

pub mod auth;
pub mod student;
pub mod teacher;
