// src/models/mod.rs

pub mod answer_sheet;
pub mod generation;
pub mod question;
pub mod quiz;
pub mod result;
pub mod user;
