// src/lib.rs
pub mod batch;
pub mod cli;
pub mod error;
pub mod image;
pub mod io;
pub mod processing;
pub mod utils;
