// src/io/mod.rs
pub mod reader;
pub mod resolver;
pub mod writer;

pub use reader::{read_intensity, read_labels};
pub use resolver::{pair_files, resolve_files, FileTriple, Pairing};
pub use writer::{write_table, write_table_file};
