pub mod catalog_reader;
pub mod catalog_writer;
pub mod import;
