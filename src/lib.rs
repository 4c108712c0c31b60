pub mod catalog;
pub mod commands;
pub mod config;
pub mod extractor;
pub mod fs;
pub mod literal;
pub mod logging;
pub mod markup;
pub mod po;
pub mod recognizer;
pub mod syntax;
pub mod token;
