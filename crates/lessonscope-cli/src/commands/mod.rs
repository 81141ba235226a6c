pub mod analyze;
pub mod check;
pub mod init;
pub mod list_models;
pub mod output;
pub mod parse;
