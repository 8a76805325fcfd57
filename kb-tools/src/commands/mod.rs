pub mod encoding;
pub mod manage;
pub mod process;
pub mod validate;
pub mod webdocs;
