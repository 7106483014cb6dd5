pub mod transcript;
pub mod url;
