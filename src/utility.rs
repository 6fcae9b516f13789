pub mod encoding;
pub mod str;
