pub mod alignment;
pub mod cex;
pub mod citation;
pub mod collation;
pub mod report;
pub mod utility;
