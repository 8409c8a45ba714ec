pub mod download;
pub mod multipart;
pub mod shutdown;
