pub mod draw;
pub mod grade;
pub mod init;
pub mod summarize;
pub mod take;
pub mod validate;
