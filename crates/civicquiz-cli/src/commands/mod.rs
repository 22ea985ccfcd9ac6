pub mod init;
pub mod play;
pub mod review;
pub mod validate;
