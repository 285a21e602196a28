pub mod connection;
pub mod init;
pub mod personas;
pub mod review;
pub mod show;
