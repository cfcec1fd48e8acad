pub mod check;
mod command_result;
pub mod context;
pub mod edit;
pub mod fill;
pub mod helper;
pub mod init;
pub mod status;
pub mod transfer;
pub mod validate;
pub mod watch;

pub use command_result::*;
