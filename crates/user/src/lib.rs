mod command;
mod jwt;
mod password;
mod repository;
mod types;

pub use command::*;
pub use jwt::*;
pub use password::*;
pub use types::*;
