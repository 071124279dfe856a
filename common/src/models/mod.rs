pub mod exchange;
pub mod user;

pub use exchange::*;
pub use user::*;
