//! Domain models for the site.
//!
//! - [`user`] - Account records (domain type, separate from row types)
//! - [`session`] - Keys for values stored in the session
//! - [`flash`] - One-shot user-facing messages carried in the session

pub mod flash;
pub mod session;
pub mod user;

pub use flash::{Flash, FlashLevel};
pub use session::keys as session_keys;
pub use user::User;
