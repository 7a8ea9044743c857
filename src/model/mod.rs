pub mod common;
pub mod endpoint;
pub mod import;
pub mod organisation;
pub mod project;
pub mod user;
pub mod user_context;

pub use common::*;
pub use endpoint::*;
pub use import::*;
pub use organisation::*;
pub use project::*;
pub use user::*;
pub use user_context::*;
