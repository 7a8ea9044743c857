pub mod handlers;
pub mod mock_handlers;
pub mod routes;
pub mod user_extractor;

pub use handlers::*;
pub use mock_handlers::*;
pub use routes::*;
