pub mod events;
pub mod feedback;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod scan;
pub mod session;
pub mod verify;

pub use routes::create_router;
