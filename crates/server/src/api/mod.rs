pub mod games;
pub mod handlers;
pub mod middleware;
pub mod profile;
pub mod routes;
pub mod wishlists;

pub use routes::create_router;
