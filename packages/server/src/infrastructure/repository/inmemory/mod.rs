pub mod session;
pub mod user;

pub use session::InMemorySessionRepository;
pub use user::{InMemoryUserRepository, SeedError};
