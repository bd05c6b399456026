//! Repositories for database operations

mod todo;
mod user;

pub use todo::TodoRepository;
pub use user::UserRepository;
