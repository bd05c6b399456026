//! Data models for the todo API

mod todo;
mod user;

pub use todo::{Todo, TodoPayload};
pub use user::{AuthRequest, NewUser, User, UserResponse};
