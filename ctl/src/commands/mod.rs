mod create_user;

pub use create_user::{CreateUserParams, create_user};
