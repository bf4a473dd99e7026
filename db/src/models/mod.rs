pub mod emergency;
pub mod error;
pub mod typed_ulid;
pub mod user;

pub use emergency::*;
pub use error::*;
pub use typed_ulid::*;
pub use user::*;
