//! Client side of Allerta: the HTTP client, the emergency state the web
//! views render from, the signed-in user and the path router.

mod client;
pub mod emergencies;
pub mod format;
pub mod router;
pub mod session;

pub use client::{ApiClient, ApiClientError, BASE_URL_ENV};
pub use emergencies::{EmergencyData, EmergencyEntry};
pub use router::Route;
pub use session::LoggedUser;
