pub mod auth;
pub mod error;
pub mod model;
pub mod store;

pub use error::{Result, StoreError};
pub use model::{Signal, Site, User};
pub use store::{Collection, Store};
