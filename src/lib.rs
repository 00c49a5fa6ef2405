pub mod actors;
pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod sampler;
pub mod store;
pub mod util;
pub mod viewer;

pub use api::ApiClient;
pub use config::Config;
pub use error::{ApiError, ApiResult, StoreError, StoreResult};
pub use store::{AuthSession, SelectedInstance, Store};
