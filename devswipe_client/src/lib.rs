pub mod api;
pub mod config;
pub mod credentials;
pub mod error;
pub mod feed;
pub mod models;
pub mod normalize;
pub mod telemetry;

pub use api::{ApiClient, FeedBackend};
pub use config::{ClientConfig, FeedConfig};
pub use credentials::Credentials;
pub use error::{ApiError, FeedError, OutOfRange};
pub use feed::{FeedEvent, FeedSession, FetchOutcome};
