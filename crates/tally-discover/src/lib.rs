mod tasks;
pub use tasks::register;
pub use tasks::register_once;

mod transport;
pub use transport::HttpAgentTransport;

mod config;
pub use config::RegisterConfig;

mod errors;
pub use errors::DiscoverError;
