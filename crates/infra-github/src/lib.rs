// Jetsite Infrastructure - GitHub Adapters
// Implements: CredentialProvider, QueueSource

mod credentials;
mod queue_source;

pub use credentials::{CredentialConfig, GithubCredentials, DEFAULT_API_URL};
pub use queue_source::HttpQueueSource;

/// User-Agent sent on every outbound request
pub const USER_AGENT: &str = "jetsite-agent";
