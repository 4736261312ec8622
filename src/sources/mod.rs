pub mod manager;
pub mod plugin;
pub mod remote;
pub mod target;

pub use manager::{MediaResolver, ResolveError, SourceManager};
pub use plugin::{BoxedProvider, ProviderError, SourceOutput, SourceProvider};
pub use remote::RemoteProvider;
pub use target::{ProviderFlag, Target};
