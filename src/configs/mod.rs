pub mod base;
pub mod logging;
pub mod proxy;
pub mod resolver;
pub mod server;

pub use base::*;
pub use logging::*;
pub use proxy::*;
pub use resolver::*;
pub use server::*;
