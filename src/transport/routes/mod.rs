pub mod info;
pub mod proxy;
pub mod stream;
