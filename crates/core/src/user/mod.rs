//! Directory user use cases

pub mod ports;
pub mod service;

pub use ports::DirectoryApi;
pub use service::UserService;
