pub mod config_store;
pub mod dispatcher;

pub use config_store::CameraConfigStore;
pub use dispatcher::Dispatcher;
