mod coordinator;
mod response;

pub use coordinator::RefreshCoordinator;
