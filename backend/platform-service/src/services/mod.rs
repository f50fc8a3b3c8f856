/// Service layer
///
/// `sessions` and `coordinator` hold the consistency-critical logic; the
/// resource services compose them with the repositories.
pub mod authz;
pub mod coordinator;
pub mod profiles;
pub mod sessions;
pub mod storage;
pub mod videos;

pub use coordinator::WriteCoordinator;
pub use profiles::ProfileService;
pub use sessions::SessionService;
pub use videos::VideoService;
