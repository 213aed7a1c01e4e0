pub mod folders;
pub mod media;
pub mod notifications;
pub mod response;
pub mod scheduled;
pub mod shares;
pub mod state;

pub use response::ApiResponse;
