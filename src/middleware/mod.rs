pub mod identity;
pub mod request_id;

pub use identity::Caller;
pub use request_id::RequestId;
