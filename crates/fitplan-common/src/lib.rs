pub mod profile;
pub mod protocol;
pub mod session;

pub use protocol::PlanKind;
pub use session::Session;
