pub mod cli;
pub mod config;
pub mod source;

pub use fitplan_common::profile;
pub use fitplan_common::protocol;
pub use fitplan_common::session;
pub use fitplan_parser as parser;
