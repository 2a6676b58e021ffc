pub mod actors;
pub mod aggregate;
pub mod events;
pub mod ports;

pub use actors::*;
pub use aggregate::*;
pub use events::*;
pub use ports::*;
