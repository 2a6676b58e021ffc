pub mod buffered_logger;
pub mod console_logger;
pub mod debug_draw;
pub mod direct_search;
pub mod file_logger;
pub mod multi_logger;

pub use buffered_logger::*;
pub use console_logger::*;
pub use debug_draw::*;
pub use direct_search::*;
pub use file_logger::*;
pub use multi_logger::*;
