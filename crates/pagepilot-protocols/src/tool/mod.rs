//! Tool protocol definitions.
//!
//! The page tools (`page_capture`, `page_action`) are exposed to agents
//! through this trait so a host can list, validate and invoke them uniformly.

mod context;
mod definition;
mod result;
mod traits;

pub use context::*;
pub use definition::*;
pub use result::*;
pub use traits::*;
