//! Tool routing
//!
//! ```text
//! ┌──────────────┐  call(name, args)  ┌──────────────┐  tools/call  ┌──────────┐
//! │ Orchestrator │ ─────────────────▶ │  ToolRouter  │ ───────────▶ │ session  │
//! └──────────────┘                    │              │              └──────────┘
//!                                     │ resolve via  │
//!                                     │ live query   │
//!                                     │ or catalog   │
//!                                     └──────────────┘
//! ```

mod error;
mod router;

pub use error::{RoutingError, ToolError};
pub use router::{RouteMode, ToolDispatcher, ToolRouter};
