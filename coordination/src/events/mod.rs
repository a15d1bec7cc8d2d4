//! Change notification for panel state
//!
//! Components publish a [`PanelEvent`] after every committed state change;
//! presentation adapters subscribe and re-derive their views.
//!
//! ```text
//! ┌──────────────┐     ┌──────────────┐     ┌──────────────┐
//! │  Component   │────▶│  Event Bus   │────▶│   Adapters   │
//! │  (publish)   │     │  (broadcast) │     │   (recv)     │
//! └──────────────┘     └──────────────┘     └──────────────┘
//! ```

pub mod bus;
pub mod types;

pub use bus::{EventBus, EventFilter, FilteredReceiver, SharedEventBus};
pub use types::PanelEvent;
