//! Embassy async tasks
//!
//! Each task runs independently and communicates via signals. The TE
//! vsync task runs on the high-priority interrupt executor.

pub mod dim;
pub mod stats;
pub mod touch;
pub mod ui;
pub mod vsync;

pub use dim::dim_task;
pub use stats::stats_task;
pub use touch::{touch_task, Touch};
pub use ui::ui_task;
pub use vsync::te_vsync_task;
