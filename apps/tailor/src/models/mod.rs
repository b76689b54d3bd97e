pub mod plan;
pub mod resume;
pub mod session;
pub mod turn;

pub use plan::{Plan, Step, StepContext, StepStatus, StepType};
pub use resume::{ExperienceEntry, ResumeDocument};
pub use session::TailoringSessionRow;
pub use turn::{Fragment, Role, ToolCall, ToolState, Turn};
