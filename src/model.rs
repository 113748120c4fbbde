pub mod session;
pub mod workspace;

pub use session::SessionId;
pub use workspace::{WORKSPACE_COUNT, Workspace, WorkspaceId, WorkspaceManager, WorkspaceStats};
