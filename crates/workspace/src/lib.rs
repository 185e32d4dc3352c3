//! 工作区状态
//!
//! 每一块状态都只有一个拥有者负责修改，其余组件只读取快照：
//!
//! - [`tabs::WorkspaceTabs`]: 打开的标签页与当前标签页
//! - [`polling::JobPollingController`]: 单个作业视图的作业与控制台输出
//! - [`recent_projects::RecentProjects`]: 最近访问的项目
//! - [`project_context::ProjectContext`]: 当前项目及其文件、作业

pub mod file_content;
pub mod polling;
pub mod project_context;
pub mod recent_projects;
pub mod route;
pub mod tabs;

pub use file_content::{resolve_file_content, FileContent};
pub use polling::{ConsoleState, JobLoadState, JobPollingController, JobViewSnapshot};
pub use project_context::ProjectContext;
pub use recent_projects::{RecentProjects, RECENT_PROJECTS_CAPACITY, RECENT_PROJECTS_KEY};
pub use route::Route;
pub use tabs::{TabIcon, TabView, WorkspaceTabs, DEFAULT_MAX_LABEL_LENGTH};
