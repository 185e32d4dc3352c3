use std::sync::Arc;

use dendro_domain::{DendroResult, KeyValueStore, Project};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::route::Route;

pub const RECENT_PROJECTS_KEY: &str = "dendro-recent-projects";
pub const RECENT_PROJECTS_CAPACITY: usize = 10;

/// 存储中的项目快照，除可选字段外每个字段都必须存在
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredProject {
    project_id: String,
    name: String,
    description: String,
    tags: Vec<String>,
    compute_resource_id: Option<String>,
    analysis_source_url: Option<String>,
    timestamp_created: f64,
    timestamp_modified: f64,
}

impl From<StoredProject> for Project {
    fn from(stored: StoredProject) -> Self {
        Project {
            project_id: stored.project_id,
            name: stored.name,
            description: stored.description,
            tags: stored.tags,
            compute_resource_id: stored.compute_resource_id,
            analysis_source_url: stored.analysis_source_url,
            timestamp_created: stored.timestamp_created,
            timestamp_modified: stored.timestamp_modified,
        }
    }
}

/// 最近访问的项目
///
/// 以完整项目快照的 JSON 数组保存在单个键下，最近的在前，最多 10 条。
/// 每次写入都是整值替换。
pub struct RecentProjects {
    store: Arc<dyn KeyValueStore>,
    key: String,
}

impl RecentProjects {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_key(store, RECENT_PROJECTS_KEY)
    }

    pub fn with_key<S: Into<String>>(store: Arc<dyn KeyValueStore>, key: S) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// 读取全部条目；存储内容损坏或无法读取时丢弃并视为空
    pub fn entries(&self) -> Vec<Project> {
        let text = match self.store.get(&self.key) {
            Ok(Some(text)) => text,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("读取最近项目失败，丢弃记录: {}", e);
                self.discard();
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<StoredProject>>(&text) {
            Ok(projects) => projects.into_iter().map(Project::from).collect(),
            Err(e) => {
                warn!("丢弃损坏的最近项目记录: {}", e);
                self.discard();
                Vec::new()
            }
        }
    }

    fn discard(&self) {
        if let Err(e) = self.store.remove(&self.key) {
            warn!("删除损坏的最近项目记录失败: {}", e);
        }
    }

    /// 只返回当前用户仍有权限访问的项目
    pub fn list(&self, accessible_project_ids: &[String]) -> Vec<Project> {
        self.entries()
            .into_iter()
            .filter(|p| accessible_project_ids.contains(&p.project_id))
            .collect()
    }

    pub fn record(&self, project: &Project) -> DendroResult<()> {
        let mut entries = self.entries();
        if entries.first() == Some(project) {
            debug!("项目 {} 已是最近访问的第一项，跳过", project.project_id);
            return Ok(());
        }

        entries.retain(|p| p.project_id != project.project_id);
        entries.insert(0, project.clone());
        entries.truncate(RECENT_PROJECTS_CAPACITY);

        let text = serde_json::to_string(&entries)?;
        self.store.set(&self.key, &text)
    }

    /// 导航到已加载的项目页面时记录该项目
    pub fn observe(&self, route: &Route, loaded_projects: &[Project]) -> DendroResult<()> {
        let Some(project_id) = route.project_id() else {
            return Ok(());
        };
        match loaded_projects.iter().find(|p| p.project_id == project_id) {
            Some(project) => self.record(project),
            None => Ok(()),
        }
    }
}
