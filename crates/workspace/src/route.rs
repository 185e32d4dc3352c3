use std::fmt;

/// 导航位置
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    About,
    Projects,
    Project { project_id: String },
    ComputeResources,
    ComputeResource { compute_resource_id: String },
    Dandisets,
    NotFound { path: String },
}

impl Route {
    /// 解析 URL 路径；无法识别的路径得到 `NotFound`
    pub fn parse(path: &str) -> Self {
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Home,
            ["about"] => Route::About,
            ["projects"] => Route::Projects,
            ["project", id, ..] => Route::Project {
                project_id: id.to_string(),
            },
            ["compute-resources"] => Route::ComputeResources,
            ["compute-resource", id] => Route::ComputeResource {
                compute_resource_id: id.to_string(),
            },
            ["dandisets"] => Route::Dandisets,
            _ => Route::NotFound {
                path: path.to_string(),
            },
        }
    }

    pub fn project_id(&self) -> Option<&str> {
        match self {
            Route::Project { project_id } => Some(project_id),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Route::Home => write!(f, "/"),
            Route::About => write!(f, "/about"),
            Route::Projects => write!(f, "/projects"),
            Route::Project { project_id } => write!(f, "/project/{project_id}"),
            Route::ComputeResources => write!(f, "/compute-resources"),
            Route::ComputeResource {
                compute_resource_id,
            } => write!(f, "/compute-resource/{compute_resource_id}"),
            Route::Dandisets => write!(f, "/dandisets"),
            Route::NotFound { path } => write!(f, "{path}"),
        }
    }
}
