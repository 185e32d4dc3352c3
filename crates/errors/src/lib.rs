use thiserror::Error;

#[cfg(test)]
mod tests;

/// 缺失绑定的种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    Input,
    Output,
    Parameter,
}

impl std::fmt::Display for BindingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BindingKind::Input => write!(f, "输入文件"),
            BindingKind::Output => write!(f, "输出文件"),
            BindingKind::Parameter => write!(f, "参数"),
        }
    }
}

#[derive(Debug, Error)]
pub enum DendroError {
    #[error("作业未找到: {id}")]
    JobNotFound { id: String },
    #[error("项目未找到: {id}")]
    ProjectNotFound { id: String },
    #[error("文件未找到: {file_name}")]
    FileNotFound { file_name: String },
    #[error("计算资源未找到: {id}")]
    ComputeResourceNotFound { id: String },
    #[error("处理器未找到: {name}")]
    ProcessorNotFound { name: String },
    #[error("作业提交失败: {0}")]
    Submission(String),
    #[error("配置错误: {0}")]
    Configuration(String),
    #[error("缺少{kind}绑定: {name}")]
    MissingBinding { kind: BindingKind, name: String },
    #[error("无效的文件路径参数 {name}: {reason}")]
    InvalidPathParameter { name: String, reason: String },
    #[error("无效的标签页名称: {0}")]
    InvalidTabName(String),
    #[error("网络错误: {0}")]
    Network(String),
    #[error("序列化错误: {0}")]
    Serialization(String),
    #[error("存储错误: {0}")]
    Storage(String),
    #[error("内部错误: {0}")]
    Internal(String),
}

pub type DendroResult<T> = Result<T, DendroError>;

impl DendroError {
    pub fn job_not_found<S: Into<String>>(id: S) -> Self {
        Self::JobNotFound { id: id.into() }
    }
    pub fn project_not_found<S: Into<String>>(id: S) -> Self {
        Self::ProjectNotFound { id: id.into() }
    }
    pub fn file_not_found<S: Into<String>>(file_name: S) -> Self {
        Self::FileNotFound {
            file_name: file_name.into(),
        }
    }
    pub fn compute_resource_not_found<S: Into<String>>(id: S) -> Self {
        Self::ComputeResourceNotFound { id: id.into() }
    }
    pub fn processor_not_found<S: Into<String>>(name: S) -> Self {
        Self::ProcessorNotFound { name: name.into() }
    }
    pub fn submission_error<S: Into<String>>(msg: S) -> Self {
        Self::Submission(msg.into())
    }
    pub fn config_error<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
    pub fn missing_binding<S: Into<String>>(kind: BindingKind, name: S) -> Self {
        Self::MissingBinding {
            kind,
            name: name.into(),
        }
    }
    pub fn invalid_path_parameter<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        Self::InvalidPathParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }
    pub fn network_error<S: Into<String>>(msg: S) -> Self {
        Self::Network(msg.into())
    }
    pub fn storage_error<S: Into<String>>(msg: S) -> Self {
        Self::Storage(msg.into())
    }
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DendroError::JobNotFound { .. }
                | DendroError::ProjectNotFound { .. }
                | DendroError::FileNotFound { .. }
                | DendroError::ComputeResourceNotFound { .. }
                | DendroError::ProcessorNotFound { .. }
        )
    }
    /// 阻止提交的校验类错误，必须在任何网络调用之前暴露给用户
    pub fn blocks_submission(&self) -> bool {
        matches!(
            self,
            DendroError::Configuration(_)
                | DendroError::MissingBinding { .. }
                | DendroError::InvalidPathParameter { .. }
        )
    }
    /// 创建作业不是幂等操作，`Submission` 永远不可自动重试
    pub fn is_retryable(&self) -> bool {
        matches!(self, DendroError::Network(_))
    }
    pub fn user_message(&self) -> &str {
        match self {
            DendroError::JobNotFound { .. } => "请求的作业不存在",
            DendroError::ProjectNotFound { .. } => "请求的项目不存在",
            DendroError::FileNotFound { .. } => "请求的文件不存在",
            DendroError::ComputeResourceNotFound { .. } => "请求的计算资源不存在",
            DendroError::ProcessorNotFound { .. } => "计算资源未提供所需的处理器",
            DendroError::Submission(_) => "作业提交被拒绝，请检查后手动重试",
            DendroError::Configuration(_) => "计算资源配置不完整，无法提交作业",
            DendroError::MissingBinding { .. } => "作业定义缺少必需的输入",
            DendroError::InvalidPathParameter { .. } => "文件路径参数无效",
            DendroError::Network(_) => "网络异常，请稍后重试",
            _ => "系统繁忙，请稍后重试",
        }
    }
}

impl From<serde_json::Error> for DendroError {
    fn from(err: serde_json::Error) -> Self {
        DendroError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for DendroError {
    fn from(err: std::io::Error) -> Self {
        DendroError::Storage(err.to_string())
    }
}

impl From<anyhow::Error> for DendroError {
    fn from(err: anyhow::Error) -> Self {
        DendroError::Internal(err.to_string())
    }
}
