use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, ConfigResult, ConfigValidator};

/// 本地持久化配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub recent_projects_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".dendro"),
            recent_projects_key: "dendro-recent-projects".to_string(),
        }
    }
}

impl ConfigValidator for StorageConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.recent_projects_key.trim().is_empty() {
            return Err(ConfigError::Validation(
                "storage.recent_projects_key 不能为空".to_string(),
            ));
        }
        Ok(())
    }
}

/// 工作区展示配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkspaceConfig {
    pub max_tab_label_length: usize,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            max_tab_label_length: 18,
        }
    }
}

impl ConfigValidator for WorkspaceConfig {
    fn validate(&self) -> ConfigResult<()> {
        // 省略号占3个字符，至少保留1个字符的前缀
        if self.max_tab_label_length < 4 {
            return Err(ConfigError::Validation(
                "workspace.max_tab_label_length 不能小于4".to_string(),
            ));
        }
        Ok(())
    }
}
