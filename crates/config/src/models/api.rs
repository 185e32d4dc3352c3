use serde::{Deserialize, Serialize};

use crate::{ConfigError, ConfigResult, ConfigValidator};

/// 远程 Dendro 服务连接配置
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiConfig {
    pub base_url: String,
    /// 通过 `dendro-api-key` 请求头发送
    #[serde(default)]
    pub api_key: Option<String>,
    pub request_timeout_seconds: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://dendro.vercel.app/api/client".to_string(),
            api_key: None,
            request_timeout_seconds: 30,
        }
    }
}

impl ConfigValidator for ApiConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::Validation("api.base_url 不能为空".to_string()));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ConfigError::Validation(format!(
                "api.base_url 必须是 http(s) 地址: {}",
                self.base_url
            )));
        }
        if self.request_timeout_seconds == 0 {
            return Err(ConfigError::Validation(
                "api.request_timeout_seconds 必须大于0".to_string(),
            ));
        }
        Ok(())
    }
}

/// 项目相关的默认值
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ProjectDefaults {
    /// 项目未指定计算资源时使用
    #[serde(default)]
    pub default_compute_resource_id: Option<String>,
}
