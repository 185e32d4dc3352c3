use crate::ConfigResult;

/// 配置校验
pub trait ConfigValidator {
    fn validate(&self) -> ConfigResult<()>;
}
