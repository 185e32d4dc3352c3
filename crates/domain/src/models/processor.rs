use serde::{Deserialize, Serialize};

/// 处理器输入声明
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorInputSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optional: Option<bool>,
}

/// 处理器输出声明
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorOutputSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// 处理器参数声明
///
/// - `default` 为空表示必填参数
/// - `secret` 参数在展示时需要遮盖
/// - `path_into_input` 指向一个输入槽名称，表示该参数的值是该输入文件内部的路径
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorParameterSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "type")]
    pub param_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<serde_json::Value>,
    #[serde(default)]
    pub secret: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_into_input: Option<String>,
}

impl ProcessorParameterSpec {
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    pub fn is_path_into_file(&self) -> bool {
        self.path_into_input.is_some()
    }
}

/// 处理器规格
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProcessorSpec {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub inputs: Vec<ProcessorInputSpec>,
    #[serde(default)]
    pub outputs: Vec<ProcessorOutputSpec>,
    #[serde(default)]
    pub parameters: Vec<ProcessorParameterSpec>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl ProcessorSpec {
    pub fn parameter(&self, name: &str) -> Option<&ProcessorParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn input(&self, name: &str) -> Option<&ProcessorInputSpec> {
        self.inputs.iter().find(|i| i.name == name)
    }

    pub fn secret_parameter_names(&self) -> Vec<String> {
        self.parameters
            .iter()
            .filter(|p| p.secret)
            .map(|p| p.name.clone())
            .collect()
    }
}

/// 判断参数名是否为电生理序列路径参数
pub fn is_electrical_series_path_parameter(name: &str) -> bool {
    name.ends_with("electrical_series_path")
}
