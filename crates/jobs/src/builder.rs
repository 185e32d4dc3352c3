use dendro_domain::{
    BindingKind, DendroError, DendroResult, JobDefinition, JobInputFile, JobOutputFile,
    JobParameter, ProcessorSpec, RequiredResources, RunMethod,
};
use serde_json::Value;

/// 调用方未指定资源时使用
pub const DEFAULT_REQUIRED_RESOURCES: RequiredResources = RequiredResources {
    num_cpus: 1,
    num_gpus: 0,
    memory_gb: 4.0,
    time_sec: 3600.0,
};

/// 一组命名绑定：输入文件、输出文件、参数
///
/// 同名绑定后写覆盖先写，保证列表内名称唯一。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobBindings {
    pub input_files: Vec<JobInputFile>,
    pub output_files: Vec<JobOutputFile>,
    pub parameters: Vec<JobParameter>,
}

impl JobBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn input<N: Into<String>, F: Into<String>>(mut self, name: N, file_name: F) -> Self {
        self.set_input(JobInputFile::new(name, file_name));
        self
    }

    pub fn output<N: Into<String>, F: Into<String>>(mut self, name: N, file_name: F) -> Self {
        self.set_output(JobOutputFile::new(name, file_name));
        self
    }

    pub fn parameter<N: Into<String>>(mut self, name: N, value: Value) -> Self {
        self.set_parameter(JobParameter::new(name, value));
        self
    }

    pub fn set_input(&mut self, input: JobInputFile) {
        match self.input_files.iter_mut().find(|f| f.name == input.name) {
            Some(existing) => *existing = input,
            None => self.input_files.push(input),
        }
    }

    pub fn set_output(&mut self, output: JobOutputFile) {
        match self.output_files.iter_mut().find(|f| f.name == output.name) {
            Some(existing) => *existing = output,
            None => self.output_files.push(output),
        }
    }

    pub fn set_parameter(&mut self, parameter: JobParameter) {
        match self.parameters.iter_mut().find(|p| p.name == parameter.name) {
            Some(existing) => *existing = parameter,
            None => self.parameters.push(parameter),
        }
    }
}

/// 构造结果
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltJob {
    pub definition: JobDefinition,
    pub required_resources: RequiredResources,
    pub run_method: Option<RunMethod>,
}

/// 作业定义构造器
///
/// 不做任何 I/O。只检查处理器声明的输入、输出、参数是否都有值，
/// 以及"文件内路径"参数是否引用了一个已绑定的输入槽。
pub struct JobDefinitionBuilder<'a> {
    processor: &'a ProcessorSpec,
    bindings: JobBindings,
    required_resources: Option<RequiredResources>,
    run_method: Option<RunMethod>,
}

impl<'a> JobDefinitionBuilder<'a> {
    pub fn new(processor: &'a ProcessorSpec) -> Self {
        Self {
            processor,
            bindings: JobBindings::default(),
            required_resources: None,
            run_method: None,
        }
    }

    pub fn with_bindings(mut self, bindings: JobBindings) -> Self {
        for input in bindings.input_files {
            self.bindings.set_input(input);
        }
        for output in bindings.output_files {
            self.bindings.set_output(output);
        }
        for parameter in bindings.parameters {
            self.bindings.set_parameter(parameter);
        }
        self
    }

    pub fn input<N: Into<String>, F: Into<String>>(mut self, name: N, file_name: F) -> Self {
        self.bindings = self.bindings.input(name, file_name);
        self
    }

    pub fn output<N: Into<String>, F: Into<String>>(mut self, name: N, file_name: F) -> Self {
        self.bindings = self.bindings.output(name, file_name);
        self
    }

    pub fn parameter<N: Into<String>>(mut self, name: N, value: Value) -> Self {
        self.bindings = self.bindings.parameter(name, value);
        self
    }

    pub fn required_resources(mut self, resources: RequiredResources) -> Self {
        self.required_resources = Some(resources);
        self
    }

    pub fn run_method(mut self, run_method: Option<RunMethod>) -> Self {
        self.run_method = run_method;
        self
    }

    pub fn build(self) -> DendroResult<BuiltJob> {
        let processor = self.processor;
        let bindings = self.bindings;

        for input in &processor.inputs {
            let optional = input.optional.unwrap_or(false);
            if !optional && !bindings.input_files.iter().any(|f| f.name == input.name) {
                return Err(DendroError::missing_binding(BindingKind::Input, &input.name));
            }
        }

        for output in &processor.outputs {
            if !bindings.output_files.iter().any(|f| f.name == output.name) {
                return Err(DendroError::missing_binding(BindingKind::Output, &output.name));
            }
        }

        // 参数按处理器声明顺序排列，未提供时取默认值
        let mut parameters = Vec::with_capacity(processor.parameters.len());
        for spec in &processor.parameters {
            let supplied = bindings.parameters.iter().find(|p| p.name == spec.name);
            let value = match (supplied, &spec.default) {
                (Some(p), _) => p.value.clone(),
                (None, Some(default)) => default.clone(),
                (None, None) => {
                    return Err(DendroError::missing_binding(BindingKind::Parameter, &spec.name))
                }
            };

            if let Some(input_name) = &spec.path_into_input {
                check_path_parameter(&spec.name, input_name, &value, &bindings)?;
            }

            parameters.push(JobParameter::new(spec.name.clone(), value));
        }
        for extra in &bindings.parameters {
            if processor.parameter(&extra.name).is_none() {
                parameters.push(extra.clone());
            }
        }

        Ok(BuiltJob {
            definition: JobDefinition {
                processor_name: processor.name.clone(),
                input_files: bindings.input_files,
                output_files: bindings.output_files,
                input_parameters: parameters,
            },
            required_resources: self.required_resources.unwrap_or(DEFAULT_REQUIRED_RESOURCES),
            run_method: self.run_method,
        })
    }
}

fn check_path_parameter(
    name: &str,
    input_name: &str,
    value: &Value,
    bindings: &JobBindings,
) -> DendroResult<()> {
    let path = value
        .as_str()
        .ok_or_else(|| DendroError::invalid_path_parameter(name, "值必须是字符串路径"))?;
    if path.is_empty() {
        return Err(DendroError::invalid_path_parameter(name, "路径不能为空"));
    }
    if !bindings.input_files.iter().any(|f| f.name == input_name) {
        return Err(DendroError::invalid_path_parameter(
            name,
            format!("引用的输入 {input_name} 未绑定文件"),
        ));
    }
    Ok(())
}
