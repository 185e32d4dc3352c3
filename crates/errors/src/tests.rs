#[cfg(test)]
mod error_tests {
    use crate::*;

    #[test]
    fn test_dendro_error_display() {
        let job_error = DendroError::JobNotFound {
            id: "j-123".to_string(),
        };
        assert_eq!(job_error.to_string(), "作业未找到: j-123");

        let file_error = DendroError::file_not_found("rec.nwb");
        assert_eq!(file_error.to_string(), "文件未找到: rec.nwb");

        let submission_error = DendroError::Submission("quota exceeded".to_string());
        assert_eq!(submission_error.to_string(), "作业提交失败: quota exceeded");

        let binding_error = DendroError::missing_binding(BindingKind::Input, "recording");
        assert_eq!(binding_error.to_string(), "缺少输入文件绑定: recording");

        let param_error = DendroError::missing_binding(BindingKind::Parameter, "threshold");
        assert_eq!(param_error.to_string(), "缺少参数绑定: threshold");

        let path_error = DendroError::invalid_path_parameter("electrical_series_path", "必须是字符串");
        assert_eq!(
            path_error.to_string(),
            "无效的文件路径参数 electrical_series_path: 必须是字符串"
        );

        let tab_error = DendroError::InvalidTabName("home".to_string());
        assert_eq!(tab_error.to_string(), "无效的标签页名称: home");
    }

    #[test]
    fn test_is_not_found() {
        assert!(DendroError::job_not_found("a").is_not_found());
        assert!(DendroError::project_not_found("p").is_not_found());
        assert!(DendroError::processor_not_found("x").is_not_found());
        assert!(DendroError::compute_resource_not_found("cr").is_not_found());
        assert!(!DendroError::submission_error("rejected").is_not_found());
        assert!(!DendroError::config_error("missing").is_not_found());
    }

    #[test]
    fn test_is_retryable() {
        assert!(DendroError::network_error("connection reset").is_retryable());

        // 创建作业不可盲目重试
        assert!(!DendroError::submission_error("validation failed").is_retryable());
        assert!(!DendroError::config_error("no run method").is_retryable());
        assert!(!DendroError::job_not_found("a").is_retryable());
    }

    #[test]
    fn test_blocks_submission() {
        assert!(DendroError::config_error("no run method").blocks_submission());
        assert!(DendroError::missing_binding(BindingKind::Output, "output").blocks_submission());
        assert!(DendroError::invalid_path_parameter("p", "r").blocks_submission());
        assert!(!DendroError::submission_error("rejected").blocks_submission());
    }

    #[test]
    fn test_user_message() {
        assert_eq!(
            DendroError::job_not_found("a").user_message(),
            "请求的作业不存在"
        );
        assert_eq!(
            DendroError::submission_error("quota").user_message(),
            "作业提交被拒绝，请检查后手动重试"
        );
        assert_eq!(
            DendroError::Internal("boom".to_string()).user_message(),
            "系统繁忙，请稍后重试"
        );
    }

    #[test]
    fn test_from_conversions() {
        let json_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: DendroError = json_err.into();
        assert!(matches!(err, DendroError::Serialization(_)));

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: DendroError = io_err.into();
        assert!(matches!(err, DendroError::Storage(_)));

        let err: DendroError = anyhow::anyhow!("unexpected").into();
        assert!(matches!(err, DendroError::Internal(_)));
    }
}
