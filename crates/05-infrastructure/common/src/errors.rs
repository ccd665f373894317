//! 错误类型定义

use thiserror::Error;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置加载失败: {source}")]
    LoadError {
        #[from]
        source: config::ConfigError,
    },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

/// 实例提供错误类型
///
/// `locate` 本身从不因“未找到”而失败；需要强制语义的调用方（按 role/hint 查找）自行返回此错误。
#[derive(Error, Debug, Clone)]
pub enum ProvisionError {
    #[error("没有匹配的绑定: role={role}, hint={hint}")]
    NoBinding { role: String, hint: String },

    #[error("提供者创建实例失败: {description}, 原因: {message}")]
    ProviderFailed {
        description: String,
        message: String,
    },

    #[error("绑定类型不匹配: 期望 {expected}, 实际 {actual}")]
    TypeMismatch { expected: String, actual: String },
}

impl ProvisionError {
    /// 创建未找到绑定错误
    pub fn no_binding(role: impl Into<String>, hint: impl Into<String>) -> Self {
        Self::NoBinding {
            role: role.into(),
            hint: hint.into(),
        }
    }

    /// 创建提供者失败错误
    pub fn provider_failed(description: impl Into<String>, message: impl ToString) -> Self {
        Self::ProviderFailed {
            description: description.into(),
            message: message.to_string(),
        }
    }
}

/// 启动错误类型
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("环境发现失败: {environment}, 原因: {message}")]
    EnvironmentFailed {
        environment: String,
        message: String,
    },
}

/// 结果类型别名
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type ProvisionResult<T> = Result<T, ProvisionError>;
pub type BootstrapResult<T> = Result<T, BootstrapError>;
