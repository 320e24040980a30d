//! 外部服务错误类型与降级结果
//!
//! ProviderError 覆盖四类失败：连接失败、服务端拒绝（非成功状态）、响应无法解析、空结果；
//! 另有缺少凭据与非法输入。管线不向上抛错，而是返回 Outcome：始终携带可展示的值，
//! 同时保留失败原因，由界面决定是否提示。

use thiserror::Error;

/// 单次外部调用的失败原因
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ProviderError {
    #[error("{provider} unreachable: {message}")]
    Connectivity {
        provider: &'static str,
        message: String,
    },

    #[error("{provider} refused request (HTTP {code}): {detail}")]
    Status {
        provider: &'static str,
        code: u16,
        detail: String,
    },

    #[error("Malformed response from {provider}: {message}")]
    Malformed {
        provider: &'static str,
        message: String,
    },

    #[error("Empty result from {0}")]
    Empty(&'static str),

    #[error("Missing credentials for {0}")]
    MissingCredentials(&'static str),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl ProviderError {
    /// reqwest 错误归类：解码失败算响应格式错误，其余视为连接失败
    pub fn from_reqwest(provider: &'static str, err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProviderError::Malformed {
                provider,
                message: err.to_string(),
            }
        } else if let Some(status) = err.status() {
            ProviderError::Status {
                provider,
                code: status.as_u16(),
                detail: err.to_string(),
            }
        } else {
            ProviderError::Connectivity {
                provider,
                message: err.to_string(),
            }
        }
    }

    pub fn malformed(provider: &'static str, message: impl Into<String>) -> Self {
        ProviderError::Malformed {
            provider,
            message: message.into(),
        }
    }
}

/// 管线结果：Success 全部成功；Degraded 主调用成功但部分补充信息降级；
/// Failed 主调用失败，value 为固定的兜底数据
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Success(T),
    Degraded { value: T, causes: Vec<ProviderError> },
    Failed { value: T, cause: ProviderError },
}

impl<T> Outcome<T> {
    /// 无失败原因为 Success，否则 Degraded
    pub fn from_causes(value: T, causes: Vec<ProviderError>) -> Self {
        if causes.is_empty() {
            Outcome::Success(value)
        } else {
            Outcome::Degraded { value, causes }
        }
    }

    pub fn failed(value: T, cause: ProviderError) -> Self {
        Outcome::Failed { value, cause }
    }

    pub fn value(&self) -> &T {
        match self {
            Outcome::Success(v) => v,
            Outcome::Degraded { value, .. } => value,
            Outcome::Failed { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Outcome::Success(v) => v,
            Outcome::Degraded { value, .. } => value,
            Outcome::Failed { value, .. } => value,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, Outcome::Degraded { .. })
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }

    pub fn causes(&self) -> Vec<&ProviderError> {
        match self {
            Outcome::Success(_) => Vec::new(),
            Outcome::Degraded { causes, .. } => causes.iter().collect(),
            Outcome::Failed { cause, .. } => vec![cause],
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Success(v) => Outcome::Success(f(v)),
            Outcome::Degraded { value, causes } => Outcome::Degraded {
                value: f(value),
                causes,
            },
            Outcome::Failed { value, cause } => Outcome::Failed {
                value: f(value),
                cause,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_causes() {
        let ok: Outcome<u8> = Outcome::from_causes(1, vec![]);
        assert!(ok.is_success());

        let degraded = Outcome::from_causes(2, vec![ProviderError::Empty("photo search")]);
        assert!(degraded.is_degraded());
        assert_eq!(*degraded.value(), 2);
        assert_eq!(degraded.causes().len(), 1);
    }

    #[test]
    fn test_failed_still_carries_value() {
        let outcome = Outcome::failed(vec!["fallback"], ProviderError::MissingCredentials("openai"));
        assert!(outcome.is_failed());
        assert_eq!(outcome.causes()[0], &ProviderError::MissingCredentials("openai"));
        assert_eq!(outcome.map(|v| v.len()).into_value(), 1);
    }

    #[test]
    fn test_error_display() {
        let err = ProviderError::Status {
            provider: "pexels",
            code: 429,
            detail: "rate limited".into(),
        };
        assert_eq!(err.to_string(), "pexels refused request (HTTP 429): rate limited");
    }
}
