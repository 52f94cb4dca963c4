// ==========================================
// 恩施山区交通平台 - API层错误类型
// ==========================================
// 职责: 定义API层错误类型，转换数据源错误为用户友好的错误消息
// 约定: 数据缺失不是错误 (返回 None / Unknown); 只有非法输入与未知实体报错
// ==========================================

use crate::repository::error::RepositoryError;
use chrono::NaiveDateTime;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 输入错误
    // ==========================================
    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("无效时间窗: from={from} 晚于 to={to}")]
    InvalidTimeWindow {
        from: NaiveDateTime,
        to: NaiveDateTime,
    },

    #[error("取值越界: {field}={value}, 允许范围 {range}")]
    ValueOutOfRange {
        field: String,
        value: String,
        range: String,
    },

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("数据源错误: {0}")]
    Repository(String),

    #[error("数据验证失败: {0}")]
    ValidationError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn out_of_range(field: &str, value: impl ToString, range: &str) -> Self {
        ApiError::ValueOutOfRange {
            field: field.to_string(),
            value: value.to_string(),
            range: range.to_string(),
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::Repository(format!("数据源锁获取失败: {}", msg))
            }
            RepositoryError::DataSourceError(msg) => ApiError::Repository(msg),
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
