//! 核心模块 - 引擎配置和错误定义
//!
//! # 模块结构
//!
//! - [`Config`] - 引擎配置
//! - [`EngineError`] - 引擎错误
//! - [`EntityKind`] - 错误所指的记录类型

pub mod config;
pub mod error;

pub use config::Config;
pub use error::{EngineError, EntityKind, Result};
