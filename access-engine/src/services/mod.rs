//! 服务层
//!
//! # 服务列表
//!
//! - [`AccessService`] - 权限解析、级联删除检查、缓存失效

pub mod access;

pub use access::AccessService;
