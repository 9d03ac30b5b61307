//! Access Engine - 分层 RBAC 与数据权限解析引擎
//!
//! # 架构概述
//!
//! 给定某租户的扁平数据行 (菜单、部门、角色、用户及其关联)，计算:
//!
//! - **菜单树** (`menu`): 按权限码裁剪后的菜单/按钮树
//! - **权限码** (`auth`): 请求鉴权使用的扁平权限码集合
//! - **数据权限** (`scope`): 用户可读写的部门 ID 集合
//!
//! 另外提供菜单/部门的级联删除检查 (`cascade`) 与权限上下文缓存 (`cache`)。
//!
//! # 模块结构
//!
//! ```text
//! access-engine/src/
//! ├── core/          # 配置、错误
//! ├── tree/          # 通用父子索引 (arena)
//! ├── menu/          # 菜单树构建与裁剪
//! ├── dept/          # 部门层级
//! ├── scope/         # 数据权限解析
//! ├── auth/          # 角色合并、权限上下文
//! ├── cascade/       # 级联删除计划
//! ├── cache/         # 权限上下文缓存
//! ├── store/         # 租户快照存储
//! ├── services/      # AccessService
//! └── utils/         # 日志
//! ```

pub mod auth;
pub mod cache;
pub mod cascade;
pub mod core;
pub mod dept;
pub mod menu;
pub mod scope;
pub mod services;
pub mod store;
pub mod tree;
pub mod utils;

// Re-export 公共类型
pub use auth::{PermissionContext, TenantModel, resolve_context};
pub use cache::{CacheKey, MemoryPermissionCache, PermissionCache};
pub use cascade::{BlockingReference, CascadeDeletionPlanner, DeletionPlan};
pub use crate::core::{Config, EngineError, EntityKind, Result};
pub use dept::DeptHierarchy;
pub use menu::{MenuNode, MenuTree};
pub use scope::{DataScopeFilter, DataScopeResolver};
pub use services::AccessService;
pub use store::{InMemoryStore, SnapshotStore, StoreError, TenantSnapshot};
pub use tree::{TreeIndex, TreeKind, TreeLimits};

// Re-export logger functions
pub use utils::logger::{cleanup_old_logs, init_logger, init_logger_with_file};

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($fields:tt)*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($fields)*
        )
    };
}

/// 设置运行环境: 加载 `.env`、读取配置、初始化日志
pub fn setup_environment() -> anyhow::Result<Config> {
    // .env 不存在时忽略
    dotenv::dotenv().ok();

    let config = Config::from_env();
    init_logger_with_file(&config.log_level, config.log_json, config.log_dir.as_deref())?;
    Ok(config)
}
