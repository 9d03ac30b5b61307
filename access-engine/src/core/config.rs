use crate::tree::{DEFAULT_MAX_DEPTH, DEFAULT_MAX_NODES, TreeLimits};

/// 引擎配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖 (启动时先加载 `.env`)：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | ENVIRONMENT | development | 运行环境 |
/// | MAX_TREE_DEPTH | 100 | 菜单/部门树最大深度 |
/// | MAX_TREE_NODES | 100000 | 单租户菜单/部门最大节点数 |
/// | PERMISSION_CACHE_ENABLED | true | 是否缓存 PermissionContext |
/// | LOG_LEVEL | info | 日志级别 |
/// | LOG_JSON | false | 是否输出 JSON 日志 |
/// | LOG_DIR | (未设置) | 日志文件目录 |
#[derive(Debug, Clone)]
pub struct Config {
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 父链最大深度，超过视为数据损坏
    pub max_tree_depth: usize,
    /// 单棵树最大节点数
    pub max_tree_nodes: usize,
    /// 是否启用权限上下文缓存
    pub cache_enabled: bool,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            max_tree_depth: std::env::var("MAX_TREE_DEPTH")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(DEFAULT_MAX_DEPTH),
            max_tree_nodes: std::env::var("MAX_TREE_NODES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v| *v > 0)
                .unwrap_or(DEFAULT_MAX_NODES),
            cache_enabled: std::env::var("PERMISSION_CACHE_ENABLED")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(true),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: std::env::var("LOG_JSON")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
        }
    }

    /// 使用自定义树限制覆盖配置
    ///
    /// 常用于测试场景
    pub fn with_limits(max_tree_depth: usize, max_tree_nodes: usize) -> Self {
        let mut config = Self::from_env();
        config.max_tree_depth = max_tree_depth;
        config.max_tree_nodes = max_tree_nodes;
        config
    }

    pub fn limits(&self) -> TreeLimits {
        TreeLimits {
            max_depth: self.max_tree_depth,
            max_nodes: self.max_tree_nodes,
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
