/// 服务器配置 - 预订核心的所有配置项
///
/// # 环境变量
///
/// 所有配置项都可以通过 `TICKET_` 前缀的环境变量覆盖：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | TICKET_WORK_DIR | /var/lib/tribune/server | 工作目录 |
/// | TICKET_HTTP_PORT | 3000 | HTTP 服务端口 |
/// | TICKET_ENVIRONMENT | development | 运行环境 |
/// | TICKET_HOLD_MINUTES | 10 | 座位锁定时长(分钟) |
/// | TICKET_SWEEP_INTERVAL_SECS | 60 | 过期扫描间隔(秒) |
/// | TICKET_MAX_ORDERS_PER_HOUR | 6 | 每买家每小时订单上限 |
/// | TICKET_MAX_ORDERS_PER_DAY | 20 | 每买家每天订单上限 |
///
/// # 示例
///
/// ```ignore
/// TICKET_WORK_DIR=/data/tribune TICKET_HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录，存储数据库和日志文件
    pub work_dir: String,
    /// HTTP API 服务端口
    pub http_port: u16,
    /// 运行环境: development | staging | production
    pub environment: String,
    /// 座位锁定时长（分钟）
    pub hold_minutes: i64,
    /// 过期订单扫描间隔（秒）
    pub sweep_interval_secs: u64,
    /// 每买家每小时订单上限
    pub max_orders_per_hour: u32,
    /// 每买家每天订单上限
    pub max_orders_per_day: u32,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("TICKET_WORK_DIR")
                .unwrap_or_else(|_| "/var/lib/tribune/server".into()),
            http_port: std::env::var("TICKET_HTTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(3000),
            environment: std::env::var("TICKET_ENVIRONMENT")
                .unwrap_or_else(|_| "development".into()),
            hold_minutes: std::env::var("TICKET_HOLD_MINUTES")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(10),
            sweep_interval_secs: std::env::var("TICKET_SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(60),
            max_orders_per_hour: std::env::var("TICKET_MAX_ORDERS_PER_HOUR")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(6),
            max_orders_per_day: std::env::var("TICKET_MAX_ORDERS_PER_DAY")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(20),
        }
    }

    /// 使用自定义值覆盖部分配置
    ///
    /// 常用于测试场景
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.http_port = http_port;
        config
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
