//! Tribune Ticket Server - 座位预订与支付生命周期核心
//!
//! # 架构概述
//!
//! 本模块是售票平台的预订核心，提供以下功能：
//!
//! - **座位账本** (`reservations::ledger`): 座位状态的唯一权威记录
//! - **预订管理器** (`reservations::manager`): hold→pay→settle 状态机
//! - **价格解析** (`pricing`): 时段价格窗口解析
//! - **支付网关** (`payments`): 多网关策略 + 回调验签
//! - **过期回收** (`reservations::sweeper`): 超时持有座位回收
//! - **事件广播** (`notify`): 座位图实时推送
//!
//! # 模块结构
//!
//! ```text
//! ticket-server/src/
//! ├── core/          # 配置、状态、HTTP 服务器
//! ├── api/           # HTTP 路由和处理器
//! ├── catalog/       # 场馆布局、票档、时段价格
//! ├── reservations/  # 存储、账本、状态机、后台任务
//! ├── pricing/       # 价格解析（纯函数）
//! ├── payments/      # 支付网关适配
//! ├── notify/        # 座位事件广播
//! └── utils/         # 错误、日志、校验
//! ```

pub mod api;
pub mod catalog;
pub mod core;
pub mod money;
pub mod notify;
pub mod payments;
pub mod pricing;
pub mod reservations;
pub mod utils;

// Re-export 公共类型
pub use crate::core::{Config, Server, ServerState};
pub use reservations::{ReservationManager, ReservationSettings, ReservationStorage};
pub use utils::{AppError, AppResult};

// Re-export logger functions
pub use utils::logger::{init_logger, init_logger_with_file};

pub fn print_banner() {
    println!(
        r#"
  ______     _ __
 /_  __/____(_) /_  __  ______  ___
  / / / ___/ / __ \/ / / / __ \/ _ \
 / / / /  / / /_/ / /_/ / / / /  __/
/_/ /_/  /_/_.___/\__,_/_/ /_/\___/
         ticket server
"#
    );
}
