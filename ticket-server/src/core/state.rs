use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::core::Config;
use crate::notify::BroadcastPublisher;
use crate::payments::ProviderRegistry;
use crate::reservations::{
    ArchiveWorker, ExpirySweeper, ReservationManager, ReservationSettings, ReservationStorage,
};

/// Notification fan-out channel capacity
const NOTIFY_CHANNEL_CAPACITY: usize = 4096;

/// 服务器状态 - 持有所有服务的单例引用
///
/// 使用 Arc 实现浅拷贝，所有权成本极低。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | manager | 预订状态机 |
/// | publisher | 座位事件广播 |
/// | shutdown | 后台任务停止信号 |
#[derive(Clone)]
pub struct ServerState {
    /// 服务器配置
    pub config: Config,
    /// 预订管理器
    pub manager: Arc<ReservationManager>,
    /// 座位事件广播（推送网关订阅此通道）
    pub publisher: Arc<BroadcastPublisher>,
    /// 后台任务停止信号
    pub shutdown: CancellationToken,
}

impl ServerState {
    /// Initialize storage, providers and the reservation manager
    pub fn initialize(config: &Config) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&config.work_dir)?;
        let db_path = std::path::Path::new(&config.work_dir).join("reservations.redb");
        let storage = ReservationStorage::open(&db_path)?;
        tracing::info!(path = %db_path.display(), "Reservation storage opened");

        let publisher = Arc::new(BroadcastPublisher::new(NOTIFY_CHANNEL_CAPACITY));
        let manager = ReservationManager::new(
            storage,
            ProviderRegistry::with_default_providers(),
            publisher.clone(),
            ReservationSettings {
                hold_duration_ms: config.hold_minutes * 60 * 1000,
                max_orders_per_hour: config.max_orders_per_hour,
                max_orders_per_day: config.max_orders_per_day,
            },
        );

        Ok(Self {
            config: config.clone(),
            manager: Arc::new(manager),
            publisher,
            shutdown: CancellationToken::new(),
        })
    }

    /// Spawn the sweeper and the archive worker
    pub fn start_background_tasks(&self) {
        let sweeper = ExpirySweeper::new(
            self.manager.clone(),
            self.config.sweep_interval_secs,
            self.shutdown.clone(),
        );
        tokio::spawn(sweeper.run());

        let worker = ArchiveWorker::new(self.manager.storage().clone(), self.shutdown.clone());
        let event_rx = self.manager.subscribe();
        tokio::spawn(worker.run(event_rx));

        tracing::debug!("Background tasks started");
    }
}
