//! 推送分发总线
//!
//! 单一入口 `submit` 接收外部推送的信封，按类别投递到四条独立通道之一。
//! 每条通道在自己的 tokio 任务中串行执行"过滤 → (补全) → 展示"，
//! 通道之间互不阻塞：动态通道卡在网络请求上时，其他通道照常推进。
//!
//! 生命周期：
//! - `initialize` 建立四条通道并触发一次设备注册，重复调用无效果
//! - `shutdown` 立即取消所有通道，缓冲中的信封和进行中的拉取结果被丢弃
//! - `drain` 停止接收新信封，等待已接收的信封全部处理完毕
//!
//! 关闭之后的 `submit` 静默忽略。

use std::sync::Arc;

use parking_lot::Mutex;
use push_shared::config::{AppConfig, DispatcherConfig, OverflowPolicy};
use push_shared::events::PushEnvelope;
use push_shared::observability::metrics::names;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

use crate::classifier::NotificationKind;
use crate::client::{HttpUpdateClient, UpdateClient};
use crate::enrichment::{EnvelopeUpdatePair, fetch_update_with_envelope};
use crate::error::Result;
use crate::handlers::NotificationHandlers;
use crate::images::{HttpImageLoader, ImageLoader};
use crate::presentation::{AlertPresenter, AlertStyle};
use crate::registrar::{DeviceRegistrar, LoggingDeviceRegistrar};
use crate::sink::NotificationSink;

type EnvelopeRef = Arc<PushEnvelope>;

/// 分发总线依赖的外部协作方
#[derive(Clone)]
pub struct Collaborators {
    pub client: Arc<dyn UpdateClient>,
    pub images: Arc<dyn ImageLoader>,
    pub sink: Arc<dyn NotificationSink>,
    pub registrar: Arc<dyn DeviceRegistrar>,
}

// ---------------------------------------------------------------------------
// 通道缓冲
// ---------------------------------------------------------------------------

enum LaneSender {
    Unbounded(mpsc::UnboundedSender<EnvelopeRef>),
    Bounded {
        sender: mpsc::Sender<EnvelopeRef>,
        policy: OverflowPolicy,
    },
}

enum LaneReceiver {
    Unbounded(mpsc::UnboundedReceiver<EnvelopeRef>),
    Bounded(mpsc::Receiver<EnvelopeRef>),
}

impl LaneReceiver {
    async fn recv(&mut self) -> Option<EnvelopeRef> {
        match self {
            Self::Unbounded(rx) => rx.recv().await,
            Self::Bounded(rx) => rx.recv().await,
        }
    }
}

fn lane_channel(config: &DispatcherConfig) -> (LaneSender, LaneReceiver) {
    match config.lane_capacity {
        Some(capacity) => {
            let (tx, rx) = mpsc::channel(capacity.max(1));
            (
                LaneSender::Bounded {
                    sender: tx,
                    policy: config.overflow_policy,
                },
                LaneReceiver::Bounded(rx),
            )
        }
        None => {
            let (tx, rx) = mpsc::unbounded_channel();
            (LaneSender::Unbounded(tx), LaneReceiver::Unbounded(rx))
        }
    }
}

struct Lane {
    kind: NotificationKind,
    sender: LaneSender,
}

impl Lane {
    /// 投递到通道，永不阻塞
    ///
    /// 不属于本通道的信封不占用缓冲，返回 false。
    fn offer(&self, envelope: EnvelopeRef) -> bool {
        if !self.kind.matches(&envelope) {
            return false;
        }
        match &self.sender {
            LaneSender::Unbounded(tx) => {
                // 接收端只会在关闭后消失，此时丢弃是预期行为
                let _ = tx.send(envelope);
            }
            LaneSender::Bounded { sender, policy } => match sender.try_send(envelope) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(envelope)) => match policy {
                    OverflowPolicy::DropNewest => {
                        metrics::counter!(names::LANE_OVERFLOWS, "lane" => self.kind.as_str())
                            .increment(1);
                        warn!(
                            lane = %self.kind,
                            signature = envelope.signature,
                            "通道缓冲已满，丢弃新信封"
                        );
                    }
                },
                Err(mpsc::error::TrySendError::Closed(_)) => {}
            },
        }
        true
    }
}

// ---------------------------------------------------------------------------
// PushNotifications 分发总线
// ---------------------------------------------------------------------------

struct RunningBus {
    lanes: Vec<Lane>,
    shutdown: watch::Sender<bool>,
    tasks: Vec<JoinHandle<()>>,
}

enum BusState {
    Idle,
    Running(RunningBus),
    Stopped,
}

/// 推送分发总线
pub struct PushNotifications {
    handlers: NotificationHandlers,
    client: Arc<dyn UpdateClient>,
    registrar: Arc<dyn DeviceRegistrar>,
    config: DispatcherConfig,
    state: Mutex<BusState>,
}

impl PushNotifications {
    pub fn new(
        collaborators: Collaborators,
        presenter: AlertPresenter,
        config: DispatcherConfig,
    ) -> Self {
        let handlers =
            NotificationHandlers::new(presenter, collaborators.images, collaborators.sink);
        Self {
            handlers,
            client: collaborators.client,
            registrar: collaborators.registrar,
            config,
            state: Mutex::new(BusState::Idle),
        }
    }

    /// 按应用配置组装：HTTP 动态客户端、HTTP 图片加载器和模拟设备注册器
    pub fn from_app_config(config: &AppConfig, sink: Arc<dyn NotificationSink>) -> Result<Self> {
        let collaborators = Collaborators {
            client: Arc::new(HttpUpdateClient::new(&config.api)?),
            images: Arc::new(HttpImageLoader::new(&config.images)?),
            sink,
            registrar: Arc::new(LoggingDeviceRegistrar::new(config.service_name.clone())),
        };
        let presenter = AlertPresenter::new(AlertStyle::from(&config.presentation));
        Ok(Self::new(collaborators, presenter, config.dispatcher.clone()))
    }

    /// 建立四条通道并注册设备
    ///
    /// 必须在 tokio 运行时内调用。已初始化或已关闭时不做任何事。
    pub fn initialize(&self) {
        let mut state = self.state.lock();
        if !matches!(*state, BusState::Idle) {
            warn!("分发总线已初始化或已关闭，忽略重复初始化");
            return;
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut lanes = Vec::with_capacity(NotificationKind::ALL.len());
        let mut tasks = Vec::new();

        for kind in NotificationKind::ALL {
            let (sender, receiver) = lane_channel(&self.config);
            lanes.push(Lane { kind, sender });

            match kind {
                NotificationKind::ProjectUpdate => {
                    let (pair_tx, pair_rx) = mpsc::unbounded_channel();
                    tasks.push(tokio::spawn(run_update_fetch_lane(
                        receiver,
                        shutdown_rx.clone(),
                        self.client.clone(),
                        pair_tx,
                    )));
                    tasks.push(tokio::spawn(run_update_display_lane(
                        pair_rx,
                        shutdown_rx.clone(),
                        self.handlers.clone(),
                    )));
                }
                NotificationKind::FriendFollow => tasks.push(tokio::spawn(run_lane(
                    kind,
                    receiver,
                    shutdown_rx.clone(),
                    self.handlers.clone(),
                    |handlers, envelope| async move {
                        handlers.display_friend_follow(envelope).await
                    },
                ))),
                NotificationKind::ProjectActivity => tasks.push(tokio::spawn(run_lane(
                    kind,
                    receiver,
                    shutdown_rx.clone(),
                    self.handlers.clone(),
                    |handlers, envelope| async move {
                        handlers.display_project_activity(envelope).await
                    },
                ))),
                NotificationKind::ProjectReminder => tasks.push(tokio::spawn(run_lane(
                    kind,
                    receiver,
                    shutdown_rx.clone(),
                    self.handlers.clone(),
                    |handlers, envelope| async move {
                        handlers.display_project_reminder(envelope).await
                    },
                ))),
            }
        }

        let registrar = self.registrar.clone();
        tokio::spawn(async move {
            if let Err(e) = registrar.register_device().await {
                error!(error = %e, "推送设备注册失败");
            }
        });

        *state = BusState::Running(RunningBus {
            lanes,
            shutdown: shutdown_tx,
            tasks,
        });

        info!(
            lanes = NotificationKind::ALL.len(),
            lane_capacity = ?self.config.lane_capacity,
            "推送分发总线已启动"
        );
    }

    /// 接收一条信封并投递到所属通道
    ///
    /// 从不阻塞调用方，也不返回错误。未初始化或已关闭时静默忽略。
    /// 有界模式下一条通道的突发流量不会挤占其他通道的缓冲。
    pub fn submit(&self, envelope: PushEnvelope) {
        let state = self.state.lock();
        let BusState::Running(bus) = &*state else {
            debug!(signature = envelope.signature, "分发总线未运行，忽略信封");
            return;
        };

        metrics::counter!(names::ENVELOPES_RECEIVED).increment(1);
        let envelope = Arc::new(envelope);
        let accepted = bus.lanes.iter().any(|lane| lane.offer(envelope.clone()));
        if !accepted {
            debug!(signature = envelope.signature, "信封不属于任何通知类别，丢弃");
        }
    }

    /// `submit` 的别名，与消息通道回调命名保持一致
    pub fn add(&self, envelope: PushEnvelope) {
        self.submit(envelope);
    }

    pub fn is_running(&self) -> bool {
        matches!(*self.state.lock(), BusState::Running(_))
    }

    /// 立即取消所有通道
    ///
    /// 缓冲中的信封被丢弃；进行中的动态拉取不会被中断，但其结果不再展示。
    pub fn shutdown(&self) {
        let previous = std::mem::replace(&mut *self.state.lock(), BusState::Stopped);
        if let BusState::Running(bus) = previous {
            let _ = bus.shutdown.send(true);
            info!("推送分发总线已关闭");
        }
    }

    /// 停止接收新信封，等待已接收的信封处理完毕后关闭
    ///
    /// 中途取消返回的 future 等同于 `shutdown`：剩余缓冲和进行中的拉取结果被丢弃。
    pub async fn drain(&self) {
        let previous = std::mem::replace(&mut *self.state.lock(), BusState::Stopped);
        let BusState::Running(bus) = previous else {
            return;
        };

        // 丢弃发送端后各通道读完缓冲即退出
        drop(bus.lanes);
        for task in bus.tasks {
            if let Err(e) = task.await {
                error!(error = %e, "通道任务异常退出");
            }
        }
        drop(bus.shutdown);
        info!("推送分发总线已排空并关闭");
    }
}

impl Drop for PushNotifications {
    fn drop(&mut self) {
        if let BusState::Running(bus) = &*self.state.get_mut() {
            let _ = bus.shutdown.send(true);
        }
    }
}

// ---------------------------------------------------------------------------
// 通道任务
// ---------------------------------------------------------------------------

/// 普通通道：过滤后交给本通道的展示函数
async fn run_lane<F, Fut>(
    kind: NotificationKind,
    mut receiver: LaneReceiver,
    mut shutdown: watch::Receiver<bool>,
    handlers: NotificationHandlers,
    display: F,
) where
    F: Fn(NotificationHandlers, EnvelopeRef) -> Fut,
    Fut: Future<Output = ()>,
{
    debug!(lane = %kind, "通道已启动");

    loop {
        tokio::select! {
            // 偏向关闭信号，保证收到关闭时能尽快退出
            biased;

            changed = shutdown.changed() => {
                if shutdown_requested(changed, &shutdown) {
                    break;
                }
            }

            envelope = receiver.recv() => {
                let Some(envelope) = envelope else {
                    break;
                };
                if !kind.matches(&envelope) {
                    continue;
                }
                display(handlers.clone(), envelope).await;
            }
        }
    }

    debug!(lane = %kind, "通道已停止");
}

/// 关闭信号已发出，或发送端已随总线一起被丢弃
fn shutdown_requested(
    changed: std::result::Result<(), watch::error::RecvError>,
    shutdown: &watch::Receiver<bool>,
) -> bool {
    changed.is_err() || *shutdown.borrow()
}

/// 动态通道的补全阶段：每个信封独立拉取，完成顺序不做保证
async fn run_update_fetch_lane(
    mut receiver: LaneReceiver,
    mut shutdown: watch::Receiver<bool>,
    client: Arc<dyn UpdateClient>,
    pairs: mpsc::UnboundedSender<EnvelopeUpdatePair>,
) {
    let kind = NotificationKind::ProjectUpdate;
    let mut in_flight = JoinSet::new();

    loop {
        tokio::select! {
            biased;

            changed = shutdown.changed() => {
                if shutdown_requested(changed, &shutdown) {
                    // 不中断进行中的拉取，结果由已关闭的展示阶段丢弃
                    in_flight.detach_all();
                    return;
                }
            }

            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}

            envelope = receiver.recv() => {
                let Some(envelope) = envelope else {
                    break;
                };
                if !kind.matches(&envelope) {
                    continue;
                }
                let client = client.clone();
                let pairs = pairs.clone();
                in_flight.spawn(async move {
                    if let Some(pair) = fetch_update_with_envelope(client.as_ref(), envelope).await {
                        let _ = pairs.send(pair);
                    }
                });
            }
        }
    }

    // 排空：等待所有已发起的拉取完成后再关闭展示阶段，期间仍响应关闭
    loop {
        tokio::select! {
            biased;

            changed = shutdown.changed() => {
                if shutdown_requested(changed, &shutdown) {
                    in_flight.detach_all();
                    return;
                }
            }

            joined = in_flight.join_next() => {
                if joined.is_none() {
                    break;
                }
            }
        }
    }
}

/// 动态通道的展示阶段：串行展示补全完成的通知
async fn run_update_display_lane(
    mut pairs: mpsc::UnboundedReceiver<EnvelopeUpdatePair>,
    mut shutdown: watch::Receiver<bool>,
    handlers: NotificationHandlers,
) {
    loop {
        tokio::select! {
            biased;

            changed = shutdown.changed() => {
                if shutdown_requested(changed, &shutdown) {
                    break;
                }
            }

            pair = pairs.recv() => {
                let Some(pair) = pair else {
                    break;
                };
                handlers.display_project_update(pair).await;
            }
        }
    }
}
