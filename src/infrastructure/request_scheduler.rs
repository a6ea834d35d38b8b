//! 请求调度器 - 基础设施层
//!
//! 所有远程调用排成一个 FIFO 队列，同一时刻最多一个调用在进行，
//! 相邻两次调用的开始时间至少间隔 `min_interval`。
//!
//! 状态机：Idle → Draining → Idle。队列、是否在消费、上次调用时间
//! 放在同一把锁里，队列为空时在持锁状态下切回 Idle，
//! 因此并发入队的请求要么被正在运行的消费循环取走，要么自己启动新的循环。

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::LlmError;
use crate::models::FormattedReadingTest;
use crate::services::RemoteFormatter;

type Outcome = Result<FormattedReadingTest, LlmError>;

/// 排队中的请求
struct QueuedRequest {
    prompt: String,
    responder: oneshot::Sender<Outcome>,
}

#[derive(Default)]
struct SchedulerState {
    queue: VecDeque<QueuedRequest>,
    draining: bool,
    last_call: Option<Instant>,
}

struct Inner {
    state: Mutex<SchedulerState>,
    formatter: RemoteFormatter,
    min_interval: Duration,
}

impl Inner {
    fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// 单飞 + 限速的请求调度器
#[derive(Clone)]
pub struct RequestScheduler {
    inner: Arc<Inner>,
}

impl RequestScheduler {
    pub fn new(formatter: RemoteFormatter, min_interval: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(SchedulerState::default()),
                formatter,
                min_interval,
            }),
        }
    }

    /// 提交一个请求，等待它被轮到并完成
    ///
    /// 需要在 tokio 运行时中调用；失败只影响本请求。
    pub async fn enqueue(&self, prompt: String) -> Outcome {
        let (responder, receiver) = oneshot::channel();

        let start_drain = {
            let mut state = self.inner.lock();
            state.queue.push_back(QueuedRequest { prompt, responder });
            debug!("请求入队，当前队列长度: {}", state.queue.len());
            if state.draining {
                false
            } else {
                state.draining = true;
                true
            }
        };

        if start_drain {
            debug!("调度器由空闲转为消费状态");
            tokio::spawn(drain(Arc::clone(&self.inner)));
        }

        receiver.await.map_err(|_| LlmError::SchedulerClosed)?
    }

    /// 当前排队（尚未开始）的请求数
    pub fn queue_len(&self) -> usize {
        self.inner.lock().queue.len()
    }

    pub fn is_draining(&self) -> bool {
        self.inner.lock().draining
    }
}

/// 消费循环：逐个取出请求，按最小间隔调用远程服务
async fn drain(inner: Arc<Inner>) {
    loop {
        let (request, last_call) = {
            let mut state = inner.lock();
            match state.queue.pop_front() {
                Some(request) => (request, state.last_call),
                None => {
                    state.draining = false;
                    debug!("队列已清空，调度器回到空闲状态");
                    return;
                }
            }
        };

        if request.responder.is_closed() {
            debug!("调用方已放弃等待，跳过该请求");
            continue;
        }

        if let Some(last) = last_call {
            let ready_at = last + inner.min_interval;
            if ready_at > Instant::now() {
                debug!("距上次调用不足 {:?}，等待中", inner.min_interval);
                tokio::time::sleep_until(ready_at).await;
            }
        }

        inner.lock().last_call = Some(Instant::now());

        let outcome = inner.formatter.call(&request.prompt).await;
        match &outcome {
            Ok(_) => info!("✓ 远程格式化成功"),
            Err(e) => warn!("远程格式化失败 ({}): {}", e.kind(), e),
        }

        if request.responder.send(outcome).is_err() {
            debug!("调用方已离开，结果被丢弃");
        }
    }
}
