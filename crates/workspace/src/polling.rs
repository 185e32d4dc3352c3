//! 作业视图的拉取控制
//!
//! 两个独立的刷新通道：作业刷新和控制台输出刷新。作业刷新完成后总会
//! 触发一次控制台输出刷新；单独刷新控制台输出不会重新拉取作业。
//!
//! 同一通道上发起新请求会取消尚未返回的旧请求，被取消的响应直接丢弃，
//! 不修改任何状态。这里没有自动轮询，也不设超时。

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use dendro_domain::{DendroApi, Job};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Default)]
pub enum JobLoadState {
    #[default]
    Idle,
    Loading,
    Loaded(Box<Job>),
    NotFound,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ConsoleState {
    /// 作业未加载或没有控制台输出引用
    #[default]
    Absent,
    Loading,
    Loaded(String),
    /// 拉取失败，界面上不显示内容
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct JobViewSnapshot {
    pub job_id: Option<String>,
    pub job: JobLoadState,
    pub console: ConsoleState,
    pub job_refresh_count: u64,
    pub console_refresh_count: u64,
    /// 实际写入状态的作业响应数，被取消的响应不计
    pub job_results_applied: u64,
    pub console_results_applied: u64,
}

impl JobViewSnapshot {
    pub fn loaded_job(&self) -> Option<&Job> {
        match &self.job {
            JobLoadState::Loaded(job) => Some(job),
            _ => None,
        }
    }
}

#[derive(Default)]
struct Slots {
    job: Option<CancellationToken>,
    console: Option<CancellationToken>,
}

impl Slots {
    fn replace_job(&mut self) -> CancellationToken {
        replace_token(&mut self.job)
    }

    fn replace_console(&mut self) -> CancellationToken {
        replace_token(&mut self.console)
    }

    fn cancel_console(&mut self) {
        if let Some(token) = self.console.take() {
            token.cancel();
        }
    }

    fn cancel_all(&mut self) {
        if let Some(token) = self.job.take() {
            token.cancel();
        }
        if let Some(token) = self.console.take() {
            token.cancel();
        }
    }
}

/// 作业刷新或控制台刷新时决定是否需要拉取控制台输出
fn prepare_console(
    slots: &mut Slots,
    snapshot: &mut JobViewSnapshot,
) -> Option<(CancellationToken, String)> {
    let url = snapshot
        .loaded_job()
        .and_then(|job| job.console_output_url.clone());
    match url {
        Some(url) => {
            let token = slots.replace_console();
            snapshot.console = ConsoleState::Loading;
            snapshot.console_refresh_count += 1;
            Some((token, url))
        }
        None => {
            slots.cancel_console();
            snapshot.console = ConsoleState::Absent;
            None
        }
    }
}

fn replace_token(slot: &mut Option<CancellationToken>) -> CancellationToken {
    if let Some(old) = slot.take() {
        old.cancel();
    }
    let token = CancellationToken::new();
    *slot = Some(token.clone());
    token
}

struct Inner {
    api: Arc<dyn DendroApi>,
    state: watch::Sender<JobViewSnapshot>,
    slots: Mutex<Slots>,
}

/// 单个作业视图的拉取控制器
#[derive(Clone)]
pub struct JobPollingController {
    inner: Arc<Inner>,
}

impl JobPollingController {
    pub fn new(api: Arc<dyn DendroApi>) -> Self {
        let (state, _) = watch::channel(JobViewSnapshot::default());
        Self {
            inner: Arc::new(Inner {
                api,
                state,
                slots: Mutex::new(Slots::default()),
            }),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<JobViewSnapshot> {
        self.inner.state.subscribe()
    }

    pub fn snapshot(&self) -> JobViewSnapshot {
        self.inner.state.borrow().clone()
    }

    /// 挂载到某个作业（或切换作业），取消之前所有在途请求
    pub fn attach<S: Into<String>>(&self, job_id: S) {
        let job_id = job_id.into();
        let mut slots = self.lock_slots();
        slots.cancel_all();
        self.inner.state.send_modify(|s| {
            s.job_id = Some(job_id.clone());
            s.job = JobLoadState::Idle;
            s.console = ConsoleState::Absent;
        });
        self.start_job_fetch(&mut slots, job_id);
    }

    pub fn detach(&self) {
        self.lock_slots().cancel_all();
        self.inner.state.send_modify(|s| {
            s.job_id = None;
            s.job = JobLoadState::Idle;
            s.console = ConsoleState::Absent;
        });
    }

    pub fn refresh_job(&self) {
        let mut slots = self.lock_slots();
        let Some(job_id) = self.inner.state.borrow().job_id.clone() else {
            return;
        };
        self.start_job_fetch(&mut slots, job_id);
    }

    pub fn refresh_console_output(&self) {
        let mut slots = self.lock_slots();
        let mut pending = None;
        self.inner
            .state
            .send_modify(|s| pending = prepare_console(&mut slots, s));
        if let Some((token, url)) = pending {
            self.spawn_console_fetch(token, url);
        }
    }

    fn lock_slots(&self) -> MutexGuard<'_, Slots> {
        self.inner
            .slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn start_job_fetch(&self, slots: &mut Slots, job_id: String) {
        let token = slots.replace_job();
        self.inner.state.send_modify(|s| {
            s.job = JobLoadState::Loading;
            s.job_refresh_count += 1;
        });

        let this = self.clone();
        tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("作业 {} 的请求已被新的请求取代", job_id);
                    return;
                }
                result = this.inner.api.fetch_job(&job_id) => result,
            };

            let mut slots = this.lock_slots();
            if token.is_cancelled() {
                debug!("丢弃过期的作业响应: {}", job_id);
                return;
            }
            slots.job = None;

            let state = match result {
                Ok(job) => JobLoadState::Loaded(Box::new(job)),
                Err(e) if e.is_not_found() => JobLoadState::NotFound,
                Err(e) => {
                    warn!("拉取作业 {} 失败: {}", job_id, e);
                    JobLoadState::Failed(e.to_string())
                }
            };
            // 作业状态与控制台输出状态一起更新，订阅方不会看到中间状态
            let mut pending = None;
            this.inner.state.send_modify(|s| {
                s.job = state;
                s.job_results_applied += 1;
                pending = prepare_console(&mut slots, s);
            });
            if let Some((token, url)) = pending {
                this.spawn_console_fetch(token, url);
            }
        });
    }

    fn spawn_console_fetch(&self, token: CancellationToken, url: String) {
        let this = self.clone();
        tokio::spawn(async move {
            let text = tokio::select! {
                biased;
                _ = token.cancelled() => return,
                text = this.inner.api.fetch_text(&url) => text,
            };

            let mut slots = this.lock_slots();
            if token.is_cancelled() {
                debug!("丢弃过期的控制台输出响应");
                return;
            }
            slots.console = None;

            this.inner.state.send_modify(|s| {
                s.console = match text {
                    Some(text) => ConsoleState::Loaded(text),
                    None => ConsoleState::Unavailable,
                };
                s.console_results_applied += 1;
            });
        });
    }
}
