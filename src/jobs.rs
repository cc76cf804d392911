//! 后台任务
//!
//! 导出/翻译和抓取是仅有的耗时操作，各自在独立线程上运行。
//! 工作线程只通过有界通道向界面线程发送消息，界面线程每个周期调用
//! [`JobHandle::drain`] 取走消息，从不跨线程直接修改界面状态。

use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tokio::sync::mpsc::{self, error::TryRecvError};

use crate::config::constants::WORKER_CHANNEL_CAPACITY;
use crate::config::ScrapeConfig;
use crate::core::{export_bundle, ExportReport, SheetError, SheetResult};
use crate::document::DocumentSnapshot;
use crate::scrape::{scrape_url, CancelToken, PageFetcher, ScrapeOutcome, ScrapeProgress};
use crate::translation::{LabelTranslator, Translator};

/// 任务阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Idle,
    LoadingEngines,
    Translating,
    Fetching,
    Mapping,
    Done,
}

/// 工作线程发给界面线程的消息
#[derive(Debug)]
pub enum WorkerMessage {
    StateChanged(JobState),
    Progress { done: usize, total: usize },
    ExportFinished(Result<ExportReport, SheetError>),
    ScrapeFinished(ScrapeOutcome),
}

/// 工作线程一侧的发送端
struct Reporter {
    sender: mpsc::Sender<WorkerMessage>,
}

impl Reporter {
    fn send(&self, message: WorkerMessage) {
        // 界面线程已经放弃接收时静默丢弃
        if self.sender.blocking_send(message).is_err() {
            tracing::debug!("任务消息接收端已关闭");
        }
    }

    fn state(&self, state: JobState) {
        self.send(WorkerMessage::StateChanged(state));
    }
}

/// 界面线程持有的任务句柄
pub struct JobHandle {
    receiver: mpsc::Receiver<WorkerMessage>,
    cancel: CancelToken,
    thread: Option<JoinHandle<()>>,
    state: JobState,
}

impl JobHandle {
    fn spawn<F>(name: &str, cancel: CancelToken, work: F) -> SheetResult<Self>
    where
        F: FnOnce(Reporter) + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel(WORKER_CHANNEL_CAPACITY);
        let reporter = Reporter { sender };

        let thread = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || work(reporter))
            .map_err(|e| SheetError::Job(format!("无法启动后台线程 {}: {}", name, e)))?;

        Ok(Self {
            receiver,
            cancel,
            thread: Some(thread),
            state: JobState::Idle,
        })
    }

    /// 取走当前已到达的全部消息，不阻塞
    pub fn drain(&mut self) -> Vec<WorkerMessage> {
        let mut messages = Vec::new();
        loop {
            match self.receiver.try_recv() {
                Ok(message) => {
                    self.observe(&message);
                    messages.push(message);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        messages
    }

    /// 阻塞直到任务结束，返回剩余的全部消息（命令行使用）
    pub fn wait(mut self) -> Vec<WorkerMessage> {
        let mut messages = Vec::new();
        while let Some(message) = self.receiver.blocking_recv() {
            self.observe(&message);
            messages.push(message);
        }
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("后台线程异常退出");
            }
        }
        messages
    }

    /// 等待导出任务结束并取出结果；工作线程没有报告结果时返回 `Job` 错误
    pub fn wait_for_export(self) -> SheetResult<ExportReport> {
        self.wait()
            .into_iter()
            .find_map(|message| match message {
                WorkerMessage::ExportFinished(result) => Some(result),
                _ => None,
            })
            .unwrap_or_else(|| Err(SheetError::Job("导出任务没有返回结果".to_string())))
    }

    /// 等待抓取任务结束并取出结果；取消是正常结果，缺少结果才是错误
    pub fn wait_for_scrape(self) -> SheetResult<ScrapeOutcome> {
        self.wait()
            .into_iter()
            .find_map(|message| match message {
                WorkerMessage::ScrapeFinished(outcome) => Some(outcome),
                _ => None,
            })
            .ok_or_else(|| SheetError::Job("抓取任务没有返回结果".to_string()))
    }

    fn observe(&mut self, message: &WorkerMessage) {
        if let WorkerMessage::StateChanged(state) = message {
            self.state = *state;
        }
    }

    /// 请求取消；只有抓取任务会在行与行之间检查
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// 工作线程是否已经退出
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

/// 启动导出任务：先写源语言文件，给了翻译器时再写译文文件
///
/// 快照在调用时已经取得，之后对文档的修改不会影响本次导出。
pub fn spawn_export(
    snapshot: DocumentSnapshot,
    source_path: PathBuf,
    translator: Option<Arc<Translator>>,
    target_suffix: String,
) -> SheetResult<JobHandle> {
    JobHandle::spawn("specsheet-export", CancelToken::new(), move |reporter| {
        if let Some(translator) = &translator {
            reporter.state(JobState::LoadingEngines);
            if !translator.warm_up() {
                tracing::info!("没有可用的机器翻译，只使用词典");
            }
        }

        reporter.state(JobState::Translating);
        let result = export_bundle(
            &snapshot,
            &source_path,
            translator.as_deref().map(|t| t as &dyn LabelTranslator),
            &target_suffix,
        );
        if let Err(e) = &result {
            tracing::warn!("导出失败: {}", e);
        }

        reporter.send(WorkerMessage::ExportFinished(result));
        reporter.state(JobState::Done);
    })
}

struct ChannelProgress<'a> {
    reporter: &'a Reporter,
}

impl ScrapeProgress for ChannelProgress<'_> {
    fn begin(&mut self, total: usize) {
        self.reporter.state(JobState::Mapping);
        self.reporter.send(WorkerMessage::Progress { done: 0, total });
    }

    fn item_done(&mut self, done: usize, total: usize) {
        self.reporter.send(WorkerMessage::Progress { done, total });
    }

    fn log(&mut self, msg: &str) {
        tracing::info!("{}", msg);
    }
}

/// 启动抓取任务，返回的句柄可用于取消
pub fn spawn_scrape(
    url: String,
    config: ScrapeConfig,
    fetcher: Arc<dyn PageFetcher>,
) -> SheetResult<JobHandle> {
    let cancel = CancelToken::new();
    let worker_cancel = cancel.clone();

    JobHandle::spawn("specsheet-scrape", cancel, move |reporter| {
        reporter.state(JobState::Fetching);
        let outcome = {
            let mut progress = ChannelProgress { reporter: &reporter };
            scrape_url(&url, &config, fetcher.as_ref(), &worker_cancel, &mut progress)
        };

        reporter.send(WorkerMessage::ScrapeFinished(outcome));
        reporter.state(JobState::Done);
    })
}
