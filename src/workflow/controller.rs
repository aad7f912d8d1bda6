//! # 工作流控制器
//!
//! ## 设计思路
//!
//! 一份实现，按 `Operation` 实例化三次（Hide / Detect / Extract），实例之间不共享可变状态。
//!
//! 状态机：`Idle → Loading → {Succeeded, Failed}`，成功或失败后再次触发直接进入 `Loading`。
//!
//! ## 实现思路
//!
//! - 重入保护由状态机显式完成：`Loading` 期间的 `trigger()` 直接返回 `Busy`，不依赖界面禁用按钮。
//! - 状态放在 `std::sync::Mutex` 中，锁只在同步片段内持有，绝不跨 `.await`。
//! - 每次触发递增 `generation`；取消或过期的响应按代号比对后丢弃。
//! - 在途请求与 `watch` 取消信号竞争，`cancel()` 立即让 `trigger()` 返回。
//! - `Loading` 期间拒绝选择、拖放与清除，在途请求对应的载荷不会被替换。
//! - `trigger()` 的 future 被丢弃时由守卫作废该代并复位为 `Idle`，不会永久卡在 `Loading`。
//! - 通知一律在释放锁之后发出（含上传校验诊断），外壳在回调里再读控制器也不会死锁。

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;

use super::interpret::interpret;
use super::{Operation, Phase, ResultArtifact, Role, SlotView, WorkflowSnapshot};
use crate::config::{ClientConfig, IntakeConfig};
use crate::error::AppError;
use crate::intake::{Affordance, FileIntake, Payload, ValidationError};
use crate::notify::{Notification, Notifier};
use crate::resource::{self, ResourceStore};
use crate::service::StegoServiceClient;

struct ControllerState {
    intakes: Vec<(Role, FileIntake)>,
    phase: Phase,
    result: Option<ResultArtifact>,
    generation: u64,
    cancel_tx: Option<watch::Sender<bool>>,
}

impl ControllerState {
    fn intake_mut(&mut self, role: Role) -> Option<&mut FileIntake> {
        self.intakes
            .iter_mut()
            .find(|(r, _)| *r == role)
            .map(|(_, intake)| intake)
    }

    fn intake(&self, role: Role) -> Option<&FileIntake> {
        self.intakes
            .iter()
            .find(|(r, _)| *r == role)
            .map(|(_, intake)| intake)
    }

    fn missing_roles(&self) -> Vec<Role> {
        self.intakes
            .iter()
            .filter(|(_, intake)| intake.is_empty())
            .map(|(role, _)| *role)
            .collect()
    }
}

/// 单个工作流的控制器。
pub struct WorkflowController {
    operation: Operation,
    service: StegoServiceClient,
    store: ResourceStore,
    notifier: Arc<dyn Notifier>,
    state: Mutex<ControllerState>,
}

impl WorkflowController {
    /// 使用已有服务客户端创建控制器；资源仓库为本实例独占。
    pub fn new(
        operation: Operation,
        service: StegoServiceClient,
        intake_config: IntakeConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let store = ResourceStore::new();
        let intakes = operation
            .roles()
            .iter()
            .map(|role| {
                let intake = FileIntake::new(
                    role.label(),
                    intake_config.clone(),
                    store.clone(),
                    Arc::clone(&notifier),
                );
                (*role, intake)
            })
            .collect();

        Self {
            operation,
            service,
            store,
            notifier,
            state: Mutex::new(ControllerState {
                intakes,
                phase: Phase::Idle,
                result: None,
                generation: 0,
                cancel_tx: None,
            }),
        }
    }

    /// 由完整配置创建控制器（校验配置并构建服务客户端）。
    pub fn from_config(
        operation: Operation,
        config: &ClientConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self, AppError> {
        config.validate()?;
        let service = StegoServiceClient::new(config.service.clone())?;
        Ok(Self::new(operation, service, config.intake.clone(), notifier))
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn store(&self) -> &ResourceStore {
        &self.store
    }

    // 锁内不会 panic，中毒只可能来自外部，直接取回内部数据
    fn lock_state(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn unknown_role(&self, role: Role) -> AppError {
        AppError::Config(format!("{} 工作流不包含角色 {}", self.operation, role))
    }

    fn with_intake<R>(
        &self,
        role: Role,
        f: impl FnOnce(&mut FileIntake) -> R,
    ) -> Result<R, AppError> {
        let mut state = self.lock_state();
        let intake = state.intake_mut(role).ok_or_else(|| self.unknown_role(role))?;
        Ok(f(intake))
    }

    /// 修改槽位内容；请求在途时拒绝，保证 `Loading` 期间必填角色齐全。
    /// 校验失败的诊断在释放锁之后发出。
    fn mutate_intake(
        &self,
        role: Role,
        f: impl FnOnce(&mut FileIntake) -> Result<(), AppError>,
    ) -> Result<(), AppError> {
        let (outcome, diagnostic) = {
            let mut state = self.lock_state();
            if state.phase == Phase::Loading {
                log::warn!("⏳ {} 请求在途，拒绝修改 {} 槽位", self.operation, role);
                return Err(AppError::Busy);
            }
            let intake = state.intake_mut(role).ok_or_else(|| self.unknown_role(role))?;
            let outcome = f(intake);
            let diagnostic = match &outcome {
                Err(AppError::Validation(err)) => Some(Notification::destructive(
                    err.title(),
                    err.description(),
                )),
                _ => None,
            };
            (outcome, diagnostic)
        };

        if let Some(notification) = diagnostic {
            self.notifier.notify(notification);
        }
        outcome
    }

    /// 为角色选择文件。
    pub fn select(&self, role: Role, payload: Payload) -> Result<(), AppError> {
        self.mutate_intake(role, |intake| intake.accept(payload).map(|_| ()))
    }

    /// 拖放文件到角色槽位。
    pub fn drop_file(&self, role: Role, payload: Payload) -> Result<(), AppError> {
        self.mutate_intake(role, |intake| intake.accept_drop(payload).map(|_| ()))
    }

    /// 清除角色槽位。
    pub fn clear(&self, role: Role) -> Result<(), AppError> {
        self.mutate_intake(role, |intake| {
            intake.clear();
            Ok(())
        })
    }

    pub fn drag_enter(&self, role: Role) -> Result<(), AppError> {
        self.with_intake(role, FileIntake::drag_enter)
    }

    pub fn drag_leave(&self, role: Role) -> Result<(), AppError> {
        self.with_intake(role, FileIntake::drag_leave)
    }

    pub fn payload(&self, role: Role) -> Option<Payload> {
        self.lock_state().intake(role).and_then(|i| i.payload().cloned())
    }

    pub fn affordance(&self, role: Role) -> Option<Affordance> {
        self.lock_state().intake(role).map(FileIntake::affordance)
    }

    pub fn phase(&self) -> Phase {
        self.lock_state().phase
    }

    pub fn result(&self) -> Option<ResultArtifact> {
        self.lock_state().result.clone()
    }

    pub fn missing_roles(&self) -> Vec<Role> {
        self.lock_state().missing_roles()
    }

    /// 触发按钮是否可用：必填角色齐全且不在请求中。
    pub fn can_trigger(&self) -> bool {
        let state = self.lock_state();
        state.phase != Phase::Loading && state.missing_roles().is_empty()
    }

    pub fn snapshot(&self) -> WorkflowSnapshot {
        let state = self.lock_state();
        let slots = state
            .intakes
            .iter()
            .map(|(role, intake)| SlotView {
                role: *role,
                label: role.label(),
                file_name: intake.payload().map(|p| p.name().to_string()),
                affordance: intake.affordance(),
            })
            .collect();

        WorkflowSnapshot {
            operation: self.operation,
            phase: state.phase,
            can_trigger: state.phase != Phase::Loading && state.missing_roles().is_empty(),
            slots,
            result: state.result.clone(),
        }
    }

    /// 发出一次请求并解读响应。
    ///
    /// - 缺图：发出诊断，返回 `Validation(Missing)`，不进入 `Loading`
    /// - 请求中：返回 `Busy`，不发请求
    /// - 失败：进入 `Failed` 并发出错误通知，上传内容保留以便重试
    /// - 被取消：返回 `Cancelled`，状态已由 `cancel()` 复位
    /// - future 被丢弃：守卫作废该代并回到 `Idle`
    pub async fn trigger(&self) -> Result<(), AppError> {
        let (generation, fields, mut cancel_rx) = self.begin()?;
        let _loading = LoadingGuard {
            controller: self,
            generation,
        };

        let outcome = tokio::select! {
            result = self.service.submit(self.operation.path(), &fields) => Some(result),
            _ = cancel_rx.wait_for(|cancelled| *cancelled) => None,
        };

        let Some(outcome) = outcome else {
            log::info!("⏹️ {} 请求已取消（generation={}）", self.operation, generation);
            return Err(AppError::Cancelled);
        };

        let interpreted = outcome
            .and_then(|response| interpret(self.operation.response_kind(), &response, &self.store));
        self.finish(generation, interpreted)
    }

    fn begin(
        &self,
    ) -> Result<(u64, Vec<(&'static str, Payload)>, watch::Receiver<bool>), AppError> {
        let refusal = {
            let mut state = self.lock_state();
            if state.phase == Phase::Loading {
                log::warn!("⏳ {} 已有请求在途，忽略重复触发", self.operation);
                return Err(AppError::Busy);
            }

            let missing = state.missing_roles();
            if missing.is_empty() {
                let fields = state
                    .intakes
                    .iter()
                    .filter_map(|(role, intake)| {
                        intake.payload().map(|p| (role.field_name(), p.clone()))
                    })
                    .collect();

                state.generation += 1;
                state.phase = Phase::Loading;
                state.result = None;
                let (tx, rx) = watch::channel(false);
                state.cancel_tx = Some(tx);

                log::info!("🚀 {} 开始请求（generation={}）", self.operation, state.generation);
                return Ok((state.generation, fields, rx));
            }

            ValidationError::Missing {
                roles: missing.iter().map(|role| role.display_name()).collect(),
            }
        };

        log::warn!("🚫 {} 缺少图片：{}", self.operation, refusal);
        self.notifier
            .notify(Notification::destructive(refusal.title(), refusal.description()));
        Err(refusal.into())
    }

    fn finish(
        &self,
        generation: u64,
        outcome: Result<ResultArtifact, AppError>,
    ) -> Result<(), AppError> {
        let (notification, ret) = {
            let mut state = self.lock_state();
            if state.generation != generation || state.phase != Phase::Loading {
                log::info!(
                    "⏭️ {} 丢弃过期响应（generation={}，当前={}）",
                    self.operation,
                    generation,
                    state.generation
                );
                return Err(AppError::Cancelled);
            }
            state.cancel_tx = None;

            match outcome {
                Ok(artifact) => {
                    let notification = success_notification(&artifact);
                    state.phase = Phase::Succeeded;
                    state.result = Some(artifact);
                    (notification, Ok(()))
                }
                Err(err) => {
                    log::error!("❌ {} 请求失败：{}", self.operation, err);
                    state.phase = Phase::Failed;
                    let notification =
                        Notification::destructive("Error", self.failure_description(&err));
                    (notification, Err(err))
                }
            }
        };

        self.notifier.notify(notification);
        ret
    }

    /// 取消在途请求；不在 `Loading` 时返回 `false`。
    pub fn cancel(&self) -> bool {
        let cancelled = {
            let mut state = self.lock_state();
            if state.phase != Phase::Loading {
                false
            } else {
                state.generation += 1;
                state.phase = Phase::Idle;
                if let Some(tx) = state.cancel_tx.take() {
                    let _ = tx.send(true);
                }
                true
            }
        };

        if cancelled {
            self.notifier
                .notify(Notification::info("Cancelled", "Request cancelled"));
        }
        cancelled
    }

    /// 将当前图片结果保存到目录。
    pub fn download_result(&self, dir: &Path) -> Result<PathBuf, AppError> {
        let Some(ResultArtifact::Image(artifact)) = self.result() else {
            return Err(AppError::NoResult);
        };

        match resource::download(&artifact.preview, artifact.suggested_name(), dir) {
            Ok(path) => {
                self.notifier.notify(Notification::info(
                    "Downloaded",
                    artifact.output.saved_description,
                ));
                Ok(path)
            }
            Err(err) => {
                self.notifier
                    .notify(Notification::destructive("Error", err.to_string()));
                Err(err)
            }
        }
    }

    fn failure_description(&self, err: &AppError) -> String {
        match err {
            AppError::Status(_) | AppError::UnexpectedResponse(_) | AppError::Validation(_) => {
                err.to_string()
            }
            _ => self.operation.failure_fallback().to_string(),
        }
    }
}

fn success_notification(artifact: &ResultArtifact) -> Notification {
    match artifact {
        ResultArtifact::Classification(prediction) => Notification::info(
            "Analysis complete",
            format!("Image classified as: {}", prediction.label),
        ),
        ResultArtifact::Image(image) => {
            Notification::info("Success!", image.output.success_description)
        }
    }
}

/// 在途请求的守卫：`trigger()` 的 future 被中途丢弃（超时、任务中止）时，
/// 若该代仍处于 `Loading`，则作废该代并回到 `Idle`。
struct LoadingGuard<'a> {
    controller: &'a WorkflowController,
    generation: u64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.controller.lock_state();
        if state.generation != self.generation || state.phase != Phase::Loading {
            return;
        }
        state.generation += 1;
        state.phase = Phase::Idle;
        state.cancel_tx = None;
        log::warn!(
            "🧯 {} 请求被调用方放弃，复位为 Idle（generation={}）",
            self.controller.operation,
            self.generation
        );
    }
}
