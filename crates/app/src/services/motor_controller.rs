//! Motor controller — the single serialization point for motor commands.
//!
//! One task owns the [`MotorMachine`] and its completion timer. Every ingress
//! channel (HTTP, store subscription, automation) talks to it through a
//! cloneable [`MotorHandle`], so commands are applied strictly one at a time
//! and there is never more than one completion timer alive.
//!
//! Every handled command and every completion reset raises a watermark of
//! `updatedAt` stamps. A stamped store record at or below it is an echo of
//! something already handled (typically a late acknowledgment) and is ignored
//! as [`IgnoreReason::Stale`].

use std::future::pending;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Sleep, sleep};

use clothesline_domain::command::{CommandRecord, CommandSource, MotorCommand, MotorCommandKind};
use clothesline_domain::error::ClotheslineError;
use clothesline_domain::motor::{IgnoreReason, MotorMachine, MotorState, Transition};
use clothesline_domain::time::Millis;

use crate::clock::Clock;
use crate::ports::{SharedStore, StorePaths};
use crate::services::status_publisher::StatusPublisher;

const REQUEST_BUFFER: usize = 32;

/// Source tag written with the `IDLE` reset after a completed run.
pub const CONTROLLER_SOURCE: &str = "controller";

/// What the controller currently looks like from the outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControllerView {
    pub state: MotorState,
    /// A completion timer is pending. Always equal to `state.running()`.
    pub timer_armed: bool,
    pub last_processed: Option<MotorCommandKind>,
}

/// Result of one submitted command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    pub command: MotorCommand,
    pub transition: Transition,
    /// Motor state right after the command was applied.
    pub state: MotorState,
}

impl CommandOutcome {
    #[must_use]
    pub fn accepted(&self) -> bool {
        self.transition.is_accepted()
    }
}

struct Request {
    command: MotorCommand,
    /// `updatedAt` carried by the command, if any.
    stamp: Option<Millis>,
    reply: oneshot::Sender<CommandOutcome>,
}

/// Cloneable front door to the controller task.
#[derive(Clone)]
pub struct MotorHandle {
    requests: mpsc::Sender<Request>,
    view: watch::Receiver<ControllerView>,
    clock: Clock,
}

impl MotorHandle {
    /// Submit a command and wait until it has been applied.
    ///
    /// # Errors
    ///
    /// Returns [`ClotheslineError::Unavailable`] when the controller task has
    /// stopped.
    pub async fn submit(
        &self,
        kind: MotorCommandKind,
        source: CommandSource,
    ) -> Result<CommandOutcome, ClotheslineError> {
        let now = self.clock.now_ms();
        // acknowledged commands come back with this stamp
        let stamp = source.needs_acknowledgment().then_some(now);
        self.send(MotorCommand::new(kind, source, now), stamp).await
    }

    /// Submit a command read from the store's command record.
    ///
    /// `stamp` is the record's `updatedAt`. Unstamped records are never
    /// considered stale.
    ///
    /// # Errors
    ///
    /// Returns [`ClotheslineError::Unavailable`] when the controller task has
    /// stopped.
    pub async fn submit_record(
        &self,
        kind: MotorCommandKind,
        stamp: Option<Millis>,
    ) -> Result<CommandOutcome, ClotheslineError> {
        let command = MotorCommand::new(kind, CommandSource::Store, self.clock.now_ms());
        self.send(command, stamp).await
    }

    async fn send(
        &self,
        command: MotorCommand,
        stamp: Option<Millis>,
    ) -> Result<CommandOutcome, ClotheslineError> {
        let (reply, outcome) = oneshot::channel();
        self.requests
            .send(Request {
                command,
                stamp,
                reply,
            })
            .await
            .map_err(|_| ClotheslineError::Unavailable("motor controller"))?;
        outcome
            .await
            .map_err(|_| ClotheslineError::Unavailable("motor controller"))
    }

    #[must_use]
    pub fn view(&self) -> ControllerView {
        *self.view.borrow()
    }

    #[must_use]
    pub fn state(&self) -> MotorState {
        self.view().state
    }
}

enum Event {
    Command(Request),
    Completed,
    Closed,
}

/// The task that owns the machine. Built and started with [`MotorController::spawn`].
pub struct MotorController<S> {
    machine: MotorMachine,
    timer: Option<Pin<Box<Sleep>>>,
    watermark: Option<Millis>,
    travel: Duration,
    requests: mpsc::Receiver<Request>,
    view: watch::Sender<ControllerView>,
    store: Arc<S>,
    command_path: String,
    publisher: Arc<StatusPublisher<S>>,
    clock: Clock,
}

impl<S: SharedStore + 'static> MotorController<S> {
    /// Start the controller at `IDLE_RETRACTED`.
    ///
    /// The task runs until every [`MotorHandle`] is dropped.
    pub fn spawn(
        store: Arc<S>,
        paths: &StorePaths,
        publisher: Arc<StatusPublisher<S>>,
        clock: Clock,
        travel: Duration,
    ) -> (MotorHandle, JoinHandle<()>) {
        let (requests_tx, requests) = mpsc::channel(REQUEST_BUFFER);
        let (view, view_rx) = watch::channel(ControllerView::default());
        let controller = Self {
            machine: MotorMachine::new(),
            timer: None,
            watermark: None,
            travel,
            requests,
            view,
            store,
            command_path: paths.command(),
            publisher,
            clock,
        };
        let task = tokio::spawn(controller.run());
        let handle = MotorHandle {
            requests: requests_tx,
            view: view_rx,
            clock,
        };
        (handle, task)
    }

    async fn run(mut self) {
        tracing::debug!(travel_ms = self.travel.as_millis(), "motor controller started");
        loop {
            let event = tokio::select! {
                request = self.requests.recv() => match request {
                    Some(request) => Event::Command(request),
                    None => Event::Closed,
                },
                () = wait_for(&mut self.timer) => Event::Completed,
            };
            match event {
                Event::Command(request) => self.apply(request).await,
                Event::Completed => self.complete().await,
                Event::Closed => break,
            }
        }
        tracing::debug!("motor controller stopped");
    }

    async fn apply(
        &mut self,
        Request {
            command,
            stamp,
            reply,
        }: Request,
    ) {
        let transition = if self.is_stale(command.source, stamp) {
            Transition::Ignored(IgnoreReason::Stale)
        } else {
            self.raise_watermark(stamp);
            self.machine.handle(command.kind)
        };
        let effects = transition.effects();
        if effects.cancel_timer {
            self.timer = None;
        }
        if effects.start_timer {
            self.timer = Some(Box::pin(sleep(self.travel)));
        }
        let state = self.machine.state();
        self.sync_view();

        match transition {
            Transition::Ignored(reason) => tracing::debug!(
                command = %command.kind,
                source = %command.source,
                ?reason,
                "motor command ignored"
            ),
            _ => tracing::info!(
                command = %command.kind,
                source = %command.source,
                phase = ?state.phase(),
                "motor command accepted"
            ),
        }

        if effects.publish {
            self.publisher.publish_motor(state).await;
        }
        if command.source.needs_acknowledgment() {
            let record = CommandRecord::new(command.kind, command.issued_at_ms)
                .with_source(command.source.to_string());
            self.write_command(record).await;
        }

        // the caller may have given up waiting
        let _ = reply.send(CommandOutcome {
            command,
            transition,
            state,
        });
    }

    async fn complete(&mut self) {
        self.timer = None;
        let Some(position) = self.machine.complete() else {
            return;
        };
        self.sync_view();
        tracing::info!(%position, "motor run completed");

        self.publisher.publish_motor(self.machine.state()).await;
        let now = self.clock.now_ms();
        self.raise_watermark(Some(now));
        let record = CommandRecord::new(MotorCommandKind::Idle, now).with_source(CONTROLLER_SOURCE);
        self.write_command(record).await;
    }

    async fn write_command(&mut self, record: CommandRecord) {
        if let Err(err) = self.store.merge(&self.command_path, record.to_value()).await {
            tracing::warn!(
                path = %self.command_path,
                command = %record.motor,
                error = %err,
                "failed to acknowledge motor command"
            );
        }
    }

    fn is_stale(&self, source: CommandSource, stamp: Option<Millis>) -> bool {
        match (source, stamp, self.watermark) {
            (CommandSource::Store, Some(stamp), Some(watermark)) => stamp <= watermark,
            _ => false,
        }
    }

    fn raise_watermark(&mut self, stamp: Option<Millis>) {
        if let Some(stamp) = stamp {
            self.watermark = Some(self.watermark.map_or(stamp, |current| current.max(stamp)));
        }
    }

    fn sync_view(&self) {
        self.view.send_replace(ControllerView {
            state: self.machine.state(),
            timer_armed: self.timer.is_some(),
            last_processed: self.machine.last_processed(),
        });
    }
}

async fn wait_for(timer: &mut Option<Pin<Box<Sleep>>>) {
    match timer {
        Some(timer) => timer.as_mut().await,
        None => pending().await,
    }
}
