/*
 * Copyright (c) 2024. Govcraft
 *
 * Licensed under either of
 *   * Apache License, Version 2.0 (the "License");
 *     you may not use this file except in compliance with the License.
 *     You may obtain a copy of the License at http://www.apache.org/licenses/LICENSE-2.0
 *   * MIT license: http://opensource.org/licenses/MIT
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the applicable License for the specific language governing permissions and
 * limitations under that License.
 */

use std::fmt::Debug;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, instrument, trace, warn};

use crate::actor::{ManagedActor, SupervisionDecision};
use crate::common::{ActorRef, ActorRuntime, RuntimeEvent, StopReason};
use crate::message::{ActorContext, Envelope, HandlerFault};

/// Type-state marker for an actor whose task is draining its mailbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Started;

/// What the supervisor did about a fault.
enum Recovery {
    Resumed,
    Restarted,
    Halted(StopReason),
}

impl<Model: Send + Debug + 'static> ManagedActor<Started, Model> {
    #[instrument(skip(self), fields(actor = %self.handle.path()))]
    pub(crate) async fn wake(mut self) {
        let token = self.handle.cancellation_token().clone();
        debug!(policy = %self.supervisor.policy(), "actor started");
        self.runtime.emit(RuntimeEvent::Spawned {
            path: self.handle.path().clone(),
        });

        let reason = self.run(&token).await;
        self.terminate(reason);
    }

    async fn run(&mut self, token: &CancellationToken) -> StopReason {
        if token.is_cancelled() {
            return StopReason::Cancelled;
        }
        let mut starting = true;
        loop {
            if starting {
                starting = false;
                if let Err(fault) = self.run_start_hook() {
                    match self.recover(fault, token).await {
                        Recovery::Resumed => {}
                        Recovery::Restarted => {
                            starting = true;
                            continue;
                        }
                        Recovery::Halted(reason) => return reason,
                    }
                }
            }

            let envelope = tokio::select! {
                biased;
                () = token.cancelled() => {
                    trace!("cancellation observed");
                    return StopReason::Cancelled;
                }
                incoming = self.inbox.recv() => match incoming {
                    Some(envelope) => envelope,
                    None => return StopReason::Cancelled,
                },
            };

            if let Err(fault) = self.dispatch(&envelope) {
                match self.recover(fault, token).await {
                    Recovery::Resumed => {}
                    Recovery::Restarted => starting = true,
                    Recovery::Halted(reason) => return reason,
                }
            }
        }
    }

    fn run_start_hook(&mut self) -> Result<(), HandlerFault> {
        let Some(hook) = self.on_start.as_ref() else {
            return Ok(());
        };
        invoke(&self.handle, &self.runtime, &mut self.model, |model, context| {
            hook(model, context);
            Ok(())
        })
    }

    fn dispatch(&mut self, envelope: &Envelope) -> Result<(), HandlerFault> {
        let message = envelope.payload();
        let type_id = message.as_any().type_id();
        let Some(handler) = self.handlers.get(&type_id) else {
            trace!(?message, "no handler registered, dropping");
            return Ok(());
        };
        trace!(?message, sender = ?envelope.sender, "dispatch");
        invoke(&self.handle, &self.runtime, &mut self.model, |model, context| {
            handler(model, message, context)
        })
    }

    async fn recover(&mut self, fault: HandlerFault, token: &CancellationToken) -> Recovery {
        let path = self.handle.path().clone();
        let decision = self.supervisor.on_failure();
        let failures = self.supervisor.failures();
        error!(%fault, failures, "handler fault");
        self.runtime.emit(RuntimeEvent::Failed {
            path: path.clone(),
            fault,
            failures,
        });

        match decision {
            SupervisionDecision::Resume => {
                warn!("resuming with current state");
                self.supervisor.recovered();
                self.runtime.emit(RuntimeEvent::Resumed { path });
                Recovery::Resumed
            }
            SupervisionDecision::Restart { attempt, delay } => {
                warn!(attempt, ?delay, "restart scheduled");
                self.runtime.emit(RuntimeEvent::RestartScheduled {
                    path: path.clone(),
                    attempt,
                    delay,
                });
                self.stop_children();

                tokio::select! {
                    biased;
                    () = token.cancelled() => return Recovery::Halted(StopReason::Cancelled),
                    () = tokio::time::sleep(delay) => {}
                }

                self.model = (self.factory)();
                self.supervisor.recovered();
                debug!(attempt, "restarted with fresh model");
                self.runtime.emit(RuntimeEvent::Restarted { path, attempt });
                Recovery::Restarted
            }
            SupervisionDecision::Stop => Recovery::Halted(StopReason::Supervision),
        }
    }

    fn stop_children(&self) {
        for child in self.runtime.children(&self.handle) {
            self.runtime.stop(&child);
        }
    }

    fn terminate(mut self, reason: StopReason) {
        self.supervisor.stop();
        self.runtime.stop(&self.handle);

        self.inbox.close();
        let dead_letters = self.runtime.dead_letters();
        while let Ok(envelope) = self.inbox.try_recv() {
            dead_letters.post(self.handle.path(), envelope.message);
        }

        if let Some(hook) = self.after_stop.as_ref() {
            let model = &self.model;
            if let Err(fault) = HandlerFault::capture(|| {
                hook(model);
                Ok(())
            }) {
                error!(%fault, "after_stop hook failed");
            }
        }

        debug!(%reason, "actor stopped");
        self.runtime.emit(RuntimeEvent::Stopped {
            path: self.handle.path().clone(),
            reason,
        });
    }
}

/// Runs one handler invocation, committing its side effects on success and
/// discarding them on failure.
fn invoke<Model>(
    myself: &ActorRef,
    runtime: &ActorRuntime,
    model: &mut Model,
    handler: impl FnOnce(&mut Model, &mut ActorContext) -> anyhow::Result<()>,
) -> Result<(), HandlerFault> {
    let mut context = ActorContext::new(myself.clone(), runtime.clone());
    match HandlerFault::capture(|| handler(model, &mut context)) {
        Ok(()) => {
            context.commit();
            Ok(())
        }
        Err(fault) => {
            context.rollback();
            Err(fault)
        }
    }
}
