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
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::anyhow;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{error, info, instrument, trace};

use crate::actor::{ActorConfig, Idle, ManagedActor};
use crate::common::actor_tree::ActorTree;
use crate::common::{ActorId, ActorRef, DeadLetterOffice, FleetConfig, RuntimeEvent};

/// A running actor system.
///
/// Cheap to clone; every clone drives the same arena of actors. Obtain one from
/// [`GreenhouseApp::launch`](crate::common::GreenhouseApp::launch).
#[derive(Debug, Clone)]
pub struct ActorRuntime(pub(crate) Arc<RuntimeInner>);

#[derive(Debug)]
pub(crate) struct RuntimeInner {
    tree: ActorTree,
    next_id: AtomicU64,
    tracker: TaskTracker,
    root_token: CancellationToken,
    events: broadcast::Sender<RuntimeEvent>,
    dead_letters: DeadLetterOffice,
    config: FleetConfig,
}

impl ActorRuntime {
    pub(crate) fn new(config: FleetConfig) -> Self {
        let (events, _) = broadcast::channel(config.limits.event_channel_capacity.max(1));
        Self(Arc::new(RuntimeInner {
            tree: ActorTree::default(),
            next_id: AtomicU64::new(1),
            tracker: TaskTracker::new(),
            root_token: CancellationToken::new(),
            dead_letters: DeadLetterOffice::new(events.clone()),
            events,
            config,
        }))
    }

    /// Creates an idle actor whose model is built by `factory`.
    ///
    /// The factory runs now and again on every restart. The returned builder accepts
    /// handler registrations; call [`ManagedActor::start`] to run it.
    pub fn new_actor<Model, F>(&self, config: ActorConfig, factory: F) -> ManagedActor<Idle, Model>
    where
        Model: Send + Debug + 'static,
        F: Fn() -> Model + Send + Sync + 'static,
    {
        let id = ActorId(self.0.next_id.fetch_add(1, Ordering::Relaxed));
        let token = config.parent().map_or_else(
            || self.0.root_token.child_token(),
            |parent| parent.cancellation_token().child_token(),
        );
        let (outbox, inbox) = mpsc::unbounded_channel();
        let handle = ActorRef::new(
            id,
            config.path(),
            outbox,
            token,
            self.0.dead_letters.clone(),
        );
        ManagedActor::new(self.clone(), &config, handle, inbox, Box::new(factory))
    }

    /// Stops `actor` and everything it owns.
    ///
    /// Fire-and-forget: children are cancelled before their parents, and messages
    /// already queued for any of them are discarded as dead letters.
    #[instrument(skip(self), fields(actor = %actor.path()))]
    pub fn stop(&self, actor: &ActorRef) {
        let subtree = self.0.tree.detach_subtree(actor.id());
        trace!(count = subtree.len(), "stopping subtree");
        for handle in &subtree {
            handle.cancellation_token().cancel();
        }
        if subtree.is_empty() {
            actor.cancellation_token().cancel();
        }
    }

    /// Live children of `actor`.
    pub fn children(&self, actor: &ActorRef) -> Vec<ActorRef> {
        self.0.tree.children(actor.id())
    }

    /// The owner of `actor`, while both are live.
    pub fn parent_of(&self, actor: &ActorRef) -> Option<ActorRef> {
        self.0.tree.parent(actor.id())
    }

    /// Looks an actor up by its full path.
    pub fn find(&self, path: &str) -> Option<ActorRef> {
        self.0.tree.find(path)
    }

    /// Whether `actor` is still part of the tree.
    pub fn is_live(&self, actor: &ActorRef) -> bool {
        self.0.tree.contains(actor.id())
    }

    /// Number of live actors.
    pub fn actor_count(&self) -> usize {
        self.0.tree.len()
    }

    /// Subscribes to lifecycle events emitted from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<RuntimeEvent> {
        self.0.events.subscribe()
    }

    /// Messages dropped because their recipient had stopped.
    pub fn dead_letter_count(&self) -> u64 {
        self.0.dead_letters.count()
    }

    /// The configuration this runtime was launched with.
    pub fn config(&self) -> &FleetConfig {
        &self.0.config
    }

    /// Cancels every actor and waits for all runtime tasks to finish.
    ///
    /// # Errors
    ///
    /// Returns an error if tasks are still running after
    /// `timeouts.system_shutdown_timeout_ms`.
    #[instrument(skip(self))]
    pub async fn shutdown_all(&self) -> anyhow::Result<()> {
        info!(actors = self.actor_count(), "shutting down");
        self.0.root_token.cancel();
        self.0.tracker.close();

        let timeout = self.0.config.timeouts.system_shutdown_timeout();
        if tokio::time::timeout(timeout, self.0.tracker.wait())
            .await
            .is_err()
        {
            error!(?timeout, "shutdown timed out");
            return Err(anyhow!("actors still running after {timeout:?}"));
        }
        info!("all actors stopped");
        Ok(())
    }

    pub(crate) fn adopt(&self, handle: &ActorRef, parent: Option<&ActorRef>) {
        self.0
            .tree
            .insert(handle.clone(), parent.map(ActorRef::id));
    }

    pub(crate) fn spawn<F>(&self, task: F) -> JoinHandle<F::Output>
    where
        F: Future + Send + 'static,
        F::Output: Send + 'static,
    {
        self.0.tracker.spawn(task)
    }

    pub(crate) fn root_token(&self) -> &CancellationToken {
        &self.0.root_token
    }

    pub(crate) fn emit(&self, event: RuntimeEvent) {
        // Nobody listening is fine.
        let _ = self.0.events.send(event);
    }

    pub(crate) fn dead_letters(&self) -> &DeadLetterOffice {
        &self.0.dead_letters
    }
}
