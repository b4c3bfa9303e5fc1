//! Debounced query dispatch with generation-based stale-response rejection.
//!
//! [`DebounceState`] is the clock-driven state machine; [`QueryDispatcher`]
//! runs it on a tokio task that is the only writer of the [`ResultStore`].
//! Readers observe the store through a `watch` channel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

use stockroom_catalog::{QueryDescriptor, ResultStore};
use stockroom_core::{CatalogResult, Product, ProductId};

use crate::service::QueryService;

/// Monotonic tag identifying one issued fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl core::fmt::Display for Generation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// A fetch the caller must perform and report back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: Generation,
    pub descriptor: QueryDescriptor,
}

/// What happened to a fetch response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseOutcome {
    /// Current generation; items replaced.
    Committed,
    /// Current generation; error recorded, items kept.
    Failed,
    /// Superseded generation; ignored.
    Stale,
}

#[derive(Debug, Clone)]
struct Pending {
    descriptor: QueryDescriptor,
    deadline: Instant,
    force: bool,
}

/// Debounce and generation bookkeeping.
///
/// Every change restarts the quiet period; only the descriptor pending when
/// the period elapses is fetched. A response is applied only when its
/// generation is the most recently issued one.
#[derive(Debug, Clone)]
pub struct DebounceState {
    interval: Duration,
    pending: Option<Pending>,
    last_seen: Option<QueryDescriptor>,
    latest: Option<FetchTicket>,
    latest_failed: bool,
    next_generation: u64,
}

impl DebounceState {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            pending: None,
            last_seen: None,
            latest: None,
            latest_failed: false,
            next_generation: 1,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Replace the pending target and restart the quiet period.
    pub fn on_descriptor_changed(&mut self, descriptor: QueryDescriptor, now: Instant) {
        self.schedule(descriptor, now, false);
    }

    /// Schedule a fetch of the last seen descriptor even if it is already the
    /// latest issued one. No-op before the first descriptor arrives.
    pub fn request_refresh(&mut self, now: Instant) {
        if let Some(descriptor) = self.last_seen.clone() {
            self.schedule(descriptor, now, true);
        }
    }

    fn schedule(&mut self, descriptor: QueryDescriptor, now: Instant, force: bool) {
        if let Some(previous) = &self.pending {
            tracing::debug!(
                remaining_ms = previous.deadline.saturating_duration_since(now).as_millis() as u64,
                "restarting debounce window"
            );
        }
        let force = force || self.pending.as_ref().is_some_and(|p| p.force);
        self.last_seen = Some(descriptor.clone());
        self.pending = Some(Pending {
            descriptor,
            deadline: now + self.interval,
            force,
        });
    }

    /// When the pending target becomes due.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Most recently issued fetch.
    pub fn latest(&self) -> Option<&FetchTicket> {
        self.latest.as_ref()
    }

    pub fn is_current(&self, generation: Generation) -> bool {
        self.latest.as_ref().is_some_and(|t| t.generation == generation)
    }

    /// Issue the pending fetch if its quiet period has elapsed.
    ///
    /// A due target equal to the latest issued descriptor is dropped unless
    /// a refresh was requested or that fetch failed.
    pub fn poll(&mut self, now: Instant, store: &mut ResultStore) -> Option<FetchTicket> {
        if self.pending.as_ref()?.deadline > now {
            return None;
        }
        let pending = self.pending.take()?;

        if !pending.force
            && !self.latest_failed
            && self.latest.as_ref().is_some_and(|t| t.descriptor == pending.descriptor)
        {
            tracing::debug!("due descriptor matches latest fetch, skipping");
            return None;
        }

        let ticket = FetchTicket {
            generation: Generation(self.next_generation),
            descriptor: pending.descriptor,
        };
        self.next_generation += 1;
        self.latest = Some(ticket.clone());
        self.latest_failed = false;
        store.begin_fetch();

        tracing::info!(generation = %ticket.generation, "issuing product query");
        Some(ticket)
    }

    /// Fold a fetch response into `store`.
    pub fn on_response(
        &mut self,
        generation: Generation,
        result: CatalogResult<Vec<Product>>,
        store: &mut ResultStore,
    ) -> ResponseOutcome {
        let Some(latest) = self.latest.as_ref().filter(|t| t.generation == generation) else {
            tracing::debug!(%generation, "discarding superseded response");
            return ResponseOutcome::Stale;
        };

        match result {
            Ok(items) => {
                tracing::info!(%generation, count = items.len(), "committing product query");
                store.commit(latest.descriptor.clone(), items);
                store.finish_fetch();
                ResponseOutcome::Committed
            }
            Err(err) => {
                tracing::warn!(%generation, error = %err, "product query failed");
                self.latest_failed = true;
                store.fail_fetch(err.display_message());
                ResponseOutcome::Failed
            }
        }
    }
}

enum Command {
    DescriptorChanged(QueryDescriptor),
    Refresh,
    InsertOne(Product),
    UpdateOne(Product),
    RemoveOne(ProductId),
    BeginMutation,
    FinishMutation(Option<String>),
    ClearError,
    Shutdown,
}

struct Completion {
    generation: Generation,
    result: CatalogResult<Vec<Product>>,
}

/// Cheap, cloneable front of a running dispatcher.
///
/// Sends never fail from the caller's point of view; once the dispatcher
/// has stopped they are dropped.
#[derive(Debug, Clone)]
pub struct DispatcherHandle {
    commands: mpsc::UnboundedSender<Command>,
    results: watch::Receiver<ResultStore>,
}

impl core::fmt::Debug for Command {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Command::DescriptorChanged(_) => "DescriptorChanged",
            Command::Refresh => "Refresh",
            Command::InsertOne(_) => "InsertOne",
            Command::UpdateOne(_) => "UpdateOne",
            Command::RemoveOne(_) => "RemoveOne",
            Command::BeginMutation => "BeginMutation",
            Command::FinishMutation(_) => "FinishMutation",
            Command::ClearError => "ClearError",
            Command::Shutdown => "Shutdown",
        };
        f.write_str(name)
    }
}

impl DispatcherHandle {
    fn send(&self, command: Command) {
        if let Err(e) = self.commands.send(command) {
            tracing::debug!(command = ?e.0, "dispatcher stopped; dropping command");
        }
    }

    pub fn descriptor_changed(&self, descriptor: QueryDescriptor) {
        self.send(Command::DescriptorChanged(descriptor));
    }

    /// Refetch the current descriptor after the usual quiet period.
    pub fn refresh(&self) {
        self.send(Command::Refresh);
    }

    pub fn insert_one(&self, product: Product) {
        self.send(Command::InsertOne(product));
    }

    pub fn update_one(&self, product: Product) {
        self.send(Command::UpdateOne(product));
    }

    pub fn remove_one(&self, id: ProductId) {
        self.send(Command::RemoveOne(id));
    }

    pub fn begin_mutation(&self) {
        self.send(Command::BeginMutation);
    }

    pub fn finish_mutation(&self, error: Option<String>) {
        self.send(Command::FinishMutation(error));
    }

    pub fn clear_error(&self) {
        self.send(Command::ClearError);
    }

    /// Stop the dispatcher; in-flight responses are dropped.
    pub fn shutdown(&self) {
        self.send(Command::Shutdown);
    }

    /// Copy of the current store.
    pub fn snapshot(&self) -> ResultStore {
        self.results.borrow().clone()
    }

    /// Receiver notified on every store change.
    pub fn subscribe(&self) -> watch::Receiver<ResultStore> {
        self.results.clone()
    }

    /// Wait for a store state matching `predicate`.
    ///
    /// Returns `None` if the dispatcher stopped first.
    pub async fn wait_for(&self, predicate: impl FnMut(&ResultStore) -> bool) -> Option<ResultStore> {
        let mut results = self.results.clone();
        let store = results.wait_for(predicate).await.ok()?;
        Some(store.clone())
    }
}

/// Runs a [`DebounceState`] against a [`QueryService`].
pub struct QueryDispatcher {
    service: Arc<dyn QueryService>,
    state: DebounceState,
}

impl QueryDispatcher {
    pub fn new(service: Arc<dyn QueryService>, interval: Duration) -> Self {
        Self {
            service,
            state: DebounceState::new(interval),
        }
    }

    /// Spawn the dispatcher task.
    ///
    /// Fetches run on their own tasks; superseded ones run to completion and
    /// their responses are discarded.
    pub fn start(self) -> (DispatcherHandle, JoinHandle<()>) {
        let (command_tx, mut commands) = mpsc::unbounded_channel::<Command>();
        let (completion_tx, mut completions) = mpsc::unbounded_channel::<Completion>();
        let (results_tx, results_rx) = watch::channel(ResultStore::new());

        let QueryDispatcher { service, mut state } = self;

        let join = tokio::spawn(async move {
            tracing::info!(interval_ms = state.interval().as_millis() as u64, "query dispatcher started");

            loop {
                let deadline = state.deadline();

                tokio::select! {
                    command = commands.recv() => {
                        let Some(command) = command else { break };
                        match command {
                            Command::Shutdown => break,
                            Command::DescriptorChanged(descriptor) => {
                                state.on_descriptor_changed(descriptor, Instant::now());
                            }
                            Command::Refresh => state.request_refresh(Instant::now()),
                            Command::InsertOne(product) => {
                                results_tx.send_modify(|store| store.insert_one(product));
                            }
                            Command::UpdateOne(product) => {
                                results_tx.send_modify(|store| store.update_one(product));
                            }
                            Command::RemoveOne(id) => {
                                results_tx.send_modify(|store| store.remove_one(&id));
                            }
                            Command::BeginMutation => results_tx.send_modify(ResultStore::begin_mutation),
                            Command::FinishMutation(error) => {
                                results_tx.send_modify(|store| store.finish_mutation(error));
                            }
                            Command::ClearError => results_tx.send_modify(ResultStore::clear_error),
                        }
                    }
                    Some(done) = completions.recv() => {
                        results_tx.send_if_modified(|store| {
                            state.on_response(done.generation, done.result, store) != ResponseOutcome::Stale
                        });
                    }
                    _ = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                        let mut issued = None;
                        results_tx.send_if_modified(|store| {
                            issued = state.poll(Instant::now(), store);
                            issued.is_some()
                        });

                        if let Some(ticket) = issued {
                            let service = Arc::clone(&service);
                            let completion_tx = completion_tx.clone();
                            tokio::spawn(async move {
                                let result = service.fetch(&ticket.descriptor).await;
                                let _ = completion_tx.send(Completion {
                                    generation: ticket.generation,
                                    result,
                                });
                            });
                        }
                    }
                }
            }

            tracing::info!("query dispatcher stopped");
        });

        (
            DispatcherHandle {
                commands: command_tx,
                results: results_rx,
            },
            join,
        )
    }
}
