use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::fmt::{Debug, Display};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

// =============================================================================
// 1. THE ABSTRACTION
// =============================================================================

/// Trait that any record must implement to be kept by a ResourceActor
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// Label used in logs and error messages ("customer", "soda", ...)
    const KIND: &'static str;

    /// Get the ID of the entity
    fn id(&self) -> &Self::Id;
}

/// Failures of the record store itself, as opposed to domain rule violations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },
    #[error("{kind} already exists: {id}")]
    Conflict { kind: &'static str, id: String },
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

pub type Predicate<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// A single staged change inside a unit of work.
#[derive(Debug, Clone)]
pub enum Change<T: Entity> {
    Insert(T),
    Delete(T::Id),
}

pub enum ResourceRequest<T: Entity> {
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    Find {
        predicate: Predicate<T>,
        respond_to: Response<Option<T>>,
    },
    Count {
        respond_to: Response<usize>,
    },
    Commit {
        changes: Vec<Change<T>>,
        respond_to: Response<()>,
    },
    /// Stops the actor even while other clients are still alive.
    Shutdown,
}

impl<T: Entity> Debug for ResourceRequest<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceRequest::Get { id, .. } => f.debug_struct("Get").field("id", id).finish(),
            ResourceRequest::Find { .. } => f.write_str("Find"),
            ResourceRequest::Count { .. } => f.write_str("Count"),
            ResourceRequest::Commit { changes, .. } => {
                f.debug_struct("Commit").field("changes", &changes.len()).finish()
            }
            ResourceRequest::Shutdown => f.write_str("Shutdown"),
        }
    }
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    // Insertion order, so `find` behaves like a first-match scan.
    order: Vec<T::Id>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(buffer_size: usize) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            order: Vec::new(),
        };
        let client = ResourceClient { sender };
        (actor, client)
    }

    pub async fn run(mut self) {
        debug!(kind = T::KIND, "Record store starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Get { id, respond_to } => {
                    let item = self.store.get(&id).cloned();
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Find { predicate, respond_to } => {
                    let item = self.order.iter()
                        .filter_map(|id| self.store.get(id))
                        .find(|item| predicate(item))
                        .cloned();
                    let _ = respond_to.send(Ok(item));
                }
                ResourceRequest::Count { respond_to } => {
                    let _ = respond_to.send(Ok(self.store.len()));
                }
                ResourceRequest::Commit { changes, respond_to } => {
                    let result = self.apply(changes);
                    if let Err(e) = &result {
                        warn!(kind = T::KIND, error = %e, "Commit rejected");
                    }
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Shutdown => {
                    debug!(kind = T::KIND, "Shutdown requested");
                    break;
                }
            }
        }
        debug!(kind = T::KIND, "Record store stopped");
    }

    /// Validates the whole batch against the current store, then applies it.
    /// Nothing is written unless every change is valid.
    fn apply(&mut self, changes: Vec<Change<T>>) -> Result<(), FrameworkError> {
        let mut present: HashSet<T::Id> = HashSet::new();
        let mut removed: HashSet<T::Id> = HashSet::new();
        let exists = |id: &T::Id, present: &HashSet<T::Id>, removed: &HashSet<T::Id>| {
            present.contains(id) || (self.store.contains_key(id) && !removed.contains(id))
        };

        for change in &changes {
            match change {
                Change::Delete(id) => {
                    if !exists(id, &present, &removed) {
                        return Err(FrameworkError::NotFound { kind: T::KIND, id: id.to_string() });
                    }
                    present.remove(id);
                    removed.insert(id.clone());
                }
                Change::Insert(item) => {
                    let id = item.id();
                    if exists(id, &present, &removed) {
                        return Err(FrameworkError::Conflict { kind: T::KIND, id: id.to_string() });
                    }
                    present.insert(id.clone());
                }
            }
        }

        for change in changes {
            match change {
                Change::Delete(id) => {
                    self.store.remove(&id);
                    self.order.retain(|existing| existing != &id);
                }
                Change::Insert(item) => {
                    let id = item.id().clone();
                    self.order.push(id.clone());
                    self.store.insert(id, item);
                }
            }
        }
        Ok(())
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender.send(build(respond_to))
            .await.map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn find(
        &self,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> Result<Option<T>, FrameworkError> {
        let predicate: Predicate<T> = Box::new(predicate);
        self.request(|respond_to| ResourceRequest::Find { predicate, respond_to }).await
    }

    pub async fn count(&self) -> Result<usize, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Count { respond_to }).await
    }

    /// Asks the actor to stop. Requests queued behind this one are dropped and
    /// every client, including clones, sees `ActorClosed` afterwards.
    pub async fn close(&self) {
        if self.sender.send(ResourceRequest::Shutdown).await.is_err() {
            debug!(kind = T::KIND, "Record store already stopped");
        }
    }

    /// Starts a unit of work whose changes become visible together on commit.
    pub fn begin(&self) -> UnitOfWork<T> {
        UnitOfWork {
            client: self.clone(),
            changes: Vec::new(),
        }
    }
}

/// Staged inserts and deletes, flushed to the actor as one message.
pub struct UnitOfWork<T: Entity> {
    client: ResourceClient<T>,
    changes: Vec<Change<T>>,
}

impl<T: Entity> UnitOfWork<T> {
    pub fn insert(&mut self, item: T) -> &mut Self {
        self.changes.push(Change::Insert(item));
        self
    }

    pub fn delete(&mut self, item: &T) -> &mut Self {
        self.changes.push(Change::Delete(item.id().clone()));
        self
    }

    pub async fn commit(self) -> Result<(), FrameworkError> {
        let changes = self.changes;
        self.client.request(|respond_to| ResourceRequest::Commit { changes, respond_to }).await
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================
