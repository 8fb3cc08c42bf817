//! Topic-keyed publish/subscribe used to hand locally created recipes from
//! the add-recipe flow to whichever store is listening.
//!
//! The bus is an ordinary value: clone it into every component that needs
//! it. Clones share the same handler registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use log::{debug, trace};

/// Topic carrying freshly composed [`crate::Recipe`]s
pub const NEW_RECIPE_TOPIC: &str = "newRecipe";

type Handler<P> = Arc<dyn Fn(&P) + Send + Sync>;

struct Registration<P> {
    id: u64,
    handler: Handler<P>,
}

struct Registry<P> {
    next_id: u64,
    topics: HashMap<String, Vec<Registration<P>>>,
}

impl<P> Registry<P> {
    fn remove(&mut self, topic: &str, id: u64) -> bool {
        let Some(handlers) = self.topics.get_mut(topic) else {
            return false;
        };
        match handlers.iter().position(|registration| registration.id == id) {
            Some(index) => {
                handlers.remove(index);
                true
            }
            None => false,
        }
    }
}

fn lock<P>(registry: &Mutex<Registry<P>>) -> MutexGuard<'_, Registry<P>> {
    // Handlers never run under the lock, so a poisoned registry is still consistent
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-memory publish/subscribe channel keyed by topic name
pub struct EventBus<P> {
    registry: Arc<Mutex<Registry<P>>>,
}

impl<P: 'static> EventBus<P> {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                next_id: 0,
                topics: HashMap::new(),
            })),
        }
    }

    /// Register `handler` for `topic`.
    ///
    /// The returned [`Subscription`] removes exactly this handler when it is
    /// dropped or [`Subscription::unsubscribe`]d, whatever else is registered
    /// on the same topic.
    pub fn subscribe<F>(&self, topic: impl Into<String>, handler: F) -> Subscription
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        let topic = topic.into();
        let id = {
            let mut registry = lock(&self.registry);
            let id = registry.next_id;
            registry.next_id += 1;
            registry
                .topics
                .entry(topic.clone())
                .or_default()
                .push(Registration {
                    id,
                    handler: Arc::new(handler),
                });
            id
        };
        debug!("Subscribed handler {} to '{}'", id, topic);

        let registry: Weak<Mutex<Registry<P>>> = Arc::downgrade(&self.registry);
        Subscription {
            topic: topic.clone(),
            release: Some(Box::new(move || match registry.upgrade() {
                Some(registry) => lock(&registry).remove(&topic, id),
                None => false,
            })),
        }
    }

    /// Invoke every handler registered for `topic`, in registration order.
    ///
    /// The handler list is copied before the first call, so handlers that
    /// subscribe or unsubscribe while this runs only affect later publishes.
    /// Returns how many handlers were called; zero subscribers is not an error.
    pub fn publish(&self, topic: &str, payload: &P) -> usize {
        let handlers: Vec<Handler<P>> = {
            let registry = lock(&self.registry);
            match registry.topics.get(topic) {
                Some(handlers) => handlers
                    .iter()
                    .map(|registration| Arc::clone(&registration.handler))
                    .collect(),
                None => Vec::new(),
            }
        };

        trace!("Publishing to '{}' ({} handlers)", topic, handlers.len());
        for handler in &handlers {
            handler(payload);
        }
        handlers.len()
    }

    /// Drop every handler for `topic`. Other topics are untouched.
    pub fn unsubscribe_all(&self, topic: &str) {
        if let Some(handlers) = lock(&self.registry).topics.get_mut(topic) {
            debug!("Removing {} handlers from '{}'", handlers.len(), topic);
            handlers.clear();
        }
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        lock(&self.registry)
            .topics
            .get(topic)
            .map_or(0, Vec::len)
    }
}

impl<P: 'static> Default for EventBus<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Clone for EventBus<P> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<P> fmt::Debug for EventBus<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = lock(&self.registry);
        f.debug_struct("EventBus")
            .field("topics", &registry.topics.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Handle for one registered handler. Releasing it unregisters the handler.
#[must_use = "dropping a Subscription unregisters its handler immediately"]
pub struct Subscription {
    topic: String,
    release: Option<Box<dyn FnOnce() -> bool + Send + Sync>>,
}

impl Subscription {
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// Unregister now. Returns `false` if the handler was already gone
    /// (for example after [`EventBus::unsubscribe_all`]).
    pub fn unsubscribe(mut self) -> bool {
        self.release.take().is_some_and(|release| release())
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("active", &self.release.is_some())
            .finish()
    }
}

/// A bus bound to a single topic with a fixed payload type
#[derive(Debug, Clone)]
pub struct EventNotifier<P> {
    bus: EventBus<P>,
    topic: String,
}

impl<P: 'static> EventNotifier<P> {
    pub fn new(bus: EventBus<P>, topic: impl Into<String>) -> Self {
        Self {
            bus,
            topic: topic.into(),
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn notify(&self, payload: &P) -> usize {
        self.bus.publish(&self.topic, payload)
    }

    pub fn listen<F>(&self, handler: F) -> Subscription
    where
        F: Fn(&P) + Send + Sync + 'static,
    {
        self.bus.subscribe(self.topic.clone(), handler)
    }
}
