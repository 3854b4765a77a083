//! Writable store: a shared value plus an ordered subscriber list.
//!
//! `Writable` handles are cheap to clone and all clones point at the same
//! value. Every mutation replaces the value under a write lock, releases the
//! lock, and then delivers the new value to each subscriber in subscription
//! order, so a subscriber callback may safely read the store it observes.
//!
//! A write made from inside a subscriber callback does not notify
//! immediately. Its value is queued and delivered once the current pass has
//! reached every subscriber, so all subscribers see values in write order and
//! end on the latest one.

use std::{
    collections::VecDeque,
    fmt::{Debug, Formatter, Result as FmtResult},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering::Relaxed},
    },
    thread::panicking,
};

use {
    async_channel::{Receiver, Sender, unbounded},
    parking_lot::{Mutex, RwLock},
    tracing::{debug, trace},
};

/// Callback invoked with the new value after each mutation.
pub type Subscriber<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A single registered listener.
enum Subscription<T> {
    /// Synchronous callback.
    Callback(Subscriber<T>),
    /// Async consumer fed through an unbounded channel.
    Channel(Sender<T>),
}

impl<T> Clone for Subscription<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Callback(callback) => Self::Callback(Arc::clone(callback)),
            Self::Channel(tx) => Self::Channel(tx.clone()),
        }
    }
}

/// Values waiting to be delivered.
struct NotifyQueue<T> {
    pending: VecDeque<T>,
    /// Set while some caller is draining `pending`.
    draining: bool,
}

/// Resets the queue if a subscriber panics mid-drain, so later writes still
/// notify.
struct DrainGuard<'a, T>(&'a Mutex<NotifyQueue<T>>);

impl<T> Drop for DrainGuard<'_, T> {
    fn drop(&mut self) {
        if panicking() {
            let mut queue = self.0.lock();
            queue.pending.clear();
            queue.draining = false;
        }
    }
}

struct Inner<T> {
    /// Store name used in log output.
    name: &'static str,
    value: RwLock<T>,
    /// Subscribers keyed by registration id, kept in registration order.
    subscribers: RwLock<Vec<(u64, Subscription<T>)>>,
    queue: Mutex<NotifyQueue<T>>,
    next_id: AtomicU64,
}

impl<T> Inner<T> {
    fn remove(&self, id: u64) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|(subscriber_id, _)| *subscriber_id != id);
        before != subscribers.len()
    }
}

/// Reactive container holding a value of type `T`.
///
/// Reads return clones of the current value. Writes always notify, even when
/// the new value equals the old one: one mutation, one notification.
pub struct Writable<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for Writable<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Debug> Debug for Writable<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Writable")
            .field("name", &self.inner.name)
            .field("value", &*self.inner.value.read())
            .field("subscribers", &self.inner.subscribers.read().len())
            .finish()
    }
}

impl<T> Writable<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Creates a new store.
    ///
    /// # Arguments
    ///
    /// * `name` - Name reported in log output.
    /// * `initial` - Initial value.
    ///
    /// # Returns
    ///
    /// A new `Writable` with no subscribers.
    pub fn new(name: &'static str, initial: T) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                value: RwLock::new(initial),
                subscribers: RwLock::new(Vec::new()),
                queue: Mutex::new(NotifyQueue {
                    pending: VecDeque::new(),
                    draining: false,
                }),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    /// Name of the store.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Gets a copy of the current value.
    #[must_use]
    pub fn get(&self) -> T {
        self.inner.value.read().clone()
    }

    /// Runs `f` against the current value without cloning it.
    ///
    /// The store is read-locked while `f` runs; `f` must not write to it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.value.read())
    }

    /// Replaces the value and notifies subscribers.
    ///
    /// # Arguments
    ///
    /// * `value` - New value.
    pub fn set(&self, value: T) {
        debug!(store = self.inner.name, "Replacing store value");
        let snapshot = {
            let mut guard = self.inner.value.write();
            *guard = value;
            guard.clone()
        };
        self.notify(snapshot);
    }

    /// Mutates the value in place and notifies subscribers once.
    ///
    /// The store is write-locked while `f` runs; `f` must not touch it.
    ///
    /// # Arguments
    ///
    /// * `f` - Mutation to apply.
    ///
    /// # Returns
    ///
    /// Whatever `f` returns.
    pub fn update<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        debug!(store = self.inner.name, "Updating store value");
        let (result, snapshot) = {
            let mut guard = self.inner.value.write();
            let result = f(&mut guard);
            (result, guard.clone())
        };
        self.notify(snapshot);
        result
    }

    /// Fallible in-place mutation.
    ///
    /// Subscribers are notified only when `f` returns `Ok`. `f` should check
    /// its preconditions before mutating, since the value is not rolled back
    /// on error.
    ///
    /// # Errors
    ///
    /// Returns whatever error `f` returns.
    pub fn try_update<R, E>(&self, f: impl FnOnce(&mut T) -> Result<R, E>) -> Result<R, E> {
        let (result, snapshot) = {
            let mut guard = self.inner.value.write();
            let result = f(&mut guard)?;
            (result, guard.clone())
        };
        debug!(store = self.inner.name, "Updated store value");
        self.notify(snapshot);
        Ok(result)
    }

    /// Subscribes a callback to value changes.
    ///
    /// The callback runs once with the current value before this returns,
    /// then once per mutation.
    ///
    /// # Arguments
    ///
    /// * `callback` - Invoked with the current value and after every mutation.
    ///
    /// # Returns
    ///
    /// A handle that removes the subscription.
    pub fn subscribe<F>(&self, callback: F) -> Unsubscriber
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        let callback: Subscriber<T> = Arc::new(callback);
        let id = self.register(Subscription::Callback(Arc::clone(&callback)));

        let current = self.get();
        callback(&current);

        let inner = Arc::downgrade(&self.inner);
        Unsubscriber::new(move || {
            if let Some(inner) = inner.upgrade()
                && inner.remove(id)
            {
                debug!(store = inner.name, id, "Subscription removed");
            }
        })
    }

    /// Subscribes through a channel.
    ///
    /// The receiver starts with the current value and then gets every new
    /// value in the same order as callback subscribers. Dropping the receiver
    /// ends the subscription on the next notification.
    ///
    /// # Returns
    ///
    /// A receiver for the current and future values.
    pub fn subscribe_channel(&self) -> Receiver<T> {
        let (tx, rx) = unbounded();
        // Unbounded and the receiver is alive, so this cannot fail.
        let _ = tx.try_send(self.get());
        self.register(Subscription::Channel(tx));
        rx
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.read().len()
    }

    fn register(&self, subscription: Subscription<T>) -> u64 {
        let id = self.inner.next_id.fetch_add(1, Relaxed);
        self.inner.subscribers.write().push((id, subscription));
        debug!(store = self.inner.name, id, "New subscription created");
        id
    }

    /// Queues `value` for delivery and drains the queue unless a caller
    /// further up the stack is already draining it.
    fn notify(&self, value: T) {
        {
            let mut queue = self.inner.queue.lock();
            queue.pending.push_back(value);
            if queue.draining {
                trace!(store = self.inner.name, "Deferred nested notification");
                return;
            }
            queue.draining = true;
        }

        let _guard = DrainGuard(&self.inner.queue);
        loop {
            let next = {
                let mut queue = self.inner.queue.lock();
                let next = queue.pending.pop_front();
                if next.is_none() {
                    queue.draining = false;
                }
                next
            };
            match next {
                Some(value) => self.deliver(&value),
                None => break,
            }
        }
    }

    /// Delivers `value` to every subscriber and prunes closed channels.
    fn deliver(&self, value: &T) {
        let subscribers = self.inner.subscribers.read().clone();
        let mut closed = Vec::new();
        let mut delivered = 0;

        for (id, subscription) in &subscribers {
            match subscription {
                Subscription::Callback(callback) => {
                    callback(value);
                    delivered += 1;
                }
                Subscription::Channel(tx) => {
                    if tx.try_send(value.clone()).is_ok() {
                        delivered += 1;
                    } else {
                        closed.push(*id);
                    }
                }
            }
        }

        if !closed.is_empty() {
            self.inner
                .subscribers
                .write()
                .retain(|(id, _)| !closed.contains(id));
            debug!(
                store = self.inner.name,
                pruned = closed.len(),
                "Pruned closed channel subscriptions"
            );
        }

        trace!(store = self.inner.name, delivered, "Notified subscribers");
    }
}

/// Removes a subscription when [`Unsubscriber::unsubscribe`] is called.
///
/// Dropping the handle without calling it keeps the subscription alive for
/// the lifetime of the store.
pub struct Unsubscriber {
    detach: Box<dyn FnOnce() + Send + Sync>,
}

impl Unsubscriber {
    fn new(detach: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            detach: Box::new(detach),
        }
    }

    /// Removes the subscription. A no-op once the store has been dropped.
    pub fn unsubscribe(self) {
        (self.detach)();
    }
}

impl Debug for Unsubscriber {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("Unsubscriber").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        panic::{AssertUnwindSafe, catch_unwind},
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering::SeqCst},
        },
    };

    use {parking_lot::Mutex, tokio::test as TokioTest};

    use crate::store::Writable;

    #[test]
    fn test_get_returns_initial_value() {
        let store = Writable::new("numbers", vec![1, 2, 3]);
        assert_eq!(store.get(), vec![1, 2, 3]);
        assert_eq!(store.name(), "numbers");
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_set_replaces_value() {
        let store = Writable::new("text", String::from("a"));
        store.set(String::from("b"));
        assert_eq!(store.get(), "b");
        assert_eq!(store.with(String::len), 1);
    }

    #[test]
    fn test_clones_share_value() {
        let store = Writable::new("counter", 0_u32);
        let other = store.clone();
        other.set(7);
        assert_eq!(store.get(), 7);
    }

    #[test]
    fn test_subscribe_replays_current_value() {
        let store = Writable::new("counter", 3_u32);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let _ = store.subscribe(move |value: &u32| log.lock().push(*value));

        assert_eq!(*seen.lock(), vec![3]);

        store.set(4);
        assert_eq!(*seen.lock(), vec![3, 4]);
    }

    #[test]
    fn test_one_notification_per_mutation_in_subscription_order() {
        let store = Writable::new("counter", 0_u32);
        let log = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let log = Arc::clone(&log);
            let _ = store.subscribe(move |value: &u32| log.lock().push((tag, *value)));
        }
        assert_eq!(
            *log.lock(),
            vec![("first", 0), ("second", 0), ("third", 0)]
        );
        log.lock().clear();

        store.set(1);
        store.update(|value| *value += 1);

        assert_eq!(
            *log.lock(),
            vec![
                ("first", 1),
                ("second", 1),
                ("third", 1),
                ("first", 2),
                ("second", 2),
                ("third", 2),
            ]
        );
    }

    #[test]
    fn test_set_with_equal_value_still_notifies() {
        let store = Writable::new("counter", 5_u32);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let _ = store.subscribe(move |_: &u32| {
            counter.fetch_add(1, SeqCst);
        });
        calls.store(0, SeqCst);

        store.set(5);
        store.set(5);
        assert_eq!(calls.load(SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let store = Writable::new("counter", 0_u32);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let unsubscriber = store.subscribe(move |_: &u32| {
            counter.fetch_add(1, SeqCst);
        });
        assert_eq!(store.subscriber_count(), 1);

        store.set(1);
        unsubscriber.unsubscribe();
        store.set(2);

        // Replay plus the one write made while subscribed.
        assert_eq!(calls.load(SeqCst), 2);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_unsubscribe_after_store_dropped() {
        let store = Writable::new("counter", 0_u32);
        let unsubscriber = store.subscribe(|_: &u32| {});
        drop(store);
        unsubscriber.unsubscribe();
    }

    #[test]
    fn test_callback_can_read_store() {
        let store = Writable::new("counter", 0_u32);
        let seen = Arc::new(Mutex::new(None));
        let observed = store.clone();
        let slot = Arc::clone(&seen);
        let _ = store.subscribe(move |_: &u32| {
            *slot.lock() = Some(observed.get());
        });
        assert_eq!(*seen.lock(), Some(0));

        store.set(42);
        assert_eq!(*seen.lock(), Some(42));
    }

    #[test]
    fn test_nested_set_is_delivered_after_current_pass() {
        let store = Writable::new("counter", 0_u32);
        let log = Arc::new(Mutex::new(Vec::new()));

        let writer = store.clone();
        let first_log = Arc::clone(&log);
        let _ = store.subscribe(move |value: &u32| {
            first_log.lock().push(("first", *value));
            if *value == 1 {
                writer.set(2);
            }
        });
        let second_log = Arc::clone(&log);
        let _ = store.subscribe(move |value: &u32| second_log.lock().push(("second", *value)));
        log.lock().clear();

        store.set(1);

        assert_eq!(
            *log.lock(),
            vec![("first", 1), ("second", 1), ("first", 2), ("second", 2)]
        );
        assert_eq!(store.get(), 2);
    }

    #[test]
    fn test_nested_update_chain_keeps_write_order() {
        let store = Writable::new("counter", 0_u32);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let writer = store.clone();
        let _ = store.subscribe(move |value: &u32| {
            if (1..3).contains(value) {
                writer.update(|current| *current += 1);
            }
        });
        let log = Arc::clone(&seen);
        let _ = store.subscribe(move |value: &u32| log.lock().push(*value));
        seen.lock().clear();

        store.set(1);

        assert_eq!(*seen.lock(), vec![1, 2, 3]);
        assert_eq!(store.get(), 3);
    }

    #[test]
    fn test_panicking_subscriber_does_not_block_later_writes() {
        let store = Writable::new("counter", 0_u32);
        let _ = store.subscribe(|value: &u32| assert_ne!(*value, 1));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = Arc::clone(&seen);
        let _ = store.subscribe(move |value: &u32| log.lock().push(*value));

        let writer = store.clone();
        assert!(catch_unwind(AssertUnwindSafe(|| writer.set(1))).is_err());

        store.set(2);
        assert_eq!(*seen.lock(), vec![0, 2]);
    }

    #[TokioTest]
    async fn test_nested_set_reaches_channels_in_order() {
        let store = Writable::new("counter", 0_u32);
        let writer = store.clone();
        let _ = store.subscribe(move |value: &u32| {
            if *value == 1 {
                writer.set(2);
            }
        });
        let receiver = store.subscribe_channel();

        store.set(1);

        assert_eq!(receiver.recv().await.unwrap(), 0);
        assert_eq!(receiver.recv().await.unwrap(), 1);
        assert_eq!(receiver.recv().await.unwrap(), 2);
        assert!(receiver.is_empty());
    }

    #[test]
    fn test_try_update_error_skips_notification() {
        let store = Writable::new("counter", 1_u32);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let _ = store.subscribe(move |_: &u32| {
            counter.fetch_add(1, SeqCst);
        });
        calls.store(0, SeqCst);

        let result: Result<(), &str> = store.try_update(|_| Err("rejected"));
        assert_eq!(result, Err("rejected"));
        assert_eq!(calls.load(SeqCst), 0);

        let doubled: Result<u32, &str> = store.try_update(|value| {
            *value *= 2;
            Ok(*value)
        });
        assert_eq!(doubled, Ok(2));
        assert_eq!(calls.load(SeqCst), 1);
    }

    #[TokioTest]
    async fn test_channel_subscription_receives_values() {
        let store = Writable::new("counter", 0_u32);
        let receiver = store.subscribe_channel();

        store.set(1);
        store.set(2);

        assert_eq!(receiver.recv().await.unwrap(), 0);
        assert_eq!(receiver.recv().await.unwrap(), 1);
        assert_eq!(receiver.recv().await.unwrap(), 2);
    }

    #[test]
    fn test_closed_channel_is_pruned() {
        let store = Writable::new("counter", 0_u32);
        let receiver = store.subscribe_channel();
        let _ = store.subscribe(|_: &u32| {});
        assert_eq!(store.subscriber_count(), 2);

        drop(receiver);
        store.set(1);
        assert_eq!(store.subscriber_count(), 1);
    }

    #[TokioTest]
    async fn test_channel_closes_when_store_dropped() {
        let store = Writable::new("counter", 0_u32);
        let receiver = store.subscribe_channel();
        store.set(9);
        drop(store);

        assert_eq!(receiver.recv().await.unwrap(), 0);
        assert_eq!(receiver.recv().await.unwrap(), 9);
        assert!(receiver.recv().await.is_err());
    }
}
