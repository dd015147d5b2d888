//! Row sources for views.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde_json::Value;

use crate::data::DataTable;

/// Anything that can hand out its current rows.
pub trait DataSource: Send + Sync {
    /// Name of the source, if it has one.
    fn data_name(&self) -> Option<String> {
        None
    }

    /// Current rows, in source order.
    fn get_data_list(&self) -> Vec<Value>;
}

/// Callback receiving one batch of rows.
pub type DataHandler = Arc<dyn Fn(&[Value]) + Send + Sync>;

/// Handle returned by [`DataChannel::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

#[derive(Default)]
struct Subscribers {
    next_id: u64,
    handlers: Vec<(SubscriptionId, DataHandler)>,
}

/// A push channel carrying row batches to subscribers.
///
/// Emitting calls every subscriber synchronously, in subscription order.
/// The subscriber list is copied before the calls, so a handler may
/// subscribe or unsubscribe others; the change applies from the next batch.
#[derive(Clone, Default)]
pub struct DataChannel {
    subscribers: Arc<Mutex<Subscribers>>,
}

impl DataChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        let mut subscribers = self.subscribers.lock();
        let id = SubscriptionId(subscribers.next_id);
        subscribers.next_id += 1;
        subscribers.handlers.push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler. Returns `false` if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.handlers.len();
        subscribers.handlers.retain(|(sid, _)| *sid != id);
        subscribers.handlers.len() != before
    }

    pub fn emit(&self, batch: &[Value]) {
        let handlers: Vec<DataHandler> = self
            .subscribers
            .lock()
            .handlers
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        tracing::trace!(rows = batch.len(), subscribers = handlers.len(), "emitting batch");
        for handler in handlers {
            handler(batch);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().handlers.len()
    }
}

impl fmt::Debug for DataChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataChannel")
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// A source that also pushes incoming batches on its channel.
pub trait DataReceiver: DataSource {
    fn channel(&self) -> &DataChannel;

    /// Take in a batch of new rows.
    fn on_data_received(&self, batch: Vec<Value>);
}

impl DataSource for DataTable {
    fn data_name(&self) -> Option<String> {
        Some(self.name().to_string())
    }

    fn get_data_list(&self) -> Vec<Value> {
        DataTable::get_data_list(self)
            .into_iter()
            .map(Value::Object)
            .collect()
    }
}

impl DataSource for RwLock<DataTable> {
    fn data_name(&self) -> Option<String> {
        self.read().data_name()
    }

    fn get_data_list(&self) -> Vec<Value> {
        DataSource::get_data_list(&*self.read())
    }
}

/// A named list of plain objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectListTable {
    name: Option<String>,
    objects: Vec<Value>,
}

impl ObjectListTable {
    pub fn new(name: Option<String>, objects: Vec<Value>) -> Self {
        Self { name, objects }
    }

    pub fn objects(&self) -> &[Value] {
        &self.objects
    }
}

impl DataSource for ObjectListTable {
    fn data_name(&self) -> Option<String> {
        self.name.clone()
    }

    fn get_data_list(&self) -> Vec<Value> {
        self.objects.clone()
    }
}

/// A reactive source fed from outside.
///
/// Keeps every row it has received, in arrival order, and pushes each
/// batch on its channel as it arrives.
#[derive(Debug, Default)]
pub struct DataFeed {
    name: Option<String>,
    rows: RwLock<Vec<Value>>,
    channel: DataChannel,
}

impl DataFeed {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Drop the cached rows. Subscribers are kept.
    pub fn clear(&self) {
        self.rows.write().clear();
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

impl DataSource for DataFeed {
    fn data_name(&self) -> Option<String> {
        self.name.clone()
    }

    fn get_data_list(&self) -> Vec<Value> {
        self.rows.read().clone()
    }
}

impl DataReceiver for DataFeed {
    fn channel(&self) -> &DataChannel {
        &self.channel
    }

    fn on_data_received(&self, batch: Vec<Value>) {
        self.rows.write().extend(batch.iter().cloned());
        self.channel.emit(&batch);
    }
}
