//! Filtered views over data sources.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::ast::Expr;
use super::error::PredicateResult;
use super::eval;
use super::parser::PredicateParser;
use super::source::{DataChannel, DataReceiver, DataSource, SubscriptionId};

/// Row test supplied as code.
pub type RowPredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// Which rows a view lets through.
#[derive(Clone, Default)]
pub enum Filter {
    /// Every row.
    #[default]
    None,
    /// Rows matching a parsed expression.
    Predicate(Arc<Expr>),
    /// Rows the callback accepts.
    Callback(RowPredicate),
}

impl Filter {
    /// Parse filter text. Blank text gives [`Filter::None`].
    pub fn parse(text: &str) -> PredicateResult<Filter> {
        if text.trim().is_empty() {
            return Ok(Filter::None);
        }
        PredicateParser::parse(text).map(|expr| Filter::Predicate(Arc::new(expr)))
    }

    pub fn callback<F>(f: F) -> Filter
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Filter::Callback(Arc::new(f))
    }

    pub fn accepts(&self, row: &Value) -> bool {
        match self {
            Filter::None => true,
            Filter::Predicate(expr) => eval::matches(expr, row),
            Filter::Callback(f) => f(row),
        }
    }

    /// Rows that pass, in input order.
    pub fn apply(&self, rows: &[Value]) -> Vec<Value> {
        rows.iter().filter(|row| self.accepts(row)).cloned().collect()
    }
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::None => f.write_str("None"),
            Filter::Predicate(expr) => f.debug_tuple("Predicate").field(expr).finish(),
            Filter::Callback(_) => f.write_str("Callback(..)"),
        }
    }
}

/// A read-only, filtered projection of a data source.
///
/// Pulling ([`get_data_list`](DataSource::get_data_list)) reads the source
/// and filters its rows. A view built with [`DataView::reactive`] also
/// filters every batch the source pushes and pushes the result on its own
/// channel, inside the source's emit call. The view holds no rows. Its
/// subscription on the source ends when the view is dropped.
pub struct DataView {
    name: Option<String>,
    filter: Filter,
    source: Option<Arc<dyn DataSource>>,
    channel: DataChannel,
    upstream: Option<(DataChannel, SubscriptionId)>,
}

impl DataView {
    /// A pull-only view.
    pub fn new(name: Option<String>, filter: Filter, source: Option<Arc<dyn DataSource>>) -> Self {
        Self {
            name,
            filter,
            source,
            channel: DataChannel::new(),
            upstream: None,
        }
    }

    /// A view that also forwards the source's pushed batches.
    pub fn reactive<R>(name: Option<String>, filter: Filter, source: Arc<R>) -> Self
    where
        R: DataReceiver + 'static,
    {
        let mut view = Self::new(name, filter, Some(source.clone() as Arc<dyn DataSource>));

        let filter = view.filter.clone();
        let downstream = view.channel.clone();
        let upstream = source.channel().clone();
        let id = upstream.subscribe(move |batch| {
            downstream.emit(&filter.apply(batch));
        });
        view.upstream = Some((upstream, id));
        tracing::debug!(view = ?view.name, "view subscribed to source");
        view
    }

    /// A pull-only view with a text filter.
    pub fn with_predicate(
        name: Option<String>,
        filter: &str,
        source: Option<Arc<dyn DataSource>>,
    ) -> PredicateResult<Self> {
        Ok(Self::new(name, Filter::parse(filter)?, source))
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn filter(&self) -> &Filter {
        &self.filter
    }

    pub fn source(&self) -> Option<&Arc<dyn DataSource>> {
        self.source.as_ref()
    }
}

impl DataSource for DataView {
    fn data_name(&self) -> Option<String> {
        self.name.clone()
    }

    fn get_data_list(&self) -> Vec<Value> {
        match &self.source {
            Some(source) => self.filter.apply(&source.get_data_list()),
            None => Vec::new(),
        }
    }
}

impl DataReceiver for DataView {
    fn channel(&self) -> &DataChannel {
        &self.channel
    }

    fn on_data_received(&self, batch: Vec<Value>) {
        self.channel.emit(&self.filter.apply(&batch));
    }
}

impl Drop for DataView {
    fn drop(&mut self) {
        if let Some((upstream, id)) = self.upstream.take() {
            upstream.unsubscribe(id);
        }
    }
}

impl fmt::Debug for DataView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DataView")
            .field("name", &self.name)
            .field("filter", &self.filter)
            .field("source", &self.source.as_ref().and_then(|s| s.data_name()))
            .finish()
    }
}
