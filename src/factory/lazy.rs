//! Deferred module loading.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};

use super::error::{FactoryError, FactoryResult};
use crate::codec::Node;

/// Loads an exported value from a module.
pub trait ModuleResolver: Send + Sync {
    fn resolve(&self, path: &str, symbol: &str) -> FactoryResult<Node>;
}

/// In-memory modules registered up front.
#[derive(Debug, Default)]
pub struct StaticModules {
    modules: RwLock<HashMap<String, HashMap<String, Node>>>,
}

impl StaticModules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Export `value` as `symbol` from the module at `path`.
    pub fn insert(&self, path: impl Into<String>, symbol: impl Into<String>, value: Node) {
        self.modules
            .write()
            .entry(path.into())
            .or_default()
            .insert(symbol.into(), value);
    }
}

impl ModuleResolver for StaticModules {
    fn resolve(&self, path: &str, symbol: &str) -> FactoryResult<Node> {
        let modules = self.modules.read();
        let module = modules
            .get(path)
            .ok_or_else(|| FactoryError::Module(format!("module not found: {}", path).into()))?;
        module
            .get(symbol)
            .cloned()
            .ok_or_else(|| FactoryError::MissingExport {
                path: path.to_string(),
                symbol: symbol.to_string(),
            })
    }
}

/// Produces a module export, loading it on first use only.
///
/// Clones share the cache. Only the path and symbol are serialized; a
/// decoded factory needs [`with_resolver`](LazyFactory::with_resolver)
/// before it can load.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct LazyFactory {
    path: String,
    symbol: String,
    #[serde(skip)]
    resolver: Option<Arc<dyn ModuleResolver>>,
    #[serde(skip)]
    cache: Arc<Mutex<Option<Node>>>,
}

crate::addon!(LazyFactory {
    name: "LazyFactory",
    label: "Deferred module export",
});

impl LazyFactory {
    pub fn new(
        path: impl Into<String>,
        symbol: impl Into<String>,
        resolver: Arc<dyn ModuleResolver>,
    ) -> Self {
        Self {
            path: path.into(),
            symbol: symbol.into(),
            resolver: Some(resolver),
            cache: Arc::default(),
        }
    }

    /// Attach the resolver used by [`load`](LazyFactory::load).
    pub fn with_resolver(mut self, resolver: Arc<dyn ModuleResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.lock().is_some()
    }

    /// The export, loading it if this is the first call.
    ///
    /// A failed load is not cached; the next call tries again. The cache
    /// lock is not held while the resolver runs, so the resolver may use
    /// this factory itself. When two loads race, the first stored value
    /// wins.
    pub fn load(&self) -> FactoryResult<Node> {
        if let Some(value) = self.cache.lock().as_ref() {
            return Ok(value.clone());
        }

        let resolver = self.resolver.as_ref().ok_or_else(|| {
            FactoryError::Module(format!("no resolver for module {}", self.path).into())
        })?;
        tracing::debug!(path = %self.path, symbol = %self.symbol, "loading module export");
        let value = resolver.resolve(&self.path, &self.symbol)?;

        let mut cache = self.cache.lock();
        Ok(cache.get_or_insert(value).clone())
    }
}

impl fmt::Debug for LazyFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LazyFactory")
            .field("path", &self.path)
            .field("symbol", &self.symbol)
            .field("has_resolver", &self.resolver.is_some())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Counts how often it is asked.
    struct Counting {
        inner: StaticModules,
        calls: AtomicUsize,
    }

    impl ModuleResolver for Counting {
        fn resolve(&self, path: &str, symbol: &str) -> FactoryResult<Node> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.resolve(path, symbol)
        }
    }

    fn resolver() -> Arc<Counting> {
        let inner = StaticModules::new();
        inner.insert("widgets/chart", "Chart", Node::from("chart export"));
        Arc::new(Counting {
            inner,
            calls: AtomicUsize::new(0),
        })
    }

    #[test]
    fn test_loads_once() {
        let resolver = resolver();
        let factory = LazyFactory::new("widgets/chart", "Chart", resolver.clone());
        assert!(!factory.is_loaded());

        assert_eq!(factory.load().unwrap(), Node::from("chart export"));
        assert_eq!(factory.clone().load().unwrap(), Node::from("chart export"));
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 1);
        assert!(factory.is_loaded());
    }

    #[test]
    fn test_missing_export_and_module() {
        let resolver = resolver();
        let err = LazyFactory::new("widgets/chart", "Table", resolver.clone())
            .load()
            .unwrap_err();
        assert!(matches!(err, FactoryError::MissingExport { ref symbol, .. } if symbol == "Table"));

        let failing = LazyFactory::new("widgets/none", "Chart", resolver.clone());
        assert!(failing.load().unwrap_err().is_external());
        assert!(failing.load().is_err());
        assert_eq!(resolver.calls.load(Ordering::SeqCst), 3);
    }

    /// Looks at the factory it is loading for while resolving.
    #[derive(Default)]
    struct Reentrant {
        target: Mutex<Option<LazyFactory>>,
        saw_loaded: Mutex<Option<bool>>,
    }

    impl ModuleResolver for Reentrant {
        fn resolve(&self, _path: &str, _symbol: &str) -> FactoryResult<Node> {
            let target = self.target.lock().clone();
            if let Some(factory) = target {
                *self.saw_loaded.lock() = Some(factory.is_loaded());
            }
            Ok(Node::from(7))
        }
    }

    #[test]
    fn test_resolver_may_use_the_loading_factory() {
        let resolver = Arc::new(Reentrant::default());
        let factory = LazyFactory::new("m", "seven", resolver.clone());
        *resolver.target.lock() = Some(factory.clone());

        assert_eq!(factory.load().unwrap(), Node::from(7));
        assert_eq!(*resolver.saw_loaded.lock(), Some(false));
        assert!(factory.is_loaded());
        resolver.target.lock().take();
    }

    #[test]
    fn test_decoded_factory_needs_a_resolver() {
        let text = r#"{"path": "widgets/chart", "symbol": "Chart"}"#;
        let decoded: LazyFactory = serde_json::from_str(text).unwrap();
        assert!(decoded.load().unwrap_err().is_external());

        let attached = decoded.with_resolver(resolver());
        assert_eq!(attached.load().unwrap(), Node::from("chart export"));
    }
}
