//! Descriptions of remote systems and the services they host.

use serde::{Deserialize, Serialize};
use ulid::Ulid;

/// A remote system: a name and the URL calls are sent to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteSystem {
    id: String,
    name: String,
    url: String,
}

crate::addon!(RemoteSystem {
    name: "RemoteSystem",
    label: "Remote system",
    description: "Name and address of a remote service host",
    id: id,
});

impl Default for RemoteSystem {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl RemoteSystem {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: Ulid::new().to_string(),
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

/// One service on a remote system, and the type its proxies stand in for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteService {
    id: String,
    system: RemoteSystem,
    service_name: String,
    proxy_type: String,
}

crate::addon!(RemoteService {
    name: "RemoteService",
    label: "Remote service",
    description: "A named service and the interface it implements",
    id: id,
    children: [system],
});

impl Default for RemoteService {
    fn default() -> Self {
        Self::new(RemoteSystem::default(), "", "")
    }
}

impl RemoteService {
    pub fn new(
        system: RemoteSystem,
        service_name: impl Into<String>,
        proxy_type: impl Into<String>,
    ) -> Self {
        Self {
            id: Ulid::new().to_string(),
            system,
            service_name: service_name.into(),
            proxy_type: proxy_type.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn system(&self) -> &RemoteSystem {
        &self.system
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }

    /// Registry name of the interface the service implements.
    pub fn proxy_type(&self) -> &str {
        &self.proxy_type
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{Codec, Node};
    use crate::registry::TypeRegistry;
    use std::sync::Arc;

    #[test]
    fn test_service_round_trip() {
        let registry = TypeRegistry::new();
        crate::remote::register_types(&registry);
        let codec = Codec::new(Arc::new(registry));

        let service = RemoteService::new(RemoteSystem::new("erp", "http://erp"), "Stock", "StockApi");
        let tagged = codec.tag_graph(&Node::typed(service.clone())).unwrap();
        assert_eq!(tagged["$type"], "RemoteService");
        assert_eq!(tagged["system"]["$type"], "RemoteSystem");

        let text = codec.serialize(&Node::typed(service.clone())).unwrap();
        let back = codec.deserialize(&text).unwrap().unwrap();
        assert_eq!(back.into_typed::<RemoteService>().unwrap(), service);
    }
}
