//! Request envelopes and the transport boundary.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use ulid::Ulid;

use super::error::{RemoteError, RemoteResult};
use super::service::RemoteService;
use crate::codec::{Codec, Node};
use crate::factory::{BoxError, FactoryError, ProxyFactory};
use crate::registry::TypeDescriptor;

/// Sends a serialized request and returns the decoded response.
///
/// Implemented by the host; the crate does no networking.
pub trait RemoteClientAdapter: Send + Sync {
    fn remote_call(&self, url: &str, data: &str) -> Result<Value, BoxError>;
}

/// The envelope sent for every call.
#[derive(Debug, Clone)]
pub struct RemoteRequest {
    pub id: String,
    pub service_name: String,
    pub function_name: String,
    pub user_token: Option<String>,
    pub args: Vec<Node>,
}

impl RemoteRequest {
    pub fn new(
        service_name: impl Into<String>,
        function_name: impl Into<String>,
        args: Vec<Node>,
    ) -> Self {
        Self {
            id: Ulid::new().to_string(),
            service_name: service_name.into(),
            function_name: function_name.into(),
            user_token: None,
            args,
        }
    }

    /// Untyped object form; typed arguments stay typed so they get tagged.
    pub fn to_node(&self) -> Node {
        let mut node = Node::object();
        node.insert("id", Node::from(self.id.as_str()));
        node.insert("service_name", Node::from(self.service_name.as_str()));
        node.insert("function_name", Node::from(self.function_name.as_str()));
        node.insert(
            "user_token",
            self.user_token.as_deref().map_or(Node::Null, Node::from),
        );
        node.insert("args", Node::Array(self.args.clone()));
        node
    }
}

/// Makes remote calls through a host adapter.
///
/// Cheap to clone.
#[derive(Clone)]
pub struct RemoteClient {
    adapter: Arc<dyn RemoteClientAdapter>,
    codec: Codec,
    user_token: Option<String>,
}

impl RemoteClient {
    pub fn new(adapter: Arc<dyn RemoteClientAdapter>, codec: Codec) -> Self {
        Self {
            adapter,
            codec,
            user_token: None,
        }
    }

    /// Token sent with every request.
    pub fn with_user_token(mut self, token: impl Into<String>) -> Self {
        self.user_token = Some(token.into());
        self
    }

    /// Call `function` on `service`.
    ///
    /// Returns the response's `d` member with its typed values rebuilt, or
    /// `None` when the response is empty or has no `d`.
    pub fn call(
        &self,
        url: &str,
        service: &str,
        function: &str,
        args: Vec<Node>,
    ) -> RemoteResult<Option<Node>> {
        let mut request = RemoteRequest::new(service, function, args);
        request.user_token = self.user_token.clone();
        let data = self.codec.serialize(&request.to_node())?;

        tracing::debug!(url, service, function, request_id = %request.id, "remote call");
        let response = self
            .adapter
            .remote_call(url, &data)
            .map_err(RemoteError::Transport)?;

        match response {
            Value::Object(mut map) => match map.remove("d") {
                Some(Value::Null) | None => Ok(None),
                Some(d) => Ok(Some(self.codec.untag(d)?)),
            },
            _ => Ok(None),
        }
    }

    /// A proxy factory whose method calls become remote calls to `service`.
    pub fn proxy(&self, service: &RemoteService, destination: TypeDescriptor) -> ProxyFactory {
        let client = self.clone();
        let url = service.system().url().to_string();
        let service_name = service.service_name().to_string();
        ProxyFactory::new(destination, move |method, args| {
            client
                .call(&url, &service_name, method, args)
                .map(|result| result.unwrap_or(Node::Null))
                .map_err(|e| FactoryError::Handler(Box::new(e)))
        })
    }
}

impl fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteClient")
            .field("codec", &self.codec)
            .field("has_user_token", &self.user_token.is_some())
            .finish()
    }
}
