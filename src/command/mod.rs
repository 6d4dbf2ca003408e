pub mod hash;
pub mod key;
pub mod server_cmd;
pub mod string;

use crate::connection::ClientState;
use crate::error::ShardisError;
use crate::resp::ValueNode;
use crate::store::ShardedStore;
use std::collections::HashMap;
use tracing::debug;

/// A decoded request: lower-cased name, raw positional arguments and the
/// protocol version negotiated on the connection that sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    name: String,
    args: Vec<Vec<u8>>,
    proto: u8,
}

impl Command {
    pub fn new(name: &str, args: Vec<Vec<u8>>, proto: u8) -> Self {
        Command {
            name: name.to_lowercase(),
            args,
            proto,
        }
    }

    /// Build a command from a request frame, which must be a non-empty
    /// array of bulk strings. On failure returns the error reply to send.
    pub fn from_frame(frame: ValueNode, proto: u8) -> Result<Self, ValueNode> {
        let items = match frame {
            ValueNode::Array(items) => items,
            other => {
                return Err(ValueNode::error(format!(
                    "ERR expected '*' at the beginning, got '{}'",
                    other.prefix()
                )));
            }
        };

        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            match item {
                ValueNode::BulkString(Some(s)) => parts.push(s),
                other => {
                    return Err(ValueNode::error(format!(
                        "ERR expected '$' at the beginning, got '{}'",
                        other.prefix()
                    )));
                }
            }
        }

        if parts.is_empty() {
            return Err(ValueNode::error("ERR empty command"));
        }
        let name = parts.remove(0);
        Ok(Command::new(&String::from_utf8_lossy(&name), parts, proto))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Argument 0, or empty when there are no arguments.
    pub fn key(&self) -> &[u8] {
        self.args.first().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every argument after the key.
    pub fn args(&self) -> &[Vec<u8>] {
        self.args.get(1..).unwrap_or(&[])
    }

    /// Every argument including the key.
    pub fn all_args(&self) -> &[Vec<u8>] {
        &self.args
    }

    pub fn proto(&self) -> u8 {
        self.proto
    }
}

pub type Handler = fn(&Command, &ShardedStore, &mut ClientState) -> ValueNode;

/// Name -> handler registry.
pub struct CommandRouter {
    handlers: HashMap<String, Handler>,
}

impl CommandRouter {
    pub fn new() -> Self {
        CommandRouter {
            handlers: HashMap::new(),
        }
    }

    /// Router with every built-in command registered.
    pub fn with_defaults() -> Self {
        let mut router = CommandRouter::new();

        // Connection
        router.register("ping", server_cmd::cmd_ping);
        router.register("hello", server_cmd::cmd_hello);

        // Strings
        router.register("get", string::cmd_get);
        router.register("set", string::cmd_set);

        // Keys
        router.register("del", key::cmd_del);

        // Hashes
        router.register("hget", hash::cmd_hget);
        router.register("hgetall", hash::cmd_hgetall);
        router.register("hset", hash::cmd_hset);
        router.register("hmget", hash::cmd_hmget);
        router.register("hmset", hash::cmd_hmset);

        router
    }

    pub fn register(&mut self, name: &str, handler: Handler) {
        self.handlers.insert(name.to_lowercase(), handler);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Run `cmd` through its handler.
    pub fn dispatch(&self, cmd: &Command, store: &ShardedStore, client: &mut ClientState) -> ValueNode {
        match self.handlers.get(cmd.name()) {
            Some(handler) => handler(cmd, store, client),
            None => {
                debug!("client {} sent unknown command '{}'", client.id, cmd.name());
                ShardisError::UnknownCommand(cmd.name().to_string()).to_resp_error()
            }
        }
    }
}

impl Default for CommandRouter {
    fn default() -> Self {
        CommandRouter::with_defaults()
    }
}

pub fn wrong_type_error() -> ValueNode {
    ShardisError::WrongType.to_resp_error()
}

pub fn wrong_arg_count(cmd: &str) -> ValueNode {
    ShardisError::WrongArgCount(cmd.to_string()).to_resp_error()
}
