use crate::resp::ValueNode;

#[derive(Debug, thiserror::Error)]
pub enum ShardisError {
    #[error("WRONGTYPE Operation against a key holding the wrong kind of value")]
    WrongType,

    #[error("ERR wrong number of arguments for '{0}' command")]
    WrongArgCount(String),

    #[error("ERR unknown command '{0}'")]
    UnknownCommand(String),

    #[error("ERR no partition covers block {0}")]
    Routing(u32),

    #[error("ERR invalid partitioning: {0}")]
    InvalidTopology(String),

    #[error("ERR Protocol error: {0}")]
    Protocol(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ShardisError {
    /// Render this error as the SimpleError frame sent to clients.
    pub fn to_resp_error(&self) -> ValueNode {
        ValueNode::error(self.to_string())
    }
}

pub type ShardisResult<T> = Result<T, ShardisError>;
