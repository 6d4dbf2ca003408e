use crate::command::{Command, wrong_arg_count};
use crate::connection::{ClientState, RESP2, RESP3};
use crate::resp::ValueNode;
use crate::store::ShardedStore;

pub const SERVER_NAME: &str = "shardis";

pub fn cmd_ping(cmd: &Command, _store: &ShardedStore, _client: &mut ClientState) -> ValueNode {
    match cmd.all_args() {
        [] => ValueNode::simple_string("PONG"),
        [msg] => ValueNode::bulk_string(msg.clone()),
        _ => wrong_arg_count("ping"),
    }
}

/// HELLO [protover]. Switches the connection's protocol version and
/// describes the server.
pub fn cmd_hello(cmd: &Command, _store: &ShardedStore, client: &mut ClientState) -> ValueNode {
    if !cmd.args().is_empty() {
        return wrong_arg_count("hello");
    }

    let proto = match cmd.key() {
        b"" => client.proto,
        b"2" => RESP2,
        b"3" => RESP3,
        _ => return ValueNode::error("NOPROTO unsupported protocol version"),
    };
    client.proto = proto;

    let info = [
        ("server", SERVER_NAME.to_string()),
        ("version", env!("CARGO_PKG_VERSION").to_string()),
        ("proto", proto.to_string()),
        ("id", client.id.to_string()),
        ("mode", "standalone".to_string()),
        ("role", "master".to_string()),
    ];

    if proto == RESP3 {
        ValueNode::map(
            info.into_iter()
                .map(|(k, v)| (ValueNode::bulk_string(k), ValueNode::bulk_string(v)))
                .collect(),
        )
    } else {
        ValueNode::array(
            info.into_iter()
                .flat_map(|(k, v)| [ValueNode::bulk_string(k), ValueNode::bulk_string(v)])
                .collect(),
        )
    }
}
