use crate::command::{Command, wrong_arg_count};
use crate::connection::ClientState;
use crate::resp::ValueNode;
use crate::store::ShardedStore;
use crate::types::Update;

pub fn cmd_get(cmd: &Command, store: &ShardedStore, _client: &mut ClientState) -> ValueNode {
    if cmd.key().is_empty() || !cmd.args().is_empty() {
        return wrong_arg_count("get");
    }

    match store.get_string(cmd.key()) {
        Ok(Some(value)) => ValueNode::bulk_string(value),
        Ok(None) => ValueNode::nil(),
        Err(e) => e.to_resp_error(),
    }
}

pub fn cmd_set(cmd: &Command, store: &ShardedStore, _client: &mut ClientState) -> ValueNode {
    if cmd.key().is_empty() || cmd.args().len() != 1 {
        return wrong_arg_count("set");
    }

    match store.set(cmd.key(), Update::String(&cmd.args()[0])) {
        Ok(_) => ValueNode::ok(),
        Err(e) => e.to_resp_error(),
    }
}
