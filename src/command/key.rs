use crate::command::{Command, wrong_arg_count};
use crate::connection::ClientState;
use crate::resp::ValueNode;
use crate::store::ShardedStore;
use tracing::debug;

/// DEL key [key ...]. Always answers `:1`, whether or not anything existed.
pub fn cmd_del(cmd: &Command, store: &ShardedStore, client: &mut ClientState) -> ValueNode {
    if cmd.key().is_empty() {
        return wrong_arg_count("del");
    }

    let mut removed = 0;
    for key in cmd.all_args() {
        match store.delete(key) {
            Ok(true) => removed += 1,
            Ok(false) => {}
            Err(e) => return e.to_resp_error(),
        }
    }
    debug!("client {} removed {removed} key(s)", client.id);

    ValueNode::integer(1)
}
