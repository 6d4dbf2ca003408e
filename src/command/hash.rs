use crate::command::{Command, wrong_arg_count};
use crate::connection::{ClientState, RESP3};
use crate::resp::ValueNode;
use crate::store::ShardedStore;
use crate::types::Update;

/// Shared validation for HSET/HMSET: a key plus a non-empty, even run of
/// field/value pairs.
fn valid_pairs(cmd: &Command) -> bool {
    !cmd.key().is_empty() && !cmd.args().is_empty() && cmd.args().len() % 2 == 0
}

pub fn cmd_hset(cmd: &Command, store: &ShardedStore, _client: &mut ClientState) -> ValueNode {
    if !valid_pairs(cmd) {
        return wrong_arg_count("hset");
    }

    match store.set(cmd.key(), Update::Map(cmd.args())) {
        Ok(new_fields) => ValueNode::integer(new_fields),
        Err(e) => e.to_resp_error(),
    }
}

pub fn cmd_hmset(cmd: &Command, store: &ShardedStore, _client: &mut ClientState) -> ValueNode {
    if !valid_pairs(cmd) {
        return wrong_arg_count("hmset");
    }

    match store.set(cmd.key(), Update::Map(cmd.args())) {
        Ok(_) => ValueNode::ok(),
        Err(e) => e.to_resp_error(),
    }
}

pub fn cmd_hget(cmd: &Command, store: &ShardedStore, _client: &mut ClientState) -> ValueNode {
    if cmd.key().is_empty() || cmd.args().len() != 1 {
        return wrong_arg_count("hget");
    }

    match store.get_fields(cmd.key(), cmd.args()) {
        Ok(Some(values)) => match values.into_iter().next() {
            Some(v) => ValueNode::bulk(v),
            None => ValueNode::nil(),
        },
        Ok(None) => ValueNode::nil(),
        Err(e) => e.to_resp_error(),
    }
}

pub fn cmd_hmget(cmd: &Command, store: &ShardedStore, _client: &mut ClientState) -> ValueNode {
    if cmd.key().is_empty() || cmd.args().is_empty() {
        return wrong_arg_count("hmget");
    }

    match store.get_fields(cmd.key(), cmd.args()) {
        Ok(Some(values)) => ValueNode::array(values.into_iter().map(ValueNode::bulk).collect()),
        Ok(None) => ValueNode::array(
            cmd.args()
                .iter()
                .filter(|f| !f.is_empty())
                .map(|_| ValueNode::nil())
                .collect(),
        ),
        Err(e) => e.to_resp_error(),
    }
}

/// HGETALL key. Flat array under protocol 2, map under protocol 3.
pub fn cmd_hgetall(cmd: &Command, store: &ShardedStore, _client: &mut ClientState) -> ValueNode {
    if cmd.key().is_empty() || !cmd.args().is_empty() {
        return wrong_arg_count("hgetall");
    }

    let flat = match store.get_fields(cmd.key(), &[]) {
        Ok(Some(flat)) => flat,
        Ok(None) => Vec::new(),
        Err(e) => return e.to_resp_error(),
    };

    if cmd.proto() == RESP3 {
        let mut pairs = Vec::with_capacity(flat.len() / 2);
        let mut items = flat.into_iter();
        while let (Some(field), Some(value)) = (items.next(), items.next()) {
            pairs.push((ValueNode::bulk_string(field), ValueNode::bulk_string(value)));
        }
        ValueNode::map(pairs)
    } else {
        ValueNode::array(flat.into_iter().map(ValueNode::bulk_string).collect())
    }
}
