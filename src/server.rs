use crate::command::{Command, CommandRouter};
use crate::config::Config;
use crate::connection::ClientState;
use crate::error::{ShardisError, ShardisResult};
use crate::resp::{RespParser, ValueNode};
use crate::store::SharedStore;
use bytes::BytesMut;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub async fn run_server(
    config: Config,
    store: SharedStore,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Shardis server listening on {addr}");

    let router = Arc::new(CommandRouter::with_defaults());
    serve(listener, store, router, config.read_buffer_size, shutdown).await
}

/// Accept connections on `listener` until `shutdown` is cancelled. Open
/// connections are left to finish on their own.
pub async fn serve(
    listener: TcpListener,
    store: SharedStore,
    router: Arc<CommandRouter>,
    read_buffer_size: usize,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    loop {
        tokio::select! {
            result = listener.accept() => {
                let (stream, peer_addr) = match result {
                    Ok(accepted) => accepted,
                    Err(e) => {
                        warn!("Failed to accept connection: {e}");
                        continue;
                    }
                };
                debug!("New connection from {peer_addr}");

                let store = store.clone();
                let router = router.clone();

                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, store, router, read_buffer_size).await {
                        debug!("Connection error from {peer_addr}: {e}");
                    }
                    debug!("Connection closed: {peer_addr}");
                });
            }
            _ = shutdown.cancelled() => {
                info!("Shutting down...");
                return Ok(());
            }
        }
    }
}

async fn handle_connection(
    mut stream: TcpStream,
    store: SharedStore,
    router: Arc<CommandRouter>,
    read_buffer_size: usize,
) -> ShardisResult<()> {
    let mut client = ClientState::new();
    let mut buf = BytesMut::with_capacity(read_buffer_size);
    let mut out = Vec::new();

    loop {
        buf.reserve(read_buffer_size);
        if stream.read_buf(&mut buf).await? == 0 {
            return Ok(());
        }

        // Answer every complete frame in the buffer, then flush once.
        let mut close = false;
        loop {
            match RespParser::parse(&mut buf) {
                Ok(Some(frame)) => {
                    process_frame(frame, &store, &router, &mut client).write_to(&mut out);
                }
                Ok(None) => break,
                Err(e) => {
                    debug!("client {} sent undecodable data: {e}", client.id);
                    ShardisError::Protocol(e.to_string())
                        .to_resp_error()
                        .write_to(&mut out);
                    close = true;
                    break;
                }
            }
        }

        if !out.is_empty() {
            stream.write_all(&out).await?;
            out.clear();
        }
        if close {
            return Ok(());
        }
    }
}

fn process_frame(
    frame: ValueNode,
    store: &SharedStore,
    router: &CommandRouter,
    client: &mut ClientState,
) -> ValueNode {
    match Command::from_frame(frame, client.proto) {
        Ok(cmd) => router.dispatch(&cmd, store, client),
        Err(reply) => reply,
    }
}

/// Cancel `token` on Ctrl-C or SIGTERM.
pub async fn shutdown_signal(token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
    token.cancel();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ShardedStore;

    fn request(parts: &[&str]) -> ValueNode {
        ValueNode::array(parts.iter().map(|p| ValueNode::bulk_string(*p)).collect())
    }

    #[test]
    fn test_process_frame_dispatches() {
        let store: SharedStore = Arc::new(ShardedStore::default());
        let router = CommandRouter::with_defaults();
        let mut client = ClientState::new();

        assert_eq!(
            process_frame(request(&["SET", "x", "5"]), &store, &router, &mut client),
            ValueNode::ok()
        );
        assert_eq!(
            process_frame(request(&["get", "x"]), &store, &router, &mut client),
            ValueNode::bulk_string("5")
        );
    }

    #[test]
    fn test_process_frame_rejects_non_array() {
        let store: SharedStore = Arc::new(ShardedStore::default());
        let router = CommandRouter::with_defaults();
        let mut client = ClientState::new();

        let reply = process_frame(ValueNode::simple_string("PING"), &store, &router, &mut client);
        assert_eq!(reply, ValueNode::error("ERR expected '*' at the beginning, got '+'"));
    }

    #[test]
    fn test_process_frame_uses_negotiated_protocol() {
        let store: SharedStore = Arc::new(ShardedStore::default());
        let router = CommandRouter::with_defaults();
        let mut client = ClientState::new();

        process_frame(request(&["hset", "h", "f", "v"]), &store, &router, &mut client);
        process_frame(request(&["hello", "3"]), &store, &router, &mut client);
        let reply = process_frame(request(&["hgetall", "h"]), &store, &router, &mut client);
        assert_eq!(reply.serialize(), b"%1\r\n$1\r\nf\r\n$1\r\nv\r\n");
    }

    #[tokio::test]
    async fn test_serve_stops_on_cancel() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let token = CancellationToken::new();
        let handle = tokio::spawn(serve(
            listener,
            Arc::new(ShardedStore::default()),
            Arc::new(CommandRouter::with_defaults()),
            4096,
            token.clone(),
        ));
        token.cancel();
        assert!(handle.await.unwrap().is_ok());
    }
}
