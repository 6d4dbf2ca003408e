use shardis::config::Config;
use shardis::server;
use shardis::store::ShardedStore;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = Config::load(&args);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(config.log_level().into()),
        )
        .init();

    let store = ShardedStore::new(config.block_count, config.node_count)
        .map_err(std::io::Error::other)?;
    info!(
        "Keyspace split into {} blocks over {} partitions",
        config.block_count, config.node_count
    );
    for partition in store.router().partitions() {
        let range = partition.range();
        info!("Partition {} owns blocks {}..={}", partition.id(), range.start, range.end);
    }

    let shutdown = CancellationToken::new();
    tokio::spawn(server::shutdown_signal(shutdown.clone()));

    server::run_server(config, Arc::new(store), shutdown).await
}
