use redis::Commands;
use shardis::command::CommandRouter;
use shardis::store::ShardedStore;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

async fn start_server(blocks: u32, nodes: u32) -> (u16, CancellationToken) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let store = Arc::new(ShardedStore::new(blocks, nodes).unwrap());
    let token = CancellationToken::new();

    tokio::spawn(shardis::server::serve(
        listener,
        store,
        Arc::new(CommandRouter::with_defaults()),
        4096,
        token.clone(),
    ));
    (port, token)
}

fn get_client(port: u16) -> redis::Connection {
    let client = redis::Client::open(format!("redis://127.0.0.1:{port}/")).unwrap();
    client.get_connection().unwrap()
}

fn ops_per_sec(iterations: usize, start: Instant) -> f64 {
    iterations as f64 / start.elapsed().as_secs_f64()
}

fn bench_set_get(conn: &mut redis::Connection, iterations: usize) -> (f64, f64) {
    let start = Instant::now();
    for i in 0..iterations {
        let _: () = conn.set(format!("bench_key_{i}"), format!("value_{i}")).unwrap();
    }
    let set_ops = ops_per_sec(iterations, start);

    let start = Instant::now();
    for i in 0..iterations {
        let _: String = conn.get(format!("bench_key_{i}")).unwrap();
    }
    (set_ops, ops_per_sec(iterations, start))
}

fn bench_hset_hmget(conn: &mut redis::Connection, iterations: usize) -> (f64, f64) {
    let start = Instant::now();
    for i in 0..iterations {
        let _: i64 = conn
            .hset(format!("bench_hash_{}", i % 100), format!("field_{i}"), format!("value_{i}"))
            .unwrap();
    }
    let hset_ops = ops_per_sec(iterations, start);

    let start = Instant::now();
    for i in 0..iterations {
        let _: Vec<Option<String>> = redis::cmd("HMGET")
            .arg(format!("bench_hash_{}", i % 100))
            .arg(format!("field_{i}"))
            .arg("missing")
            .query(conn)
            .unwrap();
    }
    (hset_ops, ops_per_sec(iterations, start))
}

fn bench_pipeline(conn: &mut redis::Connection, iterations: usize) -> f64 {
    let batch_size = 100;
    let start = Instant::now();
    for batch in 0..(iterations / batch_size) {
        let mut pipe = redis::pipe();
        for i in 0..batch_size {
            pipe.set(format!("pipe_key_{batch}_{i}"), "value").ignore();
        }
        let _: () = pipe.query(conn).unwrap();
    }
    ops_per_sec(iterations, start)
}

/// Several clients hammering disjoint keys at once.
fn bench_parallel(port: u16, clients: usize, iterations: usize) -> f64 {
    let start = Instant::now();
    let handles: Vec<_> = (0..clients)
        .map(|c| {
            std::thread::spawn(move || {
                let mut conn = get_client(port);
                for i in 0..iterations {
                    let _: () = conn.set(format!("par_{c}_{i}"), i).unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
    ops_per_sec(clients * iterations, start)
}

#[tokio::main]
async fn main() {
    let iterations = 10_000;

    for (blocks, nodes) in [(20, 10), (1024, 16)] {
        let (port, token) = start_server(blocks, nodes).await;

        tokio::task::spawn_blocking(move || {
            let mut conn = get_client(port);

            println!("=== Shardis Benchmark ({iterations} operations, {blocks} blocks / {nodes} partitions) ===\n");

            let (set_ops, get_ops) = bench_set_get(&mut conn, iterations);
            println!("SET:    {set_ops:>10.0} ops/sec");
            println!("GET:    {get_ops:>10.0} ops/sec");

            let (hset_ops, hmget_ops) = bench_hset_hmget(&mut conn, iterations);
            println!("HSET:   {hset_ops:>10.0} ops/sec");
            println!("HMGET:  {hmget_ops:>10.0} ops/sec");

            let pipe_ops = bench_pipeline(&mut conn, iterations);
            println!("PIPE:   {pipe_ops:>10.0} ops/sec (100-cmd pipeline batches)");

            let par_ops = bench_parallel(port, 8, iterations / 8);
            println!("PAR:    {par_ops:>10.0} ops/sec (8 clients)");

            println!();
        })
        .await
        .unwrap();

        token.cancel();
    }

    println!("=== Done ===");
}
