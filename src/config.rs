use crate::store::{DEFAULT_BLOCK_COUNT, DEFAULT_NODE_COUNT};
use tracing::Level;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub bind: String,
    pub port: u16,
    /// Total number of hash blocks the keyspace is divided into.
    pub block_count: u32,
    /// Number of partitions the blocks are spread over.
    pub node_count: u32,
    /// Bytes reserved for each socket read.
    pub read_buffer_size: usize,
    pub loglevel: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            bind: "0.0.0.0".to_string(),
            port: 6379,
            block_count: DEFAULT_BLOCK_COUNT,
            node_count: DEFAULT_NODE_COUNT,
            read_buffer_size: 4096,
            loglevel: "info".to_string(),
        }
    }
}

impl Config {
    /// Defaults, overridden by the environment, overridden by flags.
    pub fn load(args: &[String]) -> Self {
        let mut config = Config::default();
        config.apply_env(|name| std::env::var(name).ok());
        config.apply_args(args);
        config
    }

    pub fn from_args(args: &[String]) -> Self {
        let mut config = Config::default();
        config.apply_args(args);
        config
    }

    /// Reads PORT, HOST, BLOCK_COUNT, NODE_COUNT and LOG_LEVEL. Values that
    /// fail to parse are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(p) = lookup("PORT").and_then(|v| v.parse().ok()) {
            self.port = p;
        }
        if let Some(host) = lookup("HOST").filter(|v| !v.is_empty()) {
            self.bind = host;
        }
        if let Some(b) = lookup("BLOCK_COUNT").and_then(|v| v.parse().ok()) {
            self.block_count = b;
        }
        if let Some(n) = lookup("NODE_COUNT").and_then(|v| v.parse().ok()) {
            self.node_count = n;
        }
        if let Some(level) = lookup("LOG_LEVEL").filter(|v| !v.is_empty()) {
            self.loglevel = level;
        }
    }

    pub fn apply_args(&mut self, args: &[String]) {
        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--port" => {
                    if i + 1 < args.len() {
                        if let Ok(p) = args[i + 1].parse() {
                            self.port = p;
                        }
                        i += 1;
                    }
                }
                "--bind" => {
                    if i + 1 < args.len() {
                        self.bind = args[i + 1].clone();
                        i += 1;
                    }
                }
                "--blocks" => {
                    if i + 1 < args.len() {
                        if let Ok(b) = args[i + 1].parse() {
                            self.block_count = b;
                        }
                        i += 1;
                    }
                }
                "--nodes" => {
                    if i + 1 < args.len() {
                        if let Ok(n) = args[i + 1].parse() {
                            self.node_count = n;
                        }
                        i += 1;
                    }
                }
                "--read-buffer" => {
                    if i + 1 < args.len() {
                        if let Ok(size) = args[i + 1].parse::<usize>() {
                            self.read_buffer_size = size.max(1);
                        }
                        i += 1;
                    }
                }
                "--loglevel" => {
                    if i + 1 < args.len() {
                        self.loglevel = args[i + 1].clone();
                        i += 1;
                    }
                }
                _ => {}
            }
            i += 1;
        }
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    /// Unknown names fall back to INFO.
    pub fn log_level(&self) -> Level {
        match self.loglevel.to_ascii_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" | "verbose" => Level::DEBUG,
            "warn" | "warning" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}
