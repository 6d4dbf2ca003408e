use bytes::BytesMut;
use std::io::{self, BufRead, Write};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

use shardis::resp::{RespParser, ValueNode};

#[tokio::main]
async fn main() -> io::Result<()> {
    let mut host = "127.0.0.1".to_string();
    let mut port = 6379u16;
    let mut resp3 = false;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--host" | "-h" => {
                if i + 1 < args.len() {
                    host = args[i + 1].clone();
                    i += 1;
                }
            }
            "--port" | "-p" => {
                if i + 1 < args.len() {
                    if let Ok(p) = args[i + 1].parse() {
                        port = p;
                    }
                    i += 1;
                }
            }
            "-3" => resp3 = true,
            _ => {}
        }
        i += 1;
    }

    let addr = format!("{host}:{port}");
    let mut conn = Connection {
        stream: TcpStream::connect(&addr).await?,
        buf: BytesMut::with_capacity(4096),
    };
    eprintln!("Connected to {addr}");

    if resp3 {
        match conn.call(&["HELLO".to_string(), "3".to_string()]).await? {
            Some(ValueNode::SimpleError(e)) => eprintln!("HELLO 3 refused: {e}"),
            Some(_) => {}
            None => return Ok(()),
        }
    }

    let stdin = io::stdin();
    let mut reader = stdin.lock();

    loop {
        print!("shardis> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if reader.read_line(&mut line)? == 0 {
            break;
        }

        let tokens = match split_line(line.trim()) {
            Ok(tokens) => tokens,
            Err(e) => {
                eprintln!("(error) {e}");
                continue;
            }
        };
        if tokens.is_empty() {
            continue;
        }
        let quit = tokens[0].eq_ignore_ascii_case("quit");

        match conn.call(&tokens).await? {
            Some(reply) => print_reply(&reply, 0),
            None => {
                eprintln!("Connection closed by server");
                return Ok(());
            }
        }

        if quit {
            break;
        }
    }

    Ok(())
}

struct Connection {
    stream: TcpStream,
    buf: BytesMut,
}

impl Connection {
    /// Send one request and wait for its reply. `None` means the server hung up.
    async fn call(&mut self, tokens: &[String]) -> io::Result<Option<ValueNode>> {
        let request = ValueNode::array(tokens.iter().map(|t| ValueNode::bulk_string(t.clone())).collect());
        self.stream.write_all(&request.serialize()).await?;

        loop {
            match RespParser::parse(&mut self.buf) {
                Ok(Some(reply)) => return Ok(Some(reply)),
                Ok(None) => {}
                Err(e) => return Err(io::Error::new(io::ErrorKind::InvalidData, e.to_string())),
            }
            if self.stream.read_buf(&mut self.buf).await? == 0 {
                return Ok(None);
            }
        }
    }
}

/// Split on whitespace, keeping double-quoted runs together.
fn split_line(line: &str) -> Result<Vec<String>, &'static str> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut started = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                started = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if started {
                    tokens.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            c => {
                current.push(c);
                started = true;
            }
        }
    }

    if in_quotes {
        return Err("unbalanced quotes");
    }
    if started {
        tokens.push(current);
    }
    Ok(tokens)
}

fn print_reply(value: &ValueNode, indent: usize) {
    let pad = " ".repeat(indent);
    match value {
        ValueNode::SimpleString(s) => println!("{s}"),
        ValueNode::SimpleError(s) => println!("(error) {s}"),
        ValueNode::Integer(n) => println!("(integer) {n}"),
        ValueNode::BulkString(None) => println!("(nil)"),
        ValueNode::BulkString(Some(data)) => println!("\"{}\"", String::from_utf8_lossy(data)),
        ValueNode::Array(items) if items.is_empty() => println!("(empty array)"),
        ValueNode::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    print!("{pad}");
                }
                print!("{}) ", i + 1);
                print_reply(item, indent + 3);
            }
        }
        ValueNode::Map(pairs) if pairs.is_empty() => println!("(empty hash)"),
        ValueNode::Map(pairs) => {
            for (i, (k, v)) in pairs.iter().enumerate() {
                if i > 0 {
                    print!("{pad}");
                }
                print!("{}# ", i + 1);
                match k.as_bytes() {
                    Some(key) => print!("\"{}\" => ", String::from_utf8_lossy(key)),
                    None => print!("{k:?} => "),
                }
                print_reply(v, indent + 3);
            }
        }
    }
}
