use bytes::{Buf, BytesMut};

/// Value that handlers and storage use to mean "nothing here".
pub const NIL_SENTINEL: &[u8] = b"-1";

/// Largest bulk payload accepted from a client (512 MiB).
const MAX_BULK_LEN: i64 = 512 * 1024 * 1024;
/// Largest aggregate (array or map) accepted from a client.
const MAX_AGGREGATE_LEN: i64 = 1024 * 1024;
/// Declared aggregate lengths are not trusted for allocation past this.
const PREALLOC_LIMIT: usize = 1024;

/// A protocol frame.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueNode {
    /// +OK\r\n
    SimpleString(String),
    /// -ERR message\r\n
    SimpleError(String),
    /// :1000\r\n, kept as text and validated when written.
    Integer(String),
    /// $6\r\nfoobar\r\n  or  $-1\r\n (nil)
    BulkString(Option<Vec<u8>>),
    /// *2\r\n...
    Array(Vec<ValueNode>),
    /// %2\r\n... (protocol 3). Each pair is written key first.
    Map(Vec<(ValueNode, ValueNode)>),
}

impl ValueNode {
    pub fn ok() -> Self {
        ValueNode::SimpleString("OK".to_string())
    }

    pub fn simple_string(s: impl Into<String>) -> Self {
        ValueNode::SimpleString(s.into())
    }

    pub fn error(s: impl Into<String>) -> Self {
        ValueNode::SimpleError(s.into())
    }

    pub fn integer(n: impl ToString) -> Self {
        ValueNode::Integer(n.to_string())
    }

    /// A bulk string carrying exactly `s`.
    pub fn bulk_string(s: impl Into<Vec<u8>>) -> Self {
        ValueNode::BulkString(Some(s.into()))
    }

    /// A bulk reply built from a stored value: the `NIL_SENTINEL` becomes nil.
    pub fn bulk(s: impl Into<Vec<u8>>) -> Self {
        let s = s.into();
        if s == NIL_SENTINEL {
            ValueNode::BulkString(None)
        } else {
            ValueNode::BulkString(Some(s))
        }
    }

    pub fn nil() -> Self {
        ValueNode::BulkString(None)
    }

    pub fn array(items: Vec<ValueNode>) -> Self {
        ValueNode::Array(items)
    }

    pub fn map(pairs: Vec<(ValueNode, ValueNode)>) -> Self {
        ValueNode::Map(pairs)
    }

    /// Serialize this value to wire bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.write_to(&mut buf);
        buf
    }

    /// Append wire bytes to `buf`.
    pub fn write_to(&self, buf: &mut Vec<u8>) {
        match self {
            ValueNode::SimpleString(s) => {
                buf.push(b'+');
                buf.extend_from_slice(s.as_bytes());
                buf.extend_from_slice(b"\r\n");
            }
            ValueNode::SimpleError(s) => {
                buf.push(b'-');
                buf.extend_from_slice(s.as_bytes());
                buf.extend_from_slice(b"\r\n");
            }
            ValueNode::Integer(text) => match text.parse::<i64>() {
                Ok(n) => {
                    buf.push(b':');
                    buf.extend_from_slice(n.to_string().as_bytes());
                    buf.extend_from_slice(b"\r\n");
                }
                Err(_) => {
                    buf.extend_from_slice(b"-ERR value is not an integer or out of range\r\n");
                }
            },
            ValueNode::BulkString(None) => {
                buf.extend_from_slice(b"$-1\r\n");
            }
            ValueNode::BulkString(Some(data)) => {
                buf.push(b'$');
                buf.extend_from_slice(data.len().to_string().as_bytes());
                buf.extend_from_slice(b"\r\n");
                buf.extend_from_slice(data);
                buf.extend_from_slice(b"\r\n");
            }
            ValueNode::Array(items) => {
                buf.push(b'*');
                buf.extend_from_slice(items.len().to_string().as_bytes());
                buf.extend_from_slice(b"\r\n");
                for item in items {
                    item.write_to(buf);
                }
            }
            ValueNode::Map(pairs) => {
                buf.push(b'%');
                buf.extend_from_slice(pairs.len().to_string().as_bytes());
                buf.extend_from_slice(b"\r\n");
                for (key, value) in pairs {
                    key.write_to(buf);
                    value.write_to(buf);
                }
            }
        }
    }

    /// Raw payload of a bulk or simple string.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ValueNode::BulkString(Some(data)) => Some(data),
            ValueNode::SimpleString(s) => Some(s.as_bytes()),
            _ => None,
        }
    }

    /// One-character wire prefix of this frame type.
    pub fn prefix(&self) -> char {
        match self {
            ValueNode::SimpleString(_) => '+',
            ValueNode::SimpleError(_) => '-',
            ValueNode::Integer(_) => ':',
            ValueNode::BulkString(_) => '$',
            ValueNode::Array(_) => '*',
            ValueNode::Map(_) => '%',
        }
    }
}

/// Incremental frame decoder.
///
/// Call `parse()` each time more bytes arrive. Returns `Ok(Some(value))`
/// once a complete frame is buffered (and consumes it), `Ok(None)` when
/// more data is needed (and consumes nothing).
pub struct RespParser;

impl RespParser {
    pub fn parse(buf: &mut BytesMut) -> Result<Option<ValueNode>, RespError> {
        // Tolerate stray line endings between frames.
        let stray = buf
            .iter()
            .take_while(|b| **b == b'\r' || **b == b'\n')
            .count();
        buf.advance(stray);

        if buf.is_empty() {
            return Ok(None);
        }

        match Self::parse_value(&buf[..], 0)? {
            Some((value, consumed)) => {
                buf.advance(consumed);
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    /// Decode the frame starting at `pos`. On success returns the frame and
    /// the position just past it.
    fn parse_value(buf: &[u8], pos: usize) -> Result<Option<(ValueNode, usize)>, RespError> {
        let Some(&prefix) = buf.get(pos) else {
            return Ok(None);
        };

        match prefix {
            b'+' => Ok(read_line(buf, pos).map(|(s, next)| (ValueNode::SimpleString(s), next))),
            b'-' => Ok(read_line(buf, pos).map(|(s, next)| (ValueNode::SimpleError(s), next))),
            b':' => Self::parse_integer(buf, pos),
            b'$' => Self::parse_bulk_string(buf, pos),
            b'*' => Self::parse_array(buf, pos),
            b'%' => Self::parse_map(buf, pos),
            other => Err(RespError::InvalidByte(other)),
        }
    }

    fn parse_integer(buf: &[u8], pos: usize) -> Result<Option<(ValueNode, usize)>, RespError> {
        let Some((text, next)) = read_line(buf, pos) else {
            return Ok(None);
        };
        if text.parse::<i64>().is_err() {
            return Err(RespError::InvalidData(format!("Invalid integer: {text}")));
        }
        Ok(Some((ValueNode::Integer(text), next)))
    }

    fn parse_bulk_string(buf: &[u8], pos: usize) -> Result<Option<(ValueNode, usize)>, RespError> {
        let Some((len, start)) = read_length(buf, pos, "invalid bulk length")? else {
            return Ok(None);
        };

        if len == -1 {
            return Ok(Some((ValueNode::BulkString(None), start)));
        }
        if !(0..=MAX_BULK_LEN).contains(&len) {
            return Err(RespError::InvalidData("invalid bulk length".into()));
        }

        let len = len as usize;
        let end = start + len;
        if buf.len() < end + 2 {
            return Ok(None);
        }
        if &buf[end..end + 2] != b"\r\n" {
            return Err(RespError::InvalidData(
                "Missing trailing CRLF after bulk string".into(),
            ));
        }

        Ok(Some((ValueNode::BulkString(Some(buf[start..end].to_vec())), end + 2)))
    }

    fn parse_array(buf: &[u8], pos: usize) -> Result<Option<(ValueNode, usize)>, RespError> {
        let Some((len, mut cursor)) = read_length(buf, pos, "invalid multibulk length")? else {
            return Ok(None);
        };
        if !(0..=MAX_AGGREGATE_LEN).contains(&len) {
            return Err(RespError::InvalidData("invalid multibulk length".into()));
        }

        let mut items = Vec::with_capacity((len as usize).min(PREALLOC_LIMIT));
        for _ in 0..len {
            match Self::parse_value(buf, cursor)? {
                Some((item, next)) => {
                    items.push(item);
                    cursor = next;
                }
                None => return Ok(None),
            }
        }

        Ok(Some((ValueNode::Array(items), cursor)))
    }

    fn parse_map(buf: &[u8], pos: usize) -> Result<Option<(ValueNode, usize)>, RespError> {
        let Some((len, mut cursor)) = read_length(buf, pos, "invalid map length")? else {
            return Ok(None);
        };
        if !(0..=MAX_AGGREGATE_LEN).contains(&len) {
            return Err(RespError::InvalidData("invalid map length".into()));
        }

        let mut pairs = Vec::with_capacity((len as usize).min(PREALLOC_LIMIT));
        for _ in 0..len {
            let Some((key, next)) = Self::parse_value(buf, cursor)? else {
                return Ok(None);
            };
            let Some((value, next)) = Self::parse_value(buf, next)? else {
                return Ok(None);
            };
            pairs.push((key, value));
            cursor = next;
        }

        Ok(Some((ValueNode::Map(pairs), cursor)))
    }
}

/// Read the line after the prefix byte at `pos`. Returns the text and the
/// position after its CRLF.
fn read_line(buf: &[u8], pos: usize) -> Option<(String, usize)> {
    let end = find_crlf_from(buf, pos + 1)?;
    let s = String::from_utf8_lossy(&buf[pos + 1..end]).into_owned();
    Some((s, end + 2))
}

/// Read a decimal length header of any width.
fn read_length(buf: &[u8], pos: usize, what: &str) -> Result<Option<(i64, usize)>, RespError> {
    let Some(end) = find_crlf_from(buf, pos + 1) else {
        return Ok(None);
    };
    let len = std::str::from_utf8(&buf[pos + 1..end])
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| RespError::InvalidData(what.to_string()))?;
    Ok(Some((len, end + 2)))
}

/// Find \r\n starting from the given position.
fn find_crlf_from(buf: &[u8], start: usize) -> Option<usize> {
    if buf.len() < start + 2 {
        return None;
    }
    (start..buf.len() - 1).find(|&i| buf[i] == b'\r' && buf[i + 1] == b'\n')
}

#[derive(Debug, thiserror::Error)]
pub enum RespError {
    #[error("unexpected type prefix '{}'", *.0 as char)]
    InvalidByte(u8),

    #[error("Invalid data: {0}")]
    InvalidData(String),
}
