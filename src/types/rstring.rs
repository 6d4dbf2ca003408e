/// String value container. Every write replaces the whole content. The
/// payload is raw bytes; nothing assumes it is UTF-8.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringValue {
    data: Vec<u8>,
}

impl StringValue {
    pub fn new(data: impl Into<Vec<u8>>) -> Self {
        StringValue { data: data.into() }
    }

    pub fn get(&self) -> &[u8] {
        &self.data
    }

    pub fn set(&mut self, data: &[u8]) {
        self.data.clear();
        self.data.extend_from_slice(data);
    }
}
