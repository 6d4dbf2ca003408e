use std::collections::HashMap;

/// Marker returned in place of a field that does not exist.
pub const ABSENT_FIELD: &[u8] = b"-1";

/// Map value container (field -> value). Fields and values are raw bytes.
#[derive(Debug, Clone, Default)]
pub struct MapValue {
    data: HashMap<Vec<u8>, Vec<u8>>,
}

impl MapValue {
    pub fn new() -> Self {
        MapValue {
            data: HashMap::new(),
        }
    }

    /// Upsert a flat `field, value, field, value, ...` sequence.
    /// Pairs with an empty field name are skipped. A trailing unpaired
    /// element is ignored. Returns how many fields did not exist before.
    pub fn set(&mut self, pairs: &[Vec<u8>]) -> usize {
        let mut new_fields = 0;
        for pair in pairs.chunks_exact(2) {
            let (field, value) = (&pair[0], &pair[1]);
            if field.is_empty() {
                continue;
            }
            if self.data.insert(field.clone(), value.clone()).is_none() {
                new_fields += 1;
            }
        }
        new_fields
    }

    /// With no fields, every pair flattened as `field, value, ...` in
    /// unspecified order. Otherwise one entry per requested field, with
    /// `ABSENT_FIELD` for missing ones; empty field names are dropped.
    pub fn get(&self, fields: &[Vec<u8>]) -> Vec<Vec<u8>> {
        if fields.is_empty() {
            return self.get_all();
        }

        fields
            .iter()
            .filter_map(|field| match self.data.get(field) {
                Some(v) => Some(v.clone()),
                None if field.is_empty() => None,
                None => Some(ABSENT_FIELD.to_vec()),
            })
            .collect()
    }

    fn get_all(&self) -> Vec<Vec<u8>> {
        let mut out = Vec::with_capacity(self.data.len() * 2);
        for (field, value) in &self.data {
            out.push(field.clone());
            out.push(value.clone());
        }
        out
    }
}
