//! Dense enumeration of object identifiers.
//!
//! [`IdMapping`] is a bijection between the textual identifiers found in a column and
//! the integers `0..N`, assigned in order of first appearance. It keeps the forward
//! direction in a hash map and the reverse direction in a vector indexed by the
//! assigned integer, so that iteration always follows the assignment order.
use std::collections::HashMap;
use std::io::Write;

use ahash::RandomState;
use camino::Utf8Path;

use crate::mops_errors::MopsError;

#[derive(Debug, Clone, Default)]
pub struct IdMapping {
    forward: HashMap<String, u32, RandomState>,
    reverse: Vec<String>,
}

impl IdMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the integer assigned to `original`, assigning the next free one if the
    /// value was never seen before.
    pub fn assign(&mut self, original: &str) -> u32 {
        if let Some(&id) = self.forward.get(original) {
            return id;
        }
        let id = self.reverse.len() as u32;
        self.forward.insert(original.to_string(), id);
        self.reverse.push(original.to_string());
        id
    }

    pub fn get(&self, original: &str) -> Option<u32> {
        self.forward.get(original).copied()
    }

    pub fn original(&self, id: u32) -> Option<&str> {
        self.reverse.get(id as usize).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.reverse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reverse.is_empty()
    }

    /// Pairs `(original, assigned)` in assignment order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.reverse
            .iter()
            .enumerate()
            .map(|(i, s)| (s.as_str(), i as u32))
    }

    /// Write one `<original> <assigned>` line per distinct value.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for (original, id) in self.iter() {
            writeln!(writer, "{original} {id}")?;
        }
        Ok(())
    }

    pub fn write(&self, path: &Utf8Path) -> Result<(), MopsError> {
        let mut file = std::io::BufWriter::new(std::fs::File::create(path)?);
        self.write_to(&mut file)?;
        file.flush()?;
        Ok(())
    }
}
