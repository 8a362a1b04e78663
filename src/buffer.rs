//===- buffer.rs ----------------------------------------------------------===//
//
// This file is dual licensed under the MIT and the University of Illinois Open
// Source Licenses. See LICENSE.TXT for details.
//
//===----------------------------------------------------------------------===//
//
// Declarations are assembled outward-in: a qualifier lands in front of a
// declarator, a class name in front of a member name. Buffer is the
// double-ended accumulator every production writes into.
//
//===----------------------------------------------------------------------===//

use std::collections::VecDeque;

use crate::Result;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Buffer {
    bytes: VecDeque<u8>,
}

impl Buffer {
    pub(crate) fn new() -> Buffer {
        Buffer::default()
    }

    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.bytes.clear();
    }

    pub(crate) fn append(&mut self, s: &[u8]) {
        self.bytes.extend(s.iter().copied());
    }

    pub(crate) fn appends(&mut self, other: &Buffer) {
        self.bytes.extend(other.bytes.iter().copied());
    }

    /// Appends a single space unless the buffer is still empty.
    pub(crate) fn append_blank(&mut self) {
        if !self.is_empty() {
            self.bytes.push_back(b' ');
        }
    }

    pub(crate) fn prepend(&mut self, s: &[u8]) {
        for &b in s.iter().rev() {
            self.bytes.push_front(b);
        }
    }

    pub(crate) fn prepends(&mut self, other: &Buffer) {
        for &b in other.bytes.iter().rev() {
            self.bytes.push_front(b);
        }
    }

    /// Drops the last byte, if any.
    pub(crate) fn pop(&mut self) {
        self.bytes.pop_back();
    }

    pub(crate) fn starts_with(&self, s: &[u8]) -> bool {
        self.bytes.len() >= s.len() && self.bytes.iter().zip(s).all(|(a, b)| a == b)
    }

    pub(crate) fn to_vec(&self) -> Vec<u8> {
        self.bytes.iter().copied().collect()
    }

    pub(crate) fn into_string(self) -> Result<String> {
        Ok(String::from_utf8(Vec::from(self.bytes))?)
    }
}

#[cfg(test)]
mod tests {
    use super::Buffer;

    #[test]
    fn builds_outward_in() {
        let mut decl = Buffer::new();
        decl.append(b"foo");
        decl.prepend(b"::");
        let mut class = Buffer::new();
        class.append(b"A");
        decl.prepends(&class);
        decl.append(b"(int)");
        assert_eq!(decl.into_string().unwrap(), "A::foo(int)");
    }

    #[test]
    fn blank_only_between_words() {
        let mut b = Buffer::new();
        b.append_blank();
        assert!(b.is_empty());
        b.append(b"unsigned");
        b.append_blank();
        b.append(b"int");
        assert_eq!(b.to_vec(), b"unsigned int".to_vec());
    }

    #[test]
    fn pop_and_prefix() {
        let mut b = Buffer::new();
        b.append(b"*&,");
        assert!(b.starts_with(b"*&"));
        assert!(!b.starts_with(b"*&,x"));
        b.pop();
        assert_eq!(b.len(), 2);
        assert_eq!(b.to_vec(), b"*&".to_vec());
    }
}
