//===- state.rs -----------------------------------------------------------===//
//
// This file is dual licensed under the MIT and the University of Illinois Open
// Source Licenses. See LICENSE.TXT for details.
//
//===----------------------------------------------------------------------===//
//
// The call context threaded through every production: the cursor, the
// active options, pending constructor/destructor markers and the back
// reference tables. The grammar itself lives in the sibling modules as
// further `impl ParserState` blocks.
//
//===----------------------------------------------------------------------===//

use std::mem;

use crate::buffer::Buffer;
use crate::tables::{BackRefTable, RepeatCache, TemplateArgs};
use crate::{DemangleFlags, Error, ErrorKind, Result, Style};

/// Deepest nesting followed before giving up.
const MAX_DEPTH: u32 = 128;

/// Characters g++ uses to join the parts of special names.
pub(crate) fn is_marker(c: u8) -> bool {
    c == b'$' || c == b'.'
}

pub(crate) fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || haystack.len() < needle.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub(crate) struct TypeQualifiers: u32 {
        const CONST    = 0b001;
        const VOLATILE = 0b010;
        const RESTRICT = 0b100;
    }
}

impl TypeQualifiers {
    pub(crate) fn from_code(c: u8) -> TypeQualifiers {
        match c {
            b'C' => TypeQualifiers::CONST,
            b'V' => TypeQualifiers::VOLATILE,
            b'u' => TypeQualifiers::RESTRICT,
            _ => TypeQualifiers::empty(),
        }
    }

    pub(crate) fn spelling(self) -> &'static str {
        let c = self.contains(TypeQualifiers::CONST);
        let v = self.contains(TypeQualifiers::VOLATILE);
        let r = self.contains(TypeQualifiers::RESTRICT);
        match (c, v, r) {
            (false, false, false) => "",
            (true, false, false) => "const",
            (false, true, false) => "volatile",
            (false, false, true) => "__restrict",
            (true, true, false) => "const volatile",
            (true, false, true) => "const __restrict",
            (false, true, true) => "volatile __restrict",
            (true, true, true) => "const volatile __restrict",
        }
    }
}

/// Where a class name's template arguments begin, so constructor and
/// destructor names can repeat the class name without them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TemplateStart {
    Unknown,
    Pending,
    At(usize),
}

pub(crate) struct ParserState<'a> {
    // The remaining part of the mangled name being parsed.
    pub(crate) input: &'a [u8],

    pub(crate) flags: DemangleFlags,
    pub(crate) style: Style,

    // Mangled spelling of every argument type seen so far, for `T`/`N`.
    pub(crate) types: BackRefTable<&'a [u8]>,
    // Demangled qualified-name components, for `K`.
    pub(crate) ktypes: BackRefTable<Vec<u8>>,
    // Demangled classes, reserved before they are complete, for `B`.
    pub(crate) btypes: BackRefTable<Option<Vec<u8>>>,
    pub(crate) template_args: TemplateArgs,
    pub(crate) repeats: RepeatCache,

    pub(crate) constructor: u32,
    pub(crate) destructor: u32,
    pub(crate) static_type: bool,
    pub(crate) type_quals: TypeQualifiers,
    pub(crate) dllimported: bool,
    pub(crate) temp_start: TemplateStart,
    // Nested argument lists are numbered independently.
    pub(crate) forgetting_types: u32,

    depth: u32,
}

impl<'a> ParserState<'a> {
    pub(crate) fn new(
        input: &'a [u8],
        flags: DemangleFlags,
        style: Style,
        depth: u32,
    ) -> ParserState<'a> {
        ParserState {
            input,
            flags,
            style,
            types: BackRefTable::new("type"),
            ktypes: BackRefTable::new("squangled name"),
            btypes: BackRefTable::new("squangled type"),
            template_args: TemplateArgs::default(),
            repeats: RepeatCache::default(),
            constructor: 0,
            destructor: 0,
            static_type: false,
            type_quals: TypeQualifiers::empty(),
            dllimported: false,
            temp_start: TemplateStart::Unknown,
            forgetting_types: 0,
            depth,
        }
    }

    /// Demangles an embedded name with a context of its own. Nothing but
    /// the nesting depth is shared with `self`, so running too deep is an
    /// error while any other failure yields `None`.
    pub(crate) fn demangle_embedded(&self, name: &'a [u8]) -> Result<Option<String>> {
        if self.depth >= MAX_DEPTH {
            return Err(self.fail(ErrorKind::RecursionLimit, "nesting too deep"));
        }
        let nested = ParserState::new(name, self.flags, self.style, self.depth + 1);
        match nested.demangle() {
            Ok(s) => Ok(Some(s)),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                trace!(
                    "embedded name {} kept verbatim: {}",
                    String::from_utf8_lossy(name),
                    err
                );
                Ok(None)
            }
        }
    }

    /// Appends an embedded name of `len` bytes, demangled when possible
    /// and verbatim otherwise.
    pub(crate) fn append_embedded(&mut self, result: &mut Buffer, len: usize) -> Result<()> {
        let name = self.take(len)?;
        match self.demangle_embedded(name)? {
            Some(s) => result.append(s.as_bytes()),
            None => result.append(name),
        }
        Ok(())
    }

    pub(crate) fn scope(&self) -> &'static [u8] {
        if self.flags.contains(DemangleFlags::JAVA) {
            b"."
        } else {
            b"::"
        }
    }

    pub(crate) fn wants_params(&self) -> bool {
        self.flags.contains(DemangleFlags::PARAMS)
    }

    pub(crate) fn wants_qualifiers(&self) -> bool {
        self.flags.contains(DemangleFlags::ANSI)
    }

    pub(crate) fn descend(&mut self) -> Result<()> {
        if self.depth >= MAX_DEPTH {
            return Err(self.fail(ErrorKind::RecursionLimit, "nesting too deep"));
        }
        self.depth += 1;
        Ok(())
    }

    pub(crate) fn ascend(&mut self) {
        self.depth -= 1;
    }

    pub(crate) fn fail(&self, kind: ErrorKind, what: &str) -> Error {
        Error::new(
            kind,
            format!("{} at {:?}", what, String::from_utf8_lossy(self.input)),
        )
    }

    /// A failure at the current position: running out of input makes it
    /// an incomplete input rather than a mismatch.
    pub(crate) fn mismatch(&self, what: &str) -> Error {
        if self.input.is_empty() {
            self.fail(ErrorKind::IncompleteInput, what)
        } else {
            self.fail(ErrorKind::StructuralMismatch, what)
        }
    }

    pub(crate) fn peek(&self) -> Option<u8> {
        self.input.first().cloned()
    }

    pub(crate) fn peek_at(&self, n: usize) -> Option<u8> {
        self.input.get(n).cloned()
    }

    pub(crate) fn peek_digit(&self) -> bool {
        self.peek().map_or(false, |c| c.is_ascii_digit())
    }

    pub(crate) fn get(&mut self) -> Result<u8> {
        match self.peek() {
            Some(first) => {
                self.trim(1);
                Ok(first)
            }
            None => Err(self.fail(ErrorKind::IncompleteInput, "unexpected end of input")),
        }
    }

    pub(crate) fn consume(&mut self, s: &[u8]) -> bool {
        if self.input.starts_with(s) {
            self.trim(s.len());
            true
        } else {
            false
        }
    }

    /// Advances by `len` bytes, stopping at the end of input.
    pub(crate) fn trim(&mut self, len: usize) {
        self.input = &self.input[len.min(self.input.len())..]
    }

    pub(crate) fn expect(&mut self, s: &[u8]) -> Result<()> {
        if !self.consume(s) {
            return Err(self.mismatch(&format!(
                "{} expected",
                String::from_utf8_lossy(s)
            )));
        }
        Ok(())
    }

    /// Takes the next `len` bytes.
    pub(crate) fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        if len > self.input.len() {
            return Err(self.fail(
                ErrorKind::IncompleteInput,
                &format!("{} bytes expected", len),
            ));
        }
        let (taken, rest) = self.input.split_at(len);
        self.input = rest;
        Ok(taken)
    }

    /// The part of `start` consumed since the cursor stood there.
    pub(crate) fn consumed_since(&self, start: &'a [u8]) -> &'a [u8] {
        &start[..start.len().saturating_sub(self.input.len())]
    }

    /// Runs `f` against `input` instead of the cursor, returning its result
    /// together with whatever `f` left unconsumed.
    pub(crate) fn parse_detached<T>(
        &mut self,
        input: &'a [u8],
        f: impl FnOnce(&mut Self) -> T,
    ) -> (T, &'a [u8]) {
        let saved = mem::replace(&mut self.input, input);
        let value = f(self);
        let rest = mem::replace(&mut self.input, saved);
        (value, rest)
    }

    // <count> ::= <decimal digit>+
    //
    // Accumulated with an overflow check against the 32-bit range.
    pub(crate) fn consume_count(&mut self) -> Result<usize> {
        if !self.peek_digit() {
            return Err(self.mismatch("count expected"));
        }
        let mut count: u32 = 0;
        while let Some(c) = self.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            count = count
                .checked_mul(10)
                .and_then(|n| n.checked_add(u32::from(c - b'0')))
                .ok_or_else(|| self.fail(ErrorKind::CountOverflow, "count overflows"))?;
            self.trim(1);
        }
        Ok(count as usize)
    }

    // <count> ::= <decimal digit>
    //         ::= _ <decimal digit>+ _
    pub(crate) fn consume_count_with_underscores(&mut self) -> Result<usize> {
        if self.peek() == Some(b'_') {
            self.trim(1);
            let count = self.consume_count()?;
            self.expect(b"_")?;
            Ok(count)
        } else {
            match self.peek() {
                Some(c) if c.is_ascii_digit() => {
                    self.trim(1);
                    Ok(usize::from(c - b'0'))
                }
                _ => Err(self.mismatch("count expected")),
            }
        }
    }

    // <count> ::= <decimal digit>
    //         ::= <decimal digit>+ _
    //
    // A run of several digits only counts as one number when a `_`
    // follows it; otherwise just the first digit is taken.
    pub(crate) fn get_count(&mut self) -> Result<usize> {
        let first = match self.peek() {
            Some(c) if c.is_ascii_digit() => c,
            _ => return Err(self.mismatch("count expected")),
        };
        let run = self.input.iter().take_while(|c| c.is_ascii_digit()).count();
        if run > 1 && self.peek_at(run) == Some(b'_') {
            let count = self.consume_count()?;
            self.trim(1);
            return Ok(count);
        }
        self.trim(1);
        Ok(usize::from(first - b'0'))
    }

    pub(crate) fn remember_type(&mut self, mangled: &'a [u8]) {
        if self.forgetting_types == 0 {
            self.types.push(mangled);
        }
    }

    pub(crate) fn forget_types(&mut self) {
        self.types.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(input: &str) -> ParserState {
        ParserState::new(input.as_bytes(), DemangleFlags::COMPLETE, Style::Gnu, 0)
    }

    #[test]
    fn counts() {
        let mut s = state("12abc");
        assert_eq!(s.consume_count().unwrap(), 12);
        assert_eq!(s.input, b"abc");

        let mut s = state("4294967295");
        assert_eq!(s.consume_count().unwrap(), 4294967295);
        let mut s = state("4294967296");
        assert_eq!(s.consume_count().unwrap_err().kind(), ErrorKind::CountOverflow);
        let mut s = state("x");
        assert!(s.consume_count().is_err());
        assert_eq!(s.input, b"x");
    }

    #[test]
    fn underscore_counts() {
        let mut s = state("7x");
        assert_eq!(s.consume_count_with_underscores().unwrap(), 7);
        let mut s = state("_12_x");
        assert_eq!(s.consume_count_with_underscores().unwrap(), 12);
        assert_eq!(s.input, b"x");
        let mut s = state("_12x");
        assert!(s.consume_count_with_underscores().is_err());
    }

    #[test]
    fn get_count_needs_underscore_for_long_runs() {
        let mut s = state("51");
        assert_eq!(s.get_count().unwrap(), 5);
        assert_eq!(s.input, b"1");
        let mut s = state("51_x");
        assert_eq!(s.get_count().unwrap(), 51);
        assert_eq!(s.input, b"x");
        let mut s = state("3_");
        assert_eq!(s.get_count().unwrap(), 3);
        assert_eq!(s.input, b"_");
    }

    #[test]
    fn detached_parse_restores_cursor() {
        let mut s = state("outer");
        let (c, rest) = s.parse_detached(b"xy", |s| s.get());
        assert_eq!(c.unwrap(), b'x');
        assert_eq!(rest, b"y");
        assert_eq!(s.input, b"outer");
    }

    #[test]
    fn qualifier_spelling() {
        let q = TypeQualifiers::CONST | TypeQualifiers::VOLATILE;
        assert_eq!(q.spelling(), "const volatile");
        assert_eq!(TypeQualifiers::from_code(b'u').spelling(), "__restrict");
        assert_eq!(TypeQualifiers::from_code(b'x'), TypeQualifiers::empty());
    }
}
