//===- tables.rs ----------------------------------------------------------===//
//
// This file is dual licensed under the MIT and the University of Illinois Open
// Source Licenses. See LICENSE.TXT for details.
//
//===----------------------------------------------------------------------===//
//
// Back-reference state for one top-level call: the remembered type table,
// the two squangling tables, the template argument vector and the single
// slot cache used by repeat codes.
//
//===----------------------------------------------------------------------===//

use crate::{Error, ErrorKind, Result};

/// Largest multiplier accepted by a repeat code.
pub(crate) const MAX_REPEAT: usize = 1024;

/// An append-only table addressed by 0-based index.
#[derive(Debug)]
pub(crate) struct BackRefTable<T> {
    what: &'static str,
    entries: Vec<T>,
}

impl<T> BackRefTable<T> {
    pub(crate) fn new(what: &'static str) -> BackRefTable<T> {
        BackRefTable {
            what,
            entries: Vec::new(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn push(&mut self, entry: T) -> usize {
        self.entries.push(entry);
        self.entries.len() - 1
    }

    pub(crate) fn get(&self, index: usize) -> Result<&T> {
        self.entries.get(index).ok_or_else(|| {
            Error::new(
                ErrorKind::IndexOutOfRange,
                format!(
                    "{} back reference {} out of range ({} remembered)",
                    self.what,
                    index,
                    self.entries.len()
                ),
            )
        })
    }

    /// cfront dialects start numbering again at each argument list.
    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Drops the entries added since the table held `len` of them.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.entries.truncate(len);
    }
}

impl BackRefTable<Option<Vec<u8>>> {
    /// Reserves a slot before the type it names has been demangled.
    pub(crate) fn register(&mut self) -> usize {
        self.push(None)
    }

    pub(crate) fn fill(&mut self, index: usize, text: Vec<u8>) {
        if let Some(slot) = self.entries.get_mut(index) {
            *slot = Some(text);
        }
    }
}

/// Arguments of the innermost function template, by parameter position.
/// Slots stay empty until their argument has been demangled.
#[derive(Debug, Default)]
pub(crate) struct TemplateArgs {
    slots: Option<Vec<Option<Vec<u8>>>>,
}

impl TemplateArgs {
    pub(crate) fn start(&mut self, count: usize) {
        self.slots = Some(vec![None; count]);
    }

    pub(crate) fn set(&mut self, index: usize, text: Vec<u8>) {
        if let Some(slot) = self.slots.as_mut().and_then(|s| s.get_mut(index)) {
            *slot = Some(text);
        }
    }

    /// The text substituted for parameter `index`. Outside a function
    /// template the parameter prints as a `T<index>` placeholder.
    pub(crate) fn substitute(&self, index: usize) -> Result<Vec<u8>> {
        match self.slots {
            Some(ref slots) => match slots.get(index) {
                Some(slot) => Ok(slot.clone().unwrap_or_default()),
                None => Err(Error::new(
                    ErrorKind::IndexOutOfRange,
                    format!(
                        "template parameter {} out of range ({} arguments)",
                        index,
                        slots.len()
                    ),
                )),
            },
            None => Ok(format!("T{}", index).into_bytes()),
        }
    }
}

/// Single slot cache behind the `n<count>` repeat code.
#[derive(Debug, Default)]
pub(crate) struct RepeatCache {
    previous: Option<Vec<u8>>,
    pending: usize,
}

impl RepeatCache {
    pub(crate) fn is_pending(&self) -> bool {
        self.pending > 0
    }

    pub(crate) fn arm(&mut self, count: usize) -> Result<()> {
        if count == 0 {
            return Err(Error::new(
                ErrorKind::StructuralMismatch,
                "repeat code with a zero count".to_owned(),
            ));
        }
        if count > MAX_REPEAT {
            return Err(Error::new(
                ErrorKind::CountOverflow,
                format!("repeat count {} too large", count),
            ));
        }
        self.pending = count;
        Ok(())
    }

    pub(crate) fn replay(&mut self) -> Result<Vec<u8>> {
        self.pending = self.pending.saturating_sub(1);
        self.previous.clone().ok_or_else(|| {
            Error::new(
                ErrorKind::StructuralMismatch,
                "repeat code without a previous argument".to_owned(),
            )
        })
    }

    pub(crate) fn forget(&mut self) {
        self.previous = None;
    }

    pub(crate) fn store(&mut self, argument: Vec<u8>) {
        self.previous = Some(argument);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_bounds_checked() {
        let mut types: BackRefTable<&[u8]> = BackRefTable::new("type");
        assert_eq!(types.push(b"i"), 0);
        assert_eq!(types.push(b"R3foo"), 1);
        assert_eq!(*types.get(1).unwrap(), b"R3foo");
        let err = types.get(2).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexOutOfRange);
        types.truncate(1);
        assert!(types.get(1).is_err());
        assert_eq!(*types.get(0).unwrap(), b"i");
        types.clear();
        assert!(types.get(0).is_err());
    }

    #[test]
    fn registered_slots_fill_later() {
        let mut btypes: BackRefTable<Option<Vec<u8>>> = BackRefTable::new("B");
        let outer = btypes.register();
        let inner = btypes.register();
        btypes.fill(inner, b"bar".to_vec());
        assert_eq!(*btypes.get(outer).unwrap(), None);
        btypes.fill(outer, b"foo::bar".to_vec());
        assert_eq!(btypes.get(outer).unwrap().as_deref(), Some(&b"foo::bar"[..]));
    }

    #[test]
    fn template_placeholders() {
        let mut args = TemplateArgs::default();
        assert_eq!(args.substitute(3).unwrap(), b"T3".to_vec());
        args.start(2);
        args.set(0, b"int".to_vec());
        assert_eq!(args.substitute(0).unwrap(), b"int".to_vec());
        assert_eq!(args.substitute(1).unwrap(), Vec::<u8>::new());
        assert!(args.substitute(2).is_err());
    }

    #[test]
    fn repeat_cache_replays_exactly() {
        let mut cache = RepeatCache::default();
        cache.arm(2).unwrap();
        assert!(cache.replay().is_err());

        let mut cache = RepeatCache::default();
        cache.store(b"int".to_vec());
        cache.arm(2).unwrap();
        assert_eq!(cache.replay().unwrap(), b"int".to_vec());
        assert!(cache.is_pending());
        assert_eq!(cache.replay().unwrap(), b"int".to_vec());
        assert!(!cache.is_pending());
        assert_eq!(cache.arm(MAX_REPEAT + 1).unwrap_err().kind(), ErrorKind::CountOverflow);
    }
}
