//===- lib.rs -------------------------------------------------------------===//
//
// This file is dual licensed under the MIT and the University of Illinois Open
// Source Licenses. See LICENSE.TXT for details.
//
//===----------------------------------------------------------------------===//
//
// This file defines a demangler for symbols mangled by GNU g++ 2.x and by
// the cfront family of compilers (ARM, Lucid, HP aCC, EDG).
//
// This file has no dependencies on a C++ runtime so that it can be
// easily reused in symbol browsers, disassemblers and linkers.
//
//===----------------------------------------------------------------------===//

#[macro_use]
extern crate bitflags;
#[macro_use]
extern crate log;

mod buffer;
mod names;
mod optable;
mod signature;
mod state;
mod tables;
mod templates;
mod types;

use std::fmt;
use std::result;
use std::str::FromStr;
use std::sync::atomic::{AtomicU8, Ordering};

use state::ParserState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The next token matches no production of the active dialect.
    StructuralMismatch,
    /// A back reference names an entry that does not exist (yet).
    IndexOutOfRange,
    /// A decimal count does not fit in 32 bits.
    CountOverflow,
    /// The input ends where a terminator or argument is required.
    IncompleteInput,
    /// The construct belongs to a dialect other than the active one.
    UnsupportedForm,
    /// Nesting is deeper than the demangler is willing to follow.
    RecursionLimit,
    /// A counted identifier split a multi-byte character.
    InvalidUtf8,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    kind: ErrorKind,
    s: String,
}

impl Error {
    fn new(kind: ErrorKind, s: String) -> Error {
        Error { kind, s }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    // Errors that end the whole call instead of selecting a fallback.
    pub(crate) fn is_fatal(&self) -> bool {
        self.kind == ErrorKind::RecursionLimit
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.s)
    }
}

impl std::error::Error for Error {}

impl From<std::string::FromUtf8Error> for Error {
    fn from(t: std::string::FromUtf8Error) -> Error {
        Error {
            kind: ErrorKind::InvalidUtf8,
            s: format!("{:?}", t),
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DemangleFlags: u32 {
        /// Print the parameter list of functions.
        const PARAMS = 1 << 0;
        /// Print const, volatile and __restrict qualifiers.
        const ANSI   = 1 << 1;
        /// Use `.` as the scope separator and drop pointer stars.
        const JAVA   = 1 << 2;

        const AUTO   = 1 << 8;
        const GNU    = 1 << 9;
        const LUCID  = 1 << 10;
        const ARM    = 1 << 11;
        const HP     = 1 << 12;
        const EDG    = 1 << 13;

        const COMPLETE = Self::PARAMS.bits() | Self::ANSI.bits();
        const STYLE_MASK = Self::AUTO.bits()
            | Self::GNU.bits()
            | Self::LUCID.bits()
            | Self::ARM.bits()
            | Self::HP.bits()
            | Self::EDG.bits();
    }
}

/// The mangling conventions this crate understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Style {
    /// g++ conventions plus EDG-style trailing return types.
    Auto,
    #[default]
    Gnu,
    Lucid,
    Arm,
    Hp,
    Edg,
}

const STYLES: [(Style, DemangleFlags, &str); 6] = [
    (Style::Auto, DemangleFlags::AUTO, "auto"),
    (Style::Gnu, DemangleFlags::GNU, "gnu"),
    (Style::Lucid, DemangleFlags::LUCID, "lucid"),
    (Style::Arm, DemangleFlags::ARM, "arm"),
    (Style::Hp, DemangleFlags::HP, "hp"),
    (Style::Edg, DemangleFlags::EDG, "edg"),
];

impl Style {
    /// The style selected by the style bits of `flags`, if any. The first
    /// bit in declaration order wins.
    pub fn from_flags(flags: DemangleFlags) -> Option<Style> {
        STYLES
            .iter()
            .find(|(_, bit, _)| flags.contains(*bit))
            .map(|(style, _, _)| *style)
    }

    pub fn flag(self) -> DemangleFlags {
        STYLES[self as usize].1
    }

    pub fn name(self) -> &'static str {
        STYLES[self as usize].2
    }

    fn from_index(index: u8) -> Style {
        STYLES
            .get(usize::from(index))
            .map(|(style, _, _)| *style)
            .unwrap_or_default()
    }

    /// g++ conventions: GNU special forms, implied argument lists.
    pub(crate) fn is_gnu_like(self) -> bool {
        matches!(self, Style::Auto | Style::Gnu)
    }

    /// cfront descendants: `__ct`/`__dt` names, 1-based back references,
    /// type numbering restarted at each argument list.
    pub(crate) fn is_cfront_like(self) -> bool {
        matches!(self, Style::Lucid | Style::Arm | Style::Hp | Style::Edg)
    }

    /// Whether the prefix scan moves on to the last `__` of the name.
    /// ARM and HP take the first one.
    pub(crate) fn scans_for_last_separator(self) -> bool {
        !matches!(self, Style::Arm | Style::Hp)
    }

    /// Whether a function signature may carry `_<type>` after its
    /// argument list.
    pub(crate) fn has_trailing_return_type(self) -> bool {
        matches!(self, Style::Auto | Style::Edg)
    }
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Style {
    type Err = Error;

    fn from_str(s: &str) -> Result<Style> {
        STYLES
            .iter()
            .find(|(_, _, name)| name.eq_ignore_ascii_case(s))
            .map(|(style, _, _)| *style)
            .ok_or_else(|| {
                Error::new(
                    ErrorKind::UnsupportedForm,
                    format!("unknown demangling style: {}", s),
                )
            })
    }
}

static DEFAULT_STYLE: AtomicU8 = AtomicU8::new(Style::Gnu as u8);

/// Sets the style used by [`demangle`] when its flags carry no style bit.
/// Calls already in progress are not affected.
pub fn set_default_style(style: Style) {
    DEFAULT_STYLE.store(style as u8, Ordering::Relaxed);
}

pub fn default_style() -> Style {
    Style::from_index(DEFAULT_STYLE.load(Ordering::Relaxed))
}

/// Demangles `input`, taking the style from `flags` or, when no style bit
/// is set, from [`default_style`].
///
/// `input` must already be stripped of any platform prefix such as a
/// leading underscore. On failure callers should show the symbol as is.
pub fn demangle(input: &str, flags: DemangleFlags) -> Result<String> {
    let style = Style::from_flags(flags).unwrap_or_else(default_style);
    demangle_with_style(input, flags, style)
}

pub fn demangle_with_style(input: &str, flags: DemangleFlags, style: Style) -> Result<String> {
    let result = ParserState::new(input.as_bytes(), flags, style, 0).demangle();
    if let Err(ref err) = result {
        debug!("{} ({}): {:?}: {}", input, style, err.kind(), err);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expect_with_flags(input: &str, reference: &str, flags: DemangleFlags) {
        let demangled: Result<_> = demangle_with_style(input, flags, Style::Gnu);
        let reference: Result<_> = Ok(reference.to_owned());
        assert_eq!(demangled, reference);
    }

    #[test]
    fn member_functions() {
        expect_with_flags("foo__1Ai", "A::foo(int)", DemangleFlags::COMPLETE);
        expect_with_flags("foo__1Ai", "A::foo", DemangleFlags::empty());
        expect_with_flags("foo__1Afe", "A::foo(float,...)", DemangleFlags::PARAMS);
    }

    #[test]
    fn rejects_plain_names() {
        let err = demangle("not_mangled", DemangleFlags::COMPLETE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::StructuralMismatch);
        let err = demangle("", DemangleFlags::COMPLETE).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IncompleteInput);
    }

    #[test]
    fn style_selection() {
        assert_eq!(Style::from_flags(DemangleFlags::ARM | DemangleFlags::PARAMS), Some(Style::Arm));
        assert_eq!(Style::from_flags(DemangleFlags::COMPLETE), None);
        assert_eq!(Style::from_flags(DemangleFlags::EDG | DemangleFlags::LUCID), Some(Style::Lucid));
        assert_eq!("HP".parse::<Style>().unwrap(), Style::Hp);
        assert!("cfront".parse::<Style>().is_err());
        assert_eq!(Style::Edg.flag(), DemangleFlags::EDG);
        assert_eq!(Style::Lucid.to_string(), "lucid");
        assert_eq!(Style::from_index(200), Style::Gnu);
    }
}
