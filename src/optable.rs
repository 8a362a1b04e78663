//===- optable.rs ---------------------------------------------------------===//
//
// This file is dual licensed under the MIT and the University of Illinois Open
// Source Licenses. See LICENSE.TXT for details.
//
//===----------------------------------------------------------------------===//

/// One mangled operator token and how it prints after `operator`.
#[derive(Debug)]
pub(crate) struct Operator {
    pub(crate) mangled: &'static [u8],
    pub(crate) spelling: &'static str,
    /// Token belongs to the two letter (new style) encoding.
    pub(crate) ansi: bool,
}

macro_rules! op {
    ($mangled:expr, $spelling:expr) => {
        Operator {
            mangled: $mangled,
            spelling: $spelling,
            ansi: false,
        }
    };
    ($mangled:expr, $spelling:expr, ansi) => {
        Operator {
            mangled: $mangled,
            spelling: $spelling,
            ansi: true,
        }
    };
}

// Order matters for prefix lookups in expressions: "plus" before "pl".
pub(crate) static OPERATORS: &[Operator] = &[
    op!(b"nw", " new", ansi),
    op!(b"dl", " delete", ansi),
    op!(b"new", " new"),
    op!(b"delete", " delete"),
    op!(b"vn", " new []", ansi),
    op!(b"vd", " delete []", ansi),
    op!(b"as", "=", ansi),
    op!(b"ne", "!=", ansi),
    op!(b"eq", "==", ansi),
    op!(b"ge", ">=", ansi),
    op!(b"gt", ">", ansi),
    op!(b"le", "<=", ansi),
    op!(b"lt", "<", ansi),
    op!(b"plus", "+"),
    op!(b"pl", "+", ansi),
    op!(b"apl", "+=", ansi),
    op!(b"minus", "-"),
    op!(b"mi", "-", ansi),
    op!(b"ami", "-=", ansi),
    op!(b"mult", "*"),
    op!(b"ml", "*", ansi),
    op!(b"amu", "*=", ansi),
    op!(b"aml", "*=", ansi),
    op!(b"convert", "+"),
    op!(b"negate", "-"),
    op!(b"trunc_mod", "%"),
    op!(b"md", "%", ansi),
    op!(b"amd", "%=", ansi),
    op!(b"trunc_div", "/"),
    op!(b"dv", "/", ansi),
    op!(b"adv", "/=", ansi),
    op!(b"truth_andif", "&&"),
    op!(b"aa", "&&", ansi),
    op!(b"truth_orif", "||"),
    op!(b"oo", "||", ansi),
    op!(b"truth_not", "!"),
    op!(b"nt", "!", ansi),
    op!(b"postincrement", "++"),
    op!(b"pp", "++", ansi),
    op!(b"postdecrement", "--"),
    op!(b"mm", "--", ansi),
    op!(b"bit_ior", "|"),
    op!(b"or", "|", ansi),
    op!(b"aor", "|=", ansi),
    op!(b"bit_xor", "^"),
    op!(b"er", "^", ansi),
    op!(b"aer", "^=", ansi),
    op!(b"bit_and", "&"),
    op!(b"ad", "&", ansi),
    op!(b"aad", "&=", ansi),
    op!(b"bit_not", "~"),
    op!(b"co", "~", ansi),
    op!(b"call", "()"),
    op!(b"cl", "()", ansi),
    op!(b"alshift", "<<"),
    op!(b"ls", "<<", ansi),
    op!(b"als", "<<=", ansi),
    op!(b"arshift", ">>"),
    op!(b"rs", ">>", ansi),
    op!(b"ars", ">>=", ansi),
    op!(b"component", "->"),
    op!(b"pt", "->", ansi),
    op!(b"rf", "->", ansi),
    op!(b"indirect", "*"),
    op!(b"method_call", "->()"),
    op!(b"addr", "&"),
    op!(b"array", "[]"),
    op!(b"vc", "[]", ansi),
    op!(b"compound", ", "),
    op!(b"cm", ", ", ansi),
    op!(b"cond", "?:"),
    op!(b"cn", "?:", ansi),
    op!(b"max", ">?"),
    op!(b"mx", ">?", ansi),
    op!(b"min", "<?"),
    op!(b"mn", "<?", ansi),
    op!(b"nop", ""),
    op!(b"rm", "->*", ansi),
    op!(b"sz", "sizeof ", ansi),
];

/// Exact match against any token, old or new style.
pub(crate) fn lookup(name: &[u8]) -> Option<&'static Operator> {
    OPERATORS.iter().find(|op| op.mangled == name)
}

/// Exact match restricted to the new style tokens used by `__xx` names.
pub(crate) fn lookup_ansi(name: &[u8]) -> Option<&'static Operator> {
    OPERATORS.iter().find(|op| op.ansi && op.mangled == name)
}

/// First token, in table order, that `input` starts with.
pub(crate) fn lookup_prefix(input: &[u8]) -> Option<&'static Operator> {
    OPERATORS.iter().find(|op| input.starts_with(op.mangled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn old_and_new_spellings() {
        assert_eq!(lookup(b"plus").unwrap().spelling, "+");
        assert_eq!(lookup(b"pl").unwrap().spelling, "+");
        assert_eq!(lookup_ansi(b"apl").unwrap().spelling, "+=");
        assert!(lookup_ansi(b"plus").is_none());
        assert!(lookup(b"zz").is_none());
    }

    #[test]
    fn prefix_lookup_prefers_table_order() {
        assert_eq!(lookup_prefix(b"plus3").unwrap().mangled, b"plus");
        assert_eq!(lookup_prefix(b"pl3").unwrap().mangled, b"pl");
        assert_eq!(lookup_prefix(b"ami1").unwrap().spelling, "-=");
        assert!(lookup_prefix(b"q").is_none());
    }
}
