extern crate gnu_v2_demangler;

use gnu_v2_demangler::{default_style, demangle, set_default_style, DemangleFlags, Style};

// The default style is process wide, so it gets a test binary of its own.
#[test]
fn default_style_applies_without_style_bits() {
    assert_eq!(default_style(), Style::Gnu);
    assert!(demangle("foo__FiT1", DemangleFlags::COMPLETE).is_err());

    set_default_style(Style::Lucid);
    assert_eq!(default_style(), Style::Lucid);
    assert_eq!(
        demangle("foo__FiT1", DemangleFlags::COMPLETE).unwrap(),
        "foo(int, int)"
    );
    // An explicit style bit still wins.
    assert!(demangle("foo__FiT1", DemangleFlags::COMPLETE | DemangleFlags::GNU).is_err());

    set_default_style(Style::Gnu);
    assert!(demangle("foo__FiT1", DemangleFlags::COMPLETE).is_err());
}
