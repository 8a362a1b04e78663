extern crate gnu_v2_demangler;

use gnu_v2_demangler::{demangle_with_style, DemangleFlags, ErrorKind, Style};

fn expect_with_style(input: &str, reference: &str, style: Style) {
    let demangled = demangle_with_style(input, DemangleFlags::COMPLETE, style);
    let reference = reference.to_owned();
    if let Ok(demangled) = demangled {
        assert_eq!(demangled, reference);
    } else {
        panic!("{:?} != {:?}", demangled, Ok::<_, ()>(reference));
    }
}

fn expect_failure(input: &str, style: Style) -> ErrorKind {
    match demangle_with_style(input, DemangleFlags::COMPLETE, style) {
        Ok(s) => panic!("{} demangled to {:?} as {}", input, s, style),
        Err(err) => err.kind(),
    }
}

#[test]
fn arm() {
    let expect = |input, reference| {
        expect_with_style(input, reference, Style::Arm);
    };

    expect("bar__3fooFi", "foo::bar(int)");
    expect("bar__3foo", "foo::bar");
    expect(
        "bar__3fooFPiN51",
        "foo::bar(int *, int *, int *, int *, int *, int *)",
    );
    expect("__ct__3fooFi", "foo::foo(int)");
    expect("__dt__3fooFv", "foo::~foo(void)");
    expect("__vtbl__3foo", "foo virtual table");
    expect("__vtbl__3foo__3bar", "bar::foo virtual table");
    expect("__1counter", "counter");
    expect("foo__pt__2_i", "foo<int>");
    expect("foo__pt__5_XiL1", "foo<(int)1>");
    expect("bar__12foo__pt__2_iFi", "foo<int>::bar(int)");
    // Two-digit indices once ten types are remembered.
    expect(
        "f__FPcPcPcPcPcPcPcPcPcPcPcT11",
        "f(char *, char *, char *, char *, char *, char *, \
         char *, char *, char *, char *, char *, char *)",
    );
    expect("__sti__foo", "global constructors keyed to foo");
}

#[test]
fn lucid() {
    let expect = |input, reference| {
        expect_with_style(input, reference, Style::Lucid);
    };

    expect("foo__FiT1", "foo(int, int)");
    expect("__ct__3fooFi", "foo::foo(int)");
    expect("__2count", "count");
}

#[test]
fn hp() {
    let expect = |input, reference| {
        expect_with_style(input, reference, Style::Hp);
    };

    expect("foo__XTiSP5_Fi", "foo<int,5>(int)");
    expect("foo__XTiUN12_Fi", "foo<int,-12U>(int)");
    expect("foo__XSM_Fv", "foo<-2147483648>(void)");
    expect("foo__XTiA3baz_Fi", "foo<int,&baz>(int)");
    expect("foo__Fi_2", "foo(int)");
    expect("foo__L1_3barFi", "bar::foo(int)");
    expect("__std__foo", "global destructors keyed to foo");
}

#[test]
fn edg() {
    let expect = |input, reference| {
        expect_with_style(input, reference, Style::Edg);
    };

    expect("__ct__3fooFi", "foo::foo(int)");
    expect("foo__Q23bar3bazFv", "bar::baz::foo(void)");
    expect("foo__Fi_v", "foo(int)");
    expect("foo__tm__2_i", "foo<int>");
    expect("foo__ps__2_i", "foo<int>");
    expect("foo__9bar__S2_iFv", "bar<int>::foo(void)");
}

#[test]
fn auto() {
    let expect = |input, reference| {
        expect_with_style(input, reference, Style::Auto);
    };

    expect("foo__Fi_v", "foo(int)");
    expect("foo__1Ai", "A::foo(int)");
    expect("_vt$foo", "foo virtual table");
}

#[test]
fn dialect_mismatches() {
    // GNU back references count from zero and only one type is known.
    assert_eq!(expect_failure("foo__FiT1", Style::Gnu), ErrorKind::IndexOutOfRange);
    // Function templates are a g++ extension.
    assert_eq!(expect_failure("f__H1Zi_X01_v", Style::Auto), ErrorKind::StructuralMismatch);
    // cfront names mark their argument list.
    assert_eq!(expect_failure("bar__3fooi", Style::Arm), ErrorKind::StructuralMismatch);
    assert_eq!(expect_failure("foo__L1_3barFi", Style::Arm), ErrorKind::UnsupportedForm);
    assert_eq!(expect_failure("foo__Fi_v", Style::Hp), ErrorKind::StructuralMismatch);
}
