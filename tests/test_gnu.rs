extern crate gnu_v2_demangler;

use gnu_v2_demangler::{demangle_with_style, DemangleFlags, ErrorKind, Style};

fn expect_with_flags(input: &str, reference: &str, flags: DemangleFlags) {
    let demangled = demangle_with_style(input, flags, Style::Gnu);
    let reference = reference.to_owned();
    if let Ok(demangled) = demangled {
        assert_eq!(demangled, reference);
    } else {
        panic!("{:?} != {:?}", demangled, Ok::<_, ()>(reference));
    }
}

fn expect_failure(input: &str, kind: ErrorKind) {
    let demangled = demangle_with_style(input, DemangleFlags::COMPLETE, Style::Gnu);
    assert_eq!(demangled.map_err(|e| e.kind()), Err(kind), "{}", input);
}

#[test]
fn functions_and_members() {
    let expect = |input, reference| {
        expect_with_flags(input, reference, DemangleFlags::COMPLETE);
    };

    expect("foo__1Ai", "A::foo(int)");
    expect("foo__3barPCc", "bar::foo(char const *)");
    expect("foo__FiR3fooiT1iT1", "foo(int, foo &, int, foo &, int, foo &)");
    expect("foo__FPFi_v", "foo(void (*)(int))");
    expect("foo__FRA10_i", "foo(int (&)[10])");
    expect("foo__FPM3barFi_v", "foo(void (bar::*)(int))");
    expect("foo__FPM3barCFi_v", "foo(void (bar::*)(int) const)");
    expect("foo__FUlJd", "foo(unsigned long, __complex double)");
    expect("foo__FI20", "foo(int32_t)");
    expect("foo__FI_40_", "foo(int64_t)");
    expect("foo__C3bar", "bar::foo(void) const");
    expect("foo__Fie", "foo(int,...)");
}

#[test]
fn parameter_printing() {
    expect_with_flags("foo__1Ai", "A::foo", DemangleFlags::empty());
    expect_with_flags("foo__1Afe", "A::foo(float,...)", DemangleFlags::PARAMS);
    expect_with_flags(
        "__as__3fooRC3foo",
        "foo::operator=(foo &)",
        DemangleFlags::PARAMS,
    );
    expect_with_flags(
        "__as__3fooRC3foo",
        "foo::operator=(foo const &)",
        DemangleFlags::COMPLETE,
    );
}

#[test]
fn constructors_and_destructors() {
    let expect = |input, reference| {
        expect_with_flags(input, reference, DemangleFlags::COMPLETE);
    };

    expect("__3foo", "foo::foo(void)");
    expect("_$_3foo", "foo::~foo(void)");
    expect("_._3foo", "foo::~foo(void)");
    expect("__3fooiRT0iT2iT2", "foo::foo(int, foo &, int, foo &, int, foo &)");
    expect("__t6vector1Zi", "vector<int>::vector(void)");
    expect("_$_t6vector1Zi", "vector<int>::~vector(void)");
    expect("__Q23bar3baz", "bar::baz::baz(void)");
}

#[test]
fn special_names() {
    let expect = |input, reference| {
        expect_with_flags(input, reference, DemangleFlags::COMPLETE);
    };

    expect("_vt$foo", "foo virtual table");
    expect("_vt$foo$bar", "foo::bar virtual table");
    expect("__vt_3foo", "foo virtual table");
    expect("__vt_Q23bar3baz", "bar::baz virtual table");
    expect("_3foo$varname", "foo::varname");
    expect("_Q23bar3baz$varname", "bar::baz::varname");
    expect(
        "__thunk_4__$_7ostream",
        "virtual function thunk (delta:-4) for ostream::~ostream(void)",
    );
    expect("__tf3foo", "foo type_info function");
    expect("__ti3foo", "foo type_info node");
    expect("__tfi", "int type_info function");
    expect("__tii", "int type_info node");
    expect("_GLOBAL_$I$foo", "global constructors keyed to foo");
    expect("_GLOBAL_.D.foo", "global destructors keyed to foo");
    expect(
        "_GLOBAL_$I$__3fooi",
        "global constructors keyed to foo::foo(int)",
    );
    expect("_imp__foo__Fi", "import stub for foo(int)");
    // The rejected static member leaves no squangled types behind.
    expect("_Q21a1bz$__FQ23bar3bazB0", "_Q21a1bz$(bar::baz, bar::baz)");
    expect("__imp_foo__Fi", "import stub for foo(int)");
    expect("bar__14_GLOBAL_$N$foo", "{anonymous}::bar(void)");
}

#[test]
fn operators() {
    let expect = |input, reference| {
        expect_with_flags(input, reference, DemangleFlags::COMPLETE);
    };

    expect("__ls__3fooi", "foo::operator<<(int)");
    expect("__apl__3fooi", "foo::operator+=(int)");
    expect("__nw__FUi", "operator new(unsigned int)");
    expect("__opi__3foo", "foo::operator int(void)");
    expect("type$i__3foo", "foo::operator int(void)");
    expect("op$plus__3fooi", "foo::operator+(int)");
    expect(
        "op$assign_plus__3fooRC3foo",
        "foo::operator+=(foo const &)",
    );
}

#[test]
fn templates() {
    let expect = |input, reference| {
        expect_with_flags(input, reference, DemangleFlags::COMPLETE);
    };

    expect("foo__t3bar1Zi", "bar<int>::foo(void)");
    expect("foo__t3bar2ZiZc", "bar<int, char>::foo(void)");
    expect("foo__t3bar1i5", "bar<5>::foo(void)");
    expect("foo__t3bar1im5", "bar<-5>::foo(void)");
    expect("foo__t3bar1b1", "bar<true>::foo(void)");
    expect("foo__t3bar1c97", "bar<'a'>::foo(void)");
    expect("f__H1Zi_X01_v", "void f<int>(int)");
    expect("foo__FX01", "foo(T0)");
    expect("foo__t3bar1z1Z3vec", "bar<template <class> class vec>::foo(void)");
    expect("foo__t3bar1iEm1pl2W", "bar<(-1 + 2)>::foo(void)");
    expect("foo__t3bar1f1.5e3", "bar<1.5e3>::foo(void)");
    expect("foo__t3bar1Pi3baz", "bar<&baz>::foo(void)");
    expect("foo__t3bar1Ri3baz", "bar<baz>::foo(void)");
    expect("foo__t3bar1Pi0", "bar<0>::foo(void)");
    expect("foo__t3bar1Pi6f__Fic", "bar<&f(int, char)>::foo(void)");
}

#[test]
fn squangling() {
    let expect = |input, reference| {
        expect_with_flags(input, reference, DemangleFlags::COMPLETE);
    };

    expect("foo__Q23bar3baz", "bar::baz::foo(void)");
    expect("foo__Fin2", "foo(int, int, int)");
    expect("foo__FQ23bar3bazB0", "foo(bar::baz, bar::baz)");
    expect("foo__FQ23bar3bazB2", "foo(bar::baz, baz)");
    expect("foo__FQ23bar3bazQ2K03qux", "foo(bar::baz, bar::qux)");
}

#[test]
fn java() {
    let expect = |input, reference| {
        expect_with_flags(input, reference, DemangleFlags::PARAMS | DemangleFlags::JAVA);
    };

    expect("foo__Q23bar3baz", "bar.baz.foo(void)");
    expect("foo__FP3bar", "foo(bar)");
    expect("_vt$foo$bar", "foo.bar virtual table");
    expect("foo__FPt6JArray1Zi", "foo(int[])");
    expect("foo__FPt6JArray1ZP4Test", "foo(Test[])");
}

#[test]
fn failures() {
    expect_failure("not_mangled", ErrorKind::StructuralMismatch);
    expect_failure("", ErrorKind::IncompleteInput);
    expect_failure("__not_mangled_either__", ErrorKind::StructuralMismatch);
    expect_failure("foo__Fn2", ErrorKind::StructuralMismatch);
    expect_failure("foo__FiT1", ErrorKind::IndexOutOfRange);
    expect_failure("foo__FK5", ErrorKind::IndexOutOfRange);
    expect_failure("foo__FB3", ErrorKind::IndexOutOfRange);
    expect_failure("foo__t3bar2Zi", ErrorKind::IncompleteInput);
    expect_failure("foo__1A_i", ErrorKind::StructuralMismatch);
    expect_failure("foo__Fi_2", ErrorKind::StructuralMismatch);
    expect_failure("foo__FI04", ErrorKind::StructuralMismatch);
}
