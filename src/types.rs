//===- types.rs -----------------------------------------------------------===//
//
// This file is dual licensed under the MIT and the University of Illinois Open
// Source Licenses. See LICENSE.TXT for details.
//
//===----------------------------------------------------------------------===//
//
// Types and argument lists. A type is read as a run of declarator
// modifiers (pointers, references, arrays, functions, member pointers,
// qualifiers) followed by exactly one terminal: a fundamental type, a
// class name, or a back reference.
//
//===----------------------------------------------------------------------===//

use std::mem;

use crate::buffer::Buffer;
use crate::state::{ParserState, TypeQualifiers};
use crate::tables::MAX_REPEAT;
use crate::{DemangleFlags, ErrorKind, Result, Style};

/// Coarse classification of a demangled type, used to pick the literal
/// grammar of a template value parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypeKind {
    Pointer,
    Reference,
    Integral,
    Bool,
    Char,
    Real,
}

impl<'a> ParserState<'a> {
    /// Demangles one type into `result`, which is expected to be empty.
    pub(crate) fn do_type(&mut self, result: &mut Buffer) -> Result<TypeKind> {
        self.descend()?;
        // A `T` back reference switches parsing over to the remembered
        // spelling; the cursor resumes right after the first one.
        let mut resume = None;
        let kind = self.read_type(result, &mut resume);
        if let Some(rest) = resume {
            self.input = rest;
        }
        self.ascend();
        kind
    }

    fn read_type(
        &mut self,
        result: &mut Buffer,
        resume: &mut Option<&'a [u8]>,
    ) -> Result<TypeKind> {
        let mut decl = Buffer::new();
        let mut kind = None;

        loop {
            match self.peek() {
                Some(b'P') | Some(b'p') => {
                    self.trim(1);
                    if !self.flags.contains(DemangleFlags::JAVA) {
                        decl.prepend(b"*");
                    }
                    kind.get_or_insert(TypeKind::Pointer);
                }
                Some(b'R') => {
                    self.trim(1);
                    decl.prepend(b"&");
                    kind.get_or_insert(TypeKind::Reference);
                }
                Some(b'O') => {
                    self.trim(1);
                    decl.prepend(b"&&");
                    kind.get_or_insert(TypeKind::Reference);
                }
                // <array> ::= A [<bound>] _ <type>
                Some(b'A') => {
                    self.trim(1);
                    if decl.starts_with(b"*") || decl.starts_with(b"&") {
                        decl.prepend(b"(");
                        decl.append(b")");
                    }
                    decl.append(b"[");
                    if self.peek() != Some(b'_') {
                        self.demangle_template_value_parm(&mut decl, TypeKind::Integral)?;
                    }
                    self.consume(b"_");
                    decl.append(b"]");
                }
                Some(b'T') => {
                    self.trim(1);
                    let n = self.get_count()?;
                    let remembered = *self.types.get(n)?;
                    let rest = mem::replace(&mut self.input, remembered);
                    resume.get_or_insert(rest);
                }
                // <function> ::= F <args> [_ <return type>]
                Some(b'F') => {
                    self.trim(1);
                    if decl.starts_with(b"*") || decl.starts_with(b"&") {
                        decl.prepend(b"(");
                        decl.append(b")");
                    }
                    self.demangle_nested_args(&mut decl)?;
                    match self.peek() {
                        Some(b'_') => self.trim(1),
                        None => {}
                        Some(_) => return Err(self.mismatch("end of function type expected")),
                    }
                }
                // <member> ::= M <class> [<quals>] F <args> _ <return type>
                Some(b'M') => {
                    self.trim(1);
                    decl.append(b")");
                    decl.prepend(self.scope());
                    match self.peek() {
                        Some(c) if c.is_ascii_digit() => {
                            let n = self.consume_count()?;
                            let class = self.take(n)?;
                            decl.prepend(class);
                        }
                        Some(b'X') | Some(b'Y') => {
                            let mut temp = Buffer::new();
                            match self.do_type(&mut temp) {
                                Ok(_) => decl.prepends(&temp),
                                Err(err) if err.is_fatal() => return Err(err),
                                Err(_) => {}
                            }
                        }
                        Some(b't') => {
                            let mut temp = Buffer::new();
                            self.demangle_template(&mut temp, None, true, true)?;
                            decl.prepends(&temp);
                        }
                        _ => return Err(self.mismatch("member pointer class expected")),
                    }
                    decl.prepend(b"(");

                    let mut quals = TypeQualifiers::empty();
                    if let Some(c @ (b'C' | b'V' | b'u')) = self.peek() {
                        quals |= TypeQualifiers::from_code(c);
                        self.trim(1);
                    }
                    if self.get()? != b'F' {
                        return Err(self.mismatch("member function type expected"));
                    }
                    self.demangle_nested_args(&mut decl)?;
                    self.expect(b"_")?;
                    if self.wants_qualifiers() && !quals.is_empty() {
                        decl.append_blank();
                        decl.append(quals.spelling().as_bytes());
                    }
                }
                Some(b'G') => self.trim(1),
                Some(c @ (b'C' | b'V' | b'u')) => {
                    if self.wants_qualifiers() {
                        if !decl.is_empty() {
                            decl.prepend(b" ");
                        }
                        decl.prepend(TypeQualifiers::from_code(c).spelling().as_bytes());
                    }
                    self.trim(1);
                }
                _ => break,
            }
        }

        match self.peek() {
            Some(b'Q') | Some(b'K') => self.demangle_qualified(result, false, true)?,
            Some(b'B') => {
                self.trim(1);
                let n = self.get_count()?;
                if let Some(ref text) = *self.btypes.get(n)? {
                    result.append(text);
                }
            }
            Some(b'X') | Some(b'Y') => {
                self.trim(1);
                let text = self.template_parm_ref()?;
                result.append(&text);
            }
            _ => {
                let fundamental = self.demangle_fund_type(result)?;
                kind.get_or_insert(fundamental);
            }
        }

        if !decl.is_empty() {
            result.append(b" ");
            result.appends(&decl);
        }
        Ok(kind.unwrap_or(TypeKind::Integral))
    }

    /// `<index> <level>` after an `X`/`Y` code: the substituted argument
    /// or a `T<index>` placeholder.
    pub(crate) fn template_parm_ref(&mut self) -> Result<Vec<u8>> {
        let index = self.consume_count_with_underscores()?;
        let text = self.template_args.substitute(index)?;
        self.consume_count_with_underscores()?;
        Ok(text)
    }

    // <fund type> ::= [C|V|u|U|S|J]* <builtin>
    //             ::= <count> <class name>
    //             ::= t <template>
    pub(crate) fn demangle_fund_type(&mut self, result: &mut Buffer) -> Result<TypeKind> {
        let mut kind = TypeKind::Integral;

        loop {
            match self.peek() {
                Some(c @ (b'C' | b'V' | b'u')) => {
                    if self.wants_qualifiers() {
                        if !result.is_empty() {
                            result.prepend(b" ");
                        }
                        result.prepend(TypeQualifiers::from_code(c).spelling().as_bytes());
                    }
                    self.trim(1);
                }
                Some(b'U') => {
                    self.trim(1);
                    result.append_blank();
                    result.append(b"unsigned");
                }
                Some(b'S') => {
                    self.trim(1);
                    result.append_blank();
                    result.append(b"signed");
                }
                Some(b'J') => {
                    self.trim(1);
                    result.append_blank();
                    result.append(b"__complex");
                }
                _ => break,
            }
        }

        let builtin: &[u8] = match self.peek() {
            // Qualifiers with nothing after them.
            None | Some(b'_') => return Ok(kind),
            Some(b'v') => b"void",
            Some(b'x') => b"long long",
            Some(b'l') => b"long",
            Some(b'i') => b"int",
            Some(b's') => b"short",
            Some(b'b') => {
                kind = TypeKind::Bool;
                b"bool"
            }
            Some(b'c') => {
                kind = TypeKind::Char;
                b"char"
            }
            Some(b'w') => {
                kind = TypeKind::Char;
                b"wchar_t"
            }
            Some(b'r') => {
                kind = TypeKind::Real;
                b"long double"
            }
            Some(b'd') => {
                kind = TypeKind::Real;
                b"double"
            }
            Some(b'f') => {
                kind = TypeKind::Real;
                b"float"
            }
            Some(b'G') | Some(b'I') => {
                if self.peek() == Some(b'G') {
                    self.trim(1);
                    if !self.peek_digit() {
                        return Err(self.mismatch("integer width expected"));
                    }
                }
                self.trim(1);
                let width = self.read_int_width()?;
                result.append_blank();
                result.append(format!("int{}_t", width).as_bytes());
                return Ok(kind);
            }
            Some(c) if c.is_ascii_digit() => {
                let bindex = self.btypes.register();
                let mut btype = Buffer::new();
                self.demangle_class_name(&mut btype)?;
                self.btypes.fill(bindex, btype.to_vec());
                result.append_blank();
                result.appends(&btype);
                return Ok(kind);
            }
            Some(b't') => {
                let mut btype = Buffer::new();
                self.demangle_template(&mut btype, None, true, true)?;
                result.appends(&btype);
                return Ok(kind);
            }
            Some(_) => return Err(self.mismatch("unknown fundamental type")),
        };
        self.trim(1);
        result.append_blank();
        result.append(builtin);
        Ok(kind)
    }

    // <int width> ::= <hex digit> <hex digit>
    //             ::= _ <hex digit>+ _
    fn read_int_width(&mut self) -> Result<u32> {
        let digits = if self.consume(b"_") {
            let len = self.input.iter().take(10).take_while(|&&c| c != b'_').count();
            if len >= 10 || self.peek_at(len) != Some(b'_') {
                return Err(self.mismatch("unterminated integer width"));
            }
            let digits = self.take(len)?;
            self.trim(1);
            digits
        } else {
            let len = self.input.len().min(2);
            self.take(len)?
        };
        let width = digits
            .iter()
            .map_while(|&c| char::from(c).to_digit(16))
            .fold(0u32, |acc, d| acc.saturating_mul(16).saturating_add(d));
        if !(8..=64).contains(&width) {
            return Err(self.fail(
                ErrorKind::StructuralMismatch,
                &format!("integer width {} out of range", width),
            ));
        }
        Ok(width)
    }

    // <arg> ::= n <count> [_]     repeat the previous argument
    //       ::= <type>
    fn do_arg(&mut self, result: &mut Buffer) -> Result<()> {
        if self.repeats.is_pending() {
            let previous = self.repeats.replay()?;
            result.append(&previous);
            return Ok(());
        }

        if self.consume(b"n") {
            let count = self.consume_count()?;
            self.repeats.arm(count)?;
            if count > 9 {
                self.expect(b"_")?;
            }
            return self.do_arg(result);
        }

        let start = self.input;
        self.repeats.forget();
        let mut arg = Buffer::new();
        self.do_type(&mut arg)?;
        result.appends(&arg);
        self.repeats.store(arg.to_vec());
        let mangled = self.consumed_since(start);
        self.remember_type(mangled);
        Ok(())
    }

    // <args> ::= (<arg> | N <count> <index> | T <index>)* [e]
    pub(crate) fn demangle_args(&mut self, declp: &mut Buffer) -> Result<()> {
        let params = self.wants_params();
        if params {
            declp.append(b"(");
            if self.input.is_empty() {
                declp.append(b"void");
            }
        }

        let mut need_comma = false;
        loop {
            let at_end = matches!(self.peek(), None | Some(b'_') | Some(b'e'));
            if at_end && !self.repeats.is_pending() {
                break;
            }

            if let Some(code @ (b'N' | b'T')) = self.peek() {
                self.trim(1);
                let mut repeats = if code == b'N' { self.get_count()? } else { 1 };
                if repeats > MAX_REPEAT {
                    return Err(self.fail(ErrorKind::CountOverflow, "repeat count too large"));
                }
                let index = self.remembered_type_index()?;
                let remembered = *self.types.get(index)?;

                loop {
                    if !self.repeats.is_pending() {
                        if repeats == 0 {
                            break;
                        }
                        repeats -= 1;
                    }
                    if need_comma && params {
                        declp.append(b", ");
                    }
                    let mut arg = Buffer::new();
                    let (parsed, _) = self.parse_detached(remembered, |this| this.do_arg(&mut arg));
                    parsed?;
                    if params {
                        declp.appends(&arg);
                    }
                    need_comma = true;
                }
            } else {
                if need_comma && params {
                    declp.append(b", ");
                }
                let mut arg = Buffer::new();
                self.do_arg(&mut arg)?;
                if params {
                    declp.appends(&arg);
                }
                need_comma = true;
            }
        }

        if self.consume(b"e") && params {
            if need_comma {
                declp.append(b",");
            }
            declp.append(b"...");
        }
        if params {
            declp.append(b")");
        }
        Ok(())
    }

    /// Index of an `N`/`T` back reference. Once ten types are remembered
    /// ARM, HP and EDG spell it as a full count; cfront dialects count
    /// from one.
    fn remembered_type_index(&mut self) -> Result<usize> {
        let wide = matches!(self.style, Style::Hp | Style::Arm | Style::Edg)
            && self.types.len() >= 10;
        let index = if wide {
            self.consume_count()?
        } else {
            self.get_count()?
        };
        if self.style.is_cfront_like() {
            index
                .checked_sub(1)
                .ok_or_else(|| self.fail(ErrorKind::IndexOutOfRange, "type index 0"))
        } else {
            Ok(index)
        }
    }

    /// Argument list of a function or member pointer type. Its types are
    /// not remembered and it starts with an empty repeat cache.
    pub(crate) fn demangle_nested_args(&mut self, declp: &mut Buffer) -> Result<()> {
        self.forgetting_types += 1;
        let saved = mem::take(&mut self.repeats);
        let result = self.demangle_args(declp);
        self.repeats = saved;
        self.forgetting_types -= 1;
        result
    }
}
