//===- templates.rs -------------------------------------------------------===//
//
// This file is dual licensed under the MIT and the University of Illinois Open
// Source Licenses. See LICENSE.TXT for details.
//
//===----------------------------------------------------------------------===//
//
// GNU templates and the literal grammars of template value parameters,
// including the HP aCC and cfront literal forms.
//
//===----------------------------------------------------------------------===//

use crate::buffer::Buffer;
use crate::optable;
use crate::state::ParserState;
use crate::types::TypeKind;
use crate::{DemangleFlags, ErrorKind, Result};

impl<'a> ParserState<'a> {
    // <template> ::= t <name> <count> <arg>*      type template
    //            ::= H <count> <arg>*             function template
    //
    // <name> ::= <count> <name bytes>
    //        ::= z <code> <index> <level>         template template parameter
    //
    // <arg> ::= Z <type>
    //       ::= z <template template parm> [<count> <name bytes>]
    //       ::= <type> <value>
    //
    // The full name goes to `tname`, the bare name to `trawname`. Only type
    // templates are remembered, and only when `remember` is set.
    pub(crate) fn demangle_template(
        &mut self,
        tname: &mut Buffer,
        mut trawname: Option<&mut Buffer>,
        is_type: bool,
        remember: bool,
    ) -> Result<()> {
        self.descend()?;
        let result = self.read_template(tname, &mut trawname, is_type, remember);
        self.ascend();
        result
    }

    fn read_template(
        &mut self,
        tname: &mut Buffer,
        trawname: &mut Option<&mut Buffer>,
        is_type: bool,
        remember: bool,
    ) -> Result<()> {
        self.trim(1);
        let mut bindex = None;
        let mut is_java_array = false;

        if is_type {
            if remember {
                bindex = Some(self.btypes.register());
            }
            if self.peek() == Some(b'z') {
                self.trim(2);
                let name = self.template_parm_ref()?;
                tname.append(&name);
                if let Some(raw) = trawname.as_deref_mut() {
                    raw.append(&name);
                }
            } else {
                let r = self.consume_count()?;
                if r == 0 {
                    return Err(self.mismatch("empty template name"));
                }
                // The marker runs past the counted name into the arguments.
                let rest = self.input;
                let name = self.take(r)?;
                is_java_array =
                    self.flags.contains(DemangleFlags::JAVA) && rest.starts_with(b"JArray1Z");
                if !is_java_array {
                    tname.append(name);
                }
                if let Some(raw) = trawname.as_deref_mut() {
                    raw.append(name);
                }
            }
        }

        if !is_java_array {
            tname.append(b"<");
        }
        let r = self.get_count()?;
        if r == 0 {
            return Err(self.mismatch("template without arguments"));
        }
        if r > self.input.len() {
            return Err(self.fail(ErrorKind::IncompleteInput, "too few template arguments"));
        }
        if !is_type {
            self.template_args.start(r);
        }

        for i in 0..r {
            if i > 0 {
                tname.append(b", ");
            }
            if self.consume(b"Z") {
                let mut temp = Buffer::new();
                self.do_type(&mut temp)?;
                tname.appends(&temp);
                if !is_type {
                    self.template_args.set(i, temp.to_vec());
                }
            } else if self.consume(b"z") {
                self.demangle_template_template_parm(tname)?;
                match self.consume_count() {
                    Ok(r2) if r2 > 0 && r2 <= self.input.len() => {
                        let name = self.take(r2)?;
                        tname.append(b" ");
                        tname.append(name);
                        if !is_type {
                            self.template_args.set(i, name.to_vec());
                        }
                    }
                    _ => {}
                }
            } else {
                let mut temp = Buffer::new();
                let kind = self.do_type(&mut temp)?;
                if is_type {
                    self.demangle_template_value_parm(tname, kind)?;
                } else {
                    let mut param = Buffer::new();
                    self.demangle_template_value_parm(&mut param, kind)?;
                    self.template_args.set(i, param.to_vec());
                    tname.appends(&param);
                }
            }
        }

        if is_java_array {
            tname.append(b"[]");
        } else {
            tname.append(b">");
        }
        if let Some(bindex) = bindex {
            self.btypes.fill(bindex, tname.to_vec());
        }
        Ok(())
    }

    // <template template parm> ::= <count> (Z | z <template template parm> | <type>)*
    //
    // Printed as "template <class, ...> class".
    fn demangle_template_template_parm(&mut self, tname: &mut Buffer) -> Result<()> {
        self.descend()?;
        let result = self.read_template_template_parm(tname);
        self.ascend();
        result
    }

    fn read_template_template_parm(&mut self, tname: &mut Buffer) -> Result<()> {
        tname.append(b"template <");
        if let Ok(r) = self.get_count() {
            if r > self.input.len() {
                return Err(self.fail(ErrorKind::IncompleteInput, "too few template parameters"));
            }
            for i in 0..r {
                if i > 0 {
                    tname.append(b", ");
                }
                if self.consume(b"Z") {
                    tname.append(b"class");
                } else if self.consume(b"z") {
                    self.demangle_template_template_parm(tname)?;
                } else {
                    let mut temp = Buffer::new();
                    self.do_type(&mut temp)?;
                    tname.appends(&temp);
                }
            }
        }
        tname.append(b"> class");
        Ok(())
    }

    // <integral> ::= E <value> (<operator> <value>)* W
    //            ::= <qualified>
    //            ::= [m] <digit>+
    fn demangle_integral_value(&mut self, s: &mut Buffer) -> Result<()> {
        self.descend()?;
        let result = self.read_integral_value(s);
        self.ascend();
        result
    }

    fn read_integral_value(&mut self, s: &mut Buffer) -> Result<()> {
        match self.peek() {
            Some(b'E') => {
                self.trim(1);
                s.append(b"(");
                let mut need_operator = false;
                while !matches!(self.peek(), None | Some(b'W')) {
                    if need_operator {
                        let op = optable::lookup_prefix(self.input)
                            .ok_or_else(|| self.mismatch("operator expected"))?;
                        s.append(b" ");
                        s.append(op.spelling.as_bytes());
                        s.append(b" ");
                        self.trim(op.mangled.len());
                    } else {
                        need_operator = true;
                    }
                    self.demangle_template_value_parm(s, TypeKind::Integral)?;
                }
                self.expect(b"W")?;
                s.append(b")");
                Ok(())
            }
            Some(b'Q') | Some(b'K') => self.demangle_qualified(s, false, true),
            _ => {
                if self.consume(b"m") {
                    s.append(b"-");
                }
                if !self.peek_digit() {
                    return Err(self.mismatch("integral value expected"));
                }
                self.copy_digits(s);
                Ok(())
            }
        }
    }

    fn copy_digits(&mut self, s: &mut Buffer) {
        let len = self.input.iter().take_while(|c| c.is_ascii_digit()).count();
        s.append(&self.input[..len]);
        self.trim(len);
    }

    /// The literal of a template value parameter whose type has kind
    /// `kind`, or a `Y` reference to another template parameter.
    pub(crate) fn demangle_template_value_parm(
        &mut self,
        s: &mut Buffer,
        kind: TypeKind,
    ) -> Result<()> {
        if self.consume(b"Y") {
            let text = self.template_parm_ref()?;
            s.append(&text);
            return Ok(());
        }

        match kind {
            TypeKind::Integral => self.demangle_integral_value(s)?,
            TypeKind::Char => {
                if self.consume(b"m") {
                    s.append(b"-");
                }
                s.append(b"'");
                let val = self.consume_count()?;
                if val == 0 {
                    return Err(self.mismatch("character value expected"));
                }
                // Only the low byte names the character.
                let c = char::from(val as u8);
                s.append(c.encode_utf8(&mut [0; 4]).as_bytes());
                s.append(b"'");
            }
            TypeKind::Bool => match self.consume_count()? {
                0 => s.append(b"false"),
                1 => s.append(b"true"),
                _ => return Err(self.mismatch("boolean value expected")),
            },
            TypeKind::Real => {
                if self.consume(b"m") {
                    s.append(b"-");
                }
                self.copy_digits(s);
                if self.consume(b".") {
                    s.append(b".");
                    self.copy_digits(s);
                }
                if self.consume(b"e") {
                    s.append(b"e");
                    self.copy_digits(s);
                }
            }
            TypeKind::Pointer | TypeKind::Reference => {
                if self.peek() == Some(b'Q') {
                    self.demangle_qualified(s, false, true)?;
                } else {
                    let len = self.consume_count()?;
                    if len == 0 {
                        s.append(b"0");
                    } else {
                        if len > self.input.len() {
                            return Err(self.fail(
                                ErrorKind::IncompleteInput,
                                "constant name runs past the end",
                            ));
                        }
                        if kind == TypeKind::Pointer {
                            s.append(b"&");
                        }
                        self.append_embedded(s, len)?;
                    }
                }
            }
        }
        Ok(())
    }

    // HP aCC: <const value> ::= (U | S) (N | P) <digit>+ | (U | S) M
    pub(crate) fn do_hpacc_template_const_value(&mut self, result: &mut Buffer) -> Result<()> {
        let unsigned_const = match self.get()? {
            b'U' => true,
            b'S' => false,
            _ => return Err(self.mismatch("constant expected")),
        };
        match self.get()? {
            b'N' => result.append(b"-"),
            b'P' => {}
            b'M' => {
                result.append(b"-2147483648");
                return Ok(());
            }
            _ => return Err(self.mismatch("sign expected")),
        }
        if !self.peek_digit() {
            return Err(self.mismatch("digits expected"));
        }
        self.copy_digits(result);
        if unsigned_const {
            result.append(b"U");
        }
        Ok(())
    }

    // HP aCC: <literal> ::= A <count> <mangled name>
    pub(crate) fn do_hpacc_template_literal(&mut self, result: &mut Buffer) -> Result<()> {
        self.expect(b"A")?;
        let len = self.consume_count()?;
        if len == 0 {
            return Err(self.mismatch("literal name expected"));
        }
        if len > self.input.len() {
            return Err(self.fail(ErrorKind::IncompleteInput, "literal runs past the end"));
        }
        result.append(b"&");
        self.append_embedded(result, len)
    }

    // cfront: <numeric literal> ::= [-|+] <digit>+
    pub(crate) fn snarf_numeric_literal(&mut self, arg: &mut Buffer) -> Result<()> {
        if self.consume(b"-") {
            arg.append(b"-");
        } else {
            self.consume(b"+");
        }
        if !self.peek_digit() {
            return Err(self.mismatch("numeric literal expected"));
        }
        self.copy_digits(arg);
        Ok(())
    }
}
