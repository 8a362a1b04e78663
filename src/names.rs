//===- names.rs -----------------------------------------------------------===//
//
// This file is dual licensed under the MIT and the University of Illinois Open
// Source Licenses. See LICENSE.TXT for details.
//
//===----------------------------------------------------------------------===//

use crate::buffer::Buffer;
use crate::state::{find, is_marker, ParserState, TemplateStart};
use crate::{ErrorKind, Result, Style};

impl<'a> ParserState<'a> {
    // <class name> ::= <count> <name bytes>
    pub(crate) fn demangle_class_name(&mut self, declp: &mut Buffer) -> Result<()> {
        let n = self.consume_count()?;
        if n > self.input.len() {
            return Err(self.fail(ErrorKind::IncompleteInput, "class name runs past the end"));
        }
        self.demangle_arm_hp_template(n, declp)
    }

    /// Demangles a class name in front of `declp`, the member being
    /// declared. A pending constructor or destructor repeats the class
    /// name, without template arguments, as the member name.
    pub(crate) fn demangle_class(&mut self, declp: &mut Buffer) -> Result<()> {
        let mut class_name = Buffer::new();
        let bindex = self.btypes.register();
        self.demangle_class_name(&mut class_name)?;
        let class_bytes = class_name.to_vec();

        if self.constructor & 1 == 1 || self.destructor & 1 == 1 {
            let visible = match self.temp_start {
                TemplateStart::At(n) if n > 0 => &class_bytes[..n.min(class_bytes.len())],
                _ => &class_bytes[..],
            };
            declp.prepend(visible);
            if self.destructor & 1 == 1 {
                declp.prepend(b"~");
                self.destructor -= 1;
            } else {
                self.constructor -= 1;
            }
        }

        self.ktypes.push(class_bytes.clone());
        self.btypes.fill(bindex, class_bytes);
        declp.prepend(self.scope());
        declp.prepends(&class_name);
        Ok(())
    }

    // <qualified> ::= Q <digit> [_] <component>+
    //             ::= Q _ <count> _ <component>+
    //             ::= K <index>
    //
    // <component> ::= t <template> | K <index> | <type>
    pub(crate) fn demangle_qualified(
        &mut self,
        result: &mut Buffer,
        isfuncname: bool,
        append: bool,
    ) -> Result<()> {
        let bindex = self.btypes.register();
        let isfuncname = isfuncname && (self.constructor & 1 == 1 || self.destructor & 1 == 1);
        let mut temp = Buffer::new();
        let mut last_name = Buffer::new();

        let mut qualifiers = 0;
        if self.consume(b"K") {
            let index = self.consume_count_with_underscores()?;
            temp.append(self.ktypes.get(index)?);
        } else {
            match self.peek_at(1) {
                Some(b'_') => {
                    self.trim(2);
                    if !self.peek_digit() || self.peek() == Some(b'0') {
                        return Err(self.mismatch("qualifier count expected"));
                    }
                    qualifiers = self.consume_count()?;
                    self.expect(b"_")?;
                }
                Some(c @ b'1'..=b'9') => {
                    qualifiers = usize::from(c - b'0');
                    self.trim(2);
                    self.consume(b"_");
                }
                _ => return Err(self.mismatch("qualifier count expected")),
            }
        }
        if qualifiers > self.input.len() {
            return Err(self.fail(ErrorKind::IncompleteInput, "too few qualified name components"));
        }

        while qualifiers > 0 {
            qualifiers -= 1;
            let mut remember_k = true;
            last_name.clear();

            self.consume(b"_");
            if self.peek() == Some(b't') {
                self.demangle_template(&mut temp, Some(&mut last_name), true, false)?;
            } else if self.consume(b"K") {
                let index = self.consume_count_with_underscores()?;
                temp.append(self.ktypes.get(index)?);
                remember_k = false;
            } else if self.style == Style::Edg {
                let len = self.consume_count()?;
                self.append_embedded(&mut temp, len)?;
            } else {
                self.do_type(&mut last_name)?;
                temp.appends(&last_name);
            }

            if remember_k {
                self.ktypes.push(temp.to_vec());
            }
            if qualifiers > 0 {
                temp.append(self.scope());
            }
        }

        self.btypes.fill(bindex, temp.to_vec());

        if isfuncname {
            temp.append(self.scope());
            if self.destructor & 1 == 1 {
                temp.append(b"~");
            }
            temp.appends(&last_name);
        }

        if append {
            result.appends(&temp);
        } else {
            if !result.is_empty() {
                temp.append(self.scope());
            }
            result.prepends(&temp);
        }
        Ok(())
    }

    /// Looks for a cfront template anchor inside the `n` byte class name at
    /// the cursor. Returns the length of the plain name and the offset of
    /// the first argument.
    fn arm_pt(&self, n: usize) -> Option<(usize, usize)> {
        let mangled = self.input;
        let check = |anchor: usize, skip: usize| -> Option<(usize, usize)> {
            let mut args = anchor + skip;
            let digits = mangled[args..].iter().take_while(|c| c.is_ascii_digit()).count();
            if digits == 0 {
                return None;
            }
            let len = std::str::from_utf8(&mangled[args..args + digits])
                .ok()?
                .parse::<u32>()
                .ok()? as usize;
            args += digits;
            if args.checked_add(len)? == n && mangled.get(args) == Some(&b'_') {
                Some((anchor, args + 1))
            } else {
                None
            }
        };

        if matches!(self.style, Style::Arm | Style::Hp) {
            if let Some(anchor) = find(mangled, b"__pt__") {
                return check(anchor, 6);
            }
        }
        if matches!(self.style, Style::Auto | Style::Edg) {
            let anchor = find(mangled, b"__tm__")
                .or_else(|| find(mangled, b"__ps__"))
                .or_else(|| find(mangled, b"__pt__"));
            if let Some(anchor) = anchor {
                return check(anchor, 6);
            }
            if let Some(anchor) = find(mangled, b"__S") {
                return check(anchor, 3);
            }
        }
        None
    }

    /// Demangles the `n` byte class name at the cursor, which may be a
    /// cfront or HP template instantiation, into `declp`. Malformed
    /// template arguments end the argument list early.
    pub(crate) fn demangle_arm_hp_template(&mut self, n: usize, declp: &mut Buffer) -> Result<()> {
        let whole = self.input;

        if self.style == Style::Hp && whole.get(n) == Some(&b'X') {
            let name_len = match whole.iter().position(|&c| c == b'<') {
                Some(open) if open < n => open,
                _ => n,
            };
            declp.append(&whole[..name_len]);
            self.trim(n + 1);

            if self.temp_start == TemplateStart::Pending {
                self.temp_start = TemplateStart::At(declp.len());
            }
            declp.append(b"<");
            loop {
                let mut arg = Buffer::new();
                let parsed = match self.peek() {
                    Some(b'T') => {
                        self.trim(1);
                        self.do_type(&mut arg).map(|_| ())
                    }
                    Some(b'U') | Some(b'S') => self.do_hpacc_template_const_value(&mut arg),
                    Some(b'A') => self.do_hpacc_template_literal(&mut arg),
                    _ => break,
                };
                match parsed {
                    Ok(()) => {}
                    Err(err) if err.is_fatal() => return Err(err),
                    Err(_) => break,
                }
                declp.appends(&arg);
                if matches!(self.peek(), None | Some(b'_')) {
                    break;
                }
                declp.append(b",");
            }
            declp.append(b">");
            self.consume(b"_");
            return Ok(());
        }

        if let Some((name_len, args)) = self.arm_pt(n) {
            declp.append(&whole[..name_len]);
            if self.temp_start == TemplateStart::Pending {
                self.temp_start = TemplateStart::At(declp.len());
            }
            declp.append(b"<");

            // Arguments are parsed in place; only their start must stay
            // inside the class name.
            let (end, _) = self.parse_detached(&whole[args..], |this| -> Result<usize> {
                let position = |this: &Self| whole.len().saturating_sub(this.input.len());
                while position(this) < n {
                    let before = position(this);
                    let mut arg = Buffer::new();
                    match this.read_arm_template_arg(&mut arg) {
                        Err(err) if err.is_fatal() => return Err(err),
                        Err(_) => break,
                        Ok(()) if position(this) == before => break,
                        Ok(()) => {}
                    }
                    declp.appends(&arg);
                    declp.append(b",");
                }
                Ok(position(this))
            });
            if end? >= n {
                declp.pop();
            }
            declp.append(b">");
        } else if n > 10
            && whole.starts_with(b"_GLOBAL_")
            && whole[9] == b'N'
            && whole[8] == whole[10]
            && is_marker(whole[8])
        {
            declp.append(b"{anonymous}");
        } else {
            if self.temp_start == TemplateStart::Pending {
                self.temp_start = TemplateStart::Unknown;
            }
            declp.append(&whole[..n]);
        }
        self.trim(n);
        Ok(())
    }

    // <arm arg> ::= X <type> L <literal>
    //           ::= L <literal>
    //           ::= <type>
    fn read_arm_template_arg(&mut self, arg: &mut Buffer) -> Result<()> {
        if self.consume(b"X") {
            let mut type_str = Buffer::new();
            self.do_type(&mut type_str)?;
            arg.append(b"(");
            arg.appends(&type_str);
            arg.append(b")");
            self.expect(b"L")?;
            self.snarf_numeric_literal(arg)
        } else if self.consume(b"L") {
            self.snarf_numeric_literal(arg)
        } else {
            self.do_type(arg).map(|_| ())
        }
    }
}
