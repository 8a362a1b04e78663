//===- signature.rs -------------------------------------------------------===//
//
// This file is dual licensed under the MIT and the University of Illinois Open
// Source Licenses. See LICENSE.TXT for details.
//
//===----------------------------------------------------------------------===//
//
// The top level of a mangled name: special forms (virtual tables, thunks,
// type_info objects, static members, global constructors), the function
// name in front of the first usable `__`, and the signature after it.
//
//===----------------------------------------------------------------------===//

use crate::buffer::Buffer;
use crate::optable;
use crate::state::{find, is_marker, ParserState, TemplateStart, TypeQualifiers};
use crate::{ErrorKind, Result, Style};

impl<'a> ParserState<'a> {
    /// Demangles the whole input.
    pub(crate) fn demangle(mut self) -> Result<String> {
        if self.input.is_empty() {
            return Err(self.fail(ErrorKind::IncompleteInput, "empty symbol"));
        }

        let mut decl = Buffer::new();
        let special = self.style.is_gnu_like() && self.try_gnu_special(&mut decl)?;
        if !special {
            self.demangle_prefix(&mut decl)?;
        }
        if !self.input.is_empty() {
            self.demangle_signature(&mut decl)?;
        }

        if self.constructor == 2 {
            decl.prepend(b"global constructors keyed to ");
        } else if self.destructor == 2 {
            decl.prepend(b"global destructors keyed to ");
        } else if self.dllimported {
            decl.prepend(b"import stub for ");
        }
        decl.into_string()
    }

    /// Runs `gnu_special`, undoing everything it did when the special form
    /// turns out to be malformed. Only running too deep is passed on.
    fn try_gnu_special(&mut self, decl: &mut Buffer) -> Result<bool> {
        let saved = (self.input, self.constructor, self.destructor);
        let tables = (self.types.len(), self.ktypes.len(), self.btypes.len());
        match self.gnu_special(decl) {
            Ok(matched) => Ok(matched),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                trace!("not a GNU special name: {}", err);
                self.input = saved.0;
                self.constructor = saved.1;
                self.destructor = saved.2;
                self.types.truncate(tables.0);
                self.ktypes.truncate(tables.1);
                self.btypes.truncate(tables.2);
                decl.clear();
                Ok(false)
            }
        }
    }

    // <gnu special> ::= _ <marker> _                       destructor
    //               ::= (__vt_ | _vt <marker>) <vtable name>
    //               ::= _ <class> <marker> <variable>       static member
    //               ::= __thunk_ <delta> _ <mangled name>
    //               ::= __t (i | f) <type>                  type_info node/function
    //
    // Returns false when the input has none of these forms.
    fn gnu_special(&mut self, declp: &mut Buffer) -> Result<bool> {
        let m = self.input;
        let at = |i: usize| m.get(i).copied();

        if at(0) == Some(b'_') && at(1).map_or(false, is_marker) && at(2) == Some(b'_') {
            self.trim(3);
            self.destructor += 1;
        } else if m.starts_with(b"__vt_") || (m.starts_with(b"_vt") && at(3).map_or(false, is_marker))
        {
            self.trim(if at(2) == Some(b'v') { 5 } else { 4 });
            self.gnu_vtable(declp)?;
        } else if at(0) == Some(b'_')
            && matches!(at(1), Some(b'0'..=b'9' | b'Q' | b't'))
            && m.iter().any(|&c| is_marker(c))
        {
            self.gnu_static_member(declp)?;
        } else if m.starts_with(b"__thunk_") {
            self.trim(8);
            let delta = self.consume_count()?;
            self.trim(1);
            let target = self.input;
            let method = self
                .demangle_embedded(target)?
                .ok_or_else(|| self.mismatch("thunk target expected"))?;
            declp.append(
                format!("virtual function thunk (delta:{}) for ", -(delta as i64)).as_bytes(),
            );
            declp.append(method.as_bytes());
            self.trim(target.len());
        } else if m.starts_with(b"__t") && matches!(at(3), Some(b'i' | b'f')) {
            let suffix: &[u8] = if at(3) == Some(b'i') {
                b" type_info node"
            } else {
                b" type_info function"
            };
            self.trim(4);
            match self.peek() {
                Some(b'Q') | Some(b'K') => self.demangle_qualified(declp, false, true)?,
                Some(b't') => self.demangle_template(declp, None, true, true)?,
                _ => {
                    self.demangle_fund_type(declp)?;
                }
            }
            if !self.input.is_empty() {
                return Err(self.mismatch("trailing characters after type_info"));
            }
            declp.append(suffix);
        } else {
            return Ok(false);
        }
        Ok(true)
    }

    // <vtable name> ::= <component> (<marker> <component>)*
    // <component>   ::= <qualified> | <template> | <count> <name bytes> | <name bytes>
    fn gnu_vtable(&mut self, declp: &mut Buffer) -> Result<()> {
        while let Some(c) = self.peek() {
            match c {
                b'Q' | b'K' => self.demangle_qualified(declp, false, true)?,
                b't' => self.demangle_template(declp, None, true, true)?,
                b'0'..=b'9' => {
                    let n = self.consume_count()?;
                    // A count running past the end is a static local's
                    // ".<digits>" suffix; the digits are just dropped.
                    if n <= self.input.len() {
                        let name = self.take(n)?;
                        declp.append(name);
                    }
                }
                _ => {
                    let n = self.input.iter().take_while(|&&c| !is_marker(c)).count();
                    let name = self.take(n)?;
                    declp.append(name);
                }
            }
            match self.input.iter().position(|&c| is_marker(c)) {
                None => {}
                Some(0) => {
                    declp.append(self.scope());
                    self.trim(1);
                }
                Some(_) => return Err(self.mismatch("malformed virtual table name")),
            }
        }
        declp.append(b" virtual table");
        Ok(())
    }

    fn gnu_static_member(&mut self, declp: &mut Buffer) -> Result<()> {
        let m = self.input;
        let marker = m
            .iter()
            .position(|&c| is_marker(c))
            .ok_or_else(|| self.mismatch("static member marker expected"))?;
        self.trim(1);
        match self.peek() {
            Some(b'Q') | Some(b'K') => self.demangle_qualified(declp, false, true)?,
            Some(b't') => self.demangle_template(declp, None, true, true)?,
            _ => {
                let n = self.consume_count()?;
                let class = self.take(n)?;
                declp.append(class);
            }
        }
        if m.len() - self.input.len() != marker {
            return Err(self.mismatch("static member name expected"));
        }
        self.trim(1);
        declp.append(self.scope());
        declp.append(self.input);
        self.trim(self.input.len());
        Ok(())
    }

    // <arm vtable> ::= __vtbl__ <count> <name bytes> (__ <count> <name bytes>)*
    //
    // The names are printed innermost last. Nothing is consumed unless the
    // whole input has this form.
    fn arm_special(&mut self, declp: &mut Buffer) -> bool {
        let rest = match self.input.strip_prefix(b"__vtbl__".as_slice()) {
            Some(rest) => rest,
            None => return false,
        };
        let (names, _) = self.parse_detached(rest, |this| -> Result<Vec<(&'a [u8], bool)>> {
            let mut names = Vec::new();
            while !this.input.is_empty() {
                let n = this.consume_count()?;
                let name = this.take(n)?;
                names.push((name, this.consume(b"__")));
            }
            Ok(names)
        });
        let names = match names {
            Ok(names) => names,
            Err(err) => {
                trace!("not an ARM virtual table: {}", err);
                return false;
            }
        };
        for (name, nested) in names {
            declp.prepend(name);
            if nested {
                declp.prepend(b"::");
            }
        }
        declp.append(b" virtual table");
        self.trim(self.input.len());
        true
    }

    /// Consumes everything up to the signature, leaving the function name
    /// (or, for special names, the complete result) in `declp`.
    fn demangle_prefix(&mut self, declp: &mut Buffer) -> Result<()> {
        match self.read_prefix(declp) {
            Err(err) if !err.is_fatal() && (self.constructor == 2 || self.destructor == 2) => {
                trace!("global constructor key kept verbatim: {}", err);
                declp.append(self.input);
                self.trim(self.input.len());
                Ok(())
            }
            result => result,
        }
    }

    fn read_prefix(&mut self, declp: &mut Buffer) -> Result<()> {
        let m = self.input;
        let cfront_globals = matches!(self.style, Style::Arm | Style::Hp | Style::Edg);

        if m.len() > 6 && (m.starts_with(b"_imp__") || m.starts_with(b"__imp_")) {
            self.trim(6);
            self.dllimported = true;
        } else if m.len() >= 11 && m.starts_with(b"_GLOBAL_") && is_marker(m[8]) && m[8] == m[10] {
            let keyed = match m[9] {
                b'D' => Some(&mut self.destructor),
                b'I' => Some(&mut self.constructor),
                _ => None,
            };
            if let Some(counter) = keyed {
                *counter = 2;
                self.trim(11);
                if self.try_gnu_special(declp)? {
                    return Ok(());
                }
            }
        } else if cfront_globals && m.starts_with(b"__std__") {
            self.trim(7);
            self.destructor = 2;
        } else if cfront_globals && m.starts_with(b"__sti__") {
            self.trim(7);
            self.constructor = 2;
        }

        let m = self.input;
        let at = |i: usize| m.get(i).copied();
        // The separator is the last pair of the first run of underscores.
        let scan = match find(m, b"__") {
            Some(s) => {
                let run = m[s..].iter().take_while(|&&c| c == b'_').count();
                s + run - 2
            }
            None => return Err(self.mismatch("no __ separator")),
        };

        if scan == 0 && matches!(at(2), Some(b'0'..=b'9' | b'Q' | b't' | b'K' | b'H')) {
            let local = matches!(self.style, Style::Lucid | Style::Arm | Style::Hp)
                && at(2).map_or(false, |c| c.is_ascii_digit());
            self.trim(2);
            if local {
                // cfront local variable: __<nesting level><name>
                self.consume_count()?;
                declp.append(self.input);
                self.trim(self.input.len());
            } else if !self.style.is_cfront_like() {
                self.constructor += 1;
            }
        } else if self.style == Style::Arm && at(scan + 2) == Some(b'p') && at(scan + 3) == Some(b't')
        {
            self.demangle_arm_hp_template(m.len(), declp)?;
        } else if self.style == Style::Edg
            && matches!(
                (at(scan + 2), at(scan + 3)),
                (Some(b't'), Some(b'm')) | (Some(b'p'), Some(b's')) | (Some(b'p'), Some(b't'))
            )
        {
            self.demangle_arm_hp_template(m.len(), declp)?;
        } else if scan == 0 && !matches!(at(2), Some(b'0'..=b'9' | b't')) {
            if self.style.is_cfront_like() && self.arm_special(declp) {
                return Ok(());
            }
            let skip = m.iter().take_while(|&&c| c == b'_').count();
            let mut q = match find(&m[skip..], b"__") {
                Some(q) if skip + q + 2 < m.len() => skip + q,
                _ => return Err(self.mismatch("no signature after name")),
            };
            if self.style.scans_for_last_separator() {
                while let Some(next) = find(&m[q + 2..], b"__") {
                    q += 2 + next;
                }
            }
            if q + 2 >= m.len() {
                return Err(self.mismatch("empty signature"));
            }
            self.demangle_function_name(declp, q)?;
        } else if at(scan + 2).is_some() {
            self.demangle_function_name(declp, scan)?;
        } else {
            return Err(self.mismatch("empty signature"));
        }
        Ok(())
    }

    /// Moves the name in front of the `__` at `scan` into `declp`,
    /// spelling out operator names.
    fn demangle_function_name(&mut self, declp: &mut Buffer, scan: usize) -> Result<()> {
        let input = self.input;
        let name = &input[..scan];
        declp.append(name);
        self.trim(scan + 2);

        if self.style == Style::Hp && self.peek() == Some(b'X') {
            self.demangle_arm_hp_template(0, declp)?;
        }

        let decl = declp.to_vec();
        if self.style.is_cfront_like() {
            // The class name only shows up in the signature.
            if decl == b"__ct" {
                self.constructor += 1;
                declp.clear();
                return Ok(());
            } else if decl == b"__dt" {
                self.destructor += 1;
                declp.clear();
                return Ok(());
            }
        }

        if let Some(spelled) = self.operator_name(&decl, name)? {
            declp.clear();
            declp.append(&spelled);
        }
        Ok(())
    }

    // <operator> ::= op <marker> [assign_] <old token>
    //            ::= type <marker> <type>               conversion
    //            ::= __op <type>                        conversion
    //            ::= __ <ansi token>
    //            ::= __a <ansi token>                   assignment
    //
    // `None` leaves the name as it is.
    fn operator_name(&mut self, decl: &[u8], name: &'a [u8]) -> Result<Option<Vec<u8>>> {
        let token = |op: &optable::Operator| format!("operator{}", op.spelling).into_bytes();

        if decl.len() >= 3 && decl.starts_with(b"op") && is_marker(decl[2]) {
            if decl.len() >= 10 && &decl[3..10] == b"assign_" {
                Ok(optable::lookup(&decl[10..]).map(|op| {
                    let mut spelled = token(op);
                    spelled.push(b'=');
                    spelled
                }))
            } else {
                Ok(optable::lookup(&decl[3..]).map(token))
            }
        } else if decl.len() >= 5 && decl.starts_with(b"type") && is_marker(decl[4]) {
            match name.get(5..) {
                Some(mangled) => self.conversion_operator(mangled),
                None => Ok(None),
            }
        } else if decl.starts_with(b"__op") {
            match name.get(4..) {
                Some(mangled) => self.conversion_operator(mangled),
                None => Ok(None),
            }
        } else if decl.len() >= 4
            && decl.starts_with(b"__")
            && decl[2].is_ascii_lowercase()
            && decl[3].is_ascii_lowercase()
        {
            Ok(match decl.len() {
                4 => optable::lookup_ansi(&decl[2..]).map(token),
                5 if decl[2] == b'a' => optable::lookup_ansi(&decl[2..]).map(token),
                _ => None,
            })
        } else {
            Ok(None)
        }
    }

    fn conversion_operator(&mut self, mangled: &'a [u8]) -> Result<Option<Vec<u8>>> {
        let mut ty = Buffer::new();
        let (parsed, _) = self.parse_detached(mangled, |this| this.do_type(&mut ty));
        match parsed {
            Ok(_) => {
                let mut spelled = b"operator ".to_vec();
                spelled.extend(ty.to_vec());
                Ok(Some(spelled))
            }
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                trace!("conversion operator left as is: {}", err);
                Ok(None)
            }
        }
    }

    // <signature> ::= (<class> | <qualified> | <template> | <qualifier> | S
    //                 | F <args> | B <type> | H <template> | _ <return type>)*
    //
    // GNU names imply the argument list after a class; cfront names mark
    // it with F.
    fn demangle_signature(&mut self, declp: &mut Buffer) -> Result<()> {
        let mut func_done = false;
        let mut expect_func = false;
        let mut expect_return_type = false;
        // Start of the class type being read, including any qualifiers
        // seen in front of it.
        let mut oldmangled: Option<&'a [u8]> = None;

        while let Some(c) = self.peek() {
            match c {
                b'Q' => {
                    let start = self.input;
                    self.demangle_qualified(declp, true, false)?;
                    self.remember_type(self.consumed_since(start));
                    expect_func |= self.style.is_gnu_like();
                    oldmangled = None;
                }
                b'K' => {
                    self.demangle_qualified(declp, true, false)?;
                    expect_func |= self.style.is_gnu_like();
                    oldmangled = None;
                }
                b'S' => {
                    oldmangled.get_or_insert(self.input);
                    self.trim(1);
                    self.static_type = true;
                }
                b'C' | b'V' | b'u' => {
                    self.type_quals |= TypeQualifiers::from_code(c);
                    oldmangled.get_or_insert(self.input);
                    self.trim(1);
                }
                b'L' => {
                    if self.style != Style::Hp {
                        return Err(self.fail(ErrorKind::UnsupportedForm, "L outside HP names"));
                    }
                    match self.input.iter().position(|&c| c == b'_') {
                        Some(end) => self.trim(end + 1),
                        None => return Err(self.mismatch("end of local name expected")),
                    }
                }
                b'0'..=b'9' => {
                    let start = *oldmangled.get_or_insert(self.input);
                    self.temp_start = TemplateStart::Pending;
                    self.demangle_class(declp)?;
                    self.remember_type(self.consumed_since(start));
                    if matches!(self.style, Style::Auto | Style::Gnu | Style::Edg)
                        && self.peek() != Some(b'F')
                    {
                        expect_func = true;
                    }
                    oldmangled = None;
                }
                b'B' => {
                    let mut s = Buffer::new();
                    self.do_type(&mut s)?;
                    s.append(self.scope());
                    declp.prepends(&s);
                    oldmangled = None;
                    expect_func = true;
                }
                b'F' => {
                    oldmangled = None;
                    func_done = true;
                    self.trim(1);
                    // cfront numbers argument types only.
                    if self.style.is_cfront_like() {
                        self.forget_types();
                    }
                    self.demangle_args(declp)?;
                    if self.style.has_trailing_return_type() && self.peek() == Some(b'_') {
                        self.trim(1);
                        let mut return_type = Buffer::new();
                        self.do_type(&mut return_type)?;
                    }
                }
                b't' => {
                    let start = *oldmangled.get_or_insert(self.input);
                    let mut tname = Buffer::new();
                    let mut trawname = Buffer::new();
                    self.demangle_template(&mut tname, Some(&mut trawname), true, true)?;
                    self.remember_type(self.consumed_since(start));
                    tname.append(self.scope());
                    declp.prepends(&tname);
                    if self.destructor & 1 == 1 {
                        trawname.prepend(b"~");
                        declp.appends(&trawname);
                        self.destructor -= 1;
                    }
                    if self.constructor & 1 == 1 || self.destructor & 1 == 1 {
                        declp.appends(&trawname);
                        self.constructor = self.constructor.saturating_sub(1);
                    }
                    oldmangled = None;
                    expect_func = true;
                }
                b'_' => {
                    if self.style == Style::Gnu && expect_return_type {
                        self.trim(1);
                        let mut return_type = Buffer::new();
                        self.do_type(&mut return_type)?;
                        return_type.append_blank();
                        declp.prepends(&return_type);
                    } else if self.style == Style::Hp {
                        // HP alternate entry point: _<digits>
                        self.trim(1);
                        let digits = self.input.iter().take_while(|c| c.is_ascii_digit()).count();
                        self.trim(digits);
                    } else {
                        return Err(self.mismatch("unexpected return type"));
                    }
                }
                b'H' if self.style == Style::Gnu => {
                    self.demangle_template(declp, None, false, false)?;
                    if self.constructor & 1 == 0 {
                        expect_return_type = true;
                    }
                    self.trim(1);
                }
                _ => {
                    if !self.style.is_gnu_like() {
                        return Err(self.mismatch("F expected before arguments"));
                    }
                    // The first argument of an implied argument list.
                    func_done = true;
                    self.demangle_args(declp)?;
                }
            }

            if expect_func {
                func_done = true;
                if matches!(self.style, Style::Lucid | Style::Arm | Style::Edg) {
                    self.forget_types();
                }
                self.demangle_args(declp)?;
                expect_func = false;
            }
        }

        // GNU: bar__3foo is foo::bar(void). For cfront it is a static data
        // member and stays as it is.
        if !func_done && self.style.is_gnu_like() {
            self.demangle_args(declp)?;
        }

        if self.wants_params() {
            if self.static_type {
                declp.append(b" static");
            }
            if !self.type_quals.is_empty() {
                declp.append_blank();
                declp.append(self.type_quals.spelling().as_bytes());
            }
        }
        Ok(())
    }
}
