//! Textual IR parsing.
//!
//! One module per input, `;` line comments. The grammar mirrors what the
//! printer in `memtrace-ir` emits:
//!
//! ```text
//! layout p64
//!
//! declare @malloc(i64) -> i8*
//!
//! fn @main() -> i32 {
//! entry:
//!     %p = call i8* @malloc(i64 16)
//!     %q = ptrcast i8* %p to i32*
//!     store i32 5, i32* %q, !line 7
//!     %x = load i32, i32* %q, !line 8
//!     ret i32 %x
//! }
//! ```

use memtrace_ir::{
    BinOp, Callee, Constant, DataLayout, FuncDecl, Function, FunctionBuilder, IcmpPred, Instr,
    InstrKind, Module, Param, Terminator, Type, Value,
};
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

/// Parse failure, positioned by source line.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("line {line}: unexpected character '{found}'")]
    UnexpectedChar { line: u32, found: char },
    #[error("line {line}: unexpected {found}, expected {expected}")]
    Unexpected {
        line: u32,
        found: String,
        expected: &'static str,
    },
    #[error("line {line}: unknown value '%{name}'")]
    UnknownValue { line: u32, name: String },
    #[error("line {line}: value '%{name}' is defined twice")]
    DuplicateValue { line: u32, name: String },
    #[error("line {line}: label '{label}' is defined twice")]
    DuplicateLabel { line: u32, label: String },
    #[error("line {line}: unknown label '{label}'")]
    UnknownLabel { line: u32, label: String },
    #[error("line {line}: integer literal out of range")]
    IntOutOfRange { line: u32 },
    #[error("unexpected end of input")]
    UnexpectedEof,
}

/// Parse a textual module.
pub fn parse_module(source: &str) -> Result<Module, ParseError> {
    let toks = Scanner::new(source).scan()?;
    Parser { toks, pos: 0 }.module()
}

// ===== Scanner =====

#[derive(Clone, Debug, PartialEq, Eq)]
enum Token {
    Ident(String),
    Global(String),
    Local(String),
    Int(i64),
    LParen,
    RParen,
    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Comma,
    Colon,
    Equals,
    Star,
    Arrow,
    Bang,
}

fn describe(token: &Token) -> String {
    match token {
        Token::Ident(word) => format!("'{word}'"),
        Token::Global(name) => format!("'@{name}'"),
        Token::Local(name) => format!("'%{name}'"),
        Token::Int(value) => format!("'{value}'"),
        Token::LParen => "'('".to_string(),
        Token::RParen => "')'".to_string(),
        Token::LBrace => "'{'".to_string(),
        Token::RBrace => "'}'".to_string(),
        Token::LBracket => "'['".to_string(),
        Token::RBracket => "']'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Colon => "':'".to_string(),
        Token::Equals => "'='".to_string(),
        Token::Star => "'*'".to_string(),
        Token::Arrow => "'->'".to_string(),
        Token::Bang => "'!'".to_string(),
    }
}

#[derive(Clone, Debug)]
struct Tok {
    token: Token,
    line: u32,
}

struct Scanner {
    source: Vec<char>,
    pos: usize,
    line: u32,
}

impl Scanner {
    fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            line: 1,
        }
    }

    fn scan(mut self) -> Result<Vec<Tok>, ParseError> {
        let mut toks = Vec::new();
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\r' => {
                    self.pos += 1;
                }
                '\n' => {
                    self.pos += 1;
                    self.line += 1;
                }
                ';' => {
                    while self.peek().is_some_and(|c| c != '\n') {
                        self.pos += 1;
                    }
                }
                '(' => toks.push(self.single(Token::LParen)),
                ')' => toks.push(self.single(Token::RParen)),
                '{' => toks.push(self.single(Token::LBrace)),
                '}' => toks.push(self.single(Token::RBrace)),
                '[' => toks.push(self.single(Token::LBracket)),
                ']' => toks.push(self.single(Token::RBracket)),
                ',' => toks.push(self.single(Token::Comma)),
                ':' => toks.push(self.single(Token::Colon)),
                '=' => toks.push(self.single(Token::Equals)),
                '*' => toks.push(self.single(Token::Star)),
                '!' => toks.push(self.single(Token::Bang)),
                '@' => {
                    self.pos += 1;
                    let name = self.name_chars();
                    toks.push(self.spanned(Token::Global(name)));
                }
                '%' => {
                    self.pos += 1;
                    let name = self.name_chars();
                    toks.push(self.spanned(Token::Local(name)));
                }
                '-' => {
                    self.pos += 1;
                    match self.peek() {
                        Some('>') => {
                            self.pos += 1;
                            toks.push(self.spanned(Token::Arrow));
                        }
                        Some(c) if c.is_ascii_digit() => {
                            let value = self.number(true)?;
                            toks.push(self.spanned(Token::Int(value)));
                        }
                        _ => {
                            return Err(ParseError::UnexpectedChar {
                                line: self.line,
                                found: '-',
                            });
                        }
                    }
                }
                c if c.is_ascii_digit() => {
                    let value = self.number(false)?;
                    toks.push(self.spanned(Token::Int(value)));
                }
                c if c.is_ascii_alphabetic() || c == '_' => {
                    let word = self.name_chars();
                    toks.push(self.spanned(Token::Ident(word)));
                }
                other => {
                    return Err(ParseError::UnexpectedChar {
                        line: self.line,
                        found: other,
                    });
                }
            }
        }
        Ok(toks)
    }

    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn single(&mut self, token: Token) -> Tok {
        self.pos += 1;
        self.spanned(token)
    }

    fn spanned(&self, token: Token) -> Tok {
        Tok {
            token,
            line: self.line,
        }
    }

    fn name_chars(&mut self) -> String {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            self.pos += 1;
        }
        self.source[start..self.pos].iter().collect()
    }

    fn number(&mut self, negative: bool) -> Result<i64, ParseError> {
        let digits = self.name_chars();
        let parsed = if let Some(hex) = digits.strip_prefix("0x").or_else(|| digits.strip_prefix("0X")) {
            u64::from_str_radix(hex, 16).ok().map(|bits| bits as i64)
        } else {
            digits.parse::<i64>().ok()
        };
        let Some(value) = parsed else {
            return Err(ParseError::IntOutOfRange { line: self.line });
        };
        if negative {
            value
                .checked_neg()
                .ok_or(ParseError::IntOutOfRange { line: self.line })
        } else {
            Ok(value)
        }
    }
}

// ===== Parser =====

enum PendingTerm {
    Ret(Option<Value>),
    Br(String),
    CondBr {
        cond: Value,
        then_label: String,
        else_label: String,
    },
}

struct Parser {
    toks: Vec<Tok>,
    pos: usize,
}

impl Parser {
    fn module(&mut self) -> Result<Module, ParseError> {
        let mut module = Module::new(DataLayout::P64);
        if self.check_keyword("layout") {
            self.pos += 1;
            module.layout = self.layout()?;
        }
        loop {
            match self.peek() {
                None => break,
                Some(Token::Ident(word)) if word == "declare" => {
                    self.pos += 1;
                    let decl = self.declaration()?;
                    module.declare(decl);
                }
                Some(Token::Ident(word)) if word == "fn" => {
                    self.pos += 1;
                    let function = self.function()?;
                    module.add_function(function);
                }
                Some(token) => {
                    return Err(ParseError::Unexpected {
                        line: self.line(),
                        found: describe(token),
                        expected: "'declare' or 'fn'",
                    });
                }
            }
        }
        Ok(module)
    }

    fn layout(&mut self) -> Result<DataLayout, ParseError> {
        let (word, line) = self.expect_ident("'p32' or 'p64'")?;
        match word.as_str() {
            "p32" => Ok(DataLayout::P32),
            "p64" => Ok(DataLayout::P64),
            _ => Err(ParseError::Unexpected {
                line,
                found: format!("'{word}'"),
                expected: "'p32' or 'p64'",
            }),
        }
    }

    fn declaration(&mut self) -> Result<FuncDecl, ParseError> {
        let (name, _) = self.expect_global()?;
        self.expect(&Token::LParen, "'('")?;
        let mut params = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                params.push(self.ty()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(&Token::RParen, "')'")?;
        self.expect(&Token::Arrow, "'->'")?;
        let ret = self.ty()?;
        Ok(FuncDecl::new(&name, params, ret))
    }

    fn function(&mut self) -> Result<Function, ParseError> {
        let (name, _) = self.expect_global()?;
        self.expect(&Token::LParen, "'('")?;
        let mut params = Vec::new();
        let mut scope: FxHashMap<String, Value> = FxHashMap::default();
        if !self.check(&Token::RParen) {
            loop {
                let ty = self.ty()?;
                let (pname, line) = self.expect_local()?;
                if scope.contains_key(&pname) {
                    return Err(ParseError::DuplicateValue { line, name: pname });
                }
                scope.insert(pname.clone(), Value::Param(params.len() as u32));
                params.push(Param::new(&pname, ty));
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(&Token::RParen, "')'")?;
        self.expect(&Token::Arrow, "'->'")?;
        let ret = self.ty()?;
        self.expect(&Token::LBrace, "'{'")?;

        let mut builder = FunctionBuilder::new(&name, params, ret);
        let mut labels = FxHashSet::default();
        let mut pending = Vec::new();
        while !self.check(&Token::RBrace) {
            let (label, line) = self.expect_ident("a block label")?;
            self.expect(&Token::Colon, "':'")?;
            if !labels.insert(label.clone()) {
                return Err(ParseError::DuplicateLabel { line, label });
            }
            let block = builder.block(&label);
            loop {
                match self.peek() {
                    Some(Token::Ident(word)) if word == "ret" => {
                        let line = self.line();
                        self.pos += 1;
                        let term = self.ret_terminator(&scope)?;
                        pending.push((block, term, line));
                        break;
                    }
                    Some(Token::Ident(word)) if word == "br" => {
                        let line = self.line();
                        self.pos += 1;
                        let term = self.br_terminator(&scope)?;
                        pending.push((block, term, line));
                        break;
                    }
                    _ => self.instruction(&mut builder, &mut scope)?,
                }
            }
        }
        self.expect(&Token::RBrace, "'}'")?;

        let mut function = builder.finish();
        for (block, term, line) in pending {
            let terminator = Self::resolve_terminator(&function, term, line)?;
            function.blocks[block.index()].terminator = terminator;
        }
        Ok(function)
    }

    fn ret_terminator(&mut self, scope: &FxHashMap<String, Value>) -> Result<PendingTerm, ParseError> {
        let ty = self.ty()?;
        if ty == Type::Void {
            return Ok(PendingTerm::Ret(None));
        }
        let value = self.value(&ty, scope)?;
        Ok(PendingTerm::Ret(Some(value)))
    }

    fn br_terminator(&mut self, scope: &FxHashMap<String, Value>) -> Result<PendingTerm, ParseError> {
        if self.check_keyword("i1") {
            self.pos += 1;
            let cond = self.value(&Type::I1, scope)?;
            self.expect(&Token::Comma, "','")?;
            let (then_label, _) = self.expect_ident("a block label")?;
            self.expect(&Token::Comma, "','")?;
            let (else_label, _) = self.expect_ident("a block label")?;
            return Ok(PendingTerm::CondBr {
                cond,
                then_label,
                else_label,
            });
        }
        let (label, _) = self.expect_ident("a block label")?;
        Ok(PendingTerm::Br(label))
    }

    fn resolve_terminator(
        function: &Function,
        pending: PendingTerm,
        line: u32,
    ) -> Result<Terminator, ParseError> {
        let lookup = |label: String| {
            function
                .block_by_label(&label)
                .ok_or(ParseError::UnknownLabel { line, label })
        };
        match pending {
            PendingTerm::Ret(value) => Ok(Terminator::Ret(value)),
            PendingTerm::Br(label) => Ok(Terminator::Br(lookup(label)?)),
            PendingTerm::CondBr {
                cond,
                then_label,
                else_label,
            } => Ok(Terminator::CondBr {
                cond,
                then_blk: lookup(then_label)?,
                else_blk: lookup(else_label)?,
            }),
        }
    }

    fn instruction(
        &mut self,
        builder: &mut FunctionBuilder,
        scope: &mut FxHashMap<String, Value>,
    ) -> Result<(), ParseError> {
        let mut name = None;
        if matches!(self.peek(), Some(Token::Local(_))) {
            let (n, line) = self.expect_local()?;
            self.expect(&Token::Equals, "'='")?;
            name = Some((n, line));
        }
        let (op, line) = self.expect_ident("an instruction")?;
        let kind = match op.as_str() {
            "call" => self.call_kind(scope)?,
            "load" => {
                let ty = self.ty()?;
                self.expect(&Token::Comma, "','")?;
                let (_addr_ty, addr) = self.typed_operand(scope)?;
                InstrKind::Load { ty, addr }
            }
            "store" => {
                let (ty, value) = self.typed_operand(scope)?;
                self.expect(&Token::Comma, "','")?;
                let (_addr_ty, addr) = self.typed_operand(scope)?;
                InstrKind::Store { ty, value, addr }
            }
            "alloca" => InstrKind::Alloca { ty: self.ty()? },
            "ptrcast" => {
                let (_from, value) = self.typed_operand(scope)?;
                self.expect_keyword("to")?;
                let to = self.ty()?;
                InstrKind::PtrCast { to, value }
            }
            "add" | "sub" | "mul" | "and" | "or" | "xor" => {
                let ops = [
                    BinOp::Add,
                    BinOp::Sub,
                    BinOp::Mul,
                    BinOp::And,
                    BinOp::Or,
                    BinOp::Xor,
                ];
                let op = ops
                    .into_iter()
                    .find(|o| o.mnemonic() == op)
                    .expect("mnemonic matched by the arm");
                let ty = self.ty()?;
                let lhs = self.value(&ty, scope)?;
                self.expect(&Token::Comma, "','")?;
                let rhs = self.value(&ty, scope)?;
                InstrKind::Binary { op, ty, lhs, rhs }
            }
            "icmp" => {
                let (pred_word, pred_line) = self.expect_ident("a comparison predicate")?;
                let preds = [
                    IcmpPred::Eq,
                    IcmpPred::Ne,
                    IcmpPred::Slt,
                    IcmpPred::Sle,
                    IcmpPred::Sgt,
                    IcmpPred::Sge,
                ];
                let Some(pred) = preds.into_iter().find(|p| p.mnemonic() == pred_word) else {
                    return Err(ParseError::Unexpected {
                        line: pred_line,
                        found: format!("'{pred_word}'"),
                        expected: "a comparison predicate",
                    });
                };
                let ty = self.ty()?;
                let lhs = self.value(&ty, scope)?;
                self.expect(&Token::Comma, "','")?;
                let rhs = self.value(&ty, scope)?;
                InstrKind::Icmp { pred, ty, lhs, rhs }
            }
            _ => {
                return Err(ParseError::Unexpected {
                    line,
                    found: format!("'{op}'"),
                    expected: "an instruction",
                });
            }
        };

        let meta_line = if self.check(&Token::Comma) && self.check2(&Token::Bang) {
            self.pos += 2;
            self.expect_keyword("line")?;
            let (value, int_line) = self.expect_int()?;
            Some(u32::try_from(value).map_err(|_| ParseError::IntOutOfRange { line: int_line })?)
        } else {
            None
        };

        let mut instr = Instr::new(kind);
        if let Some((n, _)) = &name {
            instr = instr.named(n);
        }
        if let Some(meta) = meta_line {
            instr = instr.at_line(meta);
        }
        let id = builder.push(instr);
        if let Some((n, line)) = name {
            if scope.contains_key(&n) {
                return Err(ParseError::DuplicateValue { line, name: n });
            }
            scope.insert(n, Value::Instr(id));
        }
        Ok(())
    }

    fn call_kind(&mut self, scope: &FxHashMap<String, Value>) -> Result<InstrKind, ParseError> {
        let ret = self.ty()?;
        let callee = match self.next()? {
            Tok {
                token: Token::Global(name),
                ..
            } => Callee::Symbol(name),
            Tok {
                token: Token::Local(name),
                line,
            } => Callee::Value(
                scope
                    .get(&name)
                    .cloned()
                    .ok_or(ParseError::UnknownValue { line, name })?,
            ),
            Tok { token, line } => {
                return Err(ParseError::Unexpected {
                    line,
                    found: describe(&token),
                    expected: "a callee",
                });
            }
        };
        self.expect(&Token::LParen, "'('")?;
        let mut args = Vec::new();
        if !self.check(&Token::RParen) {
            loop {
                let (_ty, value) = self.typed_operand(scope)?;
                args.push(value);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }
        self.expect(&Token::RParen, "')'")?;
        Ok(InstrKind::Call { ret, callee, args })
    }

    fn typed_operand(
        &mut self,
        scope: &FxHashMap<String, Value>,
    ) -> Result<(Type, Value), ParseError> {
        let ty = self.ty()?;
        let value = self.value(&ty, scope)?;
        Ok((ty, value))
    }

    fn value(
        &mut self,
        ty: &Type,
        scope: &FxHashMap<String, Value>,
    ) -> Result<Value, ParseError> {
        match self.next()? {
            Tok {
                token: Token::Local(name),
                line,
            } => scope
                .get(&name)
                .cloned()
                .ok_or(ParseError::UnknownValue { line, name }),
            Tok {
                token: Token::Int(value),
                ..
            } => {
                if ty.is_float() {
                    Ok(Value::Const(Constant::float(ty.clone(), value as u64)))
                } else {
                    Ok(Value::int(ty.clone(), value))
                }
            }
            Tok {
                token: Token::Ident(word),
                ..
            } if word == "null" => Ok(Value::null(ty.clone())),
            Tok { token, line } => Err(ParseError::Unexpected {
                line,
                found: describe(&token),
                expected: "a value",
            }),
        }
    }

    fn ty(&mut self) -> Result<Type, ParseError> {
        let mut ty = self.base_type()?;
        while self.eat(&Token::Star) {
            ty = ty.ptr_to();
        }
        Ok(ty)
    }

    fn base_type(&mut self) -> Result<Type, ParseError> {
        match self.next()? {
            Tok {
                token: Token::Ident(word),
                line,
            } => match word.as_str() {
                "void" => Ok(Type::Void),
                "i1" => Ok(Type::I1),
                "i8" => Ok(Type::I8),
                "i16" => Ok(Type::I16),
                "i32" => Ok(Type::I32),
                "i64" => Ok(Type::I64),
                "f32" => Ok(Type::F32),
                "f64" => Ok(Type::F64),
                _ => Err(ParseError::Unexpected {
                    line,
                    found: format!("'{word}'"),
                    expected: "a type",
                }),
            },
            Tok {
                token: Token::LBracket,
                line,
            } => {
                let (len, _) = self.expect_int()?;
                let len =
                    u64::try_from(len).map_err(|_| ParseError::IntOutOfRange { line })?;
                self.expect_keyword("x")?;
                let elem = self.ty()?;
                self.expect(&Token::RBracket, "']'")?;
                Ok(Type::Array {
                    elem: Box::new(elem),
                    len,
                })
            }
            Tok {
                token: Token::LBrace,
                ..
            } => {
                let mut fields = vec![self.ty()?];
                while self.eat(&Token::Comma) {
                    fields.push(self.ty()?);
                }
                self.expect(&Token::RBrace, "'}'")?;
                Ok(Type::Struct(fields))
            }
            Tok { token, line } => Err(ParseError::Unexpected {
                line,
                found: describe(&token),
                expected: "a type",
            }),
        }
    }

    // ===== Token plumbing =====

    fn peek(&self) -> Option<&Token> {
        self.toks.get(self.pos).map(|t| &t.token)
    }

    fn check(&self, token: &Token) -> bool {
        self.peek() == Some(token)
    }

    fn check2(&self, token: &Token) -> bool {
        self.toks.get(self.pos + 1).map(|t| &t.token) == Some(token)
    }

    fn check_keyword(&self, word: &str) -> bool {
        matches!(self.peek(), Some(Token::Ident(w)) if w == word)
    }

    fn line(&self) -> u32 {
        self.toks.get(self.pos).map_or(0, |t| t.line)
    }

    fn next(&mut self) -> Result<Tok, ParseError> {
        let tok = self.toks.get(self.pos).cloned().ok_or(ParseError::UnexpectedEof)?;
        self.pos += 1;
        Ok(tok)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, expected: &'static str) -> Result<(), ParseError> {
        let tok = self.next()?;
        if tok.token == *token {
            Ok(())
        } else {
            Err(ParseError::Unexpected {
                line: tok.line,
                found: describe(&tok.token),
                expected,
            })
        }
    }

    fn expect_keyword(&mut self, word: &'static str) -> Result<(), ParseError> {
        let tok = self.next()?;
        match tok.token {
            Token::Ident(w) if w == word => Ok(()),
            token => Err(ParseError::Unexpected {
                line: tok.line,
                found: describe(&token),
                expected: word,
            }),
        }
    }

    fn expect_ident(&mut self, expected: &'static str) -> Result<(String, u32), ParseError> {
        let tok = self.next()?;
        match tok.token {
            Token::Ident(word) => Ok((word, tok.line)),
            token => Err(ParseError::Unexpected {
                line: tok.line,
                found: describe(&token),
                expected,
            }),
        }
    }

    fn expect_global(&mut self) -> Result<(String, u32), ParseError> {
        let tok = self.next()?;
        match tok.token {
            Token::Global(name) => Ok((name, tok.line)),
            token => Err(ParseError::Unexpected {
                line: tok.line,
                found: describe(&token),
                expected: "'@name'",
            }),
        }
    }

    fn expect_local(&mut self) -> Result<(String, u32), ParseError> {
        let tok = self.next()?;
        match tok.token {
            Token::Local(name) => Ok((name, tok.line)),
            token => Err(ParseError::Unexpected {
                line: tok.line,
                found: describe(&token),
                expected: "'%name'",
            }),
        }
    }

    fn expect_int(&mut self) -> Result<(i64, u32), ParseError> {
        let tok = self.next()?;
        match tok.token {
            Token::Int(value) => Ok((value, tok.line)),
            token => Err(ParseError::Unexpected {
                line: tok.line,
                found: describe(&token),
                expected: "an integer",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use memtrace_ir::BlockId;

    const SMALL: &str = "\
layout p64

declare @malloc(i64) -> i8*

; heap round trip
fn @main() -> i32 {
entry:
    %p = call i8* @malloc(i64 16)
    %q = ptrcast i8* %p to i32*
    store i32 5, i32* %q, !line 7
    %x = load i32, i32* %q, !line 8
    ret i32 %x
}
";

    #[test]
    fn test_parse_small_module() {
        let module = parse_module(SMALL).unwrap();
        assert_eq!(module.layout, DataLayout::P64);
        assert_eq!(module.declarations.len(), 1);
        assert_eq!(module.functions.len(), 1);

        let function = &module.functions[0];
        assert_eq!(function.name, "main");
        assert_eq!(function.blocks.len(), 1);
        assert_eq!(function.blocks[0].len(), 4);

        let store = function.instr(function.blocks[0].instrs[2]);
        assert!(matches!(store.kind, InstrKind::Store { .. }));
        assert_eq!(store.line, Some(7));
        assert!(function.blocks[0].terminator.is_ret());
    }

    #[test]
    fn test_parse_branches() {
        let module = parse_module(
            "fn @loop(i64 %n) -> void {\n\
             entry:\n    br i1 1, body, done\n\
             body:\n    %t = add i64 %n, -1\n    br done\n\
             done:\n    ret void\n\
             }",
        )
        .unwrap();
        let function = &module.functions[0];
        assert_eq!(function.blocks.len(), 3);
        assert_eq!(
            function.blocks[0].terminator,
            Terminator::CondBr {
                cond: Value::int(Type::I1, 1),
                then_blk: BlockId(1),
                else_blk: BlockId(2),
            }
        );
        assert_eq!(function.blocks[1].terminator, Terminator::Br(BlockId(2)));
    }

    #[test]
    fn test_parse_indirect_call() {
        let module = parse_module(
            "fn @caller(i8* %fp) -> void {\n\
             entry:\n    call i8* %fp(i64 16)\n    ret void\n\
             }",
        )
        .unwrap();
        let function = &module.functions[0];
        let call = function.instr(function.blocks[0].instrs[0]);
        assert!(matches!(
            &call.kind,
            InstrKind::Call {
                callee: Callee::Value(Value::Param(0)),
                ..
            }
        ));
    }

    #[test]
    fn test_print_parse_fixpoint() {
        let module = parse_module(SMALL).unwrap();
        let printed = module.to_string();
        let reparsed = parse_module(&printed).unwrap();
        assert_eq!(reparsed.to_string(), printed);
    }

    #[test]
    fn test_unknown_value() {
        let err = parse_module(
            "fn @f() -> void {\nentry:\n    %x = load i32, i32* %nope\n    ret void\n}",
        )
        .unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownValue {
                line: 3,
                name: "nope".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_value() {
        let err = parse_module(
            "fn @f() -> void {\nentry:\n    %p = alloca i32\n    %p = alloca i32\n    ret void\n}",
        )
        .unwrap_err();
        assert!(matches!(err, ParseError::DuplicateValue { line: 4, .. }));
    }

    #[test]
    fn test_unknown_label() {
        let err = parse_module("fn @f() -> void {\nentry:\n    br nowhere\n}").unwrap_err();
        assert!(matches!(err, ParseError::UnknownLabel { .. }));
    }

    #[test]
    fn test_stray_token() {
        let err = parse_module("layout p64\nbogus").unwrap_err();
        assert!(matches!(err, ParseError::Unexpected { line: 2, .. }));
    }
}
