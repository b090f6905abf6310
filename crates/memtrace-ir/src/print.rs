//! Textual rendering of modules.
//!
//! The output is what `memtrace::parse` accepts, so a printed module can be
//! fed back through the toolchain. Unnamed results are numbered `%0`, `%1`,
//! ... in program order, per function.

use std::fmt::{self, Write};

use rustc_hash::FxHashMap;

use crate::block::{BlockId, Terminator};
use crate::function::Function;
use crate::instr::{Callee, InstrId, InstrKind};
use crate::module::{FuncDecl, Module};
use crate::types::Type;
use crate::value::{ConstKind, Value};

/// Printable result names for every value-producing instruction of a
/// function, auto-numbering the unnamed ones.
pub fn result_names(function: &Function) -> FxHashMap<InstrId, String> {
    let mut names = FxHashMap::default();
    let mut next = 0u32;
    for id in function.program_order() {
        let instr = function.instr(id);
        if instr.kind.result_type().is_none() {
            continue;
        }
        let name = match &instr.name {
            Some(name) => name.clone(),
            None => {
                let numbered = next.to_string();
                next += 1;
                numbered
            }
        };
        names.insert(id, name);
    }
    names
}

/// Render a value operand.
pub fn render_value(
    function: &Function,
    names: &FxHashMap<InstrId, String>,
    value: &Value,
) -> String {
    match value {
        Value::Instr(id) => match names.get(id) {
            Some(name) => format!("%{name}"),
            None => "%?".to_string(),
        },
        Value::Param(index) => match function.params.get(*index as usize) {
            Some(param) => format!("%{}", param.name),
            None => format!("%param{index}"),
        },
        Value::Const(constant) => match &constant.kind {
            ConstKind::Int(v) => v.to_string(),
            ConstKind::Float(bits) => format!("0x{bits:x}"),
            ConstKind::Null => "null".to_string(),
        },
    }
}

/// Render one instruction in its textual form, without indentation.
pub fn render_instr(
    function: &Function,
    names: &FxHashMap<InstrId, String>,
    id: InstrId,
) -> String {
    let instr = function.instr(id);
    let mut text = String::new();
    if let Some(name) = names.get(&id) {
        write!(text, "%{name} = ").unwrap();
    }
    match &instr.kind {
        InstrKind::Call { ret, callee, args } => {
            write!(text, "call {ret} ").unwrap();
            match callee {
                Callee::Symbol(name) => write!(text, "@{name}").unwrap(),
                Callee::Value(value) => {
                    write!(text, "{}", render_value(function, names, value)).unwrap();
                }
            }
            write!(text, "(").unwrap();
            for (i, arg) in args.iter().enumerate() {
                if i > 0 {
                    write!(text, ", ").unwrap();
                }
                write!(
                    text,
                    "{} {}",
                    operand_type(function, arg),
                    render_value(function, names, arg)
                )
                .unwrap();
            }
            write!(text, ")").unwrap();
        }
        InstrKind::Load { ty, addr } => {
            write!(
                text,
                "load {ty}, {} {}",
                operand_type(function, addr),
                render_value(function, names, addr)
            )
            .unwrap();
        }
        InstrKind::Store { ty, value, addr } => {
            write!(
                text,
                "store {ty} {}, {} {}",
                render_value(function, names, value),
                operand_type(function, addr),
                render_value(function, names, addr)
            )
            .unwrap();
        }
        InstrKind::Alloca { ty } => {
            write!(text, "alloca {ty}").unwrap();
        }
        InstrKind::PtrCast { to, value } => {
            write!(
                text,
                "ptrcast {} {} to {to}",
                operand_type(function, value),
                render_value(function, names, value)
            )
            .unwrap();
        }
        InstrKind::Binary { op, ty, lhs, rhs } => {
            write!(
                text,
                "{} {ty} {}, {}",
                op.mnemonic(),
                render_value(function, names, lhs),
                render_value(function, names, rhs)
            )
            .unwrap();
        }
        InstrKind::Icmp { pred, ty, lhs, rhs } => {
            write!(
                text,
                "icmp {} {ty} {}, {}",
                pred.mnemonic(),
                render_value(function, names, lhs),
                render_value(function, names, rhs)
            )
            .unwrap();
        }
    }
    if let Some(line) = instr.line {
        write!(text, ", !line {line}").unwrap();
    }
    text
}

fn render_terminator(
    function: &Function,
    names: &FxHashMap<InstrId, String>,
    terminator: &Terminator,
) -> String {
    match terminator {
        Terminator::Ret(None) => "ret void".to_string(),
        Terminator::Ret(Some(value)) => format!(
            "ret {} {}",
            function.ret,
            render_value(function, names, value)
        ),
        Terminator::Br(target) => format!("br {}", block_label(function, *target)),
        Terminator::CondBr {
            cond,
            then_blk,
            else_blk,
        } => format!(
            "br i1 {}, {}, {}",
            render_value(function, names, cond),
            block_label(function, *then_blk),
            block_label(function, *else_blk)
        ),
    }
}

fn block_label(function: &Function, id: BlockId) -> String {
    function
        .blocks
        .get(id.index())
        .map_or_else(|| format!("bb{}", id.0), |block| block.label.clone())
}

fn operand_type(function: &Function, value: &Value) -> Type {
    function.value_type(value).unwrap_or(Type::Void)
}

impl fmt::Display for FuncDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "declare @{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ") -> {}", self.ret)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = result_names(self);
        write!(f, "fn @{}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{} %{}", param.ty, param.name)?;
        }
        writeln!(f, ") -> {} {{", self.ret)?;
        for block in &self.blocks {
            writeln!(f, "{}:", block.label)?;
            for &id in &block.instrs {
                writeln!(f, "    {}", render_instr(self, &names, id))?;
            }
            writeln!(f, "    {}", render_terminator(self, &names, &block.terminator))?;
        }
        write!(f, "}}")
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "layout p{}", self.layout.pointer_bits())?;
        if !self.declarations.is_empty() {
            writeln!(f)?;
            for decl in &self.declarations {
                writeln!(f, "{decl}")?;
            }
        }
        for function in &self.functions {
            writeln!(f)?;
            writeln!(f, "{function}")?;
        }
        Ok(())
    }
}
