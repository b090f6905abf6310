//! Structural module verification.
//!
//! Checks operand and signature agreement, pointer-ness of memory accesses,
//! and terminator targets. Verification runs in the driver after parsing
//! (and optionally after instrumentation); passes themselves assume
//! well-formed input.

use thiserror::Error;

use crate::block::Terminator;
use crate::function::Function;
use crate::instr::{Callee, InstrKind};
use crate::module::Module;
use crate::types::Type;
use crate::value::Value;

/// Structural verification failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum VerifyError {
    #[error("function '{function}': call to unknown symbol '@{callee}'")]
    UnknownCallee { function: String, callee: String },
    #[error(
        "function '{function}': call to '@{callee}' has {actual} arguments, expected {expected}"
    )]
    CallArity {
        function: String,
        callee: String,
        expected: usize,
        actual: usize,
    },
    #[error(
        "function '{function}': argument {index} of call to '@{callee}' is {actual}, expected {expected}"
    )]
    CallArgType {
        function: String,
        callee: String,
        index: usize,
        expected: Type,
        actual: Type,
    },
    #[error("function '{function}': call to '@{callee}' returns {expected}, not {actual}")]
    CallRetType {
        function: String,
        callee: String,
        expected: Type,
        actual: Type,
    },
    #[error("function '{function}': indirect callee is not a pointer")]
    IndirectCalleeType { function: String },
    #[error("function '{function}': memory access through non-pointer {actual}")]
    NonPointerAddress { function: String, actual: Type },
    #[error("function '{function}': access of {ty} through {addr}")]
    AccessTypeMismatch {
        function: String,
        ty: Type,
        addr: Type,
    },
    #[error("function '{function}': stored value is {actual}, store annotated {expected}")]
    StoreValueType {
        function: String,
        expected: Type,
        actual: Type,
    },
    #[error("function '{function}': ptrcast on non-pointer operand")]
    PtrCastOperand { function: String },
    #[error("function '{function}': ptrcast to non-pointer {to}")]
    PtrCastTarget { function: String, to: Type },
    #[error("function '{function}': {op} on unsupported type {ty}")]
    UnsupportedOperandType {
        function: String,
        op: &'static str,
        ty: Type,
    },
    #[error("function '{function}': {op} operand is {actual}, expected {expected}")]
    OperandType {
        function: String,
        op: &'static str,
        expected: Type,
        actual: Type,
    },
    #[error("function '{function}': branch condition is not i1")]
    CondType { function: String },
    #[error("function '{function}': branch to out-of-range block {target}")]
    BlockTarget { function: String, target: u32 },
    #[error("function '{function}': returns {actual}, declared {expected}")]
    RetType {
        function: String,
        expected: Type,
        actual: Type,
    },
    #[error("function '{function}': operand has no value")]
    VoidOperand { function: String },
    #[error("function '{function}': block '{block}' references an instruction outside the arena")]
    DanglingInstr { function: String, block: String },
}

/// Verify every function of a module.
pub fn verify_module(module: &Module) -> Result<(), VerifyError> {
    for function in &module.functions {
        verify_function(module, function)?;
    }
    Ok(())
}

fn verify_function(module: &Module, function: &Function) -> Result<(), VerifyError> {
    for block in &function.blocks {
        for &id in &block.instrs {
            let Some(instr) = function.get_instr(id) else {
                return Err(VerifyError::DanglingInstr {
                    function: function.name.clone(),
                    block: block.label.clone(),
                });
            };
            verify_instr(module, function, &instr.kind)?;
        }
        verify_terminator(function, &block.terminator)?;
    }
    Ok(())
}

fn verify_instr(
    module: &Module,
    function: &Function,
    kind: &InstrKind,
) -> Result<(), VerifyError> {
    match kind {
        InstrKind::Call { ret, callee, args } => match callee {
            Callee::Symbol(name) => verify_direct_call(module, function, name, ret, args),
            Callee::Value(value) => {
                if !operand_type(function, value)?.is_pointer() {
                    return Err(VerifyError::IndirectCalleeType {
                        function: function.name.clone(),
                    });
                }
                Ok(())
            }
        },
        InstrKind::Load { ty, addr } => verify_access(function, ty, addr),
        InstrKind::Store { ty, value, addr } => {
            let actual = operand_type(function, value)?;
            if actual != *ty {
                return Err(VerifyError::StoreValueType {
                    function: function.name.clone(),
                    expected: ty.clone(),
                    actual,
                });
            }
            verify_access(function, ty, addr)
        }
        InstrKind::Alloca { .. } => Ok(()),
        InstrKind::PtrCast { to, value } => {
            if !to.is_pointer() {
                return Err(VerifyError::PtrCastTarget {
                    function: function.name.clone(),
                    to: to.clone(),
                });
            }
            if !operand_type(function, value)?.is_pointer() {
                return Err(VerifyError::PtrCastOperand {
                    function: function.name.clone(),
                });
            }
            Ok(())
        }
        InstrKind::Binary { op, ty, lhs, rhs } => {
            if !ty.is_integer() {
                return Err(VerifyError::UnsupportedOperandType {
                    function: function.name.clone(),
                    op: op.mnemonic(),
                    ty: ty.clone(),
                });
            }
            verify_operand(function, op.mnemonic(), ty, lhs)?;
            verify_operand(function, op.mnemonic(), ty, rhs)
        }
        InstrKind::Icmp { pred, ty, lhs, rhs } => {
            if !ty.is_integer() && !ty.is_pointer() {
                return Err(VerifyError::UnsupportedOperandType {
                    function: function.name.clone(),
                    op: pred.mnemonic(),
                    ty: ty.clone(),
                });
            }
            verify_operand(function, "icmp", ty, lhs)?;
            verify_operand(function, "icmp", ty, rhs)
        }
    }
}

fn verify_direct_call(
    module: &Module,
    function: &Function,
    callee: &str,
    ret: &Type,
    args: &[Value],
) -> Result<(), VerifyError> {
    let Some((params, decl_ret)) = signature(module, callee) else {
        return Err(VerifyError::UnknownCallee {
            function: function.name.clone(),
            callee: callee.to_string(),
        });
    };
    if args.len() != params.len() {
        return Err(VerifyError::CallArity {
            function: function.name.clone(),
            callee: callee.to_string(),
            expected: params.len(),
            actual: args.len(),
        });
    }
    for (index, (arg, param)) in args.iter().zip(&params).enumerate() {
        let actual = operand_type(function, arg)?;
        if actual != *param {
            return Err(VerifyError::CallArgType {
                function: function.name.clone(),
                callee: callee.to_string(),
                index,
                expected: param.clone(),
                actual,
            });
        }
    }
    if *ret != decl_ret {
        return Err(VerifyError::CallRetType {
            function: function.name.clone(),
            callee: callee.to_string(),
            expected: decl_ret,
            actual: ret.clone(),
        });
    }
    Ok(())
}

fn verify_access(function: &Function, ty: &Type, addr: &Value) -> Result<(), VerifyError> {
    let addr_ty = operand_type(function, addr)?;
    match addr_ty.pointee() {
        Some(pointee) if pointee == ty => Ok(()),
        Some(_) => Err(VerifyError::AccessTypeMismatch {
            function: function.name.clone(),
            ty: ty.clone(),
            addr: addr_ty,
        }),
        None => Err(VerifyError::NonPointerAddress {
            function: function.name.clone(),
            actual: addr_ty,
        }),
    }
}

fn verify_terminator(function: &Function, terminator: &Terminator) -> Result<(), VerifyError> {
    for target in terminator.targets() {
        if target.index() >= function.blocks.len() {
            return Err(VerifyError::BlockTarget {
                function: function.name.clone(),
                target: target.0,
            });
        }
    }
    match terminator {
        Terminator::CondBr { cond, .. } => {
            if operand_type(function, cond)? != Type::I1 {
                return Err(VerifyError::CondType {
                    function: function.name.clone(),
                });
            }
            Ok(())
        }
        Terminator::Ret(None) => {
            if function.ret == Type::Void {
                Ok(())
            } else {
                Err(VerifyError::RetType {
                    function: function.name.clone(),
                    expected: function.ret.clone(),
                    actual: Type::Void,
                })
            }
        }
        Terminator::Ret(Some(value)) => {
            let actual = operand_type(function, value)?;
            if actual == function.ret {
                Ok(())
            } else {
                Err(VerifyError::RetType {
                    function: function.name.clone(),
                    expected: function.ret.clone(),
                    actual,
                })
            }
        }
        Terminator::Br(_) => Ok(()),
    }
}

fn verify_operand(
    function: &Function,
    op: &'static str,
    expected: &Type,
    value: &Value,
) -> Result<(), VerifyError> {
    let actual = operand_type(function, value)?;
    if actual == *expected {
        Ok(())
    } else {
        Err(VerifyError::OperandType {
            function: function.name.clone(),
            op,
            expected: expected.clone(),
            actual,
        })
    }
}

fn operand_type(function: &Function, value: &Value) -> Result<Type, VerifyError> {
    function
        .value_type(value)
        .ok_or_else(|| VerifyError::VoidOperand {
            function: function.name.clone(),
        })
}

fn signature(module: &Module, name: &str) -> Option<(Vec<Type>, Type)> {
    if let Some(decl) = module.declaration(name) {
        return Some((decl.params.clone(), decl.ret.clone()));
    }
    module.function(name).map(|f| {
        (
            f.params.iter().map(|p| p.ty.clone()).collect(),
            f.ret.clone(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockId;
    use crate::builder::FunctionBuilder;
    use crate::layout::DataLayout;
    use crate::module::FuncDecl;

    fn module_with(function: Function) -> Module {
        let mut module = Module::new(DataLayout::P64);
        module.declare(FuncDecl::new("malloc", vec![Type::I64], Type::byte_ptr()));
        module.add_function(function);
        module
    }

    #[test]
    fn test_well_formed_module() {
        let mut b = FunctionBuilder::new("main", Vec::new(), Type::I32);
        b.block("entry");
        let p = b.call_symbol(Type::byte_ptr(), "malloc", vec![Value::int(Type::I64, 16)]);
        let q = b.ptr_cast(Type::I32.ptr_to(), Value::Instr(p));
        b.store(Type::I32, Value::int(Type::I32, 5), Value::Instr(q));
        let x = b.load(Type::I32, Value::Instr(q));
        b.ret(Some(Value::Instr(x)));

        assert_eq!(verify_module(&module_with(b.finish())), Ok(()));
    }

    #[test]
    fn test_store_type_mismatch() {
        let mut b = FunctionBuilder::new("main", Vec::new(), Type::Void);
        b.block("entry");
        let p = b.alloca(Type::I32);
        b.store(Type::I64, Value::int(Type::I64, 5), Value::Instr(p));
        b.ret(None);

        assert!(matches!(
            verify_module(&module_with(b.finish())),
            Err(VerifyError::AccessTypeMismatch { .. })
        ));
    }

    #[test]
    fn test_call_arity() {
        let mut b = FunctionBuilder::new("main", Vec::new(), Type::Void);
        b.block("entry");
        b.call_symbol(Type::byte_ptr(), "malloc", Vec::new());
        b.ret(None);

        assert!(matches!(
            verify_module(&module_with(b.finish())),
            Err(VerifyError::CallArity { expected: 1, actual: 0, .. })
        ));
    }

    #[test]
    fn test_unknown_callee() {
        let mut b = FunctionBuilder::new("main", Vec::new(), Type::Void);
        b.block("entry");
        b.call_symbol(Type::Void, "missing", Vec::new());
        b.ret(None);

        assert!(matches!(
            verify_module(&module_with(b.finish())),
            Err(VerifyError::UnknownCallee { .. })
        ));
    }

    #[test]
    fn test_branch_out_of_range() {
        let mut b = FunctionBuilder::new("main", Vec::new(), Type::Void);
        b.block("entry");
        b.br(BlockId(7));

        assert!(matches!(
            verify_module(&module_with(b.finish())),
            Err(VerifyError::BlockTarget { target: 7, .. })
        ));
    }
}
