//! Memory-access instrumentation.

use memtrace_ir::{
    Callee, DataLayout, Function, Instr, InstrId, InstrKind, Module, Type, Value, render_instr,
    result_names,
};
use tracing::debug;

use crate::edit::BlockEdits;
use crate::hooks::TraceHook;
use crate::pass::{ModulePass, PreservedAnalyses};

/// Registry identifier of the memory profiler.
pub const MEMORY_PROFILER_ID: &str = "mempf";
/// Display name of the memory profiler.
pub const MEMORY_PROFILER_NAME: &str = "MemoryProfiler Pass";

/// Inserts trace-runtime calls around heap allocations and memory accesses.
///
/// Every direct `malloc` call is followed by `traceMalloc(result, size)`
/// with the size operand forwarded unchanged. Every load and store is
/// preceded by `traceLoad`/`traceStore` carrying the accessed address
/// (normalized to `i8*`) and the access size in bytes, where sub-byte types
/// truncate to 0. The rewrite never touches branching or existing operands,
/// so every analysis stays valid.
///
/// Running the pass twice duplicates the hook declarations and the trace
/// calls. It is meant to run once per module.
#[derive(Clone, Copy, Debug, Default)]
pub struct MemoryProfiler;

impl MemoryProfiler {
    /// Create the pass.
    pub const fn new() -> Self {
        Self
    }
}

impl ModulePass for MemoryProfiler {
    fn run(&mut self, module: &mut Module) -> bool {
        for hook in TraceHook::ALL {
            module.declare(hook.decl());
        }
        let layout = module.layout;
        let mut inserted = 0usize;
        for function in &mut module.functions {
            inserted += instrument_function(layout, function);
        }
        debug!(calls = inserted, "instrumentation complete");
        true
    }

    fn preserved(&self) -> PreservedAnalyses {
        PreservedAnalyses::all()
    }
}

fn instrument_function(layout: DataLayout, function: &mut Function) -> usize {
    let names = result_names(function);
    let mut inserted = 0usize;
    for block_index in 0..function.blocks.len() {
        let snapshot = function.blocks[block_index].instrs.clone();
        let mut edits = BlockEdits::new();
        for &id in &snapshot {
            // Clone the payload so the arena can grow while classifying.
            let kind = function.instr(id).kind.clone();
            match kind {
                InstrKind::Call {
                    callee: Callee::Symbol(ref name),
                    ref args,
                    ..
                } if name == "malloc" => {
                    // A malloc without a size operand is malformed input;
                    // leave that call untraced.
                    let Some(size) = args.first().cloned() else {
                        continue;
                    };
                    let call = trace_call(function, TraceHook::Malloc, Value::Instr(id), size);
                    edits.insert_after(id, call);
                    inserted += 1;
                }
                InstrKind::Load { ref ty, ref addr } => {
                    let line = function.instr(id).line;
                    debug!(line, "load: {}", render_instr(function, &names, id));
                    trace_access(layout, function, &mut edits, id, TraceHook::Load, ty, addr);
                    inserted += 1;
                }
                InstrKind::Store {
                    ref ty, ref addr, ..
                } => {
                    let line = function.instr(id).line;
                    debug!(line, "store: {}", render_instr(function, &names, id));
                    trace_access(layout, function, &mut edits, id, TraceHook::Store, ty, addr);
                    inserted += 1;
                }
                InstrKind::Call { .. }
                | InstrKind::Alloca { .. }
                | InstrKind::PtrCast { .. }
                | InstrKind::Binary { .. }
                | InstrKind::Icmp { .. } => {}
            }
        }
        if edits.is_empty() {
            continue;
        }
        function.blocks[block_index].instrs = edits.materialize(&snapshot);
    }
    inserted
}

/// Queue a trace call (and an address cast when needed) before `anchor`.
fn trace_access(
    layout: DataLayout,
    function: &mut Function,
    edits: &mut BlockEdits,
    anchor: InstrId,
    hook: TraceHook,
    ty: &Type,
    addr: &Value,
) {
    let size = layout.byte_size(ty) as i64;
    let (addr, cast) = byte_ptr_operand(function, addr);
    if let Some(cast) = cast {
        edits.insert_before(anchor, cast);
    }
    let call = trace_call(function, hook, addr, Value::int(Type::I64, size));
    edits.insert_before(anchor, call);
}

/// Normalize an address operand to `i8*`, creating a cast only when the
/// operand has some other type.
fn byte_ptr_operand(function: &mut Function, addr: &Value) -> (Value, Option<InstrId>) {
    if function.value_type(addr) == Some(Type::byte_ptr()) {
        return (addr.clone(), None);
    }
    let cast = function.alloc_instr(Instr::new(InstrKind::PtrCast {
        to: Type::byte_ptr(),
        value: addr.clone(),
    }));
    (Value::Instr(cast), Some(cast))
}

fn trace_call(function: &mut Function, hook: TraceHook, addr: Value, size: Value) -> InstrId {
    function.alloc_instr(Instr::new(InstrKind::Call {
        ret: Type::Void,
        callee: Callee::Symbol(hook.symbol().to_string()),
        args: vec![addr, size],
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use memtrace_ir::{FuncDecl, FunctionBuilder, Param, Terminator, verify_module};

    fn run(module: &mut Module) -> bool {
        MemoryProfiler::new().run(module)
    }

    fn fresh_module() -> Module {
        let mut module = Module::new(DataLayout::P64);
        module.declare(FuncDecl::new("malloc", vec![Type::I64], Type::byte_ptr()));
        module
    }

    /// Symbol/shape tags of every instruction, in program order.
    fn op_tags(function: &Function) -> Vec<String> {
        function
            .program_order()
            .map(|id| match &function.instr(id).kind {
                InstrKind::Call {
                    callee: Callee::Symbol(name),
                    ..
                } => name.clone(),
                InstrKind::Call { .. } => "call.indirect".to_string(),
                InstrKind::Load { .. } => "load".to_string(),
                InstrKind::Store { .. } => "store".to_string(),
                InstrKind::Alloca { .. } => "alloca".to_string(),
                InstrKind::PtrCast { .. } => "ptrcast".to_string(),
                InstrKind::Binary { .. } => "binary".to_string(),
                InstrKind::Icmp { .. } => "icmp".to_string(),
            })
            .collect()
    }

    #[test]
    fn test_declares_all_hooks() {
        let mut module = fresh_module();
        let changed = run(&mut module);

        assert!(changed);
        assert_eq!(module.declaration_count("traceMalloc"), 1);
        assert_eq!(module.declaration_count("traceLoad"), 1);
        assert_eq!(module.declaration_count("traceStore"), 1);
        // Appended after the existing declarations, in hook order.
        let names: Vec<&str> = module.declarations.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, ["malloc", "traceMalloc", "traceLoad", "traceStore"]);
    }

    #[test]
    fn test_malloc_trace_follows_call() {
        let mut module = fresh_module();
        let mut b = FunctionBuilder::new("main", Vec::new(), Type::Void);
        b.block("entry");
        let size = Value::int(Type::I64, 16);
        let p = b.call_symbol(Type::byte_ptr(), "malloc", vec![size.clone()]);
        b.ret(None);
        module.add_function(b.finish());

        run(&mut module);

        let function = &module.functions[0];
        assert_eq!(op_tags(function), ["malloc", "traceMalloc"]);
        let trace = function.instr(function.blocks[0].instrs[1]);
        let InstrKind::Call { args, .. } = &trace.kind else {
            panic!("expected a call");
        };
        assert_eq!(args[0], Value::Instr(p));
        assert_eq!(args[1], size);
    }

    #[test]
    fn test_zero_arg_malloc_left_alone() {
        let mut module = fresh_module();
        let mut b = FunctionBuilder::new("main", Vec::new(), Type::Void);
        b.block("entry");
        b.call_symbol(Type::byte_ptr(), "malloc", Vec::new());
        b.ret(None);
        module.add_function(b.finish());

        run(&mut module);

        assert_eq!(op_tags(&module.functions[0]), ["malloc"]);
    }

    #[test]
    fn test_indirect_call_never_matches_malloc() {
        let mut module = fresh_module();
        let mut b = FunctionBuilder::new(
            "caller",
            vec![Param::new("fp", Type::byte_ptr())],
            Type::Void,
        );
        b.block("entry");
        b.call_value(
            Type::byte_ptr(),
            Value::Param(0),
            vec![Value::int(Type::I64, 16)],
        );
        b.ret(None);
        module.add_function(b.finish());

        run(&mut module);

        assert_eq!(op_tags(&module.functions[0]), ["call.indirect"]);
    }

    #[test]
    fn test_load_trace_precedes_load() {
        let mut module = fresh_module();
        let mut b = FunctionBuilder::new("main", Vec::new(), Type::I32);
        b.block("entry");
        let slot = b.alloca(Type::I32);
        let x = b.load(Type::I32, Value::Instr(slot));
        b.ret(Some(Value::Instr(x)));
        module.add_function(b.finish());

        run(&mut module);

        let function = &module.functions[0];
        assert_eq!(op_tags(function), ["alloca", "ptrcast", "traceLoad", "load"]);
        let trace = function.instr(function.blocks[0].instrs[2]);
        let InstrKind::Call { args, .. } = &trace.kind else {
            panic!("expected a call");
        };
        assert_eq!(args[1], Value::int(Type::I64, 4));
    }

    #[test]
    fn test_byte_ptr_address_needs_no_cast() {
        let mut module = fresh_module();
        let mut b =
            FunctionBuilder::new("peek", vec![Param::new("p", Type::byte_ptr())], Type::I8);
        b.block("entry");
        let x = b.load(Type::I8, Value::Param(0));
        b.ret(Some(Value::Instr(x)));
        module.add_function(b.finish());

        run(&mut module);

        let function = &module.functions[0];
        assert_eq!(op_tags(function), ["traceLoad", "load"]);
        let trace = function.instr(function.blocks[0].instrs[0]);
        let InstrKind::Call { args, .. } = &trace.kind else {
            panic!("expected a call");
        };
        assert_eq!(args[0], Value::Param(0));
    }

    #[test]
    fn test_bool_load_sizes_to_zero() {
        let mut module = fresh_module();
        let mut b = FunctionBuilder::new("main", Vec::new(), Type::Void);
        b.block("entry");
        let slot = b.alloca(Type::I1);
        b.load(Type::I1, Value::Instr(slot));
        b.ret(None);
        module.add_function(b.finish());

        run(&mut module);

        let function = &module.functions[0];
        let trace = function.instr(function.blocks[0].instrs[2]);
        let InstrKind::Call { args, .. } = &trace.kind else {
            panic!("expected a call");
        };
        assert_eq!(args[1], Value::int(Type::I64, 0));
    }

    #[test]
    fn test_huge_array_load_sizes_saturate() {
        let mut module = fresh_module();
        let huge = Type::Array {
            elem: Box::new(Type::I64),
            len: 1 << 58,
        };
        let mut b = FunctionBuilder::new("main", Vec::new(), Type::Void);
        b.block("entry");
        let slot = b.alloca(huge.clone());
        b.load(huge, Value::Instr(slot));
        b.ret(None);
        module.add_function(b.finish());
        assert_eq!(verify_module(&module), Ok(()));

        run(&mut module);

        let function = &module.functions[0];
        assert_eq!(op_tags(function), ["alloca", "ptrcast", "traceLoad", "load"]);
        let trace = function.instr(function.blocks[0].instrs[2]);
        let InstrKind::Call { args, .. } = &trace.kind else {
            panic!("expected a call");
        };
        assert_eq!(args[1], Value::int(Type::I64, (u64::MAX / 8) as i64));
    }

    #[test]
    fn test_malloc_as_final_instruction() {
        let mut module = fresh_module();
        let mut b = FunctionBuilder::new("tail", Vec::new(), Type::Void);
        let entry = b.block("entry");
        b.call_symbol(Type::byte_ptr(), "malloc", vec![Value::int(Type::I64, 8)]);
        let exit = b.block("exit");
        b.ret(None);
        b.set_terminator(entry, Terminator::Br(exit));
        module.add_function(b.finish());

        run(&mut module);

        let function = &module.functions[0];
        assert_eq!(op_tags(function), ["malloc", "traceMalloc"]);
        assert_eq!(function.blocks[0].terminator, Terminator::Br(exit));
    }

    #[test]
    fn test_program_order_end_to_end() {
        let mut module = fresh_module();
        let mut b = FunctionBuilder::new("main", Vec::new(), Type::I32);
        b.block("entry");
        let p = b.call_symbol(Type::byte_ptr(), "malloc", vec![Value::int(Type::I64, 16)]);
        let q = b.ptr_cast(Type::I32.ptr_to(), Value::Instr(p));
        b.store(Type::I32, Value::int(Type::I32, 5), Value::Instr(q));
        let x = b.load(Type::I32, Value::Instr(q));
        b.ret(Some(Value::Instr(x)));
        module.add_function(b.finish());

        run(&mut module);

        assert_eq!(
            op_tags(&module.functions[0]),
            [
                "malloc",
                "traceMalloc",
                "ptrcast",
                "ptrcast",
                "traceStore",
                "store",
                "ptrcast",
                "traceLoad",
                "load"
            ]
        );
    }

    #[test]
    fn test_preserves_every_analysis() {
        assert!(MemoryProfiler::new().preserved().preserves_all());
    }
}
