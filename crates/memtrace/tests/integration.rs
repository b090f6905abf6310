//! Integration tests for the instrumentation pipeline.

use memtrace::{Error, MEMORY_PROFILER_ID, Pipeline, parse_module};

const HEAP_ROUND_TRIP: &str = "\
layout p64

declare @malloc(i64) -> i8*

fn @main() -> i32 {
entry:
    %p = call i8* @malloc(i64 16)
    %q = ptrcast i8* %p to i32*
    store i32 5, i32* %q, !line 7
    %x = load i32, i32* %q, !line 8
    ret i32 %x
}
";

const HEAP_ROUND_TRIP_TRACED: &str = "\
layout p64

declare @malloc(i64) -> i8*
declare @traceMalloc(i8*, i64) -> void
declare @traceLoad(i8*, i64) -> void
declare @traceStore(i8*, i64) -> void

fn @main() -> i32 {
entry:
    %p = call i8* @malloc(i64 16)
    call void @traceMalloc(i8* %p, i64 16)
    %q = ptrcast i8* %p to i32*
    %0 = ptrcast i32* %q to i8*
    call void @traceStore(i8* %0, i64 4)
    store i32 5, i32* %q, !line 7
    %1 = ptrcast i32* %q to i8*
    call void @traceLoad(i8* %1, i64 4)
    %x = load i32, i32* %q, !line 8
    ret i32 %x
}
";

fn instrumented(source: &str) -> Pipeline {
    let mut pipeline = Pipeline::from_source(source).expect("Failed to parse input");
    let changed = pipeline
        .run_pass(MEMORY_PROFILER_ID)
        .expect("Failed to run the profiler");
    assert!(changed, "The profiler must report the module as changed");
    pipeline
}

#[test]
fn test_instrumented_output_is_exact() {
    let pipeline = instrumented(HEAP_ROUND_TRIP);
    assert_eq!(pipeline.render(), HEAP_ROUND_TRIP_TRACED);
}

#[test]
fn test_trace_calls_match_access_counts() {
    let source = "\
layout p64

declare @malloc(i64) -> i8*

fn @fill(i64* %dst, i64 %n) -> void {
entry:
    %c = icmp sgt i64 %n, 0
    br i1 %c, body, done
body:
    store i64 %n, i64* %dst
    store i64 0, i64* %dst
    %a = load i64, i64* %dst
    %b = load i64, i64* %dst
    br done
done:
    ret void
}

fn @main() -> i32 {
entry:
    %p = call i8* @malloc(i64 64)
    %q = call i8* @malloc(i64 8)
    %r = ptrcast i8* %p to i64*
    %x = load i64, i64* %r
    ret i32 0
}
";
    let pipeline = instrumented(source);
    let text = pipeline.render();

    // 2 mallocs, 3 loads, 2 stores in the input.
    assert_eq!(text.matches("call void @traceMalloc(").count(), 2);
    assert_eq!(text.matches("call void @traceLoad(").count(), 3);
    assert_eq!(text.matches("call void @traceStore(").count(), 2);
    assert_eq!(pipeline.module.declarations.len(), 4);
}

#[test]
fn test_running_twice_duplicates_instrumentation() {
    let mut pipeline = instrumented(HEAP_ROUND_TRIP);
    pipeline
        .run_pass(MEMORY_PROFILER_ID)
        .expect("Failed to run the profiler again");
    let text = pipeline.render();

    assert_eq!(text.matches("declare @traceLoad(").count(), 2);
    assert_eq!(text.matches("call void @traceMalloc(").count(), 2);
    assert_eq!(text.matches("call void @traceLoad(").count(), 2);
    assert_eq!(text.matches("call void @traceStore(").count(), 2);
}

#[test]
fn test_pointer_width_follows_layout() {
    let deref = |layout: &str| {
        format!(
            "layout {layout}\n\nfn @deref(i8** %pp) -> i8* {{\nentry:\n    %p = load i8*, i8** %pp\n    ret i8* %p\n}}\n"
        )
    };

    let narrow = instrumented(&deref("p32")).render();
    assert!(narrow.contains("call void @traceLoad(i8* %0, i64 4)"));

    let wide = instrumented(&deref("p64")).render();
    assert!(wide.contains("call void @traceLoad(i8* %0, i64 8)"));
}

#[test]
fn test_pass_always_reports_change() {
    let pipeline = instrumented("fn @nop() -> void {\nentry:\n    ret void\n}\n");
    let text = pipeline.render();

    // Hooks are declared even when nothing gets traced.
    assert!(text.contains("declare @traceMalloc(i8*, i64) -> void"));
    assert!(text.contains("declare @traceLoad(i8*, i64) -> void"));
    assert!(text.contains("declare @traceStore(i8*, i64) -> void"));
    assert!(text.ends_with("fn @nop() -> void {\nentry:\n    ret void\n}\n"));
}

#[test]
fn test_instrumented_module_stays_well_formed() {
    let pipeline = instrumented(HEAP_ROUND_TRIP);
    pipeline
        .verify()
        .expect("Instrumented module failed verification");

    // The printed form parses back to the same text.
    let text = pipeline.render();
    let reparsed = parse_module(&text).expect("Failed to reparse instrumented output");
    assert_eq!(reparsed.to_string(), text);
}

#[test]
fn test_unknown_pass_is_reported() {
    let mut pipeline = Pipeline::from_source(HEAP_ROUND_TRIP).expect("Failed to parse input");
    let err = pipeline.run_pass("loopfuse").unwrap_err();
    assert!(matches!(err, Error::UnknownPass(id) if id == "loopfuse"));
}

#[test]
fn test_file_round_trip() {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let input = dir.path().join("input.ir");
    std::fs::write(&input, HEAP_ROUND_TRIP).expect("Failed to write input");

    let mut pipeline = Pipeline::from_path(&input).expect("Failed to load input");
    pipeline
        .run_pass(MEMORY_PROFILER_ID)
        .expect("Failed to run the profiler");

    let output = dir.path().join("traced.ir");
    std::fs::write(&output, pipeline.render()).expect("Failed to write output");
    let text = std::fs::read_to_string(&output).expect("Failed to read output back");
    assert_eq!(text, HEAP_ROUND_TRIP_TRACED);
}
