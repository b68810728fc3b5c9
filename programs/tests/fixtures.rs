use zkhost_emulator::context::{ContextOp, ContextSchema, SegmentPosition};
use zkhost_emulator::errors::PhantomTargetError;
use zkhost_emulator::segment::{verify_chain, SegmentInput};
use zkhost_emulator::trace::HostOp;
use zkhost_emulator::utils::parse_args;
use zkhost_emulator::{ExecutionArg, ExecutionError, Runtime, RuntimeConfig, Visibility};
use zkhost_programs::batchinput::BatchInput;
use zkhost_programs::binary_search::BinarySearch;
use zkhost_programs::context::{self, Context};
use zkhost_programs::factors::Factors;
use zkhost_programs::fibonacci::{fibonacci, Fibonacci};
use zkhost_programs::phantom_search::{self, PhantomSearch};

fn public(words: &[u64]) -> ExecutionArg {
    ExecutionArg {
        public_inputs: words.to_vec(),
        ..Default::default()
    }
}

fn default_runtime() -> Runtime {
    Runtime::new(RuntimeConfig::default()).unwrap()
}

#[test]
fn test_binary_search() -> anyhow::Result<()> {
    env_logger::try_init().unwrap_or_default();
    let runtime = default_runtime();

    let found = runtime.execute(&BinarySearch, public(&[3]))?;
    assert_eq!(found.output, 3);
    assert_eq!(found.segment.public_inputs_and_outputs, vec![3]);

    let missing = runtime.execute(&BinarySearch, public(&[9]))?;
    assert_eq!(missing.output, -1);
    assert_eq!(missing.segment.read_output::<i64>()?, -1);
    Ok(())
}

#[test]
fn test_binary_search_without_input() {
    let err = default_runtime()
        .execute(&BinarySearch, ExecutionArg::default())
        .err()
        .unwrap();
    assert_eq!(
        err,
        ExecutionError::InputExhausted {
            visibility: Visibility::Public,
            reads: 0
        }
    );
}

#[test]
fn test_context_sum() -> anyhow::Result<()> {
    let runtime = Runtime::new(context::config())?;
    let result = runtime.execute(
        &Context,
        ExecutionArg {
            context_inputs: vec![2, 5],
            ..Default::default()
        },
    )?;
    assert_eq!(result.output, 7);
    assert_eq!(result.segment.context_outputs, vec![7, 7]);
    Ok(())
}

#[test]
fn test_context_too_few_slots() {
    let runtime = Runtime::new(context::config()).unwrap();
    let err = runtime
        .execute(
            &Context,
            ExecutionArg {
                context_inputs: vec![2],
                ..Default::default()
            },
        )
        .err()
        .unwrap();
    assert_eq!(
        err,
        ExecutionError::ContextSchemaMismatch {
            position: SegmentPosition::Only,
            op: ContextOp::Read,
            expected: 2,
            actual: 1
        }
    );
}

#[test]
fn test_context_over_three_segments() -> anyhow::Result<()> {
    let runtime = Runtime::new(context::config())?;
    let inputs = vec![SegmentInput::default(); 3];
    let segments = runtime
        .execute_segments(&Context, vec![1, 2], inputs)?
        .into_iter()
        .map(|r| r.segment)
        .collect::<Vec<_>>();

    let outputs = segments
        .iter()
        .map(|s| s.context_outputs.clone())
        .collect::<Vec<_>>();
    assert_eq!(outputs, vec![vec![3, 3], vec![6, 6], vec![12, 12]]);
    verify_chain(&segments)?;
    Ok(())
}

#[test]
fn test_context_without_schema() {
    // the default schema has no slots, so the first read is already too many
    let err = default_runtime()
        .execute(&Context, ExecutionArg::default())
        .err()
        .unwrap();
    assert!(matches!(
        err,
        ExecutionError::ContextSchemaMismatch {
            op: ContextOp::Read,
            expected: 0,
            actual: 1,
            ..
        }
    ));
}

#[test]
fn test_batchinput() -> anyhow::Result<()> {
    let runtime = default_runtime();
    let private_inputs = parse_args(&["0x0000000000000001:bytes-packed"])?;
    let result = runtime.execute(
        &BatchInput,
        ExecutionArg {
            private_inputs,
            ..Default::default()
        },
    )?;
    assert_eq!(result.output, 0);
    // private words never reach the instance
    assert!(result.segment.public_inputs_and_outputs.is_empty());

    let err = runtime
        .execute(
            &BatchInput,
            ExecutionArg {
                private_inputs: vec![1],
                ..Default::default()
            },
        )
        .err()
        .unwrap();
    assert_eq!(err, ExecutionError::Violated { site: 0 });
    Ok(())
}

#[test]
fn test_factors() -> anyhow::Result<()> {
    let runtime = default_runtime();
    let result = runtime.execute(
        &Factors,
        ExecutionArg {
            public_inputs: vec![91],
            private_inputs: vec![7, 13],
            ..Default::default()
        },
    )?;
    assert_eq!(result.segment.public_inputs_and_outputs, vec![91, 91]);
    assert_eq!(result.segment.outputs, vec![91]);
    assert_eq!(result.segment.constraints, 2);

    let trivial = runtime.execute(
        &Factors,
        ExecutionArg {
            public_inputs: vec![91],
            private_inputs: vec![1, 91],
            ..Default::default()
        },
    );
    assert_eq!(trivial.err(), Some(ExecutionError::Violated { site: 0 }));

    let wrong = runtime.execute(
        &Factors,
        ExecutionArg {
            public_inputs: vec![91],
            private_inputs: vec![3, 31],
            ..Default::default()
        },
    );
    assert_eq!(wrong.err(), Some(ExecutionError::Violated { site: 1 }));
    Ok(())
}

#[test]
fn test_fibonacci() -> anyhow::Result<()> {
    let result = default_runtime().execute(&Fibonacci, public(&[15]))?;
    assert_eq!(result.output, 610);
    assert_eq!(result.segment.outputs, vec![610]);
    assert_eq!(result.segment.trace.count(HostOp::Log), 1);
    assert_eq!(fibonacci(93), 12200160415121876738);

    let err = default_runtime()
        .execute(&Fibonacci, public(&[94]))
        .err()
        .unwrap();
    assert!(err.is_rejection());
    Ok(())
}

#[test]
fn test_phantom_search() -> anyhow::Result<()> {
    let runtime = Runtime::new(phantom_search::config())?;
    let result = runtime.execute(&PhantomSearch, public(&[21]))?;
    assert_eq!(result.output, 5);

    // one load in traced code, the search itself left nothing behind
    let trace = &result.segment.trace;
    assert_eq!(trace.count(HostOp::MemoryLoad), 1);
    assert_eq!(trace.count(HostOp::Require), 2);
    assert_eq!(
        trace.count(HostOp::MemoryStore),
        phantom_search::ARRAY.len()
    );

    let missing = runtime.execute(&PhantomSearch, public(&[4])).err();
    assert_eq!(missing, Some(ExecutionError::Violated { site: 0 }));
    Ok(())
}

#[test]
fn test_phantom_search_not_designated() {
    let runtime = Runtime::new(RuntimeConfig::new(ContextSchema::default(), vec![])).unwrap();
    let err = runtime
        .execute(&PhantomSearch, public(&[21]))
        .err()
        .unwrap();
    assert_eq!(
        err,
        ExecutionError::InvalidPhantomTarget {
            function: "search".to_string(),
            reason: PhantomTargetError::NotDesignated
        }
    );
}

#[test]
fn test_phantom_search_is_deterministic() -> anyhow::Result<()> {
    let runtime = Runtime::new(phantom_search::config())?;
    let a = runtime.execute(&PhantomSearch, public(&[34]))?.segment;
    let b = runtime.execute(&PhantomSearch, public(&[34]))?.segment;
    assert_eq!(a.trace_digest, b.trace_digest);
    assert_eq!(a, b);
    Ok(())
}
