use std::env;
use std::fmt::Debug;
use std::fs::{self, File};

use anyhow::Context as _;

use zkhost_emulator::config::{CONFIG_ENV, PHANTOM_ENV};
use zkhost_emulator::segment::{verify_chain, write_segment, SegmentInput};
use zkhost_emulator::utils::{
    parse_args, parse_u64_from_file, split_prog_into_segs, write_u64_to_file,
};
use zkhost_emulator::{ExecutionArg, Guest, Runtime, RuntimeConfig};
use zkhost_programs::{
    batchinput::BatchInput, binary_search::BinarySearch, context::Context, default_config,
    factors::Factors, fibonacci::Fibonacci, phantom_search::PhantomSearch, PROGRAMS,
};

macro_rules! dispatch {
    ($program:expr, $f:ident) => {
        match $program {
            "batchinput" => $f(&BatchInput, $program),
            "binary_search" => $f(&BinarySearch, $program),
            "context" => $f(&Context, $program),
            "factors" => $f(&Factors, $program),
            "fibonacci" => $f(&Fibonacci, $program),
            "phantom_search" => $f(&PhantomSearch, $program),
            _ => Err(anyhow::anyhow!(
                "unknown program {}, expected one of {:?}",
                $program,
                PROGRAMS
            )),
        }
    };
}

fn load_config(program: &str) -> anyhow::Result<RuntimeConfig> {
    if env::var(CONFIG_ENV).is_ok() || env::var(PHANTOM_ENV).is_ok() {
        RuntimeConfig::from_env()
    } else {
        Ok(default_config(program))
    }
}

fn parse_input(args: &str) -> anyhow::Result<Vec<u64>> {
    parse_args(&args.split_whitespace().collect::<Vec<_>>())
}

fn context_inputs() -> anyhow::Result<Vec<u64>> {
    match env::var("CONTEXT_IN") {
        Ok(path) => parse_u64_from_file(path),
        Err(_) => Ok(vec![]),
    }
}

fn write_context(words: &[u64]) -> anyhow::Result<()> {
    if let Ok(path) = env::var("CONTEXT_OUT") {
        write_u64_to_file(&path, words)?;
        log::info!("context written to {}", path);
    }
    Ok(())
}

fn run_program<G: Guest>(guest: &G, program: &str) -> anyhow::Result<()>
where
    G::Output: Debug,
{
    let runtime = Runtime::new(load_config(program)?)?;
    let arg = ExecutionArg {
        public_inputs: parse_input(&env::var("PUBLIC_INPUT").unwrap_or_default())?,
        private_inputs: parse_input(&env::var("PRIVATE_INPUT").unwrap_or_default())?,
        context_inputs: context_inputs()?,
    };

    let result = runtime.execute(guest, arg)?;
    log::info!("{} returned {:?}", program, result.output);
    log::info!("instance: {:?}", result.segment.public_inputs_and_outputs);
    log::debug!("trace:\n{}", result.segment.trace);
    write_context(&result.segment.context_outputs)?;

    if let Ok(seg_path) = env::var("SEG_OUTPUT") {
        fs::create_dir_all(&seg_path)?;
        let new_writer = |name: &str| -> Option<File> { File::create(name).ok() };
        write_segment(&result.segment, &seg_path, new_writer)?;
    }
    Ok(())
}

// PUBLIC_INPUT and PRIVATE_INPUT hold one `;` separated group per segment, or
// a single group shared by all of them.
fn segment_inputs(seg_num: usize) -> anyhow::Result<Vec<SegmentInput>> {
    let groups = |var: &str| -> anyhow::Result<Vec<Vec<u64>>> {
        let value = env::var(var).unwrap_or_default();
        let groups = value
            .split(';')
            .map(parse_input)
            .collect::<anyhow::Result<Vec<_>>>()?;
        match groups.len() {
            1 => Ok(vec![groups[0].clone(); seg_num]),
            n if n == seg_num => Ok(groups),
            n => Err(anyhow::anyhow!(
                "{var} has {n} segment groups, expected {seg_num}"
            )),
        }
    };
    let public = groups("PUBLIC_INPUT")?;
    let private = groups("PRIVATE_INPUT")?;
    Ok(public
        .into_iter()
        .zip(private)
        .map(|(public_inputs, private_inputs)| SegmentInput {
            public_inputs,
            private_inputs,
        })
        .collect())
}

fn split_program<G: Guest>(guest: &G, program: &str) -> anyhow::Result<()>
where
    G::Output: Debug,
{
    let seg_path = env::var("SEG_OUTPUT").unwrap_or(format!("/tmp/zkhost/{program}"));
    let seg_num = env::var("SEG_NUM").unwrap_or("1".to_string());
    let seg_num = seg_num
        .parse::<usize>()
        .with_context(|| format!("SEG_NUM={seg_num} is not a segment count"))?;
    if seg_num == 0 {
        anyhow::bail!("SEG_NUM must be at least 1");
    }

    let runtime = Runtime::new(load_config(program)?)?;
    let (segments, outputs) = split_prog_into_segs(
        &runtime,
        guest,
        &seg_path,
        context_inputs()?,
        segment_inputs(seg_num)?,
    )?;
    verify_chain(&segments)?;
    for (segment, output) in segments.iter().zip(outputs.iter()) {
        log::info!(
            "segment {} ({:?}) returned {:?}",
            segment.segment_id,
            segment.position,
            output
        );
    }
    if let Some(last) = segments.last() {
        write_context(&last.context_outputs)?;
    }
    log::info!("{} segments written to {}", segments.len(), seg_path);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::try_init().unwrap_or_default();
    let args: Vec<String> = env::args().collect();
    let helper = || {
        log::info!(
            "Help: {} run <program> | split <program> | list\n\
            env: PUBLIC_INPUT PRIVATE_INPUT CONTEXT_IN CONTEXT_OUT SEG_OUTPUT SEG_NUM {} {}",
            args[0],
            CONFIG_ENV,
            PHANTOM_ENV
        );
        std::process::exit(-1);
    };
    if args.len() < 2 {
        helper();
    }
    match (args[1].as_str(), args.get(2)) {
        ("run", Some(program)) => dispatch!(program.as_str(), run_program),
        ("split", Some(program)) => dispatch!(program.as_str(), split_program),
        ("list", _) => {
            for program in PROGRAMS {
                println!("{program}");
            }
            Ok(())
        }
        _ => {
            helper();
            Ok(())
        }
    }
}
