#![allow(clippy::uninlined_format_args)]

mod logger;

use retrace::{backends, Error, Flags, Regex};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Instant,
};
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "retrace-tool")]
struct Opt {
    /// The regular expression.
    pattern: String,

    /// The flags of the regular expression, like "gim".
    #[structopt(long, short)]
    flags: Option<Flags>,

    /// Dump the parsed AST to stdout.
    #[structopt(long)]
    dump_ast: bool,

    /// Dump the compiled graph to stdout.
    #[structopt(long)]
    dump_graph: bool,

    /// Dump all regular expression compilation phases to stdout.
    #[structopt(long)]
    dump_phases: bool,

    /// Print a JSON trace of the search on each input.
    #[structopt(long)]
    trace: bool,

    /// Maximum log level: off, error, warn, info, debug or trace.
    #[structopt(long, default_value = "warn")]
    log_level: log::LevelFilter,

    /// The input values to match against.
    #[structopt(conflicts_with_all = &["bench", "file"])]
    inputs: Vec<String>,

    /// Match against the contents of a specified file.
    #[structopt(long, conflicts_with_all = &["bench", "inputs"])]
    file: Option<PathBuf>,

    /// Benchmark the matches of the specified file.
    #[structopt(long, conflicts_with_all = &["file", "inputs"])]
    bench: Option<PathBuf>,
}

fn format_match(r: &retrace::Match, input: &str) -> String {
    let mut result = format!(
        "\"{}\" ({}..{})",
        &input[r.range()],
        r.range().start,
        r.range().end
    );

    // Show capture groups if any exist
    if !r.captures.is_empty() {
        result.push_str(", captures: [");
        for (i, cg) in r.captures.iter().enumerate() {
            if i > 0 {
                result.push_str(", ");
            }
            if let Some(cg_range) = cg {
                result.push_str(&format!(
                    "\"{}\" ({}..{})",
                    &input[cg_range.clone()],
                    cg_range.start,
                    cg_range.end
                ));
            } else {
                result.push_str("None");
            }
        }
        result.push(']');
    }

    result
}

fn exec_re_on_string(re: &Regex, input: &str) -> Result<(), Error> {
    let mut matches = re.find_iter(input);
    if let Some(res) = matches.next() {
        let res = res?;
        let mut count = 1;
        for m in matches {
            m?;
            count += 1;
        }
        println!("Match: {}, total: {}", format_match(&res, input), count);
    } else {
        println!("No match");
    }
    Ok(())
}

fn trace_re_on_string(re: &Regex, input: &str) -> Result<(), Error> {
    let flags = re.flags();
    let outcome = re.exec_debug(input, 0, flags.multiline, flags.icase)?;
    if let Some(trace) = &outcome.trace {
        match serde_json::to_string_pretty(trace) {
            Ok(json) => println!("{}", json),
            Err(err) => eprintln!("Failed to serialize trace: {}", err),
        }
        println!(
            "Visits: {}, backtracks: {}",
            trace.node_visits(),
            trace.backtracks()
        );
    }
    if outcome.matched {
        println!("Match: end {}, captures: {:?}", outcome.end_index, outcome.captures);
    } else {
        println!("No match");
    }
    Ok(())
}

fn bench_re_on_path(re: &Regex, path: &Path) -> Result<(), Error> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(err) => {
            println!("{}: {}", err, path.display());
            return Ok(());
        }
    };
    let input = contents.as_str();
    // Warmup
    re.find_iter(input).collect::<Result<Vec<_>, _>>()?;
    let start = Instant::now();
    for _ in 0..25 {
        re.find_iter(input).collect::<Result<Vec<_>, _>>()?;
    }
    let duration = start.elapsed();
    println!("{} ms", duration.as_millis());
    Ok(())
}

fn main() -> Result<(), Error> {
    let args = Opt::from_args();
    if let Err(err) = logger::Logger::init(args.log_level) {
        eprintln!("Failed to install logger: {}", err);
    }

    let flags = args.flags.unwrap_or_default();
    let ast = backends::parse(&args.pattern)?;
    if args.dump_phases || args.dump_ast {
        println!("AST:\n{}", ast);
    }
    let graph = backends::compile(&ast);
    if args.dump_phases || args.dump_graph {
        println!("Graph:\n{}", graph);
    }
    let re = Regex::with_flags(&args.pattern, flags)?;

    let run = |input: &str| {
        if args.trace {
            trace_re_on_string(&re, input)
        } else {
            exec_re_on_string(&re, input)
        }
    };
    if let Some(ref path) = args.file {
        match fs::read_to_string(path) {
            Ok(contents) => run(contents.as_str())?,
            Err(err) => println!("{}: {}", err, path.display()),
        };
    } else if let Some(ref path) = args.bench {
        bench_re_on_path(&re, path)?;
    } else {
        for input in &args.inputs {
            run(input)?;
        }
    }
    Ok(())
}
