//! Build and query command-line front end for [`dawgdic_core`].

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use dawgdic_core::dawg_builder::DawgBuilder;
use dawgdic_core::{Completer, Dictionary, Guide, RankedCompleter, RankedGuide};

#[derive(Parser)]
#[command(name = "dawgdic-cli", about = "Build and query DAWG-backed double-array dictionaries")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build a dictionary (and optionally a guide) from a sorted lexicon.
    Build(BuildArgs),
    /// Query a built dictionary, exactly or via completion.
    Query(QueryArgs),
}

#[derive(Args)]
struct BuildArgs {
    /// Each input line is `key\tvalue` instead of bare `key` (values then
    /// default to the 0-based line number).
    #[arg(short = 't', long)]
    tab_separated: bool,

    /// Emit a plain lexicographic completion guide after the dictionary.
    #[arg(short = 'g', long, conflicts_with = "ranked_guide")]
    guide: bool,

    /// Emit a value-ranked completion guide after the dictionary.
    #[arg(short = 'r', long)]
    ranked_guide: bool,

    /// Sorted lexicon to read, or `-`/omitted for stdin.
    lexicon: Option<PathBuf>,

    /// Destination for the built dictionary, or `-`/omitted for stdout.
    dicfile: Option<PathBuf>,
}

#[derive(Args)]
struct QueryArgs {
    /// Enumerate completions via a plain guide instead of exact lookup.
    #[arg(short = 'g', long, conflicts_with = "ranked_guide")]
    guide: bool,

    /// Enumerate completions via a ranked guide instead of exact lookup.
    #[arg(short = 'r', long)]
    ranked_guide: bool,

    /// Dictionary (and, with `-g`/`-r`, guide) to read, or `-`/omitted for
    /// stdin.
    dicfile: Option<PathBuf>,

    /// Query lines to read, or `-`/omitted for stdin.
    lexicon: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("argument error: {0}")]
    Arg(String),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("build error: {0}")]
    Build(String),
    #[error("corrupt file: {0}")]
    Corrupt(String),
}

impl CliError {
    fn exit_code(&self) -> u8 {
        match self {
            CliError::Arg(_) | CliError::Io(_) => 1,
            CliError::Build(_) | CliError::Corrupt(_) => 2,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("dawgdic-cli: {e}");
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Build(args) => build(args),
        Command::Query(args) => query(args),
    }
}

fn open_input(path: &Option<PathBuf>) -> Result<Box<dyn Read>, CliError> {
    match path {
        None => Ok(Box::new(io::stdin())),
        Some(p) if p.as_os_str() == "-" => Ok(Box::new(io::stdin())),
        Some(p) => Ok(Box::new(File::open(p)?)),
    }
}

fn open_output(path: &Option<PathBuf>) -> Result<Box<dyn Write>, CliError> {
    match path {
        None => Ok(Box::new(io::stdout())),
        Some(p) if p.as_os_str() == "-" => Ok(Box::new(io::stdout())),
        Some(p) => Ok(Box::new(File::create(p)?)),
    }
}

fn build(args: BuildArgs) -> Result<(), CliError> {
    let input = open_input(&args.lexicon)?;
    let reader = BufReader::new(input);

    let mut builder = DawgBuilder::new();
    let mut keys_read: u32 = 0;

    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.is_empty() {
            continue;
        }

        let (key, value) = if args.tab_separated {
            match line.split_once('\t') {
                Some((key, value)) => {
                    let value: i32 = value
                        .parse()
                        .map_err(|_| CliError::Arg(format!("line {}: invalid value {value:?}", line_number + 1)))?;
                    (key, value)
                }
                None => return Err(CliError::Arg(format!("line {}: missing tab separator", line_number + 1))),
            }
        } else {
            (line.as_str(), line_number as i32)
        };

        builder
            .insert(key.as_bytes(), value)
            .map_err(|e| CliError::Build(format!("line {}: {e}", line_number + 1)))?;
        keys_read += 1;
    }

    let dawg = builder.finish();
    let states = dawg.states_count();
    let merged_states = dawg.merged_states_count();
    let transitions = dawg.transitions_count();
    let merged_transitions = dawg.merged_transitions_count();

    let dic = Dictionary::build(&dawg).map_err(|e| CliError::Build(e.to_string()))?;
    let dictionary_size = dic.size();
    let unused_units = dic.unused_units();
    let unused_ratio = if dictionary_size > 0 {
        f64::from(unused_units) / dictionary_size as f64
    } else {
        0.0
    };

    eprintln!(
        "keys: {keys_read}, states: {states}, merged states: {merged_states}, \
         transitions: {transitions}, merged transitions: {merged_transitions}, \
         dictionary size: {dictionary_size}, unused-unit ratio: {unused_ratio:.4}"
    );

    let mut output = BufWriter::new(open_output(&args.dicfile)?);
    dic.write(&mut output)?;

    if args.guide {
        let guide = Guide::build(&dic);
        guide.write(&mut output)?;
    } else if args.ranked_guide {
        let guide = RankedGuide::build(&dic);
        guide.write(&mut output)?;
    }
    output.flush()?;

    Ok(())
}

fn query(args: QueryArgs) -> Result<(), CliError> {
    let mut dic_input = open_input(&args.dicfile)?;
    let mut dic_bytes = Vec::new();
    dic_input.read_to_end(&mut dic_bytes)?;
    let mut cursor = io::Cursor::new(&dic_bytes);

    let dic = Dictionary::read(&mut cursor).map_err(|e| CliError::Corrupt(e.to_string()))?;

    let guide = if args.guide {
        Some(Guide::read_matching(&mut cursor, &dic).map_err(|e| CliError::Corrupt(e.to_string()))?)
    } else {
        None
    };
    let ranked_guide = if args.ranked_guide {
        Some(RankedGuide::read_matching(&mut cursor, &dic).map_err(|e| CliError::Corrupt(e.to_string()))?)
    } else {
        None
    };

    let input = open_input(&args.lexicon)?;
    let reader = BufReader::new(input);
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    for line in reader.lines() {
        let line = line?;
        if line.is_empty() {
            continue;
        }

        if let Some(ranked_guide) = &ranked_guide {
            let (idx, consumed) = dic.follow_prefix(line.as_bytes(), dic.root());
            if consumed != line.len() {
                continue;
            }
            let mut completer = RankedCompleter::new(&dic, ranked_guide);
            completer.start(idx, line.as_bytes());
            while completer.next() {
                writeln!(out, "{}\t{}", String::from_utf8_lossy(completer.key()), completer.value())?;
            }
        } else if let Some(guide) = &guide {
            let (idx, consumed) = dic.follow_prefix(line.as_bytes(), dic.root());
            if consumed != line.len() {
                continue;
            }
            let mut completer = Completer::new(&dic, guide);
            completer.start(idx, line.as_bytes());
            while completer.next() {
                writeln!(out, "{}\t{}", String::from_utf8_lossy(completer.key()), completer.value())?;
            }
        } else {
            match dic.find(line.as_bytes()) {
                Some(value) => writeln!(out, "{line}\tSome({value})")?,
                None => writeln!(out, "{line}\tNone")?,
            }
        }
    }

    out.flush()?;
    Ok(())
}
