use std::{fs, path::PathBuf, process::ExitCode};

use clap::Parser;
use formulary::{Expression, SymbolTable};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

/// formulary compiles a mathematical expression and prints its value.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Reads the expression from a file instead of the command line.
    #[arg(short, long, value_name = "PATH", conflicts_with = "expression")]
    file: Option<PathBuf>,

    /// Binds a scalar variable, as in `--var x=2.5`.
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_scalar)]
    variables: Vec<(String, f64)>,

    /// Binds a string variable, as in `--string name=text`.
    #[arg(long = "string", value_name = "NAME=TEXT", value_parser = parse_text)]
    strings: Vec<(String, String)>,

    /// Binds a vector variable, as in `--vector v=1,2,3`.
    #[arg(long = "vector", value_name = "NAME=LIST", value_parser = parse_list)]
    vectors: Vec<(String, Vec<f64>)>,

    /// Adds the constants `pi`, `epsilon` and `inf`.
    #[arg(short, long)]
    constants: bool,

    #[arg(required_unless_present = "file")]
    expression: Option<String>,
}

fn split_binding(binding: &str) -> Result<(&str, &str), String> {
    binding.split_once('=')
           .ok_or_else(|| format!("expected NAME=VALUE, found '{binding}'"))
}

fn parse_number(text: &str) -> Result<f64, String> {
    text.trim()
        .parse()
        .map_err(|_| format!("'{text}' is not a number"))
}

fn parse_scalar(binding: &str) -> Result<(String, f64), String> {
    let (name, value) = split_binding(binding)?;
    Ok((name.to_string(), parse_number(value)?))
}

fn parse_text(binding: &str) -> Result<(String, String), String> {
    let (name, value) = split_binding(binding)?;
    Ok((name.to_string(), value.to_string()))
}

fn parse_list(binding: &str) -> Result<(String, Vec<f64>), String> {
    let (name, values) = split_binding(binding)?;
    let values = values.split(',')
                       .map(parse_number)
                       .collect::<Result<Vec<_>, _>>()?;
    Ok((name.to_string(), values))
}

fn bind(args: &Args, symbols: &SymbolTable) -> Result<(), String> {
    if args.constants {
        symbols.add_constants();
    }
    for (name, value) in &args.variables {
        symbols.create_variable(name, *value)
               .map_err(|e| e.to_string())?;
    }
    for (name, value) in &args.strings {
        symbols.create_stringvar(name, value)
               .map_err(|e| e.to_string())?;
    }
    for (name, values) in &args.vectors {
        symbols.create_vector(name, values)
               .map_err(|e| e.to_string())?;
    }
    Ok(())
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().compact()
         .with_env_filter(filter)
         .with_writer(std::io::stderr)
         .with_target(false)
         .without_time()
         .init();

    let args = Args::parse();

    let source = match (&args.file, &args.expression) {
        (Some(path), _) => match fs::read_to_string(path) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("Failed to read the input file '{}': {e}", path.display());
                return ExitCode::FAILURE;
            },
        },
        (None, Some(expression)) => expression.clone(),
        (None, None) => return ExitCode::FAILURE,
    };

    let symbols = SymbolTable::new();
    if let Err(e) = bind(&args, &symbols) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }
    debug!(variables = symbols.variable_count(),
           strings = symbols.stringvar_count(),
           vectors = symbols.vector_count(),
           "bound command line symbols");

    match Expression::compile(&source, &symbols) {
        Ok(expression) => {
            println!("{}", expression.evaluate());
            ExitCode::SUCCESS
        },
        Err(error) => {
            for diagnostic in error.diagnostics() {
                eprintln!("{diagnostic}");
            }
            ExitCode::FAILURE
        },
    }
}
