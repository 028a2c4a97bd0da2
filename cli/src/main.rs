//! The kefel CLI tool

use clap::{CommandFactory, Parser, Subcommand};
use env_logger::{Builder, Target};
use kefel::Kefel;
use log::LevelFilter;
use std::io::{self, BufRead, Write};
use std::path::Path;

#[derive(Parser)]
#[command(name = "kefel", author, version, about, long_about = None)]
struct Cli {
    #[arg(long, hide = true)]
    markdown_help: bool,

    /// Set log filter value [ off, error, warn, info, debug, trace ]
    #[arg(long)]
    #[arg(default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generates the multiply-by-k assembly routine and writes it to
    /// `<output-directory>/<name>.s`.
    Gen {
        /// The constant multiplier.
        #[arg(allow_negative_numbers = true)]
        k: i32,

        /// Output directory for the assembly file.
        #[arg(short, long)]
        #[arg(default_value_t = String::from("."))]
        output_directory: String,

        /// Symbol name of the generated routine.
        #[arg(long)]
        #[arg(default_value_t = String::from("kefel"))]
        name: String,

        /// Force overwriting of the output file.
        #[arg(short, long)]
        #[arg(default_value_t = false)]
        force: bool,
    },

    /// Multiplies k and x natively and via the generated routine and prints
    /// both products. Prompts for k and x when they are not given.
    Run {
        /// The constant multiplier; read from stdin when missing.
        #[arg(allow_negative_numbers = true)]
        k: Option<i32>,

        /// The operand; read from stdin when missing.
        #[arg(requires = "k", allow_negative_numbers = true)]
        x: Option<i32>,
    },
}

fn main() -> Result<(), io::Error> {
    let args = Cli::parse();

    let mut builder = Builder::new();
    builder
        .filter_level(args.log_level)
        .parse_default_env()
        .target(Target::Stdout)
        .init();

    if args.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        Ok(())
    } else if let Some(command) = args.command {
        run_command(command);
        Ok(())
    } else {
        Cli::command().print_help()
    }
}

#[allow(clippy::print_stderr)]
fn run_command(command: Commands) {
    let result = match command {
        Commands::Gen {
            k,
            output_directory,
            name,
            force,
        } => generate_file(k, &output_directory, &name, force),
        Commands::Run { k, x } => run_driver(k, x),
    };
    if let Err(errors) = result {
        for error in errors {
            eprintln!("{error}");
        }
        std::process::exit(1);
    }
}

fn generate_file(
    k: i32,
    output_directory: &str,
    name: &str,
    force: bool,
) -> Result<(), Vec<String>> {
    let dir = Path::new(output_directory);
    let path = dir.join(format!("{name}.s"));
    if path.exists() && !force {
        return Err(vec![format!(
            "{} already exists, use --force to overwrite",
            path.display()
        )]);
    }
    Kefel::with_name(k, name)
        .write_assembly_file(dir)
        .map_err(|e| vec![format!("Could not write {}: {e}", path.display())])?;
    Ok(())
}

#[allow(clippy::print_stdout)]
fn run_driver(k: Option<i32>, x: Option<i32>) -> Result<(), Vec<String>> {
    let (k, x) = match (k, x) {
        (Some(k), Some(x)) => (k, x),
        _ => prompt_for_inputs().map_err(|e| vec![e])?,
    };

    let kefel = Kefel::new(k);

    print!("\nUsing k * x:\n");
    println!("{k} * {x} = {}", k.wrapping_mul(x));

    print!("\nUsing kefel({x}):\n");
    println!("{k} * {x} = {}", kefel.apply(x));

    Ok(())
}

/// Reads two whitespace-separated integers from stdin; tokens may span lines.
#[allow(clippy::print_stdout)]
fn prompt_for_inputs() -> Result<(i32, i32), String> {
    print!("Enter k and x: ");
    io::stdout().flush().map_err(|e| e.to_string())?;

    let stdin = io::stdin();
    let mut values = vec![];
    for line in stdin.lock().lines() {
        let line = line.map_err(|e| e.to_string())?;
        for token in line.split_whitespace() {
            values.push(
                token
                    .parse::<i32>()
                    .map_err(|_| format!("invalid integer input `{token}`"))?,
            );
            if values.len() == 2 {
                return Ok((values[0], values[1]));
            }
        }
    }
    Err("expected two integers on stdin".to_string())
}
