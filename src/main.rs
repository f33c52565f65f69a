use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use batch_calculator::batch::{self, Narrator};
use batch_calculator::ops::Op;

/// A four-function integer calculator with a file batch mode.
#[derive(Parser, Debug)]
#[command(name = "bcalc", version)]
struct Cli {
    /// Process `<operation> <int> <int>` records from FILE and write the
    /// results to output.txt instead of prompting interactively.
    #[arg(short = 'f', long = "file", value_name = "FILE")]
    file: Option<Option<PathBuf>>,
}

fn main() {
    let cli = Cli::parse();
    println!("Welcome to the calculator program!");

    match cli.file {
        Some(Some(path)) => file_mode(&path),
        Some(None) => {
            // The one non-zero exit: batch mode asked for without a file.
            eprintln!("No file name given");
            process::exit(1);
        }
        None => {
            println!("No input file given");
            println!("Defaulting to manual input");
            if let Err(err) = interactive_mode() {
                let err: anyhow::Error = err.into();
                eprintln!("{err:#}");
            }
        }
    }
}

fn file_mode(path: &Path) {
    println!("File mode");
    println!("File name: {}", path.display());

    let mut narrator = Narrator::stderr();
    match batch::process_file(path, batch::OUTPUT_FILE, &mut narrator) {
        Ok(summary) => {
            println!(
                "Processed {} record(s): {} written, {} skipped",
                summary.records(),
                summary.written,
                summary.skipped,
            );
            println!("Output has been written to {}", batch::OUTPUT_FILE);
        }
        Err(err) => {
            // Batch failures are reported but do not change the exit code.
            let err: anyhow::Error = err.into();
            eprintln!("{err:#}");
        }
    }
}

/// Prompt loop: two numbers and a menu choice per round, until `q` or EOF.
fn interactive_mode() -> io::Result<()> {
    let mut line = String::new();
    loop {
        if prompt("Enter first number or q to quit: ", &mut line)? == 0 {
            break;
        }
        let first = line.trim();
        if first == "q" {
            println!("Exiting program");
            break;
        }
        let lhs: i32 = match first.parse() {
            Ok(number) => number,
            Err(_) => {
                println!("\"{first}\" is not a number");
                continue;
            }
        };

        if prompt("Enter second number: ", &mut line)? == 0 {
            break;
        }
        let second = line.trim();
        let rhs: i32 = match second.parse() {
            Ok(number) => number,
            Err(_) => {
                println!("\"{second}\" is not a number");
                continue;
            }
        };

        let menu = "Enter operation [1: add, 2: subtract, 3: multiply, 4: divide]: ";
        if prompt(menu, &mut line)? == 0 {
            break;
        }
        let op = match menu_op(line.trim()) {
            Some(op) => op,
            None => {
                println!("Invalid operation");
                continue;
            }
        };

        match op.apply(lhs, rhs) {
            Ok(result) => println!("Result: {result}"),
            Err(err) => println!("{err}"),
        }
    }
    Ok(())
}

/// Print a prompt and read one reply line into `line`. Returns the byte
/// count from `read_line`, so 0 means stdin is exhausted.
fn prompt(message: &str, line: &mut String) -> io::Result<usize> {
    print!("{message}");
    io::stdout().flush()?;
    line.clear();
    io::stdin().read_line(line)
}

/// Map an interactive menu choice to its operation.
fn menu_op(choice: &str) -> Option<Op> {
    match choice {
        "1" => Some(Op::Add),
        "2" => Some(Op::Subtract),
        "3" => Some(Op::Multiply),
        "4" => Some(Op::Divide),
        _ => None,
    }
}
