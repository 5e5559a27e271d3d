//! The Cedar compiler CLI.
//!
//! Reads a program tree from a `nodeType`-tagged JSON document (produced
//! by an external front-end), lowers it to LLVM IR, and writes the
//! verified module as textual IR.
//!
//! ```text
//! cedarc program.json              # IR to stdout
//! cedarc program.json -o out.ll    # IR to a file
//! cedarc program.json --dump-ast   # also print the tree
//! ```

use std::path::PathBuf;
use std::process;

use clap::Parser;

use cedar_ast::pretty::PrettyPrinter;

#[derive(Parser)]
#[command(name = "cedarc", version, about = "The Cedar compiler")]
struct Cli {
    /// Path to the AST JSON document
    input: PathBuf,

    /// Output path for the textual LLVM IR (stdout if omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print the parsed tree before lowering
    #[arg(long = "dump-ast")]
    dump_ast: bool,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let source = std::fs::read_to_string(&cli.input)
        .map_err(|e| format!("failed to read '{}': {e}", cli.input.display()))?;

    let program = cedar_ast::json::program_from_str(&source)
        .map_err(|e| format!("failed to load '{}': {e}", cli.input.display()))?;

    if cli.dump_ast {
        let mut printer = PrettyPrinter::new();
        print!("{}", printer.print_program(&program));
    }

    let ir = cedar_codegen::generate_ir(&program).map_err(|e| e.to_string())?;

    match &cli.output {
        Some(path) => std::fs::write(path, ir)
            .map_err(|e| format!("failed to write '{}': {e}", path.display()))?,
        None => print!("{ir}"),
    }

    Ok(())
}
