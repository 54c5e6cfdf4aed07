use babyduck::{compiler, frontend, vm::Machine};
use clap::Parser;
use std::{fmt, fs::read_to_string};

#[derive(Parser, Debug)]
#[clap(author, version, about = "Compiler and virtual machine for the BabyDuck language")]
struct Args {
    /// The BabyDuck source file to compile and run.
    #[clap(value_parser)]
    input: String,

    /// Print the generated quadruple listing before running.
    #[clap(short, long)]
    dump_quads: bool,
}

enum Error {
    Io(std::io::Error),
    Parse(frontend::ParseError),
    Compile(babyduck::Error),
    Runtime(babyduck::Error),
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "IO error: {}", e),
            Error::Parse(e) => write!(f, "{}", e),
            Error::Compile(e) => write!(f, "compile error: {}", e),
            Error::Runtime(e) => write!(f, "runtime error: {}", e),
        }
    }
}

fn main() -> Result<(), Error> {
    env_logger::init();
    let args = Args::parse();

    let source = read_to_string(&args.input).map_err(Error::Io)?;
    let ast = frontend::parse(&source).map_err(Error::Parse)?;
    let program = compiler::compile(&ast).map_err(Error::Compile)?;

    if args.dump_quads {
        eprint!("{}", program);
    }

    let output = Machine::new(&program).run().map_err(Error::Runtime)?;
    print!("{}", output);
    Ok(())
}
