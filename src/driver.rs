use std::{
    fs,
    io::{self, BufWriter, Write},
    path::PathBuf,
};

use anyhow::Context;
use clap::{ArgAction, Parser};
use thiserror::Error;

use veerji_parser::{
    ast,
    lexer::{self, LexerError, Token},
    ParserError,
};

use crate::emit;

#[derive(Error, Debug)]
pub enum DriverExecutionError {
    #[error("could not read {}", .path.display())]
    Input {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Lexer(#[from] LexerError),
    #[error(transparent)]
    Parser(#[from] ParserError),
    #[error("could not write {}", .path.display())]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl DriverExecutionError {
    pub fn exit_code(&self) -> u8 {
        match self {
            DriverExecutionError::Input { .. } => 1,
            DriverExecutionError::Lexer(_) | DriverExecutionError::Parser(_) => 3,
            DriverExecutionError::Output { .. } => 4,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "veerji",
    version,
    about = "Compiles Veerji source into x86-64 NASM assembly for Linux"
)]
pub struct Args {
    /// Source file, usually ending in .veerji
    pub input: PathBuf,
    /// Where the assembly is written
    #[arg(short, long, default_value = "out.s")]
    pub output: PathBuf,
    /// Stop after lexing
    #[arg(long)]
    pub lex: bool,
    /// Stop after parsing
    #[arg(long)]
    pub parse: bool,
    /// Stop after code generation and print the assembly IR
    #[arg(long)]
    pub codegen: bool,
    /// Write the assembly file (the default)
    #[arg(short = 'S', conflicts_with_all = ["lex", "parse", "codegen"])]
    pub assembly: bool,
    /// Compile every non-blank line instead of only the first one
    #[arg(long)]
    pub all_lines: bool,
    /// Longest string a print statement may carry, in bytes
    #[arg(long, default_value_t = lexer::DEFAULT_MAX_STRING_LEN)]
    pub max_string_len: usize,
    /// Do not print the token and statement dumps
    #[arg(short, long)]
    pub quiet: bool,
    /// Log more, can be repeated
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Lex,
    Parse,
    Codegen,
    #[default]
    Assembly,
}

#[derive(Debug)]
pub struct Options {
    pub stage: Stage,
    pub input_file: PathBuf,
    pub assembly_file: PathBuf,
    pub all_lines: bool,
    pub max_string_len: usize,
    pub dump: bool,
}

impl From<Args> for Options {
    fn from(args: Args) -> Self {
        let stage = if args.assembly {
            Stage::Assembly
        } else if args.lex {
            Stage::Lex
        } else if args.parse {
            Stage::Parse
        } else if args.codegen {
            Stage::Codegen
        } else {
            Stage::Assembly
        };

        Self {
            stage,
            input_file: args.input,
            assembly_file: args.output,
            all_lines: args.all_lines,
            max_string_len: args.max_string_len,
            dump: !args.quiet,
        }
    }
}

impl Options {
    pub fn read_source(&self) -> Result<String, DriverExecutionError> {
        fs::read_to_string(&self.input_file).map_err(|source| DriverExecutionError::Input {
            path: self.input_file.clone(),
            source,
        })
    }

    /// Picks the lines to compile, paired with their 1-based line numbers.
    ///
    /// By default only the first line is compiled, blank or not, so an empty
    /// file is a syntax error. With `all_lines` every non-blank line is.
    pub fn source_lines<'a>(&self, source: &'a str) -> Vec<(usize, &'a str)> {
        let mut lines = source.split_inclusive('\n');

        if self.all_lines {
            return lines
                .enumerate()
                .filter(|(_, line)| !line.trim().is_empty())
                .map(|(i, line)| (i + 1, line))
                .collect();
        }

        let first = lines.next().unwrap_or("");
        let ignored = lines.filter(|line| !line.trim().is_empty()).count();
        if ignored > 0 {
            log::warn!(
                "only the first line of {:?} is compiled, ignoring {} more line(s), pass --all-lines to compile them",
                self.input_file,
                ignored
            );
        }
        vec![(1, first)]
    }

    pub fn run_lexer(&self, source: &str) -> Result<Vec<Token>, DriverExecutionError> {
        let mut tokens = vec![];

        for (number, line) in self.source_lines(source) {
            let lexer = lexer::Lexer::new(line)
                .at_line(number)
                .with_max_string_len(self.max_string_len);
            for tok in lexer {
                tokens.push(tok?);
            }
        }

        log::debug!("lexed {} token(s)", tokens.len());

        if self.dump {
            println!("=== TOKENS ===");
            for (i, tok) in tokens.iter().enumerate() {
                println!("Token {}: Type={:?}, Value={}", i, tok.kind, tok.text);
            }
        }

        Ok(tokens)
    }

    pub fn run_parser(&self, tokens: Vec<Token>) -> Result<ast::Program, DriverExecutionError> {
        let program = veerji_parser::parse(tokens)?;

        if self.dump {
            println!("=== PARSED ===");
            print!("{}", program);
        }

        Ok(program)
    }

    pub fn run_code_gen(&self, program: &ast::Program) -> veerji_asm::Program {
        let program = veerji_asmgen::code_generation(program);

        if let Stage::Codegen = self.stage {
            println!("{:#?}", program);
        }

        program
    }

    /// Replaces the assembly file with the rendered program.
    pub fn run_assembly_emission(
        &self,
        program: &veerji_asm::Program,
    ) -> Result<(), DriverExecutionError> {
        let output_error = |source: io::Error| DriverExecutionError::Output {
            path: self.assembly_file.clone(),
            source,
        };

        let file = fs::File::create(&self.assembly_file).map_err(output_error)?;
        let mut writer = BufWriter::new(file);
        emit::write_program(program, &mut writer).map_err(output_error)?;
        writer.flush().map_err(output_error)?;

        if self.dump {
            println!("Assembly written to {}", self.assembly_file.display());
        }

        Ok(())
    }

    pub fn compile(&self) -> Result<(), DriverExecutionError> {
        let source = self.read_source()?;

        let tokens = self.run_lexer(&source)?;
        if let Stage::Lex = self.stage {
            return Ok(());
        }

        let program = self.run_parser(tokens)?;
        if let Stage::Parse = self.stage {
            return Ok(());
        }

        let program = self.run_code_gen(&program);
        if let Stage::Codegen = self.stage {
            return Ok(());
        }

        self.run_assembly_emission(&program)
    }
}

/// Runs one compilation. Errors are returned, never turned into a process
/// exit here.
pub fn run(args: Args) -> anyhow::Result<()> {
    let opts = Options::from(args);
    log::debug!("compiling with {:?}", opts);

    opts.compile()
        .with_context(|| format!("failed to compile {}", opts.input_file.display()))
}
