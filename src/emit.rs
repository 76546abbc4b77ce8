use std::io::{self, Write};

use veerji_asm::{DataDefinition, Instruction, Operand, Program, Register};

const INDENT: &str = "    ";

/// A Structure that implements this trait can render itself as NASM source.
pub trait EmitAsm {
    /// The indent_depth argument only needs to be used when you have to indent something.
    fn emit(&self, indent_depth: u32) -> String;
}

impl EmitAsm for Register {
    fn emit(&self, _: u32) -> String {
        match self {
            Register::AX => "rax",
            Register::DI => "rdi",
            Register::SI => "rsi",
            Register::DX => "rdx",
        }
        .to_owned()
    }
}

impl EmitAsm for Operand {
    fn emit(&self, indent_depth: u32) -> String {
        match self {
            Operand::Register(reg) => reg.emit(indent_depth),
            Operand::Imm(val) => val.to_string(),
            Operand::Symbol(sym) => sym.to_owned(),
        }
    }
}

impl EmitAsm for Instruction {
    fn emit(&self, indent_depth: u32) -> String {
        let tabs = INDENT.repeat(indent_depth as usize);

        match self {
            Instruction::Mov { src, dst } => format!(
                "{}mov {}, {}\n",
                tabs,
                dst.emit(indent_depth),
                src.emit(indent_depth)
            ),
            Instruction::Xor { src, dst } => format!(
                "{}xor {}, {}\n",
                tabs,
                dst.emit(indent_depth),
                src.emit(indent_depth)
            ),
            Instruction::Syscall => format!("{}syscall\n", tabs),
        }
    }
}

impl EmitAsm for DataDefinition {
    fn emit(&self, _: u32) -> String {
        format!(
            "{} db {}\n{} equ $ - {}\n",
            self.label,
            byte_string_literal(&self.bytes),
            self.length_label,
            self.label
        )
    }
}

impl EmitAsm for Program {
    fn emit(&self, indent_depth: u32) -> String {
        let mut out = String::from("section .data\n");

        for data in &self.data {
            out.push_str(&data.emit(indent_depth));
        }

        out.push_str("\nsection .text\n");
        out.push_str(&format!("global {}\n", self.entry));
        out.push_str(&format!("{}:\n", self.entry));

        let last = self.instructions.len().saturating_sub(1);
        for (i, inst) in self.instructions.iter().enumerate() {
            out.push_str(&inst.emit(indent_depth + 1));
            // Blank line between syscall sequences.
            if *inst == Instruction::Syscall && i != last {
                out.push('\n');
            }
        }

        out
    }
}

fn is_quotable(byte: u8) -> bool {
    !matches!(byte, b'"' | b'\\' | 0x00..=0x1F | 0x7F)
}

/// Renders bytes as the operand list of a NASM `db` directive.
///
/// Runs of bytes that are safe inside a double quoted string are quoted as is,
/// which keeps UTF-8 text readable. Quotes, backslashes and control bytes are
/// written as numbers, so the directive assembles to exactly `bytes`.
pub fn byte_string_literal(bytes: &[u8]) -> String {
    let mut parts: Vec<String> = vec![];
    let mut run: Vec<u8> = vec![];

    for &byte in bytes {
        if is_quotable(byte) {
            run.push(byte);
            continue;
        }

        if !run.is_empty() {
            parts.push(quote_run(&run));
            run.clear();
        }
        parts.push(format!("0x{:X}", byte));
    }

    if !run.is_empty() {
        parts.push(quote_run(&run));
    }

    if parts.is_empty() {
        return "\"\"".to_owned();
    }

    parts.join(", ")
}

fn quote_run(run: &[u8]) -> String {
    // Runs only ever split around ASCII bytes, so a run cut from valid UTF-8
    // is itself valid UTF-8.
    format!("\"{}\"", String::from_utf8_lossy(run))
}

/// Writes the program to `w`.
pub fn write_program(program: &Program, w: &mut impl Write) -> io::Result<()> {
    let text = program.emit(0);
    w.write_all(text.as_bytes())?;
    log::debug!("wrote {} bytes of assembly", text.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use veerji_parser::{ast, lexer::tokenize, parse};

    use super::*;

    fn compile(line: &str) -> String {
        let tokens = tokenize(line).expect("should tokenize");
        let program = parse(tokens).expect("should parse");
        veerji_asmgen::code_generation(&program).emit(0)
    }

    #[test]
    fn test_emit_single_print() {
        let expected = "\
section .data
msg0 db \"ਸਤਿ ਸ੍ਰੀ ਅਕਾਲ\", 0xA
len0 equ $ - msg0

section .text
global _start
_start:
    mov rax, 1
    mov rdi, 1
    mov rsi, msg0
    mov rdx, len0
    syscall

    mov rax, 60
    xor rdi, rdi
    syscall
";

        assert_eq!(compile("ਲਿਖੋ ☬ ਸਤਿ ਸ੍ਰੀ ਅਕਾਲ\n"), expected);
    }

    #[test]
    fn test_emit_empty_program() {
        let program = veerji_asmgen::code_generation(&ast::Program::default());

        assert_eq!(
            program.emit(0),
            "section .data\n\nsection .text\nglobal _start\n_start:\n    mov rax, 60\n    xor rdi, rdi\n    syscall\n"
        );
    }

    #[test]
    fn test_emit_two_prints() {
        let program = ast::Program {
            statements: vec![
                ast::Statement::Print("a".to_owned()),
                ast::Statement::Print("b".to_owned()),
            ],
        };
        let text = veerji_asmgen::code_generation(&program).emit(0);

        assert!(text.contains("msg0 db \"a\", 0xA\nlen0 equ $ - msg0\nmsg1 db \"b\", 0xA\nlen1 equ $ - msg1\n"));
        let first = text.find("mov rsi, msg0").expect("write for msg0");
        let second = text.find("mov rsi, msg1").expect("write for msg1");
        let exit = text.find("mov rax, 60").expect("exit");
        assert!(first < second && second < exit);
    }

    #[test]
    fn test_literal_plain() {
        assert_eq!(byte_string_literal(b"hello\n"), "\"hello\", 0xA");
    }

    #[test]
    fn test_literal_only_newline() {
        assert_eq!(byte_string_literal(b"\n"), "0xA");
    }

    #[test]
    fn test_literal_empty() {
        assert_eq!(byte_string_literal(b""), "\"\"");
    }

    #[test]
    fn test_literal_escapes_quotes_and_backslashes() {
        assert_eq!(
            byte_string_literal(b"say \"hi\\\"\n"),
            "\"say \", 0x22, \"hi\", 0x5C, 0x22, 0xA"
        );
    }

    #[test]
    fn test_literal_control_bytes() {
        assert_eq!(byte_string_literal(b"a\tb\x7f"), "\"a\", 0x9, \"b\", 0x7F");
    }

    #[test]
    fn test_literal_keeps_backticks_and_single_quotes() {
        assert_eq!(byte_string_literal(b"`it's`"), "\"`it's`\"");
    }

    #[test]
    fn test_emit_is_deterministic() {
        assert_eq!(compile("ਲਿਖੋ ☬ x\n"), compile("ਲਿਖੋ ☬ x\n"));
    }

    #[test]
    fn test_write_program() {
        let program = veerji_asmgen::code_generation(&ast::Program::default());
        let mut out = vec![];

        write_program(&program, &mut out).expect("writing to a Vec should not fail");

        assert_eq!(String::from_utf8(out).expect("utf-8"), program.emit(0));
    }
}
