use veerji_asm::{
    DataDefinition, Instruction, Operand, Register, STDOUT_FILENO, SYS_EXIT, SYS_WRITE,
};
use veerji_parser::ast::{self, Statement};

pub const ENTRY_POINT: &str = "_start";

pub fn message_label(index: usize) -> String {
    format!("msg{}", index)
}

pub fn length_label(index: usize) -> String {
    format!("len{}", index)
}

/// Lowers the program into the data section and the instruction stream.
/// Each print statement `i` owns `msg<i>` and `len<i>`, the program always
/// ends with an exit(0) syscall.
pub fn code_generation(program: &ast::Program) -> veerji_asm::Program {
    let data = program
        .statements
        .iter()
        .enumerate()
        .map(|(i, stmt)| cg_data(i, stmt))
        .collect();

    let mut instructions = vec![];
    for (i, stmt) in program.statements.iter().enumerate() {
        instructions.append(&mut cg_statement(i, stmt));
    }
    instructions.append(&mut cg_exit());

    log::debug!(
        "generated {} data definition(s) and {} instruction(s)",
        program.len(),
        instructions.len()
    );

    veerji_asm::Program {
        data,
        entry: ENTRY_POINT.to_owned(),
        instructions,
    }
}

fn cg_data(index: usize, statement: &Statement) -> DataDefinition {
    match statement {
        Statement::Print(value) => {
            let mut bytes = Vec::with_capacity(value.len() + 1);
            bytes.extend_from_slice(value.as_bytes());
            bytes.push(b'\n');

            DataDefinition {
                label: message_label(index),
                length_label: length_label(index),
                bytes,
            }
        }
    }
}

fn cg_statement(index: usize, statement: &Statement) -> Vec<Instruction> {
    match statement {
        Statement::Print(_) => vec![
            Instruction::Mov {
                src: Operand::Imm(SYS_WRITE),
                dst: Operand::Register(Register::AX),
            },
            Instruction::Mov {
                src: Operand::Imm(STDOUT_FILENO),
                dst: Operand::Register(Register::DI),
            },
            Instruction::Mov {
                src: Operand::Symbol(message_label(index)),
                dst: Operand::Register(Register::SI),
            },
            Instruction::Mov {
                src: Operand::Symbol(length_label(index)),
                dst: Operand::Register(Register::DX),
            },
            Instruction::Syscall,
        ],
    }
}

/// exit(0), with the status zeroed through `xor`.
fn cg_exit() -> Vec<Instruction> {
    vec![
        Instruction::Mov {
            src: Operand::Imm(SYS_EXIT),
            dst: Operand::Register(Register::AX),
        },
        Instruction::Xor {
            src: Operand::Register(Register::DI),
            dst: Operand::Register(Register::DI),
        },
        Instruction::Syscall,
    ]
}
