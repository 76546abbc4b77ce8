//! Assembly IR for x86-64 Linux programs that talk to the kernel through
//! raw syscalls.

pub const SYS_WRITE: i64 = 1;
pub const SYS_EXIT: i64 = 60;
pub const STDOUT_FILENO: i64 = 1;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Register {
    AX,
    DI,
    SI,
    DX,
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Operand {
    Register(Register),
    Imm(i64),
    /// An assembler symbol, either the address of a data label or an
    /// assemble-time constant.
    Symbol(String),
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Instruction {
    Mov { src: Operand, dst: Operand },
    Xor { src: Operand, dst: Operand },
    Syscall,
}

/// A labeled byte string in the data section together with the symbol that
/// holds its length. The length is computed by the assembler.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct DataDefinition {
    pub label: String,
    pub length_label: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct Program {
    pub data: Vec<DataDefinition>,
    pub entry: String,
    pub instructions: Vec<Instruction>,
}
