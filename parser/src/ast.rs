use std::fmt::Display;

#[derive(Debug, Eq, PartialEq, Clone)]
pub enum Statement {
    Print(String),
}

impl Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Statement::Print(value) => write!(f, "PRINT \"{}\"", value),
        }
    }
}

/// Statements in source order. Code generation emits them in the same order.
#[derive(Debug, Default, Eq, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

impl Program {
    pub fn len(&self) -> usize {
        self.statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl Display for Program {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, statement) in self.statements.iter().enumerate() {
            writeln!(f, "Statement {}: {}", i, statement)?;
        }
        Ok(())
    }
}
