pub mod ast;
pub mod lexer;

use thiserror::Error;

use crate::lexer::{Token, TokenKind};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParserError {
    /// The token at `index` does not start a `Print Separator String` triple.
    #[error(
        "Syntax error at token {} (line {}): '{}'",
        .index,
        .token.loc.line,
        .token.text
    )]
    UnexpectedToken { index: usize, token: Token },
}

#[derive(Debug)]
pub struct Parser {
    tokens: Vec<Token>,
    cursor: usize,
}

impl Parser {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self { tokens, cursor: 0 }
    }

    pub fn parse_program(&mut self) -> Result<ast::Program, ParserError> {
        let mut statements = vec![];

        while self.cursor < self.tokens.len() {
            statements.push(self.parse_statement()?);
        }

        log::debug!("parsed {} statement(s)", statements.len());

        Ok(ast::Program { statements })
    }

    fn parse_statement(&mut self) -> Result<ast::Statement, ParserError> {
        match &self.tokens[self.cursor..] {
            [Token {
                kind: TokenKind::Print,
                ..
            }, Token {
                kind: TokenKind::Separator,
                ..
            }, Token {
                kind: TokenKind::String,
                text,
                ..
            }, ..] => {
                let statement = ast::Statement::Print(text.clone());
                self.cursor += 3;
                Ok(statement)
            }
            [offending, ..] => Err(ParserError::UnexpectedToken {
                index: self.cursor,
                token: offending.clone(),
            }),
            [] => unreachable!("parse_statement called with no tokens left"),
        }
    }
}

/// Builds the program from a complete token stream, stopping at the first
/// malformed position.
pub fn parse(tokens: Vec<Token>) -> Result<ast::Program, ParserError> {
    Parser::new(tokens).parse_program()
}
