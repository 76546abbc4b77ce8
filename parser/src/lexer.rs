use thiserror::Error;

/// The print keyword, "write" in Gurmukhi.
pub const PRINT_KEYWORD: &str = "ਲਿਖੋ";
/// Separates the keyword from the string that gets printed.
pub const SEPARATOR: &str = "☬";
/// Text of the token produced for lines that do not start with the keyword.
pub const UNKNOWN_PLACEHOLDER: &str = "???";

pub const DEFAULT_MAX_STRING_LEN: usize = 64 * 1024;

#[derive(Error, Debug, Eq, PartialEq, Clone)]
pub enum LexerError {
    #[error(
        "The string on line {} is {} bytes long, strings can be at most {} bytes.",
        .loc.line,
        .len,
        .max
    )]
    StringTooLong { len: usize, max: usize, loc: Loc },
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Loc {
    pub line: usize,
    pub column: usize,
}

#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum TokenKind {
    Print,
    Separator,
    String,
    Unknown,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub loc: Loc,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
enum State {
    Keyword,
    Separator,
    String,
    Done,
}

/// Splits a single line into tokens. A well formed line yields
/// `Print`, `Separator`, `String`; anything else yields a lone `Unknown`,
/// or just `Print` when the separator is missing.
#[derive(Debug)]
pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    line: usize,
    max_string_len: usize,
    state: State,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            max_string_len: DEFAULT_MAX_STRING_LEN,
            state: State::Keyword,
        }
    }

    /// Sets the line number reported in token locations.
    pub fn at_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    pub fn with_max_string_len(mut self, max: usize) -> Self {
        self.max_string_len = max;
        self
    }

    fn loc(&self, offset: usize) -> Loc {
        Loc {
            line: self.line,
            column: self.input[..offset].chars().count() + 1,
        }
    }

    fn token(&self, kind: TokenKind, text: &str, offset: usize) -> Token {
        Token {
            kind,
            text: text.to_owned(),
            loc: self.loc(offset),
        }
    }

    fn read_keyword(&mut self) -> Token {
        if self.input.starts_with(PRINT_KEYWORD) {
            self.pos = PRINT_KEYWORD.len();
            self.state = State::Separator;
            self.token(TokenKind::Print, PRINT_KEYWORD, 0)
        } else {
            self.state = State::Done;
            self.token(TokenKind::Unknown, UNKNOWN_PLACEHOLDER, 0)
        }
    }

    fn read_separator(&mut self) -> Option<Token> {
        // str::find compares whole byte sequences, so a match always lands on
        // a char boundary.
        match self.input[self.pos..].find(SEPARATOR) {
            Some(offset) => {
                let start = self.pos + offset;
                self.pos = start + SEPARATOR.len();
                self.state = State::String;
                Some(self.token(TokenKind::Separator, SEPARATOR, start))
            }
            None => {
                self.state = State::Done;
                None
            }
        }
    }

    fn read_string(&mut self) -> Result<Token, LexerError> {
        self.state = State::Done;

        let rest = &self.input[self.pos..];
        let value = rest.trim_start_matches(' ');
        let start = self.pos + (rest.len() - value.len());

        let value = match value.find('\n') {
            Some(end) => &value[..end],
            None => value,
        };
        let value = value.strip_suffix('\r').unwrap_or(value);

        if value.len() > self.max_string_len {
            return Err(LexerError::StringTooLong {
                len: value.len(),
                max: self.max_string_len,
                loc: self.loc(start),
            });
        }

        self.pos = self.input.len();
        Ok(self.token(TokenKind::String, value, start))
    }

    pub fn next_token(&mut self) -> Result<Option<Token>, LexerError> {
        Ok(match self.state {
            State::Keyword => Some(self.read_keyword()),
            State::Separator => self.read_separator(),
            State::String => Some(self.read_string()?),
            State::Done => None,
        })
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token, LexerError>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.next_token();

        if token.is_err() {
            self.state = State::Done;
        }

        token.transpose()
    }
}

/// Tokenizes one line with the default limits.
pub fn tokenize(line: &str) -> Result<Vec<Token>, LexerError> {
    Lexer::new(line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<TokenKind> {
        tokens.iter().map(|tok| tok.kind).collect()
    }

    #[test]
    fn test_print_statement() {
        let tokens = tokenize("ਲਿਖੋ ☬ ਸਤਿ ਸ੍ਰੀ ਅਕਾਲ\n").expect("should tokenize");

        assert_eq!(
            kinds(&tokens),
            vec![TokenKind::Print, TokenKind::Separator, TokenKind::String]
        );
        assert_eq!(tokens[0].text, "ਲਿਖੋ");
        assert_eq!(tokens[1].text, "☬");
        assert_eq!(tokens[2].text, "ਸਤਿ ਸ੍ਰੀ ਅਕਾਲ");
    }

    #[test]
    fn test_locations() {
        let tokens = Lexer::new("ਲਿਖੋ ☬ hi")
            .at_line(7)
            .collect::<Result<Vec<_>, _>>()
            .expect("should tokenize");

        // ਲਿਖੋ is four chars long.
        assert_eq!(tokens[0].loc, Loc { line: 7, column: 1 });
        assert_eq!(tokens[1].loc, Loc { line: 7, column: 6 });
        assert_eq!(tokens[2].loc, Loc { line: 7, column: 8 });
    }

    #[test]
    fn test_no_separator() {
        let tokens = tokenize("ਲਿਖੋ hello\n").expect("should tokenize");

        assert_eq!(kinds(&tokens), vec![TokenKind::Print]);
    }

    #[test]
    fn test_unknown_hides_text() {
        let tokens = tokenize("hello world\n").expect("should tokenize");

        assert_eq!(kinds(&tokens), vec![TokenKind::Unknown]);
        assert_eq!(tokens[0].text, UNKNOWN_PLACEHOLDER);
    }

    #[test]
    fn test_unknown_ignores_separator() {
        let tokens = tokenize("print ☬ hello").expect("should tokenize");

        assert_eq!(kinds(&tokens), vec![TokenKind::Unknown]);
    }

    #[test]
    fn test_empty_line() {
        let tokens = tokenize("").expect("should tokenize");

        assert_eq!(kinds(&tokens), vec![TokenKind::Unknown]);
    }

    #[test]
    fn test_empty_string() {
        let tokens = tokenize("ਲਿਖੋ ☬\n").expect("should tokenize");

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[2].text, "");
    }

    #[test]
    fn test_keyword_without_spaces() {
        let tokens = tokenize("ਲਿਖੋ☬hi").expect("should tokenize");

        assert_eq!(tokens[2].text, "hi");
    }

    #[test]
    fn test_trailing_whitespace_kept() {
        let tokens = tokenize("ਲਿਖੋ ☬   a  b  \r\n").expect("should tokenize");

        assert_eq!(tokens[2].text, "a  b  ");
    }

    #[test]
    fn test_partial_keyword() {
        // First two chars of the keyword only.
        let tokens = tokenize("ਲਿ ☬ hi").expect("should tokenize");

        assert_eq!(kinds(&tokens), vec![TokenKind::Unknown]);
    }

    #[test]
    fn test_string_too_long() {
        let mut lexer = Lexer::new("ਲਿਖੋ ☬ 0123456789").with_max_string_len(4);

        assert_eq!(lexer.next().map(|t| t.map(|t| t.kind)), Some(Ok(TokenKind::Print)));
        assert_eq!(
            lexer.next().map(|t| t.map(|t| t.kind)),
            Some(Ok(TokenKind::Separator))
        );
        assert_eq!(
            lexer.next(),
            Some(Err(LexerError::StringTooLong {
                len: 10,
                max: 4,
                loc: Loc { line: 1, column: 8 },
            }))
        );
        assert_eq!(lexer.next(), None);
    }

    #[test]
    fn test_long_string_accepted() {
        let payload = "ਸ".repeat(1000);
        let tokens = tokenize(&format!("ਲਿਖੋ ☬ {payload}")).expect("should tokenize");

        assert_eq!(tokens[2].text, payload);
    }
}
