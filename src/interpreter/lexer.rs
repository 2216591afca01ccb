use logos::Logos;
use thiserror::Error;

use crate::error::{Diagnostic, ErrorMode};

/// Represents a lexical token in the source input.
/// A token is a minimal but meaningful unit of text produced by the lexer.
/// This enum defines all recognized tokens in the expression language.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(extras = LexerExtras)]
#[logos(error = LexicalError)]
pub enum Token {
    /// Numeric literal tokens, such as `42`, `3.14`, `.5`, `2.` or `2.1e-10`.
    #[regex(r"[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?", parse_number)]
    #[regex(r"\.[0-9]+([eE][+-]?[0-9]+)?", parse_number)]
    #[regex(r"[0-9]+(\.[0-9]*)?[eE][+-]?", malformed_number)]
    #[regex(r"\.[0-9]+[eE][+-]?", malformed_number)]
    Number(f64),
    /// Single-quoted byte string literal, such as `'abc'`.
    #[regex(r"'([^'\\\n]|\\[^\n])*'", parse_string)]
    #[regex(r"'([^'\\\n]|\\[^\n])*", unterminated_string, allow_greedy = true)]
    Str(Vec<u8>),
    /// Identifier tokens; variable, vector, string or function names.
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),
    /// `true`
    #[token("true")]
    True,
    /// `false`
    #[token("false")]
    False,
    /// `and`
    #[token("and")]
    And,
    /// `or`
    #[token("or")]
    Or,
    /// `not`
    #[token("not")]
    Not,
    /// `xor`
    #[token("xor")]
    Xor,
    /// `nand`
    #[token("nand")]
    Nand,
    /// `nor`
    #[token("nor")]
    Nor,
    /// `xnor`
    #[token("xnor")]
    Xnor,
    /// `if`
    #[token("if")]
    If,
    /// `else`
    #[token("else")]
    Else,
    /// `while`
    #[token("while")]
    While,
    /// `for`
    #[token("for")]
    For,
    /// `switch`
    #[token("switch")]
    Switch,
    /// `case`
    #[token("case")]
    Case,
    /// `default`
    #[token("default")]
    DefaultCase,
    /// `var`
    #[token("var")]
    Var,
    /// `in`
    #[token("in")]
    In,
    /// `like`
    #[token("like")]
    Like,
    /// `ilike`
    #[token("ilike")]
    ILike,
    /// `// Comments.` and `# Comments.`
    #[regex(r"(//|#)[^\n\r]*", logos::skip, allow_greedy = true)]
    Comment,
    /// ```text
    /// /* Multi line comments. */
    /// ```
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", |lex| {
        let comment = lex.slice();
        if let Some(last) = comment.rfind('\n') {
            lex.extras.line += comment.matches('\n').count();
            lex.extras.line_start = lex.span().start + last + 1;
        }
        logos::Skip
    })]
    #[regex(r"/\*([^*]|\*+[^*/])*\**", unterminated_comment, allow_greedy = true)]
    MultiLineComment,
    /// `:=`
    #[token(":=")]
    Assign,
    /// `+=`
    #[token("+=")]
    PlusAssign,
    /// `-=`
    #[token("-=")]
    MinusAssign,
    /// `*=`
    #[token("*=")]
    MulAssign,
    /// `/=`
    #[token("/=")]
    DivAssign,
    /// `%=`
    #[token("%=")]
    ModAssign,
    /// `+`
    #[token("+")]
    Plus,
    /// `-`
    #[token("-")]
    Minus,
    /// `*`
    #[token("*")]
    Star,
    /// `/`
    #[token("/")]
    Slash,
    /// `%`
    #[token("%")]
    Percent,
    /// `^`
    #[token("^")]
    Caret,
    /// `==`
    #[token("==")]
    EqualEqual,
    /// `=`
    #[token("=")]
    Equals,
    /// `!=`
    #[token("!=")]
    BangEqual,
    /// `<>`
    #[token("<>")]
    LessGreater,
    /// `<=`
    #[token("<=")]
    LessEqual,
    /// `>=`
    #[token(">=")]
    GreaterEqual,
    /// `<`
    #[token("<")]
    Less,
    /// `>`
    #[token(">")]
    Greater,
    /// `!`
    #[token("!")]
    Bang,
    /// `&`
    #[token("&")]
    Ampersand,
    /// `|`
    #[token("|")]
    Pipe,
    /// `?`
    #[token("?")]
    Question,
    /// `:`
    #[token(":")]
    Colon,
    /// `;`
    #[token(";")]
    Semicolon,
    /// `,`
    #[token(",")]
    Comma,
    /// `(`
    #[token("(")]
    LParen,
    /// `)`
    #[token(")")]
    RParen,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// `{`
    #[token("{")]
    LBrace,
    /// `}`
    #[token("}")]
    RBrace,

    /// Line breaks; only tracked for positions.
    #[token("\n", |lex| {
        lex.extras.line += 1;
        lex.extras.line_start = lex.span().end;
        logos::Skip
    })]
    NewLine,
    /// Spaces, tabs, carriage returns and feeds.
    #[regex(r"[ \t\r\f]+", logos::skip)]
    Ignored,
}

/// Keywords of the language. None of them may be used as a symbol name.
pub const KEYWORDS: &[&str] = &["true", "false", "and", "or", "not", "xor", "nand", "nor",
                                "xnor", "if", "else", "while", "for", "switch", "case",
                                "default", "var", "in", "like", "ilike"];

impl Token {
    /// Returns the category of the token as reported in diagnostics.
    ///
    /// # Example
    /// ```
    /// use formulary::interpreter::lexer::Token;
    ///
    /// assert_eq!(Token::Number(1.0).kind_name(), "NUMBER");
    /// assert_eq!(Token::Identifier("x".to_string()).kind_name(), "SYMBOL");
    /// assert_eq!(Token::Plus.kind_name(), "OPERATOR");
    /// ```
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Number(_) => "NUMBER",
            Self::Str(_) => "STRING",
            Self::Identifier(_) => "SYMBOL",
            Self::True
            | Self::False
            | Self::And
            | Self::Or
            | Self::Not
            | Self::Xor
            | Self::Nand
            | Self::Nor
            | Self::Xnor
            | Self::If
            | Self::Else
            | Self::While
            | Self::For
            | Self::Switch
            | Self::Case
            | Self::DefaultCase
            | Self::Var
            | Self::In
            | Self::Like
            | Self::ILike => "KEYWORD",
            Self::LParen
            | Self::RParen
            | Self::LBracket
            | Self::RBracket
            | Self::LBrace
            | Self::RBrace
            | Self::Comma
            | Self::Semicolon
            | Self::Colon
            | Self::Question => "PUNCTUATION",
            Self::Comment | Self::MultiLineComment | Self::NewLine | Self::Ignored => "IGNORED",
            _ => "OPERATOR",
        }
    }
}

/// Additional information carried by the lexer during tokenization.
///
/// Tracks the current line number and the byte offset at which that line
/// starts, so that every token can be given a 1-based line and column.
#[derive(Debug)]
pub struct LexerExtras {
    /// The current line number in the source being tokenized.
    pub line:       usize,
    /// Byte offset of the first character of the current line.
    pub line_start: usize,
}

impl Default for LexerExtras {
    fn default() -> Self {
        Self { line:       1,
               line_start: 0, }
    }
}

/// The ways tokenization can fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Error)]
pub enum LexicalError {
    /// A character that starts no token.
    #[default]
    #[error("invalid character")]
    UnexpectedCharacter,
    /// A number whose exponent has no digits, such as `1e` or `2.5e+`.
    #[error("malformed number literal")]
    MalformedNumber,
    /// A string literal missing its closing quote.
    #[error("unterminated string literal")]
    UnterminatedString,
    /// A `/*` comment missing its closing `*/`.
    #[error("unterminated comment")]
    UnterminatedComment,
    /// A backslash escape that is not one of `\\ \' \n \t \r \0 \xHH`.
    #[error("invalid escape sequence in string literal")]
    InvalidEscape,
}

/// A token together with its source text and position.
#[derive(Debug, Clone, PartialEq)]
pub struct Lexeme {
    /// The token.
    pub token:  Token,
    /// The exact source slice the token was read from.
    pub text:   String,
    /// 1-based line number.
    pub line:   usize,
    /// 1-based column number, counted in characters.
    pub column: usize,
}

/// Splits `source` into lexemes.
///
/// Tokenization does not stop at the first malformed token: every lexical
/// error in the input is collected and returned together.
///
/// # Errors
/// Returns one [`Diagnostic`] with mode [`ErrorMode::Lexer`] for every
/// malformed token.
///
/// # Example
/// ```
/// use formulary::interpreter::lexer::{Token, tokenize};
///
/// let lexemes = tokenize("x +\n 2.5").unwrap();
///
/// assert_eq!(lexemes[2].token, Token::Number(2.5));
/// assert_eq!((lexemes[2].line, lexemes[2].column), (2, 2));
/// assert_eq!(tokenize("1e + 'abc").unwrap_err().len(), 2);
/// ```
pub fn tokenize(source: &str) -> Result<Vec<Lexeme>, Vec<Diagnostic>> {
    let mut lexemes = Vec::new();
    let mut errors = Vec::new();
    let mut lexer = Token::lexer_with_extras(source, LexerExtras::default());
    let mut columns = Columns { source,
                                line_start: 0,
                                offset: 0,
                                column: 1 };

    while let Some(token) = lexer.next() {
        let span = lexer.span();
        let line = lexer.extras.line;
        let column = columns.at(lexer.extras.line_start, span.start);
        let text = lexer.slice().to_string();

        match token {
            Ok(token) => lexemes.push(Lexeme { token,
                                               text,
                                               line,
                                               column }),
            Err(error) => errors.push(Diagnostic::new(ErrorMode::Lexer,
                                                      "ERROR",
                                                      text,
                                                      error.to_string(),
                                                      source,
                                                      line,
                                                      column)),
        }
    }

    if errors.is_empty() { Ok(lexemes) } else { Err(errors) }
}

/// Turns byte offsets into 1-based character columns.
///
/// Offsets arrive in increasing order, so each line is only counted once.
struct Columns<'s> {
    source:     &'s str,
    line_start: usize,
    offset:     usize,
    column:     usize,
}

impl Columns<'_> {
    fn at(&mut self, line_start: usize, offset: usize) -> usize {
        if line_start != self.line_start || offset < self.offset {
            self.line_start = line_start;
            self.offset = line_start;
            self.column = 1;
        }
        self.column += self.source
                           .get(self.offset..offset)
                           .map_or(0, |skipped| skipped.chars().count());
        self.offset = offset;
        self.column
    }
}

/// Parses a numeric literal from the current token slice.
fn parse_number(lex: &logos::Lexer<Token>) -> Option<f64> {
    lex.slice().parse().ok()
}

fn malformed_number(_: &logos::Lexer<Token>) -> Result<f64, LexicalError> {
    Err(LexicalError::MalformedNumber)
}

fn unterminated_string(_: &logos::Lexer<Token>) -> Result<Vec<u8>, LexicalError> {
    Err(LexicalError::UnterminatedString)
}

fn unterminated_comment(_: &logos::Lexer<Token>) -> Result<(), LexicalError> {
    Err(LexicalError::UnterminatedComment)
}

/// Decodes a quoted string literal, resolving escape sequences.
///
/// The result is a byte string: `\0` and `\xHH` may produce bytes that are not
/// valid UTF-8 on their own.
fn parse_string(lex: &logos::Lexer<Token>) -> Result<Vec<u8>, LexicalError> {
    let slice = lex.slice();
    let body = &slice.as_bytes()[1..slice.len() - 1];
    let mut bytes = Vec::with_capacity(body.len());
    let mut iter = body.iter().copied();

    while let Some(byte) = iter.next() {
        if byte != b'\\' {
            bytes.push(byte);
            continue;
        }
        let escaped = match iter.next() {
            Some(b'\\') => b'\\',
            Some(b'\'') => b'\'',
            Some(b'n') => b'\n',
            Some(b't') => b'\t',
            Some(b'r') => b'\r',
            Some(b'0') => 0,
            Some(b'x') => {
                let high = iter.next().and_then(hex_value);
                let low = iter.next().and_then(hex_value);
                match (high, low) {
                    (Some(high), Some(low)) => high * 16 + low,
                    _ => return Err(LexicalError::InvalidEscape),
                }
            },
            _ => return Err(LexicalError::InvalidEscape),
        };
        bytes.push(escaped);
    }

    Ok(bytes)
}

const fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
