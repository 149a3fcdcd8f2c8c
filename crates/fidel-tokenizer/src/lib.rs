mod cursor;

use cursor::Cursor;
pub use fidel_syntax::SyntaxKind;
use fidel_syntax::SyntaxKind::*;
use fidel_syntax::{GreenTrivia, TriviaPiece, TriviaPieceKind};
use text_size::{TextRange, TextSize};

#[derive(Debug, Clone)]
pub struct Token {
    pub leading: GreenTrivia,
    pub kind: SyntaxKind,
    pub kind_range: TextRange,
    pub trailing: GreenTrivia,
}

impl Token {
    const EOF: Self = Self {
        kind: EOF,
        kind_range: TextRange::empty(TextSize::new(0)),
        leading: GreenTrivia::empty(),
        trailing: GreenTrivia::empty(),
    };

    /// Range of the token including its leading and trailing trivia.
    pub fn full_range(&self) -> TextRange {
        TextRange::new(
            self.kind_range.start() - self.leading.len(),
            self.kind_range.end() + self.trailing.len(),
        )
    }
}

/// Splits source text into tokens with attached trivia.
///
/// Leading trivia is everything between the previous token's trailing trivia
/// and the token. Trailing trivia stops before the next line break, so a line
/// break always starts the leading trivia of the following token. The final
/// `EOF` token carries whatever trivia ends the file.
pub struct Tokenizer<'a> {
    text: &'a str,
    cursor: Cursor<'a>,
    current: Token,
    trivia_pieces: Vec<TriviaPiece>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut tokenizer = Self {
            text,
            cursor: Cursor::new(text),
            current: Token::EOF,
            trivia_pieces: Vec::with_capacity(4),
        };
        tokenizer.next_token();
        tokenizer
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn peek(&self) -> &Token {
        &self.current
    }

    fn offset(&self) -> TextSize {
        TextSize::of(self.text) - self.cursor.len()
    }

    fn range(&self) -> TextRange {
        let len = self.cursor.pos_within_token();
        TextRange::at(self.offset() - len, len)
    }

    fn token_text(&self) -> &'a str {
        &self.text[self.range()]
    }

    /// Returns the current token and advances to the next one.
    ///
    /// Once the end of input is reached this keeps returning `EOF`.
    pub fn next_token(&mut self) -> Token {
        self.trivia(false);
        let trailing_start = self.trivia_pieces.len();
        let (kind, kind_range) = self.syntax_kind();
        if kind != EOF {
            self.trivia(true);
        }

        let (leading, trailing) = self.trivia_pieces.split_at(trailing_start);
        let leading = GreenTrivia::new(leading);
        let trailing = GreenTrivia::new(trailing);

        self.trivia_pieces.clear();
        std::mem::replace(&mut self.current, Token { leading, kind, kind_range, trailing })
    }

    fn trivia(&mut self, trailing: bool) {
        while !self.cursor.is_eof() {
            let kind = match self.cursor.peek() {
                '/' if self.cursor.second() == '/' => {
                    self.cursor.advance_while(|c| !is_newline(c));
                    TriviaPieceKind::SingleLineComment
                }
                '\n' | '\r' if trailing => break,
                '\n' => {
                    self.cursor.advance();
                    TriviaPieceKind::Newline
                }
                '\r' => {
                    self.cursor.advance();
                    self.cursor.eat('\n');
                    TriviaPieceKind::Newline
                }
                c if is_whitespace(c) => {
                    self.cursor.advance_while(is_whitespace);
                    TriviaPieceKind::Whitespace
                }
                _ => break,
            };

            self.trivia_pieces.push(TriviaPiece::new(kind, self.cursor.pos_within_token()));
            self.cursor.reset_pos_within_token();
        }
    }

    fn syntax_kind(&mut self) -> (SyntaxKind, TextRange) {
        let kind = match self.cursor.advance() {
            None => EOF,
            Some('(') => L_PAREN,
            Some(')') => R_PAREN,
            Some('{') => L_BRACE,
            Some('}') => R_BRACE,
            Some(',') => COMMA,
            Some(':') => COLON,
            Some('=') => EQ,
            Some('+') => PLUS,
            Some('*') => STAR,
            Some('/') => SLASH,
            Some('-') => {
                if self.cursor.eat('>') {
                    ARROW
                } else {
                    MINUS
                }
            }
            Some('0'..='9') => {
                self.cursor.advance_while(|c| c.is_ascii_digit() || c == '_');
                INT_NUMBER
            }
            Some('A'..='Z' | 'a'..='z' | '_') => {
                self.cursor.advance_while(|c| c.is_ascii_alphanumeric() || c == '_');

                match self.token_text() {
                    "func" => FUNC_KW,
                    "let" => LET_KW,
                    "return" => RETURN_KW,
                    _ => IDENT,
                }
            }
            Some(_) => UNKNOWN,
        };

        let range = self.range();
        self.cursor.reset_pos_within_token();

        (kind, range)
    }
}

fn is_newline(c: char) -> bool {
    matches!(c, '\n' | '\r')
}

fn is_whitespace(c: char) -> bool {
    c.is_whitespace() && !is_newline(c)
}
