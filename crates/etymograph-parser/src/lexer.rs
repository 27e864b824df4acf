#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    OpenBold,
    CloseBold,
    OpenItalic,
    CloseItalic,
    OpenLighter,
    CloseLighter,
    OpenThin,
    CloseThin,
    OpenBullet,
    CloseBullet,
    OpenAt,
    CloseParen,
}

impl Delimiter {
    pub fn as_str(self) -> &'static str {
        match self {
            Delimiter::OpenBold => "<",
            Delimiter::CloseBold => ">",
            Delimiter::OpenItalic => "{{",
            Delimiter::CloseItalic => "}}",
            Delimiter::OpenLighter => "((",
            Delimiter::CloseLighter => "))",
            Delimiter::OpenThin => "({",
            Delimiter::CloseThin => "})",
            Delimiter::OpenBullet => "[",
            Delimiter::CloseBullet => "]",
            Delimiter::OpenAt => "@(",
            Delimiter::CloseParen => ")",
        }
    }
}

// Earlier entries win when two delimiters start at the same byte.
const DELIMITERS: [Delimiter; 12] = [
    Delimiter::OpenItalic,
    Delimiter::CloseItalic,
    Delimiter::OpenBold,
    Delimiter::CloseBold,
    Delimiter::OpenLighter,
    Delimiter::CloseLighter,
    Delimiter::OpenAt,
    Delimiter::CloseParen,
    Delimiter::OpenThin,
    Delimiter::CloseThin,
    Delimiter::OpenBullet,
    Delimiter::CloseBullet,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Delimiter(Delimiter),
    Text(&'a str),
}

pub struct Lexer<'a> {
    input: &'a str,
    pos: usize,
    len: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            len: input.len(),
        }
    }

    fn read_delimiter(&self) -> Option<Delimiter> {
        let rest = &self.input.as_bytes()[self.pos..];
        DELIMITERS
            .into_iter()
            .find(|delimiter| rest.starts_with(delimiter.as_str().as_bytes()))
    }

    fn read_text(&mut self) -> Token<'a> {
        let start = self.pos;
        self.pos += 1;
        // Delimiters are ASCII, so stopping on one always lands on a char boundary.
        while self.pos < self.len && self.read_delimiter().is_none() {
            self.pos += 1;
        }
        Token::Text(&self.input[start..self.pos])
    }
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Token<'a>> {
        if self.pos >= self.len {
            return None;
        }
        if let Some(delimiter) = self.read_delimiter() {
            self.pos += delimiter.as_str().len();
            return Some(Token::Delimiter(delimiter));
        }
        Some(self.read_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<Token<'_>> {
        Lexer::new(input).collect()
    }

    #[test]
    fn splits_text_and_delimiters() {
        assert_eq!(
            kinds("a <b> {{c}}"),
            vec![
                Token::Text("a "),
                Token::Delimiter(Delimiter::OpenBold),
                Token::Text("b"),
                Token::Delimiter(Delimiter::CloseBold),
                Token::Text(" "),
                Token::Delimiter(Delimiter::OpenItalic),
                Token::Text("c"),
                Token::Delimiter(Delimiter::CloseItalic),
            ]
        );
    }

    #[test]
    fn prefers_double_delimiters() {
        assert_eq!(
            kinds("((x)))"),
            vec![
                Token::Delimiter(Delimiter::OpenLighter),
                Token::Text("x"),
                Token::Delimiter(Delimiter::CloseLighter),
                Token::Delimiter(Delimiter::CloseParen),
            ]
        );
        assert_eq!(
            kinds("({w})"),
            vec![
                Token::Delimiter(Delimiter::OpenThin),
                Token::Text("w"),
                Token::Delimiter(Delimiter::CloseThin),
            ]
        );
    }

    #[test]
    fn lone_open_paren_is_text() {
        assert_eq!(
            kinds("(a)"),
            vec![Token::Text("(a"), Token::Delimiter(Delimiter::CloseParen)]
        );
    }

    #[test]
    fn keeps_multibyte_text_intact() {
        assert_eq!(
            kinds("ἔτυμος<é>"),
            vec![
                Token::Text("ἔτυμος"),
                Token::Delimiter(Delimiter::OpenBold),
                Token::Text("é"),
                Token::Delimiter(Delimiter::CloseBold),
            ]
        );
    }
}
