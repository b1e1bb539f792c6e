#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Tok {
    Strict,
    Graph,
    Digraph,
    Node,
    Edge,
    Subgraph,

    LBrace,
    RBrace,
    LBracket,
    RBracket,
    Equal,
    Semi,
    Comma,
    Colon,
    Plus,

    /// `->` when `true`, `--` otherwise.
    EdgeOp(bool),

    Id(String),
    Str(String),
    Html(String),
}

impl Tok {
    pub(crate) fn describe(&self) -> String {
        match self {
            Tok::Strict => "'strict'".to_string(),
            Tok::Graph => "'graph'".to_string(),
            Tok::Digraph => "'digraph'".to_string(),
            Tok::Node => "'node'".to_string(),
            Tok::Edge => "'edge'".to_string(),
            Tok::Subgraph => "'subgraph'".to_string(),
            Tok::LBrace => "'{'".to_string(),
            Tok::RBrace => "'}'".to_string(),
            Tok::LBracket => "'['".to_string(),
            Tok::RBracket => "']'".to_string(),
            Tok::Equal => "'='".to_string(),
            Tok::Semi => "';'".to_string(),
            Tok::Comma => "','".to_string(),
            Tok::Colon => "':'".to_string(),
            Tok::Plus => "'+'".to_string(),
            Tok::EdgeOp(true) => "'->'".to_string(),
            Tok::EdgeOp(false) => "'--'".to_string(),
            Tok::Id(s) => format!("identifier {s:?}"),
            Tok::Str(s) => format!("string {s:?}"),
            Tok::Html(_) => "HTML string".to_string(),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub(crate) struct LexError {
    pub offset: usize,
    pub message: String,
}

pub(crate) struct Lexer<'input> {
    input: &'input str,
    pos: usize,
}

impl<'input> Lexer<'input> {
    pub(crate) fn new(input: &'input str) -> Self {
        Self { input, pos: 0 }
    }

    fn rest(&self) -> &'input str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn starts_with(&self, s: &str) -> bool {
        self.rest().starts_with(s)
    }

    fn at_line_start(&self) -> bool {
        self.input[..self.pos]
            .chars()
            .rev()
            .take_while(|&c| c != '\n')
            .all(|c| c == ' ' || c == '\t')
    }

    /// Skips whitespace and comments. Returns an error for an unterminated block comment.
    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            while self.peek().is_some_and(char::is_whitespace) {
                self.bump();
            }
            if self.starts_with("//") || (self.starts_with("#") && self.at_line_start()) {
                match self.rest().find('\n') {
                    Some(i) => self.pos += i,
                    None => self.pos = self.input.len(),
                }
                continue;
            }
            if self.starts_with("/*") {
                let start = self.pos;
                match self.rest()[2..].find("*/") {
                    Some(i) => self.pos += i + 4,
                    None => {
                        return Err(LexError {
                            offset: start,
                            message: "unterminated comment".to_string(),
                        });
                    }
                }
                continue;
            }
            return Ok(());
        }
    }

    fn lex_quoted(&mut self) -> Result<Tok, LexError> {
        let start = self.pos;
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                None => {
                    return Err(LexError {
                        offset: start,
                        message: "unterminated string".to_string(),
                    });
                }
                Some('"') => return Ok(Tok::Str(out)),
                Some('\\') => match self.peek() {
                    Some('"') => {
                        self.bump();
                        out.push('"');
                    }
                    Some('\n') => {
                        self.bump();
                    }
                    Some('\r') if self.rest()[1..].starts_with('\n') => {
                        self.pos += 2;
                    }
                    _ => out.push('\\'),
                },
                Some(c) => out.push(c),
            }
        }
    }

    fn lex_html(&mut self) -> Result<Tok, LexError> {
        let start = self.pos;
        self.bump();
        let body_start = self.pos;
        let mut depth = 1usize;
        while let Some(c) = self.bump() {
            match c {
                '<' => depth += 1,
                '>' => {
                    depth -= 1;
                    if depth == 0 {
                        let body = &self.input[body_start..self.pos - 1];
                        return Ok(Tok::Html(body.to_string()));
                    }
                }
                _ => {}
            }
        }
        Err(LexError {
            offset: start,
            message: "unterminated HTML string".to_string(),
        })
    }

    fn lex_numeral(&mut self) -> Tok {
        let start = self.pos;
        if self.peek() == Some('-') {
            self.bump();
        }
        let mut seen_dot = false;
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                self.bump();
            } else if c == '.' && !seen_dot {
                seen_dot = true;
                self.bump();
            } else {
                break;
            }
        }
        Tok::Id(self.input[start..self.pos].to_string())
    }

    fn lex_word(&mut self) -> Tok {
        let start = self.pos;
        while self.peek().is_some_and(is_id_char) {
            self.bump();
        }
        let word = &self.input[start..self.pos];
        match word.to_ascii_lowercase().as_str() {
            "strict" => Tok::Strict,
            "graph" => Tok::Graph,
            "digraph" => Tok::Digraph,
            "node" => Tok::Node,
            "edge" => Tok::Edge,
            "subgraph" => Tok::Subgraph,
            _ => Tok::Id(word.to_string()),
        }
    }
}

fn is_id_start(c: char) -> bool {
    c == '_' || c.is_ascii_alphabetic() || !c.is_ascii()
}

fn is_id_char(c: char) -> bool {
    is_id_start(c) || c.is_ascii_digit()
}

impl<'input> Iterator for Lexer<'input> {
    type Item = std::result::Result<(usize, Tok, usize), LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Err(e) = self.skip_trivia() {
            return Some(Err(e));
        }
        let start = self.pos;
        let c = self.peek()?;

        let tok = match c {
            '{' => Tok::LBrace,
            '}' => Tok::RBrace,
            '[' => Tok::LBracket,
            ']' => Tok::RBracket,
            '=' => Tok::Equal,
            ';' => Tok::Semi,
            ',' => Tok::Comma,
            ':' => Tok::Colon,
            '+' => Tok::Plus,
            '"' => {
                return Some(self.lex_quoted().map(|t| (start, t, self.pos)));
            }
            '<' => {
                return Some(self.lex_html().map(|t| (start, t, self.pos)));
            }
            '-' if self.starts_with("->") => {
                self.pos += 2;
                return Some(Ok((start, Tok::EdgeOp(true), self.pos)));
            }
            '-' if self.starts_with("--") => {
                self.pos += 2;
                return Some(Ok((start, Tok::EdgeOp(false), self.pos)));
            }
            '-' | '.' | '0'..='9' => {
                let tok = self.lex_numeral();
                if self.pos == start + 1 && c == '-' {
                    return Some(Err(LexError {
                        offset: start,
                        message: "unexpected '-'".to_string(),
                    }));
                }
                return Some(Ok((start, tok, self.pos)));
            }
            c if is_id_start(c) => {
                let tok = self.lex_word();
                return Some(Ok((start, tok, self.pos)));
            }
            other => {
                return Some(Err(LexError {
                    offset: start,
                    message: format!("unexpected character {other:?}"),
                }));
            }
        };
        self.bump();
        Some(Ok((start, tok, self.pos)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(input: &str) -> Vec<Tok> {
        Lexer::new(input)
            .map(|r| r.map(|(_, t, _)| t))
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn keywords_are_case_insensitive_and_quoted_keywords_are_ids() {
        assert_eq!(
            toks("DiGraph \"node\" Node"),
            vec![Tok::Digraph, Tok::Str("node".to_string()), Tok::Node]
        );
    }

    #[test]
    fn edge_operators_and_numerals() {
        assert_eq!(
            toks("a->b--c -1.5 .5"),
            vec![
                Tok::Id("a".to_string()),
                Tok::EdgeOp(true),
                Tok::Id("b".to_string()),
                Tok::EdgeOp(false),
                Tok::Id("c".to_string()),
                Tok::Id("-1.5".to_string()),
                Tok::Id(".5".to_string()),
            ]
        );
    }

    #[test]
    fn comments_are_skipped() {
        let input = "# preprocessor line\na // trailing\n/* block\n */ b";
        assert_eq!(
            toks(input),
            vec![Tok::Id("a".to_string()), Tok::Id("b".to_string())]
        );
    }

    #[test]
    fn quoted_strings_keep_label_escapes() {
        assert_eq!(
            toks(r#""say \"hi\"\n\N""#),
            vec![Tok::Str(r#"say "hi"\n\N"#.to_string())]
        );
    }

    #[test]
    fn html_strings_nest() {
        assert_eq!(
            toks("<<b>bold</b>>"),
            vec![Tok::Html("<b>bold</b>".to_string())]
        );
    }

    #[test]
    fn unterminated_string_reports_its_start() {
        let err = Lexer::new("a \"open")
            .collect::<Result<Vec<_>, _>>()
            .unwrap_err();
        assert_eq!(err.offset, 2);
    }
}
