use crate::error::InterpreterException;
use crate::transport::Value;

/// Unevaluated S-expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Number(f64),
    Text(String),
    Boolean(bool),
    Symbol(String),
    List(Vec<Datum>),
    Quote(Box<Datum>),
}

/// Lists and quotes nested deeper than this are refused.
const MAX_NESTING: usize = 512;

fn syntax_error(message: impl Into<String>) -> InterpreterException {
    InterpreterException::new("syntax-error", vec![Value::Text(message.into())])
}

/// Reads every top-level form of `source`.
pub fn read_all(source: &str) -> Result<Vec<Datum>, InterpreterException> {
    let mut reader = Reader {
        chars: source.chars().collect(),
        pos: 0,
        nesting: 0,
    };
    let mut forms = Vec::new();
    loop {
        reader.skip_blank();
        if reader.peek().is_none() {
            return Ok(forms);
        }
        forms.push(reader.datum()?);
    }
}

struct Reader {
    chars: Vec<char>,
    pos: usize,
    nesting: usize,
}

impl Reader {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        Some(c)
    }

    fn skip_blank(&mut self) {
        while let Some(c) = self.peek() {
            if c.is_whitespace() {
                self.pos += 1;
            } else if c == ';' {
                while let Some(c) = self.bump() {
                    if c == '\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn datum(&mut self) -> Result<Datum, InterpreterException> {
        self.skip_blank();
        match self.peek() {
            None => Err(syntax_error("unexpected end of input")),
            Some('(') => {
                self.pos += 1;
                self.nested(Self::list)
            }
            Some(')') => Err(syntax_error("unexpected ')'")),
            Some('\'') => {
                self.pos += 1;
                self.nested(|r| Ok(Datum::Quote(Box::new(r.datum()?))))
            }
            Some('"') => self.string(),
            Some(_) => Ok(self.atom()),
        }
    }

    fn nested(
        &mut self,
        read: impl FnOnce(&mut Self) -> Result<Datum, InterpreterException>,
    ) -> Result<Datum, InterpreterException> {
        if self.nesting >= MAX_NESTING {
            return Err(syntax_error("nesting too deep"));
        }
        self.nesting += 1;
        let datum = read(self);
        self.nesting -= 1;
        datum
    }

    fn list(&mut self) -> Result<Datum, InterpreterException> {
        let mut items = Vec::new();
        loop {
            self.skip_blank();
            match self.peek() {
                None => return Err(syntax_error("missing ')'")),
                Some(')') => {
                    self.pos += 1;
                    return Ok(Datum::List(items));
                }
                Some(_) => items.push(self.datum()?),
            }
        }
    }

    fn string(&mut self) -> Result<Datum, InterpreterException> {
        self.pos += 1;
        let mut text = String::new();
        loop {
            match self.bump() {
                None => return Err(syntax_error("unterminated string")),
                Some('"') => return Ok(Datum::Text(text)),
                Some('\\') => match self.bump() {
                    Some('n') => text.push('\n'),
                    Some('t') => text.push('\t'),
                    Some(c) => text.push(c),
                    None => return Err(syntax_error("unterminated string")),
                },
                Some(c) => text.push(c),
            }
        }
    }

    fn atom(&mut self) -> Datum {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_whitespace() || matches!(c, '(' | ')' | '"' | ';' | '\'') {
                break;
            }
            self.pos += 1;
        }
        let token: String = self.chars[start..self.pos].iter().collect();
        match token.as_str() {
            "#t" | "#true" => Datum::Boolean(true),
            "#f" | "#false" => Datum::Boolean(false),
            _ => match parse_number(&token) {
                Some(n) => Datum::Number(n),
                None => Datum::Symbol(token),
            },
        }
    }
}

/// Only tokens that look numeric are numbers, so `inf` stays a symbol.
fn parse_number(token: &str) -> Option<f64> {
    let mut chars = token.chars();
    let first = chars.next()?;
    let numeric_start = first.is_ascii_digit()
        || (matches!(first, '-' | '+' | '.') && chars.next().is_some_and(|c| c.is_ascii_digit() || c == '.'));
    if !numeric_start {
        return None;
    }
    token.parse::<f64>().ok().filter(|n| n.is_finite())
}
