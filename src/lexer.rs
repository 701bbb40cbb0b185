//! The UXF lexer: UTF-8 text → token stream.
//!
//! The lexer scans the mandatory `uxf <version>` header, then produces one
//! token per grammar terminal with 1-based line numbers attached. String
//! and comment payloads arrive entity-decoded; numbers, dates, and
//! datetimes arrive fully parsed.

use crate::error::{Error, Result};
use crate::event::{self, deliver, Event};
use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TokenKind {
    Comment(String),
    Import(String),
    TtypeBegin,
    MapOpen,
    MapClose,
    ListOpen,
    ListClose,
    TableOpen,
    TableClose,
    Colon,
    Null,
    Bool(bool),
    Int(i64),
    Real(f64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Str(String),
    Bytes(Vec<u8>),
    TypeName(&'static str),
    Ident(String),
    Eof,
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Token {
    pub kind: TokenKind,
    pub line: usize,
}

impl Token {
    fn new(kind: TokenKind, line: usize) -> Self {
        Token { kind, line }
    }
}

/// Everything the lexer learned about one source.
#[derive(Debug)]
pub(crate) struct Tokens {
    pub tokens: Vec<Token>,
    pub custom: String,
}

pub(crate) fn tokenize(
    text: &str,
    filename: &str,
    on_event: &mut dyn FnMut(&Event) -> Result<()>,
) -> Result<Tokens> {
    let mut lexer = Lexer {
        text: text.strip_prefix('\u{feff}').unwrap_or(text),
        pos: 0,
        line: 1,
        filename,
        on_event,
        tokens: Vec::new(),
        custom: String::new(),
    };
    lexer.scan_header()?;
    while !lexer.at_end() {
        lexer.scan_next()?;
    }
    let line = lexer.line;
    lexer.tokens.push(Token::new(TokenKind::Eof, line));
    Ok(Tokens {
        tokens: lexer.tokens,
        custom: lexer.custom,
    })
}

struct Lexer<'a> {
    text: &'a str,
    pos: usize,
    line: usize,
    filename: &'a str,
    on_event: &'a mut dyn FnMut(&Event) -> Result<()>,
    tokens: Vec<Token>,
    custom: String,
}

impl Lexer<'_> {
    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }

    fn peek(&self) -> Option<char> {
        self.text[self.pos..].chars().next()
    }

    fn peek2(&self) -> Option<char> {
        let mut chars = self.text[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
        }
        Some(c)
    }

    fn push(&mut self, kind: TokenKind) {
        let line = self.line;
        self.tokens.push(Token::new(kind, line));
    }

    fn warn(&mut self, code: &'static str, message: String) -> Result<()> {
        deliver(
            self.on_event,
            Event::warning(self.line, code, message, self.filename),
        )
    }

    fn fail<T>(&mut self, code: &'static str, message: String) -> Result<T> {
        let event = Event::error(self.line, code, message, self.filename);
        (self.on_event)(&event)?;
        Err(Error::Fatal(event))
    }

    fn scan_header(&mut self) -> Result<()> {
        let Some(end) = self.text.find('\n') else {
            return self.fail(
                event::E_LEX_HEADER,
                "missing UXF file header or empty file".to_string(),
            );
        };
        let header = &self.text[..end];
        let mut words = header.split_whitespace();
        if words.next() != Some("uxf") {
            return self.fail(event::E_LEX_HEADER, "not a UXF file".to_string());
        }
        let Some(version_text) = words.next() else {
            return self.fail(event::E_LEX_HEADER, "invalid UXF file header".to_string());
        };
        match version_text.parse::<f64>() {
            Ok(version) => {
                if version > crate::VERSION {
                    self.warn(
                        event::W_LEX_VERSION,
                        format!("version {version} is newer than {}", crate::VERSION),
                    )?;
                }
            }
            Err(_) => {
                self.warn(
                    event::W_LEX_VERSION,
                    format!("failed to read the format version, got {version_text}"),
                )?;
            }
        }
        // The custom text is everything after the version word, verbatim.
        if let Some(at) = header.find(version_text) {
            let tail = &header[at + version_text.len()..];
            self.custom = tail.trim_start().to_string();
        }
        self.pos = end + 1;
        self.line = 2;
        Ok(())
    }

    fn scan_next(&mut self) -> Result<()> {
        let Some(c) = self.peek() else { return Ok(()) };
        match c {
            _ if c.is_whitespace() => {
                self.advance();
            }
            '[' => {
                self.advance();
                self.push(TokenKind::ListOpen);
            }
            ']' => {
                self.advance();
                self.push(TokenKind::ListClose);
            }
            '{' => {
                self.advance();
                self.push(TokenKind::MapOpen);
            }
            '}' => {
                self.advance();
                self.push(TokenKind::MapClose);
            }
            '(' => {
                if self.peek2() == Some(':') {
                    self.read_bytes()?;
                } else {
                    self.advance();
                    self.push(TokenKind::TableOpen);
                }
            }
            ')' => {
                self.advance();
                self.push(TokenKind::TableClose);
            }
            '=' => {
                self.advance();
                self.push(TokenKind::TtypeBegin);
            }
            ':' => {
                self.advance();
                self.push(TokenKind::Colon);
            }
            '?' => {
                self.advance();
                self.push(TokenKind::Null);
            }
            '!' => self.read_import(),
            '#' => self.read_comment()?,
            '<' => {
                let line = self.line;
                let value = self.read_string()?;
                self.tokens.push(Token::new(TokenKind::Str(value), line));
            }
            '-' | '+' | '0'..='9' => self.read_number_or_date()?,
            _ if c == '_' || c.is_alphabetic() => self.read_bareword()?,
            _ => {
                return self.fail(
                    event::E_LEX_CHAR,
                    format!("invalid character encountered: {c:?}"),
                )
            }
        }
        Ok(())
    }

    fn read_import(&mut self) {
        self.advance(); // !
        let start = self.pos;
        let end = self.text[start..]
            .find('\n')
            .map_or(self.text.len(), |i| start + i);
        let source = self.text[start..end].trim().to_string();
        self.pos = end;
        self.push(TokenKind::Import(source));
    }

    // Comments are only legal at the very start of the body or directly
    // after an open bracket or `=`.
    fn read_comment(&mut self) -> Result<()> {
        let placed_ok = match self.tokens.last().map(|t| &t.kind) {
            None => true,
            Some(
                TokenKind::ListOpen
                | TokenKind::MapOpen
                | TokenKind::TableOpen
                | TokenKind::TtypeBegin,
            ) => true,
            _ => false,
        };
        if !placed_ok {
            return self.fail(
                event::E_LEX_COMMENT,
                "comments may only occur at the start of the file, maps, lists, tables, \
                 and ttype definitions"
                    .to_string(),
            );
        }
        self.advance(); // #
        if self.peek() != Some('<') {
            return self.fail(
                event::E_LEX_COMMENT,
                "a string must follow the # comment introducer".to_string(),
            );
        }
        let line = self.line;
        let value = self.read_string()?;
        self.tokens.push(Token::new(TokenKind::Comment(value), line));
        Ok(())
    }

    fn read_string(&mut self) -> Result<String> {
        self.advance(); // <
        let start = self.pos;
        let Some(len) = self.text[start..].find('>') else {
            return self.fail(event::E_LEX_STR, "unterminated string".to_string());
        };
        let raw = &self.text[start..start + len];
        if raw.contains('<') {
            return self.fail(
                event::E_LEX_STR,
                "strings may not contain a raw <; use &lt;".to_string(),
            );
        }
        let decoded = self.decode_entities(raw)?;
        self.line += raw.matches('\n').count();
        self.pos = start + len + 1; // past >
        Ok(decoded)
    }

    fn decode_entities(&mut self, raw: &str) -> Result<String> {
        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(i) = rest.find('&') {
            out.push_str(&rest[..i]);
            let tail = &rest[i..];
            if let Some(after) = tail.strip_prefix("&amp;") {
                out.push('&');
                rest = after;
            } else if let Some(after) = tail.strip_prefix("&lt;") {
                out.push('<');
                rest = after;
            } else if let Some(after) = tail.strip_prefix("&gt;") {
                out.push('>');
                rest = after;
            } else {
                let hint: String = tail.chars().take(6).collect();
                return self.fail(
                    event::E_LEX_ENTITY,
                    format!("invalid entity, expected &amp;, &lt;, or &gt;, got {hint:?}"),
                );
            }
        }
        out.push_str(rest);
        Ok(out)
    }

    fn read_bytes(&mut self) -> Result<()> {
        let line = self.line;
        self.advance(); // (
        self.advance(); // :
        let start = self.pos;
        let Some(len) = self.text[start..].find(":)") else {
            return self.fail(event::E_LEX_BYTES, "unterminated bytes".to_string());
        };
        let raw = &self.text[start..start + len];
        let mut nibbles = Vec::with_capacity(raw.len());
        for c in raw.chars() {
            if c.is_ascii_hexdigit() {
                nibbles.push(c.to_digit(16).unwrap_or(0) as u8);
            } else if c.is_whitespace() {
                if c == '\n' {
                    self.line += 1;
                }
            } else {
                return self.fail(
                    event::E_LEX_BYTES,
                    format!("bytes may only contain hex digits, got {c:?}"),
                );
            }
        }
        if nibbles.len() % 2 != 0 {
            return self.fail(
                event::E_LEX_BYTES,
                "bytes need an even number of hex digits".to_string(),
            );
        }
        let value = nibbles.chunks_exact(2).map(|p| (p[0] << 4) | p[1]).collect();
        self.pos = start + len + 2; // past :)
        self.tokens.push(Token::new(TokenKind::Bytes(value), line));
        Ok(())
    }

    fn read_bareword(&mut self) -> Result<()> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c == '_' || c.is_alphanumeric() {
                self.advance();
            } else {
                break;
            }
        }
        let word = &self.text[start..self.pos];
        match word {
            "yes" | "true" => self.push(TokenKind::Bool(true)),
            "no" | "false" => self.push(TokenKind::Bool(false)),
            "null" => {
                return self.fail(
                    event::E_TYPE_RESERVED,
                    "null is a reserved word; null values are written as ?".to_string(),
                )
            }
            _ => {
                if let Some(name) = crate::check::VTYPES.iter().find(|n| **n == word).copied() {
                    self.push(TokenKind::TypeName(name));
                } else {
                    let word = word.to_string();
                    if let Some((code, message)) = crate::check::ident_problem(&word) {
                        return self.fail(code, message);
                    }
                    self.push(TokenKind::Ident(word));
                }
            }
        }
        Ok(())
    }

    // Ints, reals, dates, and datetimes all start with a digit or sign, so
    // the longest run over the union of their alphabets is taken and then
    // classified.
    fn read_number_or_date(&mut self) -> Result<()> {
        let start = self.pos;
        let signed = matches!(self.peek(), Some('-' | '+'));
        if signed {
            self.advance();
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | ':' | 'T' | 'Z' | '+' | '-') {
                self.advance();
            } else {
                break;
            }
        }
        let run = &self.text[start..self.pos];
        let line = self.line;
        let kind = self.classify_run(run, signed)?;
        self.tokens.push(Token::new(kind, line));
        Ok(())
    }

    fn classify_run(&mut self, run: &str, signed: bool) -> Result<TokenKind> {
        let bytes = run.as_bytes();
        let datelike =
            !signed && run.len() >= 10 && bytes[4] == b'-' && bytes[7] == b'-';
        if datelike {
            if run.contains('T') {
                return self.read_datetime(run);
            }
            return match parse_date(run) {
                Some(date) => Ok(TokenKind::Date(date)),
                None => self.fail(event::E_RANGE_DATE, format!("invalid date: {run}")),
            };
        }
        if run.contains('.') || run.contains('e') || run.contains('E') {
            if let Some(i) = run.find('.') {
                let before = i > 0 && bytes[i - 1].is_ascii_digit();
                let after = bytes.get(i + 1).is_some_and(u8::is_ascii_digit);
                if !(before && after) {
                    return self.fail(
                        event::E_LEX_NUM,
                        format!("reals need a digit on each side of the point: {run}"),
                    );
                }
            }
            return match run.parse::<f64>() {
                Ok(r) => Ok(TokenKind::Real(r)),
                Err(_) => self.fail(event::E_LEX_NUM, format!("invalid real: {run}")),
            };
        }
        if run.contains([':', 'T', 'Z']) || run[1..].contains(['-', '+']) {
            return self.fail(event::E_LEX_NUM, format!("invalid number or date/time: {run}"));
        }
        match run.parse::<i64>() {
            Ok(i) => Ok(TokenKind::Int(i)),
            Err(err) => match err.kind() {
                std::num::IntErrorKind::PosOverflow | std::num::IntErrorKind::NegOverflow => self
                    .fail(
                        event::E_RANGE_INT,
                        format!("integer does not fit in 64 bits: {run}"),
                    ),
                _ => self.fail(event::E_LEX_NUM, format!("invalid number: {run}")),
            },
        }
    }

    fn read_datetime(&mut self, run: &str) -> Result<TokenKind> {
        let (date_part, time_part) = match run.split_once('T') {
            Some(parts) => parts,
            None => return self.fail(event::E_RANGE_DATE, format!("invalid datetime: {run}")),
        };
        let Some(date) = parse_date(date_part) else {
            return self.fail(event::E_RANGE_DATE, format!("invalid datetime: {run}"));
        };
        // Split any trailing UTC-offset suffix off the time of day.
        let (clock, offset_minutes) = match split_offset(time_part) {
            Some(parts) => parts,
            None => return self.fail(event::E_RANGE_DATE, format!("invalid datetime: {run}")),
        };
        let time = NaiveTime::parse_from_str(clock, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(clock, "%H:%M"));
        let Ok(time) = time else {
            return self.fail(event::E_RANGE_DATE, format!("invalid datetime: {run}"));
        };
        let mut datetime = date.and_time(time);
        if let Some(minutes) = offset_minutes {
            self.warn(
                event::W_DATETIME_IMPRECISE,
                format!("datetime offset in {run} normalized to UTC"),
            )?;
            datetime = datetime - Duration::minutes(minutes);
        }
        Ok(TokenKind::DateTime(datetime))
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    // Shape first (YYYY-MM-DD), then calendar validity.
    let bytes = s.as_bytes();
    if bytes.len() != 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    NaiveDate::parse_from_str(s, crate::value::ISO_DATE).ok()
}

/// Splits `HH:MM[:SS]` from a trailing `Z`, `±HH`, `±HH:MM`, or `±HHMM`
/// suffix, returning the offset east of UTC in minutes.
fn split_offset(time_part: &str) -> Option<(&str, Option<i64>)> {
    if let Some(clock) = time_part.strip_suffix('Z') {
        return Some((clock, Some(0)));
    }
    let Some(at) = time_part.find(['+', '-']) else {
        return Some((time_part, None));
    };
    let (clock, suffix) = time_part.split_at(at);
    let sign = if suffix.starts_with('-') { -1 } else { 1 };
    let digits: String = suffix[1..].chars().filter(|c| *c != ':').collect();
    if !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let minutes = match digits.len() {
        2 => digits.parse::<i64>().ok()? * 60,
        4 => {
            let hours = digits[..2].parse::<i64>().ok()?;
            let mins = digits[2..].parse::<i64>().ok()?;
            hours * 60 + mins
        }
        _ => return None,
    };
    Some((clock, Some(sign * minutes)))
}
