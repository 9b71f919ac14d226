//! Selector list parsing and serialization.
//!
//! The parser only understands enough of the selector grammar to split a
//! selector list into alternatives, each alternative into combinators and
//! simple selectors, and to find the parent reference `&`. Everything else
//! (attribute contents, pseudo-class arguments, escapes) is carried as opaque
//! text and written back unchanged.

use std::fmt;

/// Pseudo-classes whose argument is itself a selector list. A `&` inside
/// their parentheses is a parent reference like any other.
const SELECTOR_LIST_PSEUDOS: &[&str] = &[
    "is",
    "where",
    "not",
    "has",
    "matches",
    "any",
    "-webkit-any",
    "-moz-any",
    "host",
    "host-context",
];

/// Supported combinators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Combinator {
    /// Descendant combinator (a space).
    Descendant,
    /// Child combinator (`>`).
    Child,
    /// Adjacent sibling combinator (`+`).
    AdjacentSibling,
    /// General sibling combinator (`~`).
    GeneralSibling,
}

impl Combinator {
    fn from_char(ch: char) -> Option<Self> {
        match ch {
            '>' => Some(Combinator::Child),
            '+' => Some(Combinator::AdjacentSibling),
            '~' => Some(Combinator::GeneralSibling),
            _ => None,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Combinator::Descendant => " ",
            Combinator::Child => ">",
            Combinator::AdjacentSibling => "+",
            Combinator::GeneralSibling => "~",
        }
    }
}

/// One token of a selector alternative.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorToken {
    /// The parent reference `&`.
    Parent,
    Combinator(Combinator),
    /// A simple selector kept verbatim: `div`, `.btn`, `#main`, `[type="x"]`,
    /// `:hover`, `::before`, `:nth-child(2n+1)`.
    Simple(String),
    /// A pseudo-class taking a selector list, e.g. `:not(&.disabled)`.
    /// `name` includes the leading colon.
    Pseudo { name: String, arguments: SelectorList },
}

/// A single selector alternative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector(pub Vec<SelectorToken>);

/// Comma separated selector alternatives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorList(pub Vec<Selector>);

impl Selector {
    pub fn tokens(&self) -> &[SelectorToken] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if a parent reference occurs anywhere, including inside
    /// selector-list pseudo-classes.
    pub fn contains_parent(&self) -> bool {
        self.0.iter().any(|token| match token {
            SelectorToken::Parent => true,
            SelectorToken::Pseudo { arguments, .. } => arguments.contains_parent(),
            _ => false,
        })
    }

    /// Drops descendant combinators left dangling at either end or next to
    /// another combinator, which happens when an empty parent is spliced in.
    pub fn normalize(mut self) -> Self {
        let mut tokens: Vec<SelectorToken> = Vec::with_capacity(self.0.len());
        for token in self.0.drain(..) {
            let after_combinator = matches!(tokens.last(), Some(SelectorToken::Combinator(_)));
            let after_descendant =
                tokens.last() == Some(&SelectorToken::Combinator(Combinator::Descendant));
            match token {
                SelectorToken::Combinator(Combinator::Descendant)
                    if tokens.is_empty() || after_combinator => {}
                SelectorToken::Combinator(explicit) if after_descendant => {
                    if let Some(last) = tokens.last_mut() {
                        *last = SelectorToken::Combinator(explicit);
                    }
                }
                other => tokens.push(other),
            }
        }
        if tokens.last() == Some(&SelectorToken::Combinator(Combinator::Descendant)) {
            tokens.pop();
        }
        Selector(tokens)
    }
}

impl SelectorList {
    pub fn selectors(&self) -> &[Selector] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains_parent(&self) -> bool {
        self.0.iter().any(Selector::contains_parent)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.0.iter().enumerate() {
            match token {
                SelectorToken::Parent => f.write_str("&")?,
                SelectorToken::Simple(text) => f.write_str(text)?,
                SelectorToken::Pseudo { name, arguments } => write!(f, "{}({})", name, arguments)?,
                SelectorToken::Combinator(Combinator::Descendant) => f.write_str(" ")?,
                SelectorToken::Combinator(combinator) => {
                    // A leading combinator is a relative selector: "> .child".
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{} ", combinator.symbol())?;
                }
            }
        }
        Ok(())
    }
}

impl fmt::Display for SelectorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, selector) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", selector)?;
        }
        Ok(())
    }
}

/// Parse a selector list such as `".a, &:hover > .b"`.
///
/// Returns `None` when the text is not a selector list: empty alternatives,
/// unbalanced brackets or parentheses, unterminated strings, dangling or
/// doubled combinators.
pub fn parse_selector_list(input: &str) -> Option<SelectorList> {
    let mut cursor = Cursor::new(input);
    let list = parse_list(&mut cursor, None)?;
    if cursor.peek().is_some() {
        return None;
    }
    Some(list)
}

/// Serialize a selector list back to text. Same as its `Display` output.
pub fn serialize_selector_list(list: &SelectorList) -> String {
    list.to_string()
}

struct Cursor<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(input: &'a str) -> Self {
        Cursor { input, pos: 0 }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_second(&self) -> Option<char> {
        self.input[self.pos..].chars().nth(1)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek() {
            if ch.is_whitespace() {
                self.bump();
            } else {
                break;
            }
        }
    }

    fn slice_from(&self, start: usize) -> &'a str {
        &self.input[start..self.pos]
    }
}

/// Parses alternatives until end of input, or until `close` (not consumed).
fn parse_list(cursor: &mut Cursor<'_>, close: Option<char>) -> Option<SelectorList> {
    let mut selectors = Vec::new();
    loop {
        let selector = parse_selector(cursor, close)?;
        if selector.is_empty() {
            return None;
        }
        selectors.push(selector);

        match cursor.peek() {
            Some(',') => {
                cursor.bump();
            }
            None if close.is_none() => return Some(SelectorList(selectors)),
            Some(ch) if Some(ch) == close => return Some(SelectorList(selectors)),
            _ => return None,
        }
    }
}

fn parse_selector(cursor: &mut Cursor<'_>, close: Option<char>) -> Option<Selector> {
    let mut tokens: Vec<SelectorToken> = Vec::new();
    let mut pending_space = false;

    while let Some(ch) = cursor.peek() {
        if ch == ',' || Some(ch) == close {
            break;
        }
        if ch.is_whitespace() {
            cursor.bump();
            pending_space = true;
            continue;
        }
        if let Some(combinator) = Combinator::from_char(ch) {
            cursor.bump();
            if matches!(tokens.last(), Some(SelectorToken::Combinator(_))) {
                return None;
            }
            tokens.push(SelectorToken::Combinator(combinator));
            pending_space = false;
            continue;
        }

        let after_compound = matches!(
            tokens.last(),
            Some(
                SelectorToken::Parent | SelectorToken::Simple(_) | SelectorToken::Pseudo { .. }
            )
        );
        if pending_space && after_compound {
            tokens.push(SelectorToken::Combinator(Combinator::Descendant));
        }
        pending_space = false;
        tokens.push(parse_simple(cursor)?);
    }

    if matches!(tokens.last(), Some(SelectorToken::Combinator(_))) {
        return None;
    }
    Some(Selector(tokens))
}

fn parse_simple(cursor: &mut Cursor<'_>) -> Option<SelectorToken> {
    let start = cursor.pos;
    match cursor.peek()? {
        '&' => {
            cursor.bump();
            Some(SelectorToken::Parent)
        }
        '[' => {
            read_balanced(cursor)?;
            Some(SelectorToken::Simple(cursor.slice_from(start).to_string()))
        }
        '.' | '#' => {
            cursor.bump();
            if read_ident(cursor) == 0 {
                return None;
            }
            Some(SelectorToken::Simple(cursor.slice_from(start).to_string()))
        }
        '*' => {
            cursor.bump();
            read_namespace_suffix(cursor);
            Some(SelectorToken::Simple(cursor.slice_from(start).to_string()))
        }
        ':' => parse_pseudo(cursor),
        ch if is_ident_start(ch) => {
            read_ident(cursor);
            read_namespace_suffix(cursor);
            Some(SelectorToken::Simple(cursor.slice_from(start).to_string()))
        }
        _ => None,
    }
}

fn parse_pseudo(cursor: &mut Cursor<'_>) -> Option<SelectorToken> {
    let start = cursor.pos;
    cursor.bump();
    let element = cursor.peek() == Some(':');
    if element {
        cursor.bump();
    }
    let name_start = cursor.pos;
    if read_ident(cursor) == 0 {
        return None;
    }
    let name = cursor.slice_from(name_start).to_ascii_lowercase();

    if cursor.peek() != Some('(') {
        return Some(SelectorToken::Simple(cursor.slice_from(start).to_string()));
    }

    if !element && SELECTOR_LIST_PSEUDOS.contains(&name.as_str()) {
        let name = cursor.slice_from(start).to_string();
        cursor.bump();
        cursor.skip_whitespace();
        let arguments = parse_list(cursor, Some(')'))?;
        if cursor.bump() != Some(')') {
            return None;
        }
        return Some(SelectorToken::Pseudo { name, arguments });
    }

    read_balanced(cursor)?;
    Some(SelectorToken::Simple(cursor.slice_from(start).to_string()))
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '-' || ch == '\\' || !ch.is_ascii()
}

fn is_ident_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '-' || !ch.is_ascii()
}

/// Consumes an identifier (with backslash escapes) and returns its length in bytes.
fn read_ident(cursor: &mut Cursor<'_>) -> usize {
    let start = cursor.pos;
    while let Some(ch) = cursor.peek() {
        if ch == '\\' {
            cursor.bump();
            if cursor.bump().is_none() {
                break;
            }
        } else if is_ident_char(ch) {
            cursor.bump();
        } else {
            break;
        }
    }
    cursor.pos - start
}

/// `svg|circle`, `*|*`: the part after a namespace bar.
fn read_namespace_suffix(cursor: &mut Cursor<'_>) {
    if cursor.peek() == Some('|') && cursor.peek_second() != Some('|') {
        cursor.bump();
        if cursor.peek() == Some('*') {
            cursor.bump();
        } else {
            read_ident(cursor);
        }
    }
}

/// Consumes a bracketed run starting at `(` or `[` up to its matching closer,
/// skipping over quoted strings. Fails on mismatched or missing closers.
fn read_balanced(cursor: &mut Cursor<'_>) -> Option<()> {
    let mut expected: Vec<char> = Vec::new();
    loop {
        let ch = cursor.bump()?;
        match ch {
            '(' => expected.push(')'),
            '[' => expected.push(']'),
            ')' | ']' => {
                if expected.pop() != Some(ch) {
                    return None;
                }
                if expected.is_empty() {
                    return Some(());
                }
            }
            '"' | '\'' => read_string(cursor, ch)?,
            '\\' => {
                cursor.bump()?;
            }
            _ => {}
        }
    }
}

fn read_string(cursor: &mut Cursor<'_>, quote: char) -> Option<()> {
    loop {
        match cursor.bump()? {
            '\\' => {
                cursor.bump()?;
            }
            ch if ch == quote => return Some(()),
            _ => {}
        }
    }
}
