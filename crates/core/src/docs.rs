//! XML documentation comments → summary, parameter descriptions, return text.
//!
//! The resolver hands us the raw `<member>…</member>` (or bare `<summary>…`) XML a
//! C# compiler attaches to a symbol. We read it with a small strict tag reader:
//! one raw attempt, one retry wrapped in a synthetic container, then give up and
//! return an empty comment. Nothing in here returns an error to the caller.

use tracing::debug;

/// How a parsed comment is turned back into text for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommentStyle {
    /// Summary line only. Used for inline stub comments.
    #[default]
    Reduced,
    /// Summary paragraph, fenced parameter block, fenced returns block.
    Rich,
}

/// Normalized content of one documentation comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocComment {
    pub summary: String,
    /// `(name, description)` in document order.
    pub params: Vec<(String, String)>,
    pub returns: String,
}

const PARAMS_LABEL: &str = "Params: ";
const RETURNS_LABEL: &str = "Returns: ";

impl DocComment {
    /// Parse a raw documentation string. Missing, foreign or malformed input
    /// yields an empty comment.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(raw) = raw else {
            return Self::default();
        };

        let text = normalize_line_endings(raw);
        if !text.starts_with("<member") && !text.starts_with("<summary") {
            return Self::default();
        }

        let text = if text.starts_with("<summary") {
            format!("<parent>{text}</parent>")
        } else {
            text
        };

        match xml::tokenize(&text) {
            Ok(tokens) => Self::from_tokens(&tokens),
            Err(first) => {
                let wrapped = format!("<doc>{text}</doc>");
                match xml::tokenize(&wrapped) {
                    Ok(tokens) => Self::from_tokens(&tokens),
                    Err(second) => {
                        debug!(first = %first, retry = %second, "Unparsable documentation comment");
                        Self::default()
                    }
                }
            }
        }
    }

    fn from_tokens(tokens: &[xml::Token]) -> Self {
        let mut doc = Self::default();
        let mut i = 0;

        while i < tokens.len() {
            if let xml::Token::Start { name, attrs, self_closing: false } = &tokens[i] {
                let next_text = match tokens.get(i + 1) {
                    Some(xml::Token::Text(t)) => Some(collapse_whitespace(t)),
                    _ => None,
                };

                match (name.as_str(), next_text) {
                    ("summary" | "para", Some(text)) => {
                        doc.summary = text;
                        i += 1;
                    }
                    ("param", Some(text)) => {
                        if let Some((_, param_name)) = attrs.iter().find(|(k, _)| k == "name") {
                            doc.params.push((param_name.clone(), text));
                        }
                        i += 1;
                    }
                    ("returns", Some(text)) => {
                        doc.returns = text;
                        i += 1;
                    }
                    _ => {}
                }
            }
            i += 1;
        }

        doc
    }

    pub fn is_empty(&self) -> bool {
        self.summary.is_empty() && self.params.is_empty() && self.returns.is_empty()
    }

    /// Description of the parameter called `name`, if documented.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.iter().find(|(n, _)| n == name).map(|(_, text)| text.as_str())
    }

    /// Render back to text in the requested style.
    pub fn render(&self, style: CommentStyle) -> String {
        match style {
            CommentStyle::Reduced => self.summary.clone(),
            CommentStyle::Rich => self.render_rich(),
        }
    }

    fn render_rich(&self) -> String {
        let mut sections: Vec<String> = Vec::new();

        if !self.summary.is_empty() {
            sections.push(self.summary.clone());
        }

        if !self.params.is_empty() {
            let indent = " ".repeat(PARAMS_LABEL.len());
            let mut block = String::from("```plaintext\n");
            for (i, (name, text)) in self.params.iter().enumerate() {
                block.push_str(if i == 0 { PARAMS_LABEL } else { &indent });
                block.push_str(&format!("{name} - {text}\n"));
            }
            block.push_str("```");
            sections.push(block);
        }

        if !self.returns.is_empty() {
            sections.push(format!("```plaintext\n{RETURNS_LABEL}{}\n```", self.returns));
        }

        sections.join("\n\n")
    }
}

fn normalize_line_endings(raw: &str) -> String {
    raw.replace("\r\n", " ").replace(['\r', '\n', '\t'], " ").trim().to_string()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ---------------------------------------------------------------------------
// Minimal strict tag reader
// ---------------------------------------------------------------------------

mod xml {
    use thiserror::Error;

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(super) enum Token {
        Start { name: String, attrs: Vec<(String, String)>, self_closing: bool },
        End(String),
        /// Raw text with entities decoded. Whitespace-only runs are dropped.
        Text(String),
    }

    #[derive(Debug, Clone, PartialEq, Eq, Error)]
    pub(super) enum XmlError {
        #[error("unexpected end of input")]
        UnexpectedEof,
        #[error("unexpected character '{0}'")]
        UnexpectedChar(char),
        #[error("expected a tag or attribute name")]
        MissingName,
        #[error("closing tag </{found}> does not match <{expected}>")]
        MismatchedEnd { expected: String, found: String },
        #[error("closing tag </{0}> without an open element")]
        StrayEnd(String),
        #[error("element <{0}> is never closed")]
        Unclosed(String),
        #[error("unknown entity &{0};")]
        UnknownEntity(String),
        #[error("document has no root element")]
        NoRoot,
        #[error("document has more than one root element")]
        MultipleRoots,
        #[error("text outside the root element")]
        TextOutsideRoot,
    }

    struct Cursor<'a> {
        src: &'a str,
        pos: usize,
    }

    impl<'a> Cursor<'a> {
        fn rest(&self) -> &'a str {
            &self.src[self.pos..]
        }

        fn at_end(&self) -> bool {
            self.pos >= self.src.len()
        }

        fn peek(&self) -> Option<char> {
            self.rest().chars().next()
        }

        fn bump(&mut self) -> Option<char> {
            let c = self.peek()?;
            self.pos += c.len_utf8();
            Some(c)
        }

        fn eat(&mut self, s: &str) -> bool {
            if self.rest().starts_with(s) {
                self.pos += s.len();
                true
            } else {
                false
            }
        }

        fn expect(&mut self, want: char) -> Result<(), XmlError> {
            match self.bump() {
                Some(c) if c == want => Ok(()),
                Some(c) => Err(XmlError::UnexpectedChar(c)),
                None => Err(XmlError::UnexpectedEof),
            }
        }

        fn skip_ws(&mut self) -> bool {
            let start = self.pos;
            while matches!(self.peek(), Some(c) if c.is_whitespace()) {
                self.bump();
            }
            self.pos > start
        }

        fn take_until(&mut self, end: &str) -> Result<&'a str, XmlError> {
            let rest = self.rest();
            match rest.find(end) {
                Some(i) => {
                    self.pos += i + end.len();
                    Ok(&rest[..i])
                }
                None => Err(XmlError::UnexpectedEof),
            }
        }

        fn take_text(&mut self) -> &'a str {
            let rest = self.rest();
            let end = rest.find('<').unwrap_or(rest.len());
            self.pos += end;
            &rest[..end]
        }

        fn name(&mut self) -> Result<String, XmlError> {
            let mut name = String::new();
            while let Some(c) = self.peek() {
                let ok = if name.is_empty() {
                    c.is_alphabetic() || c == '_' || c == ':'
                } else {
                    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
                };
                if !ok {
                    break;
                }
                name.push(c);
                self.bump();
            }
            if name.is_empty() {
                Err(XmlError::MissingName)
            } else {
                Ok(name)
            }
        }

        fn quoted(&mut self) -> Result<&'a str, XmlError> {
            match self.bump() {
                Some(quote @ ('"' | '\'')) => {
                    let rest = self.rest();
                    match rest.find(quote) {
                        Some(i) => {
                            self.pos += i + 1;
                            Ok(&rest[..i])
                        }
                        None => Err(XmlError::UnexpectedEof),
                    }
                }
                Some(c) => Err(XmlError::UnexpectedChar(c)),
                None => Err(XmlError::UnexpectedEof),
            }
        }
    }

    fn decode_entities(raw: &str) -> Result<String, XmlError> {
        if !raw.contains('&') {
            return Ok(raw.to_string());
        }

        let mut out = String::with_capacity(raw.len());
        let mut rest = raw;
        while let Some(amp) = rest.find('&') {
            out.push_str(&rest[..amp]);
            let after = &rest[amp + 1..];
            let semi = after.find(';').ok_or_else(|| XmlError::UnknownEntity(after.to_string()))?;
            let entity = &after[..semi];
            let decoded = match entity {
                "lt" => '<',
                "gt" => '>',
                "amp" => '&',
                "quot" => '"',
                "apos" => '\'',
                _ => {
                    let code = if let Some(hex) = entity.strip_prefix("#x") {
                        u32::from_str_radix(hex, 16).ok()
                    } else if let Some(dec) = entity.strip_prefix('#') {
                        dec.parse::<u32>().ok()
                    } else {
                        None
                    };
                    code.and_then(char::from_u32)
                        .ok_or_else(|| XmlError::UnknownEntity(entity.to_string()))?
                }
            };
            out.push(decoded);
            rest = &after[semi + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }

    /// Split a complete XML fragment into tokens, checking it is well formed:
    /// exactly one root, every element closed by a matching end tag.
    pub(super) fn tokenize(src: &str) -> Result<Vec<Token>, XmlError> {
        let mut cur = Cursor { src, pos: 0 };
        let mut tokens = Vec::new();
        let mut open: Vec<String> = Vec::new();
        let mut roots = 0usize;

        while !cur.at_end() {
            if cur.eat("<!--") {
                cur.take_until("-->")?;
                continue;
            }
            if cur.eat("<?") {
                cur.take_until("?>")?;
                continue;
            }
            if cur.eat("<![CDATA[") {
                let text = cur.take_until("]]>")?;
                if text.trim().is_empty() {
                    continue;
                }
                if open.is_empty() {
                    return Err(XmlError::TextOutsideRoot);
                }
                tokens.push(Token::Text(text.to_string()));
                continue;
            }
            if cur.eat("</") {
                let name = cur.name()?;
                cur.skip_ws();
                cur.expect('>')?;
                match open.pop() {
                    Some(expected) if expected == name => tokens.push(Token::End(name)),
                    Some(expected) => return Err(XmlError::MismatchedEnd { expected, found: name }),
                    None => return Err(XmlError::StrayEnd(name)),
                }
                continue;
            }
            if cur.eat("<") {
                let name = cur.name()?;
                let mut attrs = Vec::new();
                let self_closing = loop {
                    let had_ws = cur.skip_ws();
                    match cur.peek() {
                        Some('>') => {
                            cur.bump();
                            break false;
                        }
                        Some('/') => {
                            cur.bump();
                            cur.expect('>')?;
                            break true;
                        }
                        Some(_) if had_ws => {
                            let key = cur.name()?;
                            cur.skip_ws();
                            cur.expect('=')?;
                            cur.skip_ws();
                            let value = decode_entities(cur.quoted()?)?;
                            attrs.push((key, value));
                        }
                        Some(c) => return Err(XmlError::UnexpectedChar(c)),
                        None => return Err(XmlError::UnexpectedEof),
                    }
                };

                if open.is_empty() {
                    roots += 1;
                    if roots > 1 {
                        return Err(XmlError::MultipleRoots);
                    }
                }
                if !self_closing {
                    open.push(name.clone());
                }
                tokens.push(Token::Start { name, attrs, self_closing });
                continue;
            }

            let text = decode_entities(cur.take_text())?;
            if text.trim().is_empty() {
                continue;
            }
            if open.is_empty() {
                return Err(XmlError::TextOutsideRoot);
            }
            tokens.push(Token::Text(text));
        }

        if let Some(name) = open.pop() {
            return Err(XmlError::Unclosed(name));
        }
        if roots == 0 {
            return Err(XmlError::NoRoot);
        }
        Ok(tokens)
    }

}
