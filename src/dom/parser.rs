//! Lenient HTML tokenizer and tree builder.
//!
//! Covers what real-world form pages need: implicit `<html>/<head>/<body>`,
//! void elements, raw-text elements (`script`, `style`, `textarea`, `title`),
//! character references, and the usual auto-closing rules (`p`, `li`,
//! `option`, table cells). It never fails; malformed markup is recovered
//! from the way browsers mostly do.

use std::collections::HashMap;

use crate::dom::node::{Attr, Document, NodeId, NodeKind};

// ============================================================================
// Tokenizer
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Doctype(String),
    StartTag {
        name: String,
        attrs: Vec<Attr>,
        self_closing: bool,
    },
    EndTag(String),
    Text(String),
    Comment(String),
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta",
    "param", "source", "track", "wbr",
];

/// Elements whose content is not parsed as markup.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Raw-text elements whose content still has character references decoded.
const ESCAPABLE_RAW_TEXT: &[&str] = &["textarea", "title"];

const HEAD_ELEMENTS: &[&str] = &["base", "link", "meta", "script", "style", "title"];

/// Start tags that implicitly close an open `<p>`.
const CLOSES_P: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "div", "dl", "fieldset",
    "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header",
    "hr", "main", "nav", "ol", "p", "pre", "section", "table", "ul",
];

const HEADINGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

pub fn is_raw_text_element(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.contains(&name)
}

struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Tokenizer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn skip_whitespace(&mut self) {
        while self.peek().is_some_and(|c| c.is_ascii_whitespace()) {
            self.bump();
        }
    }

    fn run(mut self) -> Vec<Token> {
        while self.pos < self.src.len() {
            let rest = self.rest();
            if rest.starts_with("<!--") {
                self.comment();
            } else if rest.starts_with("<!") || rest.starts_with("<?") {
                self.declaration();
            } else if rest.starts_with("</") && next_is_alpha(&rest[2..]) {
                self.end_tag();
            } else if rest.starts_with('<') && next_is_alpha(&rest[1..]) {
                self.start_tag();
            } else {
                self.text();
            }
        }
        self.tokens
    }

    fn comment(&mut self) {
        self.pos += 4;
        let rest = self.rest();
        let (body, consumed) = match rest.find("-->") {
            Some(end) => (&rest[..end], end + 3),
            None => (rest, rest.len()),
        };
        self.tokens.push(Token::Comment(body.to_string()));
        self.pos += consumed;
    }

    fn declaration(&mut self) {
        let rest = self.rest();
        let end = rest.find('>').map(|i| i + 1).unwrap_or(rest.len());
        let inner = rest[2..end].trim_end_matches('>').trim();
        let is_doctype = inner
            .get(..7)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("doctype"));
        if rest.starts_with("<!") && is_doctype {
            let name = inner.get(7..).unwrap_or("").trim();
            self.tokens.push(Token::Doctype(name.to_string()));
        }
        self.pos += end;
    }

    fn text(&mut self) {
        let start = self.pos;
        // Always consume at least one char so a stray '<' makes progress.
        self.bump();
        while let Some(c) = self.peek() {
            if c == '<' {
                let rest = self.rest();
                let next = &rest[1..];
                if next_is_alpha(next)
                    || next.starts_with('/')
                    || next.starts_with('!')
                    || next.starts_with('?')
                {
                    break;
                }
            }
            self.bump();
        }
        let raw = &self.src[start..self.pos];
        self.push_text(decode_entities(raw));
    }

    fn push_text(&mut self, text: String) {
        if text.is_empty() {
            return;
        }
        if let Some(Token::Text(prev)) = self.tokens.last_mut() {
            prev.push_str(&text);
        } else {
            self.tokens.push(Token::Text(text));
        }
    }

    fn read_name(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_whitespace() || c == '/' || c == '>' {
                break;
            }
            self.bump();
        }
        self.src[start..self.pos].to_ascii_lowercase()
    }

    fn end_tag(&mut self) {
        self.pos += 2;
        let name = self.read_name();
        match self.rest().find('>') {
            Some(i) => self.pos += i + 1,
            None => self.pos = self.src.len(),
        }
        self.tokens.push(Token::EndTag(name));
    }

    fn start_tag(&mut self) {
        self.pos += 1;
        let name = self.read_name();
        let mut attrs: Vec<Attr> = Vec::new();
        let mut self_closing = false;

        loop {
            self.skip_whitespace();
            match self.peek() {
                None => break,
                Some('>') => {
                    self.bump();
                    break;
                }
                Some('/') => {
                    self.bump();
                    if self.peek() == Some('>') {
                        self_closing = true;
                    }
                }
                Some(_) => {
                    let (attr_name, value) = self.attribute();
                    if attr_name.is_empty() {
                        // Unparseable byte inside a tag: drop it.
                        self.bump();
                        continue;
                    }
                    if !attrs.iter().any(|a| a.name == attr_name) {
                        attrs.push(Attr {
                            name: attr_name,
                            value,
                        });
                    }
                }
            }
        }

        self.tokens.push(Token::StartTag {
            name: name.clone(),
            attrs,
            self_closing,
        });

        if is_raw_text_element(&name) && !self_closing {
            self.raw_text(&name);
        }
    }

    fn attribute(&mut self) -> (String, String) {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if c.is_ascii_whitespace() || c == '/' || c == '>' || (c == '=' && self.pos > start) {
                break;
            }
            self.bump();
        }
        let name = self.src[start..self.pos].to_ascii_lowercase();

        self.skip_whitespace();
        if self.peek() != Some('=') {
            return (name, String::new());
        }
        self.bump();
        self.skip_whitespace();

        let value = match self.peek() {
            Some(q @ ('"' | '\'')) => {
                self.bump();
                let rest = self.rest();
                let end = rest.find(q).unwrap_or(rest.len());
                let raw = &rest[..end];
                self.pos += end;
                self.bump();
                raw
            }
            _ => {
                let begin = self.pos;
                while let Some(c) = self.peek() {
                    if c.is_ascii_whitespace() || c == '>' {
                        break;
                    }
                    self.bump();
                }
                &self.src[begin..self.pos]
            }
        };
        (name, decode_entities(value))
    }

    fn raw_text(&mut self, name: &str) {
        let rest = self.rest();
        let closing = format!("</{}", name);
        let end = find_ascii_case_insensitive(rest, &closing).unwrap_or(rest.len());
        let raw = &rest[..end];
        let text = if ESCAPABLE_RAW_TEXT.contains(&name) {
            decode_entities(raw)
        } else {
            raw.to_string()
        };
        // A newline right after <textarea> is not part of its value.
        let text = if name == "textarea" {
            text.strip_prefix('\n').map(str::to_string).unwrap_or(text)
        } else {
            text
        };
        if !text.is_empty() {
            self.tokens.push(Token::Text(text));
        }
        self.pos += end;
        if self.pos < self.src.len() {
            self.end_tag();
        } else {
            self.tokens.push(Token::EndTag(name.to_string()));
        }
    }
}

fn next_is_alpha(s: &str) -> bool {
    s.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let pat = needle.as_bytes();
    if pat.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - pat.len()).find(|&i| hay[i..i + pat.len()].eq_ignore_ascii_case(pat))
}

// ============================================================================
// Character references
// ============================================================================

const NAMED_ENTITIES: &[(&str, &str)] = &[
    ("amp", "&"),
    ("lt", "<"),
    ("gt", ">"),
    ("quot", "\""),
    ("apos", "'"),
    ("nbsp", "\u{a0}"),
    ("copy", "\u{a9}"),
    ("reg", "\u{ae}"),
    ("trade", "\u{2122}"),
    ("hellip", "\u{2026}"),
    ("mdash", "\u{2014}"),
    ("ndash", "\u{2013}"),
    ("laquo", "\u{ab}"),
    ("raquo", "\u{bb}"),
    ("lsquo", "\u{2018}"),
    ("rsquo", "\u{2019}"),
    ("ldquo", "\u{201c}"),
    ("rdquo", "\u{201d}"),
    ("bull", "\u{2022}"),
    ("middot", "\u{b7}"),
    ("euro", "\u{20ac}"),
    ("pound", "\u{a3}"),
    ("yen", "\u{a5}"),
    ("times", "\u{d7}"),
    ("deg", "\u{b0}"),
];

/// Decode `&name;`, `&#NN;` and `&#xHH;` references. Unknown references are
/// kept verbatim.
pub fn decode_entities(raw: &str) -> String {
    if !raw.contains('&') {
        return raw.to_string();
    }
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        match decode_reference(rest) {
            Some((decoded, consumed)) => {
                out.push_str(&decoded);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// `s` starts with '&'. Returns the decoded text and bytes consumed.
fn decode_reference(s: &str) -> Option<(String, usize)> {
    let body = &s[1..];
    if let Some(num) = body.strip_prefix('#') {
        let (digits, radix, prefix) = match num.strip_prefix(['x', 'X']) {
            Some(hex) => (hex, 16, 2),
            None => (num, 10, 1),
        };
        let len = digits
            .char_indices()
            .find(|(_, c)| !c.is_digit(radix))
            .map(|(i, _)| i)
            .unwrap_or(digits.len());
        if len == 0 {
            return None;
        }
        let value = u32::from_str_radix(&digits[..len], radix).ok()?;
        let ch = char::from_u32(value).unwrap_or('\u{fffd}');
        let semi = usize::from(digits[len..].starts_with(';'));
        return Some((ch.to_string(), 1 + prefix + len + semi));
    }

    let len = body
        .char_indices()
        .find(|(_, c)| !c.is_ascii_alphanumeric())
        .map(|(i, _)| i)
        .unwrap_or(body.len());
    if !body[len..].starts_with(';') {
        return None;
    }
    let name = &body[..len];
    NAMED_ENTITIES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, v)| (v.to_string(), 1 + len + 1))
}

// ============================================================================
// Tree builder
// ============================================================================

struct TreeBuilder {
    doc: Document,
    html: Option<NodeId>,
    head: Option<NodeId>,
    body: Option<NodeId>,
    /// Open elements below `<html>`, innermost last.
    stack: Vec<NodeId>,
    /// Tag name → number of open elements with that name.
    open_counts: HashMap<String, usize>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            doc: Document::new(),
            html: None,
            head: None,
            body: None,
            stack: Vec::new(),
            open_counts: HashMap::new(),
        }
    }

    fn ensure_html(&mut self) -> NodeId {
        if let Some(html) = self.html {
            return html;
        }
        let root = self.doc.root();
        let html = self.doc.append_element(root, "html", Vec::new());
        self.html = Some(html);
        html
    }

    fn ensure_head(&mut self) -> NodeId {
        if let Some(head) = self.head {
            return head;
        }
        let html = self.ensure_html();
        let head = self.doc.append_element(html, "head", Vec::new());
        self.head = Some(head);
        head
    }

    fn ensure_body(&mut self) -> NodeId {
        if let Some(body) = self.body {
            return body;
        }
        self.ensure_head();
        let html = self.ensure_html();
        let body = self.doc.append_element(html, "body", Vec::new());
        self.body = Some(body);
        self.stack.clear();
        self.open_counts.clear();
        self.push_open(body);
        body
    }

    fn current(&mut self) -> NodeId {
        match self.stack.last() {
            Some(&top) => top,
            None => self.ensure_body(),
        }
    }

    fn current_is(&self, name: &str) -> bool {
        self.stack
            .last()
            .is_some_and(|&top| self.doc.is_element(top, name))
    }

    fn push_open(&mut self, id: NodeId) {
        if let Some(name) = self.doc.tag_name(id) {
            *self.open_counts.entry(name.to_string()).or_default() += 1;
        }
        self.stack.push(id);
    }

    fn pop_open(&mut self) -> Option<NodeId> {
        let id = self.stack.pop()?;
        if let Some(count) = self
            .doc
            .tag_name(id)
            .and_then(|name| self.open_counts.get_mut(name))
        {
            *count = count.saturating_sub(1);
        }
        Some(id)
    }

    fn truncate_open(&mut self, len: usize) {
        while self.stack.len() > len {
            self.pop_open();
        }
    }

    fn is_open(&self, name: &str) -> bool {
        self.open_counts.get(name).is_some_and(|&n| n > 0)
    }

    fn open_index(&self, name: &str) -> Option<usize> {
        if !self.is_open(name) {
            return None;
        }
        self.stack
            .iter()
            .rposition(|&id| self.doc.is_element(id, name))
    }

    /// Pop up to and including the innermost open `name`, never past body.
    fn close(&mut self, name: &str) -> bool {
        match self.open_index(name) {
            Some(idx) if Some(self.stack[idx]) != self.body => {
                self.truncate_open(idx);
                true
            }
            _ => false,
        }
    }

    /// Close an open `name` only if no element from `boundary` is nested
    /// inside it.
    fn close_within(&mut self, name: &str, boundary: &[&str]) {
        if let Some(idx) = self.open_index(name) {
            let crossed = self.stack[idx + 1..]
                .iter()
                .any(|&id| boundary.iter().any(|b| self.doc.is_element(id, b)));
            if !crossed {
                self.truncate_open(idx);
            }
        }
    }

    fn merge_attrs(&mut self, id: NodeId, attrs: Vec<Attr>) {
        for attr in attrs {
            if !self.doc.has_attr(id, &attr.name) {
                self.doc.set_attr(id, &attr.name, &attr.value);
            }
        }
    }

    fn in_head_phase(&self) -> bool {
        self.body.is_none()
    }

    fn start_tag(&mut self, name: String, attrs: Vec<Attr>, self_closing: bool) {
        match name.as_str() {
            "html" => {
                let html = self.ensure_html();
                self.merge_attrs(html, attrs);
                return;
            }
            "head" => {
                self.ensure_head();
                return;
            }
            "body" => {
                let body = self.ensure_body();
                self.merge_attrs(body, attrs);
                return;
            }
            _ => {}
        }

        if self.in_head_phase() && HEAD_ELEMENTS.contains(&name.as_str()) {
            let head = self.ensure_head();
            let id = self.doc.append_element(head, &name, attrs);
            if !is_void_element(&name) && !self_closing {
                // Raw-text head elements are closed by their own end token.
                self.push_open(id);
            }
            return;
        }

        self.ensure_body();

        if self.open_index("select").is_some() {
            match name.as_str() {
                "option" | "optgroup" | "hr" => {}
                "select" => {
                    self.close("select");
                    return;
                }
                "input" | "textarea" | "keygen" => {
                    self.close("select");
                }
                _ => return,
            }
        }

        self.apply_implicit_closes(&name);

        let parent = self.current();
        let id = self.doc.append_element(parent, &name, attrs);
        if !is_void_element(&name) && !self_closing {
            self.push_open(id);
        }
    }

    fn apply_implicit_closes(&mut self, name: &str) {
        if CLOSES_P.contains(&name) {
            self.close_within("p", &["button", "td", "th", "table"]);
        }
        match name {
            "li" => self.close_within("li", &["ul", "ol"]),
            "dt" | "dd" => {
                self.close_within("dt", &["dl"]);
                self.close_within("dd", &["dl"]);
            }
            "option" => {
                if self.current_is("option") {
                    self.close("option");
                }
            }
            "optgroup" => {
                if self.current_is("option") {
                    self.close("option");
                }
                if self.current_is("optgroup") {
                    self.close("optgroup");
                }
            }
            "tr" => self.close_within("tr", &["table"]),
            "td" | "th" => {
                self.close_within("td", &["tr", "table"]);
                self.close_within("th", &["tr", "table"]);
            }
            _ if HEADINGS.contains(&name) => {
                if self
                    .stack
                    .last()
                    .is_some_and(|&top| HEADINGS.iter().any(|h| self.doc.is_element(top, h)))
                {
                    self.pop_open();
                }
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, name: &str) {
        match name {
            "html" | "body" => {}
            "head" => {
                if let Some(head) = self.head {
                    self.stack.retain(|&id| id != head);
                }
            }
            _ if HEADINGS.contains(&name) => {
                // Any heading end tag closes the open heading.
                if !HEADINGS.iter().any(|h| self.is_open(h)) {
                    return;
                }
                if let Some(idx) = self
                    .stack
                    .iter()
                    .rposition(|&id| HEADINGS.iter().any(|h| self.doc.is_element(id, h)))
                {
                    self.truncate_open(idx);
                }
            }
            _ => {
                self.close(name);
            }
        }
    }

    fn text(&mut self, text: String) {
        let in_raw_head = self.in_head_phase() && !self.stack.is_empty();
        if !in_raw_head && self.body.is_none() {
            if text.trim().is_empty() {
                return;
            }
            self.ensure_body();
        }
        let parent = match self.stack.last() {
            Some(&top) => top,
            None => self.ensure_body(),
        };
        self.doc.append_text(parent, &text);
    }

    fn comment(&mut self, text: String) {
        let parent = match self.stack.last() {
            Some(&top) => top,
            None => self.html.unwrap_or(self.doc.root()),
        };
        self.doc.append(parent, NodeKind::Comment(text));
    }

    fn finish(mut self) -> Document {
        self.ensure_body();
        self.doc
    }
}

/// Parse an HTML document. Missing `<html>`, `<head>` and `<body>` are
/// synthesized so every document has a body.
pub fn parse_html(html: &str) -> Document {
    let tokens = Tokenizer::new(html).run();
    let mut builder = TreeBuilder::new();

    for token in tokens {
        match token {
            Token::Doctype(name) => {
                if builder.html.is_none() {
                    let root = builder.doc.root();
                    builder.doc.append(root, NodeKind::Doctype(name));
                }
            }
            Token::StartTag {
                name,
                attrs,
                self_closing,
            } => builder.start_tag(name, attrs, self_closing),
            Token::EndTag(name) => builder.end_tag(&name),
            Token::Text(text) => builder.text(text),
            Token::Comment(text) => builder.comment(text),
        }
    }

    builder.finish()
}
