//! The tagged-text stream tokenizer backing `serialization::{read_model,
//! write_model}` (§4.7): turns the whole file into a `(tag, value)` token
//! stream up front, then `Tokenizer` hands them out one at a time.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    /// `<tag>` with no attributes, followed by nested structure.
    Open(String),
    /// `<tag attr="v" ...>` with attributes, followed by nested structure.
    OpenWithAttrs(String, String),
    /// `</tag>`.
    Close(String),
    /// `<tag>value</tag>` collapsed into one token.
    Scalar(String, String),
    /// `<tag k=v k2=v2/>` (e.g. `<stageSeparator idx=.. nwhyp=.. thresh=../>`).
    SelfClosing(String, String),
    /// `<tag ref="N"/>` (a tree node's child pointing at another node).
    SelfClosingRef(String, usize),
}

pub struct Tokenizer {
    tokens: Vec<Token>,
    pos: usize,
}

impl Tokenizer {
    pub fn new(text: &str) -> Self {
        Self { tokens: tokenize(text), pos: 0 }
    }

    pub fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    pub fn next(&mut self) -> Option<Token> {
        let t = self.tokens.get(self.pos).cloned();
        if t.is_some() {
            self.pos += 1;
        }
        t
    }
}

fn tokenize(text: &str) -> Vec<Token> {
    // Pass 1: split into (raw tag content, trailing text before the next tag).
    let mut raw: Vec<(String, String)> = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0usize;
    while i < bytes.len() {
        if bytes[i] == b'<' {
            let end = text[i..].find('>').map(|p| i + p).unwrap_or(text.len() - 1);
            let tag = text[i + 1..end].to_string();
            let next_start = end + 1;
            let next_open = text[next_start..].find('<').map(|p| next_start + p).unwrap_or(text.len());
            let trailing = text[next_start..next_open].to_string();
            raw.push((tag, trailing));
            i = next_open;
        } else {
            i += 1;
        }
    }

    // Pass 2: classify each raw tag, collapsing `<tag>text</tag>` pairs into
    // a single `Scalar` token.
    let mut out = Vec::with_capacity(raw.len());
    let mut idx = 0usize;
    while idx < raw.len() {
        let (tag, trailing) = &raw[idx];
        if let Some(stripped) = tag.strip_prefix('/') {
            out.push(Token::Close(stripped.to_string()));
            idx += 1;
            continue;
        }
        if let Some(stripped) = tag.strip_suffix('/') {
            let (name, attrs) = split_name_attrs(stripped);
            if let Some(v) = find_attr(&attrs, "ref") {
                out.push(Token::SelfClosingRef(name, v.parse().unwrap_or(0)));
            } else {
                out.push(Token::SelfClosing(name, attrs));
            }
            idx += 1;
            continue;
        }

        let (name, attrs) = split_name_attrs(tag);
        let text_here = trailing.trim();
        let next_is_matching_close = raw.get(idx + 1)
            .map(|(t, _)| t == &format!("/{name}"))
            .unwrap_or(false);

        if !text_here.is_empty() && next_is_matching_close {
            out.push(Token::Scalar(name, text_here.to_string()));
            idx += 2; // consume this open and its matching close
            continue;
        }

        if attrs.is_empty() {
            out.push(Token::Open(name));
        } else {
            out.push(Token::OpenWithAttrs(name, attrs));
        }
        idx += 1;
    }

    out
}

fn split_name_attrs(tag: &str) -> (String, String) {
    match tag.find(char::is_whitespace) {
        Some(p) => (tag[..p].to_string(), tag[p + 1..].trim().to_string()),
        None => (tag.to_string(), String::new()),
    }
}

fn find_attr(attrs: &str, key: &str) -> Option<String> {
    for part in attrs.split_whitespace() {
        if let Some((k, v)) = part.split_once('=') {
            if k == key {
                return Some(v.trim_matches('"').to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_collapses() {
        let toks = tokenize("<alpha>1.5</alpha>");
        assert_eq!(toks, vec![Token::Scalar("alpha".into(), "1.5".into())]);
    }

    #[test]
    fn open_close_structural() {
        let toks = tokenize("<children>\n<child>\n</child>\n</children>");
        assert_eq!(toks, vec![
            Token::Open("children".into()),
            Token::Open("child".into()),
            Token::Close("child".into()),
            Token::Close("children".into()),
        ]);
    }

    #[test]
    fn self_closing_attrs() {
        let toks = tokenize("<stageSeparator idx=0 nwhyp=3 thresh=0.5/>");
        assert_eq!(toks, vec![Token::SelfClosing("stageSeparator".into(), "idx=0 nwhyp=3 thresh=0.5".into())]);
    }

    #[test]
    fn self_closing_ref() {
        let toks = tokenize("<left ref=\"4\"/>");
        assert_eq!(toks, vec![Token::SelfClosingRef("left".into(), 4)]);
    }
}
