use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use tracing::warn;

use crate::model::StyleTable;

pub const DEFAULT_OPEN_MARKER: &str = "StyleSheet.create({";

/// `start..end` runs from the key token to its closing brace; `entry_end`
/// also covers anything trailing the value (`} as ViewStyle`), up to but not
/// including the separating comma.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySpan {
    pub name: String,
    pub start: usize,
    pub end: usize,
    pub entry_end: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleLiteral {
    pub start: usize,
    /// Past the closing `})`, or the end of input when unterminated.
    pub end: usize,
    pub keys: Vec<KeySpan>,
    pub terminated: bool,
}

impl StyleLiteral {
    pub fn key(&self, name: &str) -> Option<&KeySpan> {
        self.keys.iter().find(|k| k.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct Extraction {
    pub table: Option<StyleTable>,
    pub residual: String,
}

pub fn extract(path: &Path, text: &str, open_marker: &str) -> Extraction {
    let Some(lit) = find_literal(text, open_marker) else {
        return Extraction {
            table: None,
            residual: text.to_string(),
        };
    };

    if !lit.terminated {
        warn!("style literal in {} is not terminated; keys may be incomplete", path.display());
    } else if text[lit.end..].contains(open_marker) {
        warn!("{} declares more than one style literal; only the first is analyzed", path.display());
    }

    let mut keys: Vec<String> = Vec::with_capacity(lit.keys.len());
    for k in &lit.keys {
        if !keys.contains(&k.name) {
            keys.push(k.name.clone());
        }
    }

    let residual = format!("{}{}", &text[..lit.start], &text[lit.end..]);
    Extraction {
        table: Some(StyleTable {
            declaring_file: path.to_path_buf(),
            keys,
            local_binding: local_binding(&text[..lit.start]),
        }),
        residual,
    }
}

#[derive(Debug)]
enum Entry {
    Key,
    Name(String, usize),
    Value(String, usize),
    Other,
}

/// Scans the first style literal in `text`. `open_marker` must end with `{`.
pub fn find_literal(text: &str, open_marker: &str) -> Option<StyleLiteral> {
    let start = text.find(open_marker)?;
    let bytes = text.as_bytes();
    let mut i = start + open_marker.len();
    let mut depth = 1usize;
    let mut entry = Entry::Key;
    let mut open_key: Option<(String, usize)> = None;
    let mut trailing: Option<usize> = None;
    let mut keys: Vec<KeySpan> = Vec::new();

    while i < bytes.len() {
        let c = bytes[i];
        match c {
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                i = skip_line_comment(bytes, i);
                continue;
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = skip_block_comment(bytes, i);
                continue;
            }
            b'\'' | b'"' => {
                let end = skip_string(bytes, i);
                if depth == 1 {
                    entry = match entry {
                        Entry::Key => {
                            let close = if end > i + 1 && bytes[end - 1] == c { end - 1 } else { end };
                            Entry::Name(text[i + 1..close].to_string(), i)
                        }
                        _ => Entry::Other,
                    };
                }
                i = end;
                continue;
            }
            b'`' => {
                i = skip_template(bytes, i);
                if depth == 1 {
                    entry = Entry::Other;
                }
                continue;
            }
            b'{' => {
                if depth == 1 {
                    if let Entry::Value(name, at) = std::mem::replace(&mut entry, Entry::Other) {
                        open_key = Some((name, at));
                    }
                }
                depth += 1;
            }
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    if let Some(k) = trailing.take() {
                        keys[k].entry_end = trim_back(bytes, i);
                    }
                    return Some(StyleLiteral {
                        start,
                        end: skip_close_suffix(bytes, i + 1),
                        keys,
                        terminated: true,
                    });
                }
                if depth == 1 {
                    if let Some((name, at)) = open_key.take() {
                        trailing = Some(keys.len());
                        keys.push(KeySpan {
                            name,
                            start: at,
                            end: i + 1,
                            entry_end: i + 1,
                        });
                    }
                }
            }
            _ if depth > 1 => {}
            b',' => {
                if let Some(k) = trailing.take() {
                    keys[k].entry_end = trim_back(bytes, i);
                }
                entry = Entry::Key;
            }
            b':' => {
                entry = match entry {
                    Entry::Name(name, at) => Entry::Value(name, at),
                    _ => Entry::Other,
                };
            }
            _ if c.is_ascii_whitespace() => {}
            _ if is_ident_start(c) => {
                let end = skip_ident(bytes, i);
                entry = match entry {
                    Entry::Key => Entry::Name(text[i..end].to_string(), i),
                    _ => Entry::Other,
                };
                i = end;
                continue;
            }
            _ => entry = Entry::Other,
        }
        i += 1;
    }

    Some(StyleLiteral {
        start,
        end: text.len(),
        keys,
        terminated: false,
    })
}

fn local_binding(prefix: &str) -> Option<String> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| {
        Regex::new(r"(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*(?::[^=]*)?=\s*$").expect("regex")
    });
    let line = prefix.rsplit('\n').next().unwrap_or(prefix);
    re.captures(line).map(|c| c[1].to_string())
}

fn is_ident_start(c: u8) -> bool {
    c.is_ascii_alphabetic() || c == b'_' || c == b'$'
}

fn skip_ident(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_' || bytes[i] == b'$') {
        i += 1;
    }
    i
}

fn skip_line_comment(bytes: &[u8], i: usize) -> usize {
    bytes[i..]
        .iter()
        .position(|&b| b == b'\n')
        .map_or(bytes.len(), |p| i + p)
}

fn skip_block_comment(bytes: &[u8], i: usize) -> usize {
    bytes[i + 2..]
        .windows(2)
        .position(|w| w == b"*/")
        .map_or(bytes.len(), |p| i + 2 + p + 2)
}

fn trim_back(bytes: &[u8], mut i: usize) -> usize {
    while i > 0 && bytes[i - 1].is_ascii_whitespace() {
        i -= 1;
    }
    i
}

fn skip_string(bytes: &[u8], i: usize) -> usize {
    let quote = bytes[i];
    let mut j = i + 1;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => j += 2,
            b'\n' => return j,
            b if b == quote => return j + 1,
            _ => j += 1,
        }
    }
    bytes.len()
}

fn skip_template(bytes: &[u8], i: usize) -> usize {
    let mut j = i + 1;
    let mut interp = 0usize;
    while j < bytes.len() {
        match bytes[j] {
            b'\\' => {
                j += 2;
                continue;
            }
            b'$' if interp == 0 && bytes.get(j + 1) == Some(&b'{') => {
                interp = 1;
                j += 2;
                continue;
            }
            b'{' if interp > 0 => interp += 1,
            b'}' if interp > 0 => interp -= 1,
            b'`' if interp == 0 => return j + 1,
            _ => {}
        }
        j += 1;
    }
    bytes.len()
}

/// Skips `)` and `;` (with surrounding spaces) after the literal's closing brace.
fn skip_close_suffix(bytes: &[u8], mut i: usize) -> usize {
    let skip_blank = |mut j: usize| {
        while j < bytes.len() && (bytes[j] == b' ' || bytes[j] == b'\t') {
            j += 1;
        }
        j
    };
    let j = skip_blank(i);
    if bytes.get(j) == Some(&b')') {
        i = j + 1;
        let k = skip_blank(i);
        if bytes.get(k) == Some(&b';') {
            i = k + 1;
        }
    }
    i
}
