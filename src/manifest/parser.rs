/// 清单文本解析
/// 按行解析 pip 风格的依赖清单，坏行不会中断解析，而是记为 `Entry::Invalid`
use super::requirement::parse_requirement;
use super::{Entry, IncludeDirective, IncludeKind, Manifest, ManifestLine, Section};
use crate::constants::{FLAG_OPTIONS, HASH_ALGORITHMS, REQUIREMENT_OPTIONS, VALUE_OPTIONS};
use crate::error::{Error, ManifestError, Result};
use log::{debug, trace};
use std::path::{Path, PathBuf};

/// 读取并解析清单文件
pub fn parse_manifest_file(path: impl AsRef<Path>) -> Result<Manifest> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(Error::Manifest(ManifestError::NotFound {
            path: path.to_path_buf(),
        }));
    }

    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Manifest(ManifestError::ReadFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    })?;

    let manifest = parse_manifest_str(&content, path);
    debug!(
        "Parsed {}: {} line(s), {} section(s)",
        path.display(),
        manifest.lines.len(),
        manifest.sections.len()
    );
    Ok(manifest)
}

/// 解析清单文本
pub fn parse_manifest_str(content: &str, path: impl Into<PathBuf>) -> Manifest {
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);
    let mut lines = Vec::new();
    let mut sections: Vec<Section> = Vec::new();
    // 文件开头视同前面有一个空行
    let mut after_blank = true;

    for (number, raw) in logical_lines(content) {
        let entry = parse_line(&raw);

        if let Entry::Comment(text) = &entry
            && after_blank
            && !text.is_empty()
        {
            trace!("Section '{text}' opens at line {number}");
            sections.push(Section {
                title: text.clone(),
                start_line: number,
            });
        }
        after_blank = matches!(entry, Entry::Blank);

        let section = sections.len().checked_sub(1);
        lines.push(ManifestLine {
            number,
            raw,
            entry,
            section,
        });
    }

    Manifest {
        path: path.into(),
        lines,
        sections,
    }
}

/// 拼接以 `\` 结尾的续行，返回 (起始行号, 逻辑行)
fn logical_lines(content: &str) -> Vec<(usize, String)> {
    let mut out = Vec::new();
    let mut pending: Option<(usize, String)> = None;

    for (idx, line) in content.lines().enumerate() {
        let number = idx + 1;
        let trimmed_end = line.trim_end();
        let (text, continues) = match trimmed_end.strip_suffix('\\') {
            Some(head) if !is_comment_only(line) => (head, true),
            _ => (line, false),
        };

        let (start, mut buf) = pending.take().unwrap_or((number, String::new()));
        buf.push_str(text);

        if continues {
            pending = Some((start, buf));
        } else {
            out.push((start, buf));
        }
    }

    // 文件末尾的续行
    if let Some(last) = pending {
        out.push(last);
    }
    out
}

fn is_comment_only(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// 去掉行内注释：`#` 位于行首或前面是空白
fn strip_comment(line: &str) -> &str {
    let bytes = line.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b == b'#' && (i == 0 || bytes[i - 1].is_ascii_whitespace()) {
            return &line[..i];
        }
    }
    line
}

fn parse_line(raw: &str) -> Entry {
    if raw.trim().is_empty() {
        return Entry::Blank;
    }

    let content = strip_comment(raw).trim();
    if content.is_empty() {
        let text = raw.trim_start().trim_start_matches('#').trim();
        return Entry::Comment(text.to_string());
    }

    if content.starts_with('-') {
        return parse_option(content);
    }

    let (text, options) = match split_requirement_options(content) {
        Ok(split) => split,
        Err(reason) => return Entry::Invalid { reason },
    };

    match parse_requirement(text) {
        Ok(mut req) => {
            for (name, value) in options {
                if name == "--hash" {
                    req.hashes.push(value);
                } else {
                    req.options.push((name, value));
                }
            }
            Entry::Requirement(req)
        }
        Err(reason) => Entry::Invalid { reason },
    }
}

/// 拆出依赖后面的逐条选项，返回 (依赖文本, [(选项名, 值)])
///
/// 选项从第一个前面是空白的 `--` 开始，支持 `--hash=x` 与 `--hash x` 两种写法
fn split_requirement_options(
    content: &str,
) -> std::result::Result<(&str, Vec<(String, String)>), String> {
    let Some(start) = content
        .match_indices("--")
        .map(|(i, _)| i)
        .find(|&i| content[..i].ends_with(char::is_whitespace))
    else {
        return Ok((content, Vec::new()));
    };

    let mut options = Vec::new();
    let mut tokens = content[start..].split_whitespace();
    while let Some(token) = tokens.next() {
        let (name, inline) = match token.split_once('=') {
            Some((name, value)) => (name, Some(value)),
            None => (token, None),
        };
        if !REQUIREMENT_OPTIONS.contains(&name) {
            return Err(format!("unknown requirement option '{name}'"));
        }
        let value = match inline {
            Some(value) => value,
            None => tokens.next().unwrap_or_default(),
        };
        if value.is_empty() {
            return Err(format!("option '{name}' requires a value"));
        }
        if name == "--hash" {
            validate_hash(value)?;
        }
        options.push((name.to_string(), value.to_string()));
    }

    Ok((content[..start].trim_end(), options))
}

/// `<algo>:<十六进制摘要>`
fn validate_hash(value: &str) -> std::result::Result<(), String> {
    match value.split_once(':') {
        Some((algo, digest))
            if HASH_ALGORITHMS.contains(&algo)
                && !digest.is_empty()
                && digest.chars().all(|c| c.is_ascii_hexdigit()) =>
        {
            Ok(())
        }
        _ => Err(format!(
            "invalid hash '{value}', expected <{}>:<hex digest>",
            HASH_ALGORITHMS.join("|")
        )),
    }
}

/// 拆分选项名与值，支持 `-r x`、`-rx`、`--requirement x`、`--requirement=x`
fn split_option(text: &str) -> (&str, &str) {
    if text.starts_with("--") {
        match text.find(|c: char| c == '=' || c.is_whitespace()) {
            Some(pos) => (&text[..pos], text[pos + 1..].trim()),
            None => (text, ""),
        }
    } else {
        let split = text.char_indices().nth(2).map_or(text.len(), |(i, _)| i);
        (&text[..split], text[split..].trim())
    }
}

fn parse_option(text: &str) -> Entry {
    let (name, value) = split_option(text);

    let include_kind = match name {
        "-r" | "--requirement" => Some(IncludeKind::Requirement),
        "-c" | "--constraint" => Some(IncludeKind::Constraint),
        _ => None,
    };
    if let Some(kind) = include_kind {
        if value.is_empty() {
            return Entry::Invalid {
                reason: format!("option '{name}' requires a file path"),
            };
        }
        return Entry::Include(IncludeDirective {
            kind,
            target: value.to_string(),
        });
    }

    if let Some((_, long)) = VALUE_OPTIONS
        .iter()
        .find(|(short, long)| (!short.is_empty() && *short == name) || *long == name)
    {
        if value.is_empty() {
            return Entry::Invalid {
                reason: format!("option '{name}' requires a value"),
            };
        }
        return Entry::Option {
            name: (*long).to_string(),
            value: Some(value.to_string()),
        };
    }

    if FLAG_OPTIONS.contains(&name) {
        if !value.is_empty() {
            return Entry::Invalid {
                reason: format!("option '{name}' does not take a value"),
            };
        }
        return Entry::Option {
            name: name.to_string(),
            value: None,
        };
    }

    Entry::Invalid {
        reason: format!("unknown option '{name}'"),
    }
}
