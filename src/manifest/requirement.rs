//! 单条依赖声明（PEP 508 子集）的解析
//!
//! 支持的形式：
//! - `name`
//! - `name[extra1,extra2]`
//! - `name==1.2.3`、`name>=1.0,<2`、`name (>=1.0)`
//! - `name @ https://example.org/pkg.whl`
//! - 以上任一形式后跟 `; <environment marker>`
use serde::Serialize;
use std::fmt;

/// 版本比较运算符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Operator {
    /// `===`
    ArbitraryEqual,
    /// `~=`
    Compatible,
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<=`
    LessEqual,
    /// `>=`
    GreaterEqual,
    /// `<`
    Less,
    /// `>`
    Greater,
}

impl Operator {
    /// 按最长匹配排列，`===` 必须排在 `==` 之前
    const ALL: [(&'static str, Operator); 8] = [
        ("===", Operator::ArbitraryEqual),
        ("~=", Operator::Compatible),
        ("==", Operator::Equal),
        ("!=", Operator::NotEqual),
        ("<=", Operator::LessEqual),
        (">=", Operator::GreaterEqual),
        ("<", Operator::Less),
        (">", Operator::Greater),
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::ArbitraryEqual => "===",
            Operator::Compatible => "~=",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::LessEqual => "<=",
            Operator::GreaterEqual => ">=",
            Operator::Less => "<",
            Operator::Greater => ">",
        }
    }

    /// 从文本开头识别运算符，返回运算符与剩余部分
    fn split_prefix(text: &str) -> Option<(Operator, &str)> {
        Self::ALL
            .iter()
            .find(|(sym, _)| text.starts_with(sym))
            .map(|(sym, op)| (*op, &text[sym.len()..]))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 单个版本约束，如 `>=1.21`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionSpecifier {
    pub op: Operator,
    pub version: String,
}

impl fmt::Display for VersionSpecifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.op, self.version)
    }
}

/// 一条已解析的依赖声明
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Requirement {
    /// 原始包名（保留大小写）
    pub name: String,
    /// PEP 503 规范化后的包名，用于重复检测
    pub normalized_name: String,
    pub extras: Vec<String>,
    pub specifiers: Vec<VersionSpecifier>,
    pub marker: Option<String>,
    /// `name @ url` 形式的直接引用
    pub url: Option<String>,
    /// 行尾的 `--hash=<algo>:<digest>`
    pub hashes: Vec<String>,
    /// 其他逐条选项（`--global-option`、`--config-settings`），按出现顺序
    pub options: Vec<(String, String)>,
}

impl Requirement {
    /// 是否精确锁定到单一版本（`==x.y.z` 或 `===x`，且不含通配符）
    pub fn is_pinned(&self) -> bool {
        self.pinned_version().is_some()
    }

    /// 锁定的版本号
    pub fn pinned_version(&self) -> Option<&str> {
        match self.specifiers.as_slice() {
            [spec]
                if matches!(spec.op, Operator::Equal | Operator::ArbitraryEqual)
                    && !spec.version.ends_with(".*") =>
            {
                Some(&spec.version)
            }
            _ => None,
        }
    }

    /// 用于重复检测的环境标记键：去掉空白，单引号统一为双引号
    pub fn marker_key(&self) -> Option<String> {
        self.marker.as_ref().map(|m| {
            m.chars()
                .filter(|c| !c.is_whitespace())
                .map(|c| if c == '\'' { '"' } else { c })
                .collect()
        })
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if !self.extras.is_empty() {
            write!(f, "[{}]", self.extras.join(","))?;
        }
        if let Some(url) = &self.url {
            write!(f, " @ {url}")?;
        }
        let specs: Vec<String> = self.specifiers.iter().map(ToString::to_string).collect();
        f.write_str(&specs.join(","))?;
        if let Some(marker) = &self.marker {
            write!(f, "; {marker}")?;
        }
        Ok(())
    }
}

/// PEP 503 包名规范化：小写，连续的 `-` `_` `.` 合并为一个 `-`
pub fn normalize_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.chars() {
        if matches!(c, '-' | '_' | '.') {
            if !in_separator {
                out.push('-');
                in_separator = true;
            }
        } else {
            out.push(c.to_ascii_lowercase());
            in_separator = false;
        }
    }
    out
}

/// 包名或 extra 名是否合法：字母数字开头结尾，中间允许 `.` `_` `-`
pub fn is_valid_name(name: &str) -> bool {
    let bytes = name.as_bytes();
    match (bytes.first(), bytes.last()) {
        (Some(first), Some(last)) => {
            first.is_ascii_alphanumeric()
                && last.is_ascii_alphanumeric()
                && bytes
                    .iter()
                    .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
        }
        _ => false,
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-')
}

/// 解析一条依赖声明，失败时返回可读的原因
pub fn parse_requirement(text: &str) -> Result<Requirement, String> {
    let (body, marker) = match text.split_once(';') {
        Some((body, marker)) => {
            let marker = marker.trim();
            if marker.is_empty() {
                return Err("empty environment marker after ';'".to_string());
            }
            (body.trim(), Some(marker.to_string()))
        }
        None => (text.trim(), None),
    };

    if body.is_empty() {
        return Err("missing package name".to_string());
    }

    let name_end = body.find(|c: char| !is_name_char(c)).unwrap_or(body.len());
    let name = &body[..name_end];
    if name.is_empty() {
        return Err(format!("expected a package name, found '{body}'"));
    }
    if !is_valid_name(name) {
        return Err(format!("invalid package name '{name}'"));
    }

    let mut rest = body[name_end..].trim_start();

    let mut extras = Vec::new();
    if let Some(after) = rest.strip_prefix('[') {
        let close = after
            .find(']')
            .ok_or_else(|| format!("unclosed extras list in '{body}'"))?;
        for extra in after[..close].split(',') {
            let extra = extra.trim();
            if !is_valid_name(extra) {
                return Err(format!("invalid extra name '{extra}'"));
            }
            extras.push(extra.to_string());
        }
        rest = after[close + 1..].trim_start();
    }

    let mut url = None;
    let mut specifiers = Vec::new();
    if let Some(target) = rest.strip_prefix('@') {
        let target = target.trim();
        if target.is_empty() {
            return Err(format!("missing URL after '@' for '{name}'"));
        }
        if target.contains(char::is_whitespace) {
            return Err(format!("invalid URL '{target}'"));
        }
        url = Some(target.to_string());
    } else if !rest.is_empty() {
        let specs = match rest.strip_prefix('(') {
            Some(inner) => inner
                .strip_suffix(')')
                .ok_or_else(|| format!("unclosed '(' in '{body}'"))?,
            None => rest,
        };
        for part in specs.split(',') {
            specifiers.push(parse_specifier(part.trim())?);
        }
    }

    Ok(Requirement {
        name: name.to_string(),
        normalized_name: normalize_name(name),
        extras,
        specifiers,
        marker,
        url,
        hashes: Vec::new(),
        options: Vec::new(),
    })
}

fn parse_specifier(text: &str) -> Result<VersionSpecifier, String> {
    if text.is_empty() {
        return Err("empty version specifier".to_string());
    }
    let (op, version) = Operator::split_prefix(text)
        .ok_or_else(|| format!("expected a comparison operator in '{text}'"))?;
    let version = version.trim();
    validate_version(op, version)?;
    Ok(VersionSpecifier {
        op,
        version: version.to_string(),
    })
}

fn validate_version(op: Operator, version: &str) -> Result<(), String> {
    if version.is_empty() {
        return Err(format!("missing version after '{op}'"));
    }

    // `===` 允许任意不含空白的字符串
    if op == Operator::ArbitraryEqual {
        return if version.contains(char::is_whitespace) {
            Err(format!("invalid version '{version}'"))
        } else {
            Ok(())
        };
    }

    if !version
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '*' | '+' | '!' | '_' | '-'))
    {
        return Err(format!("invalid version '{version}'"));
    }
    if !version.starts_with(|c: char| c.is_ascii_alphanumeric()) {
        return Err(format!("invalid version '{version}'"));
    }

    if version.contains('*') {
        let wildcard_ok = version.ends_with(".*") && version.matches('*').count() == 1;
        if !wildcard_ok {
            return Err(format!("misplaced wildcard in version '{version}'"));
        }
        if !matches!(op, Operator::Equal | Operator::NotEqual) {
            return Err(format!("wildcard versions are only allowed with == and != ('{op}{version}')"));
        }
    }

    if op == Operator::Compatible {
        let release = version
            .split(|c: char| !(c.is_ascii_digit() || c == '.'))
            .next()
            .unwrap_or_default();
        if release.split('.').filter(|s| !s.is_empty()).count() < 2 {
            return Err(format!("'~=' needs at least two release segments, got '{version}'"));
        }
    }

    Ok(())
}
