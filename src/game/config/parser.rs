#[derive(Debug, Clone, PartialEq)]
pub enum ConfigToken {
    String(String),
    Float(f32),
    Number(i32),
}

impl From<ConfigToken> for String {
    fn from(value: ConfigToken) -> Self {
        match value {
            ConfigToken::String(s) => s,
            ConfigToken::Float(value) => value.to_string(),
            ConfigToken::Number(value) => value.to_string(),
        }
    }
}

impl From<ConfigToken> for i32 {
    fn from(value: ConfigToken) -> Self {
        match value {
            ConfigToken::Number(value) => value,
            _ => Default::default(),
        }
    }
}

impl From<ConfigToken> for f32 {
    fn from(value: ConfigToken) -> Self {
        match value {
            ConfigToken::Float(value) => value,
            // Whole numbers are written without a decimal point.
            ConfigToken::Number(value) => value as f32,
            _ => Default::default(),
        }
    }
}

impl From<ConfigToken> for bool {
    fn from(value: ConfigToken) -> Self {
        match value {
            ConfigToken::String(s) => s.eq_ignore_ascii_case("true"),
            ConfigToken::Number(value) => value != 0,
            ConfigToken::Float(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigLine {
    pub key: String,
    pub params: Vec<ConfigToken>,
    /// 1 based line number in the source, for diagnostics.
    pub line_number: usize,
}

impl ConfigLine {
    pub fn params(&self) -> &[ConfigToken] {
        &self.params
    }

    pub fn param<T: From<ConfigToken> + Default>(&self, index: usize) -> T {
        self.params
            .get(index)
            .cloned()
            .map(T::from)
            .unwrap_or_default()
    }

    pub fn maybe_param<T: From<ConfigToken>>(&self, index: usize) -> Option<T> {
        self.params.get(index).map(|t| T::from(t.clone()))
    }

    pub fn string(&self, index: usize) -> String {
        self.param::<String>(index)
    }
}

fn parse_string(chars: &mut std::iter::Peekable<std::str::Chars>) -> Option<String> {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next(); // Skip leading whitespace
    }

    let mut result = String::new();

    match chars.peek()? {
        '"' => {
            chars.next(); // Skip opening quote
            while let Some(ch) = chars.next() {
                if ch == '"' {
                    break;
                }
                result.push(ch);
            }
        }
        _ => {
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() {
                    break;
                }
                result.push(ch);
                chars.next();
            }
        }
    }

    Some(result)
}

/// Cut a line at the first `;` that is not inside a quoted string.
fn strip_comment(line: &str) -> &str {
    let mut in_quotes = false;
    for (i, ch) in line.char_indices() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => return &line[..i],
            _ => {}
        }
    }
    line
}

pub fn parse_line(line: &str, line_number: usize) -> Option<ConfigLine> {
    let line = strip_comment(line).trim();
    if line.is_empty() {
        return None;
    }

    let mut chars = line.chars().peekable();

    let key = parse_string(&mut chars)?;

    let mut params = Vec::new();
    while let Some(param_str) = parse_string(&mut chars) {
        if let Ok(num) = param_str.parse::<i32>() {
            params.push(ConfigToken::Number(num));
        } else if let Ok(num) = param_str.parse::<f32>() {
            params.push(ConfigToken::Float(num));
        } else {
            params.push(ConfigToken::String(param_str));
        }
    }

    Some(ConfigLine {
        key,
        params,
        line_number,
    })
}

/// A parsed config file with comments (`;` up to the end of the line) and blank lines removed.
pub struct ConfigLines {
    lines: Vec<ConfigLine>,
}

impl ConfigLines {
    pub fn parse(s: &str) -> Self {
        Self {
            lines: s
                .lines()
                .enumerate()
                .filter_map(|(i, line)| parse_line(line, i + 1))
                .collect(),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
