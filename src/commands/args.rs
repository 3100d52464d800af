//! Positional argument parsing for prefix commands

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArgumentError {
    #[error("{0} is a required argument that is missing.")]
    Missing(&'static str),
    #[error("Converting to \"int\" failed for parameter \"{0}\".")]
    BadInteger(&'static str),
    #[error("Too many arguments passed to {0}.")]
    TooMany(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Integer,
    /// Free text; when last in the list it takes the rest of the line
    Text,
}

/// One declared parameter of a command
#[derive(Debug, Clone, Copy)]
pub struct Param {
    pub name: &'static str,
    pub kind: ParamKind,
    pub required: bool,
}

impl Param {
    pub fn integer(name: &'static str) -> Self {
        Self { name, kind: ParamKind::Integer, required: true }
    }

    pub fn text(name: &'static str) -> Self {
        Self { name, kind: ParamKind::Text, required: true }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// `<name>` or `[name]` as shown in help
    pub fn usage(&self) -> String {
        if self.required {
            format!("<{}>", self.name)
        } else {
            format!("[{}]", self.name)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    Integer(i64),
    Text(String),
}

/// Parsed arguments, in declaration order. Absent optional arguments are
/// simply missing from the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args(Vec<Arg>);

impl Args {
    pub fn integer(&self, index: usize) -> Option<i64> {
        match self.0.get(index) {
            Some(Arg::Integer(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn text(&self, index: usize) -> Option<&str> {
        match self.0.get(index) {
            Some(Arg::Text(s)) => Some(s),
            _ => None,
        }
    }
}

/// Split `text` into its first whitespace-delimited word and the remainder
pub fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], &text[end..]),
        None => (text, ""),
    }
}

/// Drop one pair of surrounding double quotes
fn unquote(token: &str) -> &str {
    token
        .strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(token)
}

/// Coerce `input` into `params`. `command` is used in error messages only.
pub fn parse(command: &str, params: &[Param], input: &str) -> Result<Args, ArgumentError> {
    let mut rest = input;
    let mut args = Vec::with_capacity(params.len());

    for (i, param) in params.iter().enumerate() {
        let greedy = param.kind == ParamKind::Text && i + 1 == params.len();
        let token = if greedy {
            let all = rest.trim();
            rest = "";
            all
        } else {
            let (word, tail) = split_word(rest);
            rest = tail;
            word
        };

        if token.is_empty() {
            if param.required {
                return Err(ArgumentError::Missing(param.name));
            }
            break;
        }

        let arg = match param.kind {
            ParamKind::Integer => token
                .parse::<i64>()
                .map(Arg::Integer)
                .map_err(|_| ArgumentError::BadInteger(param.name))?,
            ParamKind::Text => Arg::Text(unquote(token).to_string()),
        };
        args.push(arg);
    }

    if !rest.trim().is_empty() {
        return Err(ArgumentError::TooMany(command.to_string()));
    }

    Ok(Args(args))
}
