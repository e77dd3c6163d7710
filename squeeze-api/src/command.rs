//! Positional command tokens
//!
//! Every server command is a flat list of tokens such as
//! `["mixer", "volume", 50]` or `["albums", "-", "-", "tags:tSS"]`. Keyed
//! arguments are single `key:value` string tokens. [`Command`] is a small
//! builder for these lists.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// A single command token
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Param {
    Text(String),
    Int(i64),
    Float(f64),
}

impl Param {
    pub fn text(s: impl Into<String>) -> Self {
        Param::Text(s.into())
    }

    pub fn to_value(&self) -> Value {
        match self {
            Param::Text(s) => Value::String(s.clone()),
            Param::Int(n) => Value::from(*n),
            Param::Float(f) => Value::from(*f),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Param::Text(s) => write!(f, "{}", s),
            Param::Int(n) => write!(f, "{}", n),
            Param::Float(x) => write!(f, "{}", x),
        }
    }
}

impl From<&str> for Param {
    fn from(s: &str) -> Self {
        Param::Text(s.to_string())
    }
}

impl From<String> for Param {
    fn from(s: String) -> Self {
        Param::Text(s)
    }
}

impl From<&String> for Param {
    fn from(s: &String) -> Self {
        Param::Text(s.clone())
    }
}

macro_rules! impl_int_param {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Param {
                fn from(n: $ty) -> Self {
                    Param::Int(i64::from(n))
                }
            }
        )*
    };
}

impl_int_param!(u8, u16, u32, i8, i16, i32, i64);

impl From<usize> for Param {
    fn from(n: usize) -> Self {
        Param::Int(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Param {
    /// Whole numbers are sent as integers
    fn from(x: f64) -> Self {
        if x.fract() == 0.0 && x.abs() < i64::MAX as f64 {
            Param::Int(x as i64)
        } else {
            Param::Float(x)
        }
    }
}

impl From<bool> for Param {
    fn from(b: bool) -> Self {
        Param::Int(i64::from(b))
    }
}

/// An ordered list of command tokens
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Command {
    tokens: Vec<Param>,
}

impl Command {
    pub fn new(first: impl Into<Param>) -> Self {
        Self {
            tokens: vec![first.into()],
        }
    }

    /// Build a command from a fixed token sequence
    pub fn from_tokens<I, P>(tokens: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Param>,
    {
        Self {
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }

    pub fn arg(mut self, param: impl Into<Param>) -> Self {
        self.tokens.push(param.into());
        self
    }

    /// Append the `?` token that turns a command into a query
    pub fn query(self) -> Self {
        self.arg("?")
    }

    /// Append `value` when present, `?` otherwise
    pub fn arg_or_query<P: Into<Param>>(self, value: Option<P>) -> Self {
        match value {
            Some(v) => self.arg(v),
            None => self.query(),
        }
    }

    /// Append a `key:value` token
    pub fn tagged(self, key: &str, value: impl fmt::Display) -> Self {
        self.arg(format!("{}:{}", key, value))
    }

    /// Append a `key:value` token only when a value is present
    pub fn tagged_opt<V: fmt::Display>(self, key: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.tagged(key, v),
            None => self,
        }
    }

    pub fn tokens(&self) -> &[Param] {
        &self.tokens
    }

    pub fn to_values(&self) -> Vec<Value> {
        self.tokens.iter().map(Param::to_value).collect()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.tokens.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", token)?;
        }
        Ok(())
    }
}
