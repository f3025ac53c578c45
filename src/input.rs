use std::fmt;

use serde_json::Value;

use crate::numeric;

/// An untyped scalar received from outside the program.
///
/// `Input` is decided once at the boundary (a form field, a query parameter,
/// a JSON document) and every coercer matches it exhaustively afterwards.
/// `Missing` and `Null` are distinct: a field that was never sent is not the
/// same as a field that was sent as `null`.
///
/// # Examples
///
/// ```
/// use scalar_sanitize::Input;
///
/// assert_eq!(Input::from("yes"), Input::Str("yes".to_string()));
/// assert_eq!(Input::from(Option::<i64>::None), Input::Null);
/// assert_eq!(Input::from(&serde_json::json!(12)), Input::Number(12.0));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Input {
    /// No value was supplied at all.
    #[default]
    Missing,
    /// An explicit null.
    Null,
    /// A boolean.
    Bool(bool),
    /// Any number, including `NaN` and the infinities.
    Number(f64),
    /// Text.
    Str(String),
    /// A structured value (array, object) in its textual form.
    Other(String),
}

impl Input {
    /// Returns `true` for input that should be read as "no value":
    /// missing, null and `NaN`.
    pub fn is_nullish(&self) -> bool {
        match self {
            Input::Missing | Input::Null => true,
            Input::Number(n) => n.is_nan(),
            _ => false,
        }
    }

    /// Returns `true` for nullish input and for strings containing only whitespace.
    pub fn is_blank(&self) -> bool {
        match self {
            Input::Str(s) => s.trim().is_empty(),
            other => other.is_nullish(),
        }
    }

    /// Returns the text if this input is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Input::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Short name of the variant, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Input::Missing => "undefined",
            Input::Null => "null",
            Input::Bool(_) => "boolean",
            Input::Number(_) => "number",
            Input::Str(_) => "string",
            Input::Other(_) => "object",
        }
    }
}

impl fmt::Display for Input {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Input::Missing => f.write_str("undefined"),
            Input::Null => f.write_str("null"),
            Input::Bool(b) => write!(f, "{}", b),
            Input::Number(n) => f.write_str(&numeric::format_number(*n)),
            Input::Str(s) | Input::Other(s) => f.write_str(s),
        }
    }
}

impl From<bool> for Input {
    fn from(value: bool) -> Self {
        Input::Bool(value)
    }
}

macro_rules! number_input {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Input {
                fn from(value: $t) -> Self {
                    Input::Number(value as f64)
                }
            }
        )*
    };
}

number_input!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl From<&str> for Input {
    fn from(value: &str) -> Self {
        Input::Str(value.to_string())
    }
}

impl From<String> for Input {
    fn from(value: String) -> Self {
        Input::Str(value)
    }
}

impl From<&String> for Input {
    fn from(value: &String) -> Self {
        Input::Str(value.clone())
    }
}

impl<T: Into<Input>> From<Option<T>> for Input {
    fn from(value: Option<T>) -> Self {
        value.map_or(Input::Null, Into::into)
    }
}

impl From<&Value> for Input {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Input::Null,
            Value::Bool(b) => Input::Bool(*b),
            Value::Number(n) => n
                .as_f64()
                .map_or_else(|| Input::Other(n.to_string()), Input::Number),
            Value::String(s) => Input::Str(s.clone()),
            Value::Array(_) | Value::Object(_) => Input::Other(value.to_string()),
        }
    }
}

impl From<Value> for Input {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) => Input::Str(s),
            other => Input::from(&other),
        }
    }
}
