//! Bind parameter values
//!
//! [`Param`] is the single tagged type every bind goes through. Anything that
//! converts into a `Param` can be passed to [`Statement::bind`], and
//! [`Statement::bind_all`] folds a sequence of them onto consecutive
//! positions.
//!
//! [`Statement::bind`]: crate::Statement::bind
//! [`Statement::bind_all`]: crate::Statement::bind_all

use crate::row::Value;

/// A value that can be bound to a statement parameter
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Param<'a> {
    Null,
    Int(i32),
    Int64(i64),
    Double(f64),
    Text(&'a str),
    Blob(&'a [u8]),
}

impl Param<'_> {
    /// SQL type name of the value, used in log output
    pub fn type_name(&self) -> &'static str {
        match self {
            Param::Null => "NULL",
            Param::Int(_) | Param::Int64(_) => "INTEGER",
            Param::Double(_) => "REAL",
            Param::Text(_) => "TEXT",
            Param::Blob(_) => "BLOB",
        }
    }
}

impl From<i32> for Param<'_> {
    fn from(value: i32) -> Self {
        Param::Int(value)
    }
}

impl From<i64> for Param<'_> {
    fn from(value: i64) -> Self {
        Param::Int64(value)
    }
}

impl From<u32> for Param<'_> {
    fn from(value: u32) -> Self {
        Param::Int64(i64::from(value))
    }
}

impl From<bool> for Param<'_> {
    fn from(value: bool) -> Self {
        Param::Int(value as i32)
    }
}

impl From<f64> for Param<'_> {
    fn from(value: f64) -> Self {
        Param::Double(value)
    }
}

impl<'a> From<&'a str> for Param<'a> {
    fn from(value: &'a str) -> Self {
        Param::Text(value)
    }
}

impl<'a> From<&'a String> for Param<'a> {
    fn from(value: &'a String) -> Self {
        Param::Text(value.as_str())
    }
}

impl<'a> From<&'a [u8]> for Param<'a> {
    fn from(value: &'a [u8]) -> Self {
        Param::Blob(value)
    }
}

impl<'a> From<&'a Vec<u8>> for Param<'a> {
    fn from(value: &'a Vec<u8>) -> Self {
        Param::Blob(value.as_slice())
    }
}

impl<'a> From<&'a Value> for Param<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Null => Param::Null,
            Value::Integer(i) => Param::Int64(*i),
            Value::Real(f) => Param::Double(*f),
            Value::Text(s) => Param::Text(s),
            Value::Blob(b) => Param::Blob(b),
        }
    }
}

impl<'a, T> From<Option<T>> for Param<'a>
where
    T: Into<Param<'a>>,
{
    fn from(value: Option<T>) -> Self {
        value.map_or(Param::Null, Into::into)
    }
}

/// Build a `[Param; N]` from heterogeneous values
///
/// ```no_run
/// # use sqlitekit::{params, Connection};
/// # let db = Connection::open_in_memory()?;
/// let mut stmt = db.prepare("INSERT INTO store VALUES (?, ?, ?)")?;
/// stmt.bind_all(params!["banana", "fruit", 70])?;
/// stmt.exec()?;
/// # Ok::<(), sqlitekit::Error>(())
/// ```
#[macro_export]
macro_rules! params {
    () => {
        [$crate::Param::Null; 0]
    };
    ($($value:expr),+ $(,)?) => {
        [$($crate::Param::from($value)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_param_conversions() {
        assert_eq!(Param::from(125), Param::Int(125));
        assert_eq!(Param::from(7_i64), Param::Int64(7));
        assert_eq!(Param::from(1.5), Param::Double(1.5));
        assert_eq!(Param::from("apple"), Param::Text("apple"));
        assert_eq!(Param::from(true), Param::Int(1));
        assert_eq!(Param::from(None::<i32>), Param::Null);
        assert_eq!(Param::from(Some("x")), Param::Text("x"));

        let bytes = vec![1u8, 2, 3];
        assert_eq!(Param::from(&bytes), Param::Blob(&[1, 2, 3]));
    }

    #[test]
    fn test_params_macro_preserves_order() {
        let values = params!["banana", "fruit", 70];
        assert_eq!(
            values,
            [Param::Text("banana"), Param::Text("fruit"), Param::Int(70)]
        );
        assert_eq!(params![].len(), 0);
    }

    #[test]
    fn test_value_to_param() {
        let text = Value::Text("kiwi".to_string());
        assert_eq!(Param::from(&text), Param::Text("kiwi"));
        assert_eq!(Param::from(&Value::Null).type_name(), "NULL");
    }
}
