//! Command arguments.
//!
//! Commands accept a tree of arguments: scalars at the leaves, sequences in
//! between. Value objects such as positions and blocks convert into
//! sequences, so a caller can pass a [`TilePos`](crate::TilePos) where three
//! coordinates are expected, or `None` to omit an optional field entirely.

use std::fmt;

/// A primitive argument value as it appears on the wire.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl Scalar {
    /// Returns whether this scalar is an integer or a float.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Scalar::Int(_) | Scalar::Float(_))
    }
}

/// Canonical wire text. Booleans are sent as `1`/`0`, floats never use
/// scientific notation, strings pass through unescaped.
impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Int(v) => write!(f, "{}", v),
            Scalar::Float(v) => write!(f, "{}", v),
            Scalar::Str(s) => f.write_str(s),
            Scalar::Bool(b) => f.write_str(if *b { "1" } else { "0" }),
        }
    }
}

/// A node of an argument tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Scalar(Scalar),
    Seq(Vec<Argument>),
}

impl Argument {
    /// An empty sequence; contributes nothing to the flattened output.
    pub fn empty() -> Self {
        Argument::Seq(Vec::new())
    }

    /// Returns the scalar if this node is a leaf.
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Argument::Scalar(s) => Some(s),
            Argument::Seq(_) => None,
        }
    }
}

impl From<Scalar> for Argument {
    fn from(value: Scalar) -> Self {
        Argument::Scalar(value)
    }
}

macro_rules! impl_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Argument {
                fn from(value: $ty) -> Self {
                    Argument::Scalar(Scalar::Int(i64::from(value)))
                }
            }
        )*
    };
}

impl_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f64> for Argument {
    fn from(value: f64) -> Self {
        Argument::Scalar(Scalar::Float(value))
    }
}

impl From<bool> for Argument {
    fn from(value: bool) -> Self {
        Argument::Scalar(Scalar::Bool(value))
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Argument::Scalar(Scalar::Str(value.to_string()))
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Argument::Scalar(Scalar::Str(value))
    }
}

impl From<&String> for Argument {
    fn from(value: &String) -> Self {
        Argument::Scalar(Scalar::Str(value.clone()))
    }
}

impl<T: Into<Argument>> From<Vec<T>> for Argument {
    fn from(values: Vec<T>) -> Self {
        Argument::Seq(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Argument>, const N: usize> From<[T; N]> for Argument {
    fn from(values: [T; N]) -> Self {
        Argument::Seq(values.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Argument> + Clone> From<&[T]> for Argument {
    fn from(values: &[T]) -> Self {
        Argument::Seq(values.iter().cloned().map(Into::into).collect())
    }
}

impl<T: Into<Argument>> From<Option<T>> for Argument {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => v.into(),
            None => Argument::empty(),
        }
    }
}

impl<A: Into<Argument>, B: Into<Argument>> From<(A, B)> for Argument {
    fn from((a, b): (A, B)) -> Self {
        Argument::Seq(vec![a.into(), b.into()])
    }
}

impl<A: Into<Argument>, B: Into<Argument>, C: Into<Argument>> From<(A, B, C)> for Argument {
    fn from((a, b, c): (A, B, C)) -> Self {
        Argument::Seq(vec![a.into(), b.into(), c.into()])
    }
}

/// Builds a `Vec<Argument>` from heterogeneous values.
///
/// ```
/// use rjam_protocol::{args, Argument};
///
/// let list: Vec<Argument> = args![1, 2.5, "stone", (4, 5, 6)];
/// assert_eq!(list.len(), 4);
/// ```
///
/// Each value only needs `Into<Argument>`, so generic parameters work too.
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Argument>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        ::std::vec![$(::std::convert::Into::<$crate::Argument>::into($arg)),+]
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_display() {
        assert_eq!(Scalar::Int(-42).to_string(), "-42");
        assert_eq!(Scalar::Float(1.5).to_string(), "1.5");
        assert_eq!(Scalar::Float(3.0).to_string(), "3");
        assert_eq!(Scalar::Str("a b".into()).to_string(), "a b");
        assert_eq!(Scalar::Bool(true).to_string(), "1");
        assert_eq!(Scalar::Bool(false).to_string(), "0");
    }

    #[test]
    fn test_float_display_has_no_exponent() {
        let big = Scalar::Float(1e21).to_string();
        assert!(!big.contains('e'));
        assert_eq!(big, "1000000000000000000000");

        let small = Scalar::Float(1e-7).to_string();
        assert!(!small.contains('e'));
        assert_eq!(small, "0.0000001");
    }

    fn with_prefix(id: Option<i32>, pos: impl Into<Argument>) -> Vec<Argument> {
        args![id, pos]
    }

    #[test]
    fn test_args_accepts_generic_values() {
        let list = with_prefix(Some(7), (1, 2, 3));
        assert_eq!(list.len(), 2);
        assert_eq!(list[0], Argument::Scalar(Scalar::Int(7)));
        assert_eq!(list[1], Argument::from((1, 2, 3)));
    }

    #[test]
    fn test_option_none_is_empty_sequence() {
        let none: Option<i32> = None;
        assert_eq!(Argument::from(none), Argument::empty());
        assert_eq!(Argument::from(Some(7)), Argument::Scalar(Scalar::Int(7)));
    }

    #[test]
    fn test_tuple_and_array_conversions() {
        let arg = Argument::from((1, 2.5, "x"));
        assert_eq!(
            arg,
            Argument::Seq(vec![
                Argument::Scalar(Scalar::Int(1)),
                Argument::Scalar(Scalar::Float(2.5)),
                Argument::Scalar(Scalar::Str("x".into())),
            ])
        );

        let arg = Argument::from([1, 2]);
        assert!(matches!(arg, Argument::Seq(ref v) if v.len() == 2));
    }

    #[test]
    fn test_args_macro() {
        let empty = args![];
        assert!(empty.is_empty());

        let list = args![1, "two", vec![3, 4],];
        assert_eq!(list.len(), 3);
        assert_eq!(list[1].as_scalar(), Some(&Scalar::Str("two".into())));
        assert!(list[2].as_scalar().is_none());
    }

    #[test]
    fn test_is_numeric() {
        assert!(Scalar::Int(1).is_numeric());
        assert!(Scalar::Float(1.0).is_numeric());
        assert!(!Scalar::Bool(true).is_numeric());
        assert!(!Scalar::Str("1".into()).is_numeric());
    }
}
