//! Depth-first flattening of argument trees.

use crate::argument::{Argument, Scalar};
use crate::error::ProtocolError;
use crate::MAX_NESTING_DEPTH;

/// Flattens an argument list into scalars, depth-first and left to right.
///
/// Empty sequences contribute nothing. Trees nested deeper than
/// [`MAX_NESTING_DEPTH`] are rejected before anything is produced.
///
/// Depth counts sequences from the top-level list, so regrouping
/// (`[a, b, c]` as `[a, [b, c]]`) gives the same output only while every
/// regrouped element stays within the limit. Wrapping an element that is
/// already at the limit in one more sequence makes it too deep.
pub fn flatten(args: &[Argument]) -> Result<Vec<Scalar>, ProtocolError> {
    let mut out = Vec::with_capacity(args.len());
    for arg in args {
        push_flat(arg, 0, &mut out)?;
    }
    Ok(out)
}

/// Like [`flatten`], then floors every float to an integer.
///
/// Non-numeric scalars pass through unchanged.
pub fn floor_flatten(args: &[Argument]) -> Result<Vec<Scalar>, ProtocolError> {
    let mut out = flatten(args)?;
    floor_scalars(&mut out)?;
    Ok(out)
}

/// Floors every float in place.
///
/// Non-finite floats, and floats whose floor does not fit in an `i64`, are
/// rejected.
pub fn floor_scalars(scalars: &mut [Scalar]) -> Result<(), ProtocolError> {
    for scalar in scalars.iter_mut() {
        if let Scalar::Float(v) = *scalar {
            *scalar = Scalar::Int(floor_to_int(v)?);
        }
    }
    Ok(())
}

// 2^63 is exact in f64; anything at or above it would saturate.
const I64_UPPER: f64 = 9_223_372_036_854_775_808.0;

fn floor_to_int(v: f64) -> Result<i64, ProtocolError> {
    if !v.is_finite() {
        return Err(ProtocolError::InvalidArgument(format!(
            "cannot floor non-finite value {}",
            v
        )));
    }
    let floored = v.floor();
    if floored < -I64_UPPER || floored >= I64_UPPER {
        return Err(ProtocolError::InvalidArgument(format!(
            "{} is out of integer range",
            v
        )));
    }
    Ok(floored as i64)
}

fn push_flat(arg: &Argument, depth: usize, out: &mut Vec<Scalar>) -> Result<(), ProtocolError> {
    match arg {
        Argument::Scalar(s) => out.push(s.clone()),
        Argument::Seq(items) => {
            if depth >= MAX_NESTING_DEPTH {
                return Err(ProtocolError::NestingTooDeep {
                    max: MAX_NESTING_DEPTH,
                });
            }
            for item in items {
                push_flat(item, depth + 1, out)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use proptest::prelude::*;

    fn nested(depth: usize) -> Argument {
        let mut arg = Argument::from(1);
        for _ in 0..depth {
            arg = Argument::Seq(vec![arg]);
        }
        arg
    }

    #[test]
    fn test_flatten_nested() {
        let flat = flatten(&args![1, vec![2, 3], (4, vec![5.5]), "x"]).unwrap();
        assert_eq!(
            flat,
            vec![
                Scalar::Int(1),
                Scalar::Int(2),
                Scalar::Int(3),
                Scalar::Int(4),
                Scalar::Float(5.5),
                Scalar::Str("x".into()),
            ]
        );
    }

    #[test]
    fn test_empty_sequence_contributes_nothing() {
        let no_id: Option<i32> = None;
        let flat = flatten(&args![no_id, 1.0, 2.0, 3.0]).unwrap();
        assert_eq!(flat.len(), 3);

        let flat = flatten(&args![Vec::<i32>::new()]).unwrap();
        assert!(flat.is_empty());
        assert!(flatten(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_floor_flatten() {
        let flat = floor_flatten(&args![1.9, 2.1, "x"]).unwrap();
        assert_eq!(
            flat,
            vec![Scalar::Int(1), Scalar::Int(2), Scalar::Str("x".into())]
        );
    }

    #[test]
    fn test_floor_negative_rounds_down() {
        let flat = floor_flatten(&args![-0.5, -1.0, -1.1]).unwrap();
        assert_eq!(flat, vec![Scalar::Int(-1), Scalar::Int(-1), Scalar::Int(-2)]);
    }

    #[test]
    fn test_floor_leaves_non_numeric() {
        let flat = floor_flatten(&args![true, 7, "3.5"]).unwrap();
        assert_eq!(
            flat,
            vec![
                Scalar::Bool(true),
                Scalar::Int(7),
                Scalar::Str("3.5".into())
            ]
        );
    }

    #[test]
    fn test_floor_rejects_non_finite() {
        let err = floor_flatten(&args![f64::NAN]).unwrap_err();
        assert!(err.is_invalid_argument());

        let err = floor_flatten(&args![1.0, f64::INFINITY]).unwrap_err();
        assert!(err.is_invalid_argument());
    }

    #[test]
    fn test_floor_rejects_out_of_range() {
        let err = floor_flatten(&args![1e30]).unwrap_err();
        assert!(err.is_invalid_argument());

        let err = floor_flatten(&args![-1e19]).unwrap_err();
        assert!(err.is_invalid_argument());

        let flat = floor_flatten(&args![-9_223_372_036_854_775_808.0, 1e18]).unwrap();
        assert_eq!(
            flat,
            vec![Scalar::Int(i64::MIN), Scalar::Int(1_000_000_000_000_000_000)]
        );
    }

    #[test]
    fn test_nesting_limit() {
        assert!(flatten(&[nested(MAX_NESTING_DEPTH)]).is_ok());

        let err = flatten(&[nested(MAX_NESTING_DEPTH + 1)]).unwrap_err();
        assert!(matches!(err, ProtocolError::NestingTooDeep { .. }));
    }

    #[test]
    fn test_regrouping_at_the_nesting_limit() {
        let deep = nested(MAX_NESTING_DEPTH);
        assert!(flatten(&[Argument::from(1), deep.clone()]).is_ok());

        let err = flatten(&[Argument::Seq(vec![Argument::from(1), deep])]).unwrap_err();
        assert!(matches!(err, ProtocolError::NestingTooDeep { .. }));
    }

    fn arb_scalar() -> impl Strategy<Value = Argument> {
        prop_oneof![
            any::<i32>().prop_map(Argument::from),
            (-1.0e6..1.0e6f64).prop_map(Argument::from),
            "[a-z]{0,6}".prop_map(Argument::from),
            any::<bool>().prop_map(Argument::from),
        ]
    }

    fn arb_tree() -> impl Strategy<Value = Argument> {
        arb_scalar().prop_recursive(4, 32, 5, |inner| {
            prop::collection::vec(inner, 0..5).prop_map(Argument::Seq)
        })
    }

    proptest! {
        #[test]
        fn prop_flatten_is_associative(a in arb_tree(), b in arb_tree(), c in arb_tree()) {
            let grouped = flatten(&[a.clone(), Argument::Seq(vec![b.clone(), c.clone()])]).unwrap();
            let spread = flatten(&[a, b, c]).unwrap();
            prop_assert_eq!(grouped, spread);
        }

        #[test]
        fn prop_flatten_concatenates(items in prop::collection::vec(arb_tree(), 0..6)) {
            let whole = flatten(&items).unwrap();
            let mut pieces = Vec::new();
            for item in &items {
                pieces.extend(flatten(std::slice::from_ref(item)).unwrap());
            }
            prop_assert_eq!(whole, pieces);
        }

        #[test]
        fn prop_floor_flatten_only_emits_non_floats(tree in arb_tree()) {
            let flat = floor_flatten(&[tree]).unwrap();
            prop_assert!(flat.iter().all(|s| !matches!(s, Scalar::Float(_))));
        }
    }
}
