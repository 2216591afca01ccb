use crate::{ast::Aggregate, util::num::usize_to_f64};

/// Reduces a sequence of values.
///
/// An empty sequence yields NaN. `min` and `max` ignore NaN operands unless
/// every operand is NaN.
///
/// # Parameters
/// - `op`: The reduction.
/// - `values`: The values to reduce, in order.
///
/// # Returns
/// The reduced value.
///
/// # Example
/// ```
/// use formulary::{ast::Aggregate, interpreter::evaluator::function::min_max::aggregate};
///
/// assert_eq!(aggregate(Aggregate::Max, [1.0, 7.0, 3.0]), 7.0);
/// assert_eq!(aggregate(Aggregate::Avg, [1.0, 2.0, 3.0]), 2.0);
/// assert_eq!(aggregate(Aggregate::Mul, [2.0, 3.0, 4.0]), 24.0);
/// assert!(aggregate(Aggregate::Sum, []).is_nan());
/// ```
pub fn aggregate(op: Aggregate, values: impl IntoIterator<Item = f64>) -> f64 {
    let mut values = values.into_iter();
    let Some(first) = values.next() else {
        return f64::NAN;
    };

    match op {
        Aggregate::Min => values.fold(first, f64::min),
        Aggregate::Max => values.fold(first, f64::max),
        Aggregate::Sum => values.fold(first, |acc, v| acc + v),
        Aggregate::Mul => values.fold(first, |acc, v| acc * v),
        Aggregate::Avg => {
            let (sum, count) = values.fold((first, 1usize), |(sum, count), v| (sum + v, count + 1));
            sum / usize_to_f64(count)
        },
    }
}
