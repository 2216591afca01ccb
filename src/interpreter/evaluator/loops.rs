use crate::{
    ast::{Node, ScalarNode},
    util::num::is_true,
};

/// Runs a `while` loop.
///
/// # Parameters
/// - `condition`: Tested before every iteration.
/// - `body`: The loop body.
/// - `limit`: Maximum number of iterations, if bounded.
///
/// # Returns
/// The scalar value of the last executed iteration, or NaN if the body never
/// ran or does not produce a scalar.
pub fn eval_while(condition: &ScalarNode, body: &Node, limit: Option<u64>) -> f64 {
    let mut result = f64::NAN;
    let mut iterations = 0u64;

    while limit.is_none_or(|limit| iterations < limit) && is_true(condition.eval()) {
        result = body.eval_scalar();
        iterations += 1;
    }

    result
}

/// Runs a `for` loop.
///
/// The initializer runs once. Each iteration tests the condition, runs the
/// body and then the increment. A missing condition is always true, so such
/// a loop ends only through `limit`.
///
/// # Returns
/// The scalar value of the last executed iteration, or NaN if the body never
/// ran or does not produce a scalar.
pub fn eval_for(initializer: Option<&Node>,
                condition: Option<&ScalarNode>,
                increment: Option<&Node>,
                body: &Node,
                limit: Option<u64>)
                -> f64 {
    if let Some(initializer) = initializer {
        initializer.execute();
    }

    let mut result = f64::NAN;
    let mut iterations = 0u64;

    while limit.is_none_or(|limit| iterations < limit)
          && condition.is_none_or(|condition| is_true(condition.eval()))
    {
        result = body.eval_scalar();
        iterations += 1;

        if let Some(increment) = increment {
            increment.execute();
        }
    }

    result
}
