use crate::value::Value;

/// The outcome of an update function that also produces a result.
///
/// `value` is written back into the tree; `result` is handed to the caller.
#[derive(Clone, Debug, PartialEq)]
pub struct Mutation<R> {
    pub result: R,
    pub value: Value,
}

impl<R> Mutation<R> {
    /// Pair a caller-facing result with the value to write back.
    pub fn new(result: R, value: impl Into<Value>) -> Self {
        Self {
            result,
            value: value.into(),
        }
    }

    /// Split into `(result, value)`.
    pub fn into_parts(self) -> (R, Value) {
        (self.result, self.value)
    }
}
