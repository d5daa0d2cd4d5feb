use serde_json::Value;

/// Picks at most `sample_size` items from `data` at an even stride, keeping
/// their order. Returns every item when `data` already fits.
#[must_use]
pub fn get_sample_data<T>(data: &[T], sample_size: usize) -> Vec<&T> {
    if data.len() <= sample_size {
        return data.iter().collect();
    }
    let step = data.len().div_ceil(sample_size.max(1));
    data.iter().step_by(step).take(sample_size).collect()
}

#[must_use]
pub fn not_null(value: Option<&Value>) -> bool {
    value.is_some_and(|value| !value.is_null())
}
