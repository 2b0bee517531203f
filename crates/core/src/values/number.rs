//! Numeric ordering and canonical text shared by `Int` and `Float`.
//!
//! Ints and floats live on one number line: comparison is exact (no lossy
//! casts), `-0.0 == 0.0`, and every `NaN` equals every other `NaN` and sorts
//! above all numbers. Canonical text is chosen so that equal numbers always
//! render identically, which keeps the content hash consistent with ordering.

use std::cmp::Ordering;

// 2^63 as f64; exactly representable.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

pub fn compare_floats(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

pub fn compare_int_float(i: i64, f: f64) -> Ordering {
    if f.is_nan() {
        return Ordering::Less;
    }
    if f >= I64_BOUND {
        return Ordering::Less;
    }
    if f < -I64_BOUND {
        return Ordering::Greater;
    }

    let whole = f.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => {
            if f > whole {
                Ordering::Less
            } else if f < whole {
                Ordering::Greater
            } else {
                Ordering::Equal
            }
        }
        other => other,
    }
}

/// Integral floats that fit in an `i64` as that integer, everything else in
/// shortest round-trip form.
pub fn canonical_float(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f == 0.0 {
        return "0".to_string();
    }
    if f.fract() == 0.0 && f >= -I64_BOUND && f < I64_BOUND {
        return (f as i64).to_string();
    }
    format!("{}", f)
}
