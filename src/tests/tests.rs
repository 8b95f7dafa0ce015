use super::{CreationError, Histogram};

#[path = "helpers.rs"]
mod helpers;
#[path = "init.rs"]
mod init;

#[test]
fn new_err_high_not_double_low() {
    let res = Histogram::new_with_bounds(10, 15, 3);
    assert_eq!(CreationError::HighLessThanTwiceLow, res.unwrap_err());
}

#[test]
fn new_err_low_zero() {
    let res = Histogram::new_with_bounds(0, 1000, 3);
    assert_eq!(CreationError::LowIsZero, res.unwrap_err());
}

#[test]
fn new_err_low_exceeds_max() {
    let res = Histogram::new_with_bounds(i64::MAX / 2 + 1, i64::MAX, 3);
    assert_eq!(CreationError::LowExceedsMax, res.unwrap_err());
}

#[test]
fn new_err_sig_figs_zero() {
    let res = Histogram::new_with_bounds(1, 1000, 0);
    assert_eq!(CreationError::SigFigOutOfRange, res.unwrap_err());
}

#[test]
fn new_err_sig_figs_six() {
    let res = Histogram::new_with_bounds(1, 1000, 6);
    assert_eq!(CreationError::SigFigOutOfRange, res.unwrap_err());
}
