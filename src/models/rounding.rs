//! Minute rounding applied when an entry is created.

use super::entities::RoundingMode;

/// Round a duration to the configured increment.
///
/// With mode `None` or a non-positive increment the value passes through,
/// clamped to at least one minute. `Down` never rounds below one minute
/// either, so a 3-minute entry with a 15-minute increment stays visible
/// instead of vanishing to zero.
pub fn round_minutes(value: u32, mode: RoundingMode, increment: u32) -> u32 {
    if increment == 0 || mode == RoundingMode::None {
        return value.max(1);
    }
    let inc = increment.max(1);
    let quotient = value / inc;
    let remainder = value % inc;
    if remainder == 0 {
        return value;
    }
    match mode {
        RoundingMode::Down => (quotient * inc).max(1),
        RoundingMode::Up => (quotient + 1) * inc,
        // Nearest: ties round up
        _ => {
            if remainder * 2 >= inc {
                (quotient + 1) * inc
            } else {
                quotient * inc
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::entities::RoundingMode::*;

    #[test]
    fn test_mode_none_passes_through() {
        assert_eq!(round_minutes(37, None, 15), 37);
        assert_eq!(round_minutes(0, None, 15), 1);
    }

    #[test]
    fn test_zero_increment_passes_through() {
        assert_eq!(round_minutes(37, Up, 0), 37);
    }

    #[test]
    fn test_exact_multiple_unchanged() {
        assert_eq!(round_minutes(30, Up, 15), 30);
        assert_eq!(round_minutes(30, Down, 15), 30);
        assert_eq!(round_minutes(30, Nearest, 15), 30);
    }

    #[test]
    fn test_round_up() {
        assert_eq!(round_minutes(31, Up, 15), 45);
        assert_eq!(round_minutes(1, Up, 15), 15);
    }

    #[test]
    fn test_round_down_floors() {
        assert_eq!(round_minutes(44, Down, 15), 30);
    }

    #[test]
    fn test_round_down_never_reaches_zero() {
        assert_eq!(round_minutes(3, Down, 15), 1);
    }

    #[test]
    fn test_round_nearest() {
        assert_eq!(round_minutes(37, Nearest, 15), 30);
        assert_eq!(round_minutes(38, Nearest, 15), 45);
        // Exact midpoint rounds up
        assert_eq!(round_minutes(10, Nearest, 20), 20);
    }
}
