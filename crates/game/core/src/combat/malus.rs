//! Engagement malus: movement points lost when leaving hostile adjacency.
//!
//! `tacle` is the summed engage stat of every living hostile adjacent to the
//! mover, `fuite` the mover's own escape stat.
//!
//! | condition                    | penalty                         |
//! |------------------------------|---------------------------------|
//! | tacle = 0                    | 0 % if fuite ≥ 2, else 25 %     |
//! | fuite = 0, tacle ≤ 5         | 25 % if tacle ≤ 2, else 50 %    |
//! | fuite ≥ 1.5 × tacle          | 0 %                             |
//! | tacle ≤ fuite < 1.5 × tacle  | 25 % tapering linearly to 0 %   |
//! | fuite < tacle                | 25 % rising linearly to 100 %   |

/// Penalty percentage in `[0, 100]`.
pub fn penalty_percent(tacle: u32, fuite: u32) -> u32 {
    let (t, f) = (tacle as u64, fuite as u64);

    if t == 0 {
        return if f >= 2 { 0 } else { 25 };
    }
    if f == 0 && t <= 5 {
        return if t <= 2 { 25 } else { 50 };
    }
    if 2 * f >= 3 * t {
        return 0;
    }
    if f >= t {
        // 25 * (1.5t - f) / 0.5t
        return (25 * (3 * t - 2 * f) / t) as u32;
    }
    (25 + 75 * (t - f) / t) as u32
}

/// Movement points removed from `pm`: ceiling of the percentage, at least one
/// whenever a penalty applies.
pub fn penalty_points(pm: u32, percent: u32) -> u32 {
    if percent == 0 || pm == 0 {
        return 0;
    }
    let points = (pm as u64 * percent as u64).div_ceil(100) as u32;
    points.clamp(1, pm)
}

/// Movement budget left after the engagement malus.
pub fn effective_pm(pm: u32, tacle: u32, fuite: u32) -> u32 {
    pm - penalty_points(pm, penalty_percent(tacle, fuite))
}
