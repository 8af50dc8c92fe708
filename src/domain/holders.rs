use serde::{Deserialize, Serialize};

/// One holder-distribution snapshot (timestamp in seconds since epoch).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HolderPoint {
    pub time: i64,
    /// Total holder count. This is the plotted value on the holders chart.
    pub length: u64,
    pub top10: f64,
    pub top20: f64,
    pub top50: f64,
    pub top100: f64,
    pub active_24h: u64,
}

/// Sort ascending and collapse duplicate timestamps, keeping the later of
/// two entries that share one. The upstream feed occasionally repeats the
/// newest bucket with fresher numbers.
pub fn dedup_holder_points(mut points: Vec<HolderPoint>) -> Vec<HolderPoint> {
    points.sort_by_key(|p| p.time);

    let mut out: Vec<HolderPoint> = Vec::with_capacity(points.len());
    for p in points {
        match out.last_mut() {
            Some(prev) if prev.time == p.time => *prev = p,
            _ => out.push(p),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(time: i64, length: u64) -> HolderPoint {
        HolderPoint {
            time,
            length,
            top10: 0.0,
            top20: 0.0,
            top50: 0.0,
            top100: 0.0,
            active_24h: 0,
        }
    }

    #[test]
    fn test_dedup_keeps_later_entry() {
        let deduped = dedup_holder_points(vec![point(10, 100), point(5, 50), point(10, 120)]);
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].time, 5);
        assert_eq!(deduped[1].length, 120);
    }
}
