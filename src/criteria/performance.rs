use crate::{AggregatedMeasurement, Normalized};

/// Fastest and slowest mean service time among the measured candidates of a race, in nanoseconds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_ns: f64,
    pub max_ns: f64,
}

impl Bounds {
    pub fn of<'m, Measurements>(measurements: Measurements) -> Option<Self>
    where
        Measurements: IntoIterator<Item = &'m AggregatedMeasurement>,
    {
        measurements
            .into_iter()
            .map(|m| m.avg_service_elapsed_ns)
            .fold(None, |bounds, t| match bounds {
                None => Some(Self { min_ns: t, max_ns: t }),
                Some(Self { min_ns, max_ns }) => Some(Self {
                    min_ns: min_ns.min(t),
                    max_ns: max_ns.max(t),
                }),
            })
    }

    pub fn spread_ns(&self) -> f64 {
        self.max_ns - self.min_ns
    }

    /// Relative standing of a candidate with mean service time `t_ns`: 1 for the fastest, 0 for the
    /// slowest. When every candidate took the same time they all stand at 1.
    pub fn standing(&self, t_ns: f64) -> Normalized {
        let spread = self.spread_ns();
        if spread > 0.0 {
            Normalized::saturating((self.max_ns - t_ns) / spread)
        } else {
            Normalized::ONE
        }
    }
}

#[cfg(test)]
mod test {
    use super::Bounds;
    use crate::{
        test::{assert_within, measurement},
        trial::PENALTY_NS,
        AggregatedMeasurement, Normalized,
    };

    #[test]
    fn standing_limits() {
        let ms = [
            measurement("a", false, 1_000.0),
            measurement("b", true, 2_000.0),
            measurement("c", true, 1_500.0),
        ];
        let bounds = Bounds::of(&ms).unwrap();
        assert_eq!(bounds.standing(1_000.0), Normalized::ONE);
        assert_eq!(bounds.standing(2_000.0), Normalized::ZERO);
        assert_within(bounds.standing(1_500.0).as_f64(), 0.5, 1e-12);
    }

    #[test]
    fn single_candidate_stands_first() {
        let ms = [measurement("a", false, 7.0)];
        let bounds = Bounds::of(&ms).unwrap();
        assert_eq!(bounds.spread_ns(), 0.0);
        assert_eq!(bounds.standing(7.0), Normalized::ONE);
    }

    #[test]
    fn penalty_dominates_without_nan() {
        let ms = [
            measurement("ok", false, 50_000.0),
            measurement("failed", true, PENALTY_NS as f64),
        ];
        let bounds = Bounds::of(&ms).unwrap();
        let failed = bounds.standing(PENALTY_NS as f64);
        assert!(!failed.as_f64().is_nan());
        assert_eq!(failed, Normalized::ZERO);
    }

    #[test]
    fn no_measurements_no_bounds() {
        assert_eq!(Bounds::of(std::iter::empty::<&AggregatedMeasurement>()), None);
    }
}
