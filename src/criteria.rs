pub mod cohort;
pub mod performance;

use ordered_float::NotNan;

use crate::Percent;

#[derive(Clone, Copy, Debug)]
pub struct Alternative {
    pub score: Percent,
    pub weight: Weight,
}

/// We use the [weighted sum model (WSM)](https://en.wikipedia.org/wiki/Weighted_sum_model) to
/// combine criteria. All criteria share the same 0-100 scale, so with weights summing to 1 the
/// outcome stays on that scale, and raising one criterion while holding the others constant never
/// lowers the outcome.
pub fn weighted_sum_model<Alternatives>(alternatives: Alternatives) -> Percent
where
    Alternatives: IntoIterator<Item = Alternative>,
{
    let score = alternatives
        .into_iter()
        .map(|Alternative { score, weight }| score.as_f64() * weight.as_f64())
        .sum::<f64>();
    // Weights summing to 1 can still overshoot 100 by a rounding error.
    Percent::saturating(score)
}

/// A non-negative non-NaN f64 value
#[derive(Clone, Copy, PartialEq)]
pub struct Weight(NotNan<f64>);

impl Weight {
    pub fn new(value: f64) -> Option<Self> {
        let value = NotNan::new(value).ok()?;
        if value.is_sign_negative() {
            return None;
        }
        Some(Self(value))
    }

    pub fn as_f64(&self) -> f64 {
        self.0.into_inner()
    }
}

impl std::fmt::Debug for Weight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod test {
    use proptest::proptest;

    use super::{weighted_sum_model, Alternative, Weight};
    use crate::{test::assert_within, Percent};

    fn alternative(score: f64, weight: f64) -> Alternative {
        Alternative {
            score: Percent::new(score).unwrap(),
            weight: Weight::new(weight).unwrap(),
        }
    }

    #[test]
    fn weighted_sum_example() {
        let total = weighted_sum_model([
            alternative(100.0, 0.5),
            alternative(60.0, 0.3),
            alternative(30.0, 0.2),
        ]);
        assert_within(total.as_f64(), 74.0, 1e-9);
    }

    #[test]
    fn negative_weight_rejected() {
        assert!(Weight::new(-0.1).is_none());
        assert!(Weight::new(f64::NAN).is_none());
    }

    proptest! {
        #[test]
        fn convex_combination_stays_in_range(a in 0.0_f64..=100.0, b in 0.0_f64..=100.0, w in 0.0_f64..=1.0) {
            let total = weighted_sum_model([alternative(a, w), alternative(b, 1.0 - w)]);
            assert!(total >= Percent::ZERO && total <= Percent::HUNDRED);
            assert!(total.as_f64() <= a.max(b) + 1e-9);
            assert!(total.as_f64() >= a.min(b) - 1e-9);
        }
    }
}
