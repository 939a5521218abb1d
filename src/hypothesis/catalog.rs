//! The fixed hypothesis catalog (H1-H10).
//!
//! Five revenue hypotheses and five rating hypotheses, each mapped to one of
//! the three test kinds against named variable pairs. The catalog is fixed:
//! test selection is a lookup, never learned from the data.

use crate::types::{FeatureRecord, HypothesisSpec, TestKind};

/// Vehicle types counted as premium for H1.
pub const PREMIUM_VEHICLES: [&str; 2] = ["Premier Sedan", "AutoXL"];

/// Payment methods counted as digital for H4.
pub const DIGITAL_PAYMENT_METHODS: [&str; 3] = ["UPI", "Credit Card", "Digital Wallet"];

/// The ten catalog specs in id order.
pub fn specs() -> Vec<HypothesisSpec> {
    fn spec(
        id: &str,
        statement: &str,
        kind: TestKind,
        group_variable: &str,
        outcome_variable: &str,
    ) -> HypothesisSpec {
        HypothesisSpec {
            id: id.to_string(),
            statement: statement.to_string(),
            kind,
            group_variable: group_variable.to_string(),
            outcome_variable: outcome_variable.to_string(),
        }
    }

    vec![
        spec(
            "H1",
            "Premium vehicles generate higher revenue",
            TestKind::TwoSample,
            "vehicle_premium_flag",
            "booking_value",
        ),
        spec(
            "H2",
            "Peak hours yield higher fares",
            TestKind::TwoSample,
            "peak_hour_flag",
            "booking_value",
        ),
        spec(
            "H3",
            "Longer distances have higher revenue",
            TestKind::Correlation,
            "ride_distance",
            "booking_value",
        ),
        spec(
            "H4",
            "Cash and digital payments differ in revenue",
            TestKind::TwoSample,
            "payment_method",
            "booking_value",
        ),
        spec(
            "H5",
            "Higher VTAT reduces revenue",
            TestKind::Correlation,
            "avg_vtat",
            "booking_value",
        ),
        spec(
            "H6",
            "Higher VTAT reduces driver rating",
            TestKind::Correlation,
            "avg_vtat",
            "driver_ratings",
        ),
        spec(
            "H7",
            "Cancellations hurt driver ratings",
            TestKind::TwoSample,
            "cancellation_flag",
            "driver_ratings",
        ),
        spec(
            "H8",
            "Payment method affects driver ratings",
            TestKind::MultiGroup,
            "payment_method",
            "driver_ratings",
        ),
        spec(
            "H9",
            "Vehicle type affects driver ratings",
            TestKind::MultiGroup,
            "vehicle_type",
            "driver_ratings",
        ),
        spec(
            "H10",
            "Trip duration affects customer satisfaction",
            TestKind::Correlation,
            "avg_ctat",
            "customer_rating",
        ),
    ]
}

/// Samples extracted from the feature table for one hypothesis.
#[derive(Debug, Clone)]
pub enum SampleSet {
    /// Two independent groups of a continuous outcome.
    TwoGroups { a: Vec<f64>, b: Vec<f64> },
    /// Named groups of a continuous outcome, one per observed category.
    Groups(Vec<(String, Vec<f64>)>),
    /// Paired continuous observations.
    Paired { x: Vec<f64>, y: Vec<f64> },
}

/// Extract the sample set a catalog hypothesis consumes.
///
/// Rows missing the consumed variables are skipped per hypothesis, matching
/// the per-test dropna the fixed catalog was designed around. Returns `None`
/// for an id outside the catalog.
pub fn extract(id: &str, features: &[FeatureRecord]) -> Option<SampleSet> {
    match id {
        "H1" => Some(split_groups(features, |f| {
            let vehicle = f.vehicle_type.as_deref()?;
            let value = f.booking_value?;
            Some((PREMIUM_VEHICLES.contains(&vehicle), value))
        })),
        "H2" => Some(split_groups(features, |f| {
            let value = f.booking_value?;
            Some((f.is_peak(), value))
        })),
        "H3" => Some(paired(features, |f| Some((f.ride_distance?, f.booking_value?)))),
        "H4" => Some(split_groups(features, |f| {
            let method = f.payment_method.as_deref()?;
            let value = f.booking_value?;
            if method == "Cash" {
                Some((true, value))
            } else if DIGITAL_PAYMENT_METHODS.contains(&method) {
                Some((false, value))
            } else {
                None
            }
        })),
        "H5" => Some(paired(features, |f| Some((f.avg_vtat?, f.booking_value?)))),
        "H6" => Some(paired(features, |f| Some((f.avg_vtat?, f.driver_ratings?)))),
        "H7" => Some(split_groups(features, |f| {
            let rating = f.driver_ratings?;
            if f.is_completed {
                Some((true, rating))
            } else if f.is_cancelled {
                Some((false, rating))
            } else {
                None
            }
        })),
        "H8" => Some(categorical_groups(features, |f| {
            Some((f.payment_method.clone()?, f.driver_ratings?))
        })),
        "H9" => Some(categorical_groups(features, |f| {
            Some((f.vehicle_type.clone()?, f.driver_ratings?))
        })),
        "H10" => Some(paired(features, |f| Some((f.avg_ctat?, f.customer_rating?)))),
        _ => None,
    }
}

/// Split rows into two groups on a boolean selector; rows where the selector
/// returns `None` are skipped.
fn split_groups(
    features: &[FeatureRecord],
    select: impl Fn(&FeatureRecord) -> Option<(bool, f64)>,
) -> SampleSet {
    let mut a = Vec::new();
    let mut b = Vec::new();
    for feature in features {
        match select(feature) {
            Some((true, value)) => a.push(value),
            Some((false, value)) => b.push(value),
            None => {}
        }
    }
    SampleSet::TwoGroups { a, b }
}

/// Group rows by a categorical label, in first-seen order for determinism.
fn categorical_groups(
    features: &[FeatureRecord],
    select: impl Fn(&FeatureRecord) -> Option<(String, f64)>,
) -> SampleSet {
    let mut groups: Vec<(String, Vec<f64>)> = Vec::new();
    for feature in features {
        let Some((label, value)) = select(feature) else {
            continue;
        };
        match groups.iter_mut().find(|(l, _)| *l == label) {
            Some((_, values)) => values.push(value),
            None => groups.push((label, vec![value])),
        }
    }
    SampleSet::Groups(groups)
}

/// Collect paired observations where both variables are present.
fn paired(
    features: &[FeatureRecord],
    select: impl Fn(&FeatureRecord) -> Option<(f64, f64)>,
) -> SampleSet {
    let mut x = Vec::new();
    let mut y = Vec::new();
    for feature in features {
        if let Some((a, b)) = select(feature) {
            x.push(a);
            y.push(b);
        }
    }
    SampleSet::Paired { x, y }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_has_ten_specs_in_order() {
        let specs = specs();
        assert_eq!(specs.len(), 10);
        for (i, spec) in specs.iter().enumerate() {
            assert_eq!(spec.id, format!("H{}", i + 1));
        }
    }

    #[test]
    fn every_spec_has_an_extraction_rule() {
        for spec in specs() {
            assert!(
                extract(&spec.id, &[]).is_some(),
                "no extraction rule for {}",
                spec.id
            );
        }
    }

    #[test]
    fn unknown_id_has_no_rule() {
        assert!(extract("H99", &[]).is_none());
    }
}
