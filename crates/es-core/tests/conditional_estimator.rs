//! Monte-Carlo conditional priors p(param | χeff).

use es_config::{EvidenceMethod, Numerics};
use es_core::{rng_from_seed, ConditionalPriorEstimator, Error, PriorDict, SpinParameter};
use es_math::{make_grid, trapezoid};

fn numerics(mc_samples: usize) -> Numerics {
    Numerics {
        mc_samples,
        evidence_points: 201,
        mass_ratio_points: 300,
        ..Numerics::default()
    }
}

#[test]
fn seeded_estimates_are_identical() {
    let prior = PriorDict::isotropic();
    let n = numerics(5_000);
    let estimator = ConditionalPriorEstimator::new(&prior, &n);
    let grid = make_grid(0.0, 1.0, 11);

    let first = estimator
        .conditional_density_on_grid(SpinParameter::A2, &grid, 0.2, &mut rng_from_seed(Some(42)))
        .unwrap();
    let second = estimator
        .conditional_density_on_grid(SpinParameter::A2, &grid, 0.2, &mut rng_from_seed(Some(42)))
        .unwrap();
    assert_eq!(first, second);

    let other = estimator
        .conditional_density_on_grid(SpinParameter::A2, &grid, 0.2, &mut rng_from_seed(Some(43)))
        .unwrap();
    assert_ne!(first, other);
}

#[test]
fn variance_shrinks_with_sample_count() {
    let prior = PriorDict::isotropic();
    let replicates = 30u64;
    let mut variances = Vec::new();

    for &mc in &[250usize, 1_000, 4_000] {
        let n = numerics(mc);
        let estimator = ConditionalPriorEstimator::new(&prior, &n);
        let values: Vec<f64> = (0..replicates)
            .map(|seed| {
                estimator
                    .joint_density(SpinParameter::A1, 0.5, 0.1, &mut rng_from_seed(Some(seed)))
                    .unwrap()
            })
            .collect();
        let mean = values.iter().sum::<f64>() / values.len() as f64;
        let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
        variances.push(var);
    }

    assert!(
        variances.windows(2).all(|w| w[1] < w[0]),
        "variances not decreasing: {:?}",
        variances
    );
}

#[test]
fn a1_given_xeff_scenario() {
    let prior = PriorDict::isotropic();
    let n = numerics(20_000);
    let estimator = ConditionalPriorEstimator::new(&prior, &n);
    let p = estimator
        .conditional_density(SpinParameter::A1, 0.5, 0.1, &mut rng_from_seed(Some(1)))
        .unwrap();
    assert!(p.is_finite());
    assert!(p > 0.8 && p < 1.15, "p(a1=0.5 | xeff=0.1) = {}", p);
    assert_ne!(p, 1.0);
}

#[test]
fn conditional_integrates_to_one() {
    let prior = PriorDict::isotropic();
    let n = numerics(20_000);
    let estimator = ConditionalPriorEstimator::new(&prior, &n);
    let grid = make_grid(0.0, 1.0, 51);
    let p = estimator
        .conditional_density_on_grid(SpinParameter::A1, &grid, 0.1, &mut rng_from_seed(Some(5)))
        .unwrap();
    let mass = trapezoid(&p, &grid);
    assert!((mass - 1.0).abs() < 0.05, "mass = {}", mass);
}

#[test]
fn analytic_and_monte_carlo_evidence_agree() {
    let prior = PriorDict::isotropic();
    let n = numerics(20_000);
    let mc = ConditionalPriorEstimator::new(&prior, &n).with_evidence_method(EvidenceMethod::MonteCarlo);
    let analytic = mc.clone().with_evidence_method(EvidenceMethod::Analytic);

    let mut rng = rng_from_seed(Some(8));
    let sampled = mc.xeff_evidence(0.1, &mut rng);
    let exact = analytic.xeff_evidence(0.1, &mut rng);
    assert!((sampled - exact).abs() < 0.05, "mc {} vs analytic {}", sampled, exact);
    assert!((exact - 1.449).abs() < 0.01, "analytic {}", exact);
}

#[test]
fn outside_support_yields_zero_not_error() {
    let prior = PriorDict::isotropic();
    let n = numerics(2_000);
    let estimator = ConditionalPriorEstimator::new(&prior, &n);
    let grid = make_grid(0.0, 1.0, 5);
    for xeff in [1.0, -1.5] {
        let p = estimator
            .conditional_density_on_grid(SpinParameter::Q, &grid, xeff, &mut rng_from_seed(Some(3)))
            .unwrap();
        assert!(p.iter().all(|&v| v == 0.0), "xeff {}: {:?}", xeff, p);
    }
}

#[test]
fn cos1_cannot_be_conditioned() {
    let prior = PriorDict::isotropic();
    let n = numerics(100);
    let estimator = ConditionalPriorEstimator::new(&prior, &n);
    let err = estimator
        .conditional_density(SpinParameter::Cos1, 0.0, 0.1, &mut rng_from_seed(Some(1)))
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedConditioning(_)));
}
