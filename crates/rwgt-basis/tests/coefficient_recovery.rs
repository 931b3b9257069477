use proptest::prelude::*;
use rwgt_basis::{weight_at, BilinearBasis};
use rwgt_core::{sample_count, ParameterSet, ReweightParameter};

fn basis_for(transforms: &[(f64, f64)]) -> BilinearBasis {
    let params = ParameterSet::new(
        transforms
            .iter()
            .enumerate()
            .map(|(i, (scale, offset))| {
                ReweightParameter::new(format!("c{}", i + 1)).with_transform(*scale, *offset)
            })
            .collect(),
    )
    .expect("params");
    BilinearBasis::build(&params).expect("basis")
}

fn sample_oracle(basis: &BilinearBasis, truth: &[f64]) -> Vec<f64> {
    basis
        .evaluation_matrix()
        .row_iter()
        .map(|point| weight_at(truth, point).expect("oracle"))
        .collect()
}

fn assert_close(found: &[f64], expected: &[f64], tolerance: f64) {
    assert_eq!(found.len(), expected.len());
    for (index, (a, b)) in found.iter().zip(expected).enumerate() {
        assert!((a - b).abs() < tolerance, "coefficient {index}: {a} vs {b}");
    }
}

#[test]
fn single_parameter_end_to_end() {
    let basis = basis_for(&[(2.0, 0.0)]);
    let xs: Vec<f64> = basis.evaluation_matrix().row_iter().map(|row| row[0]).collect();
    assert_eq!(xs, vec![0.0, 2.0, -2.0]);
    let samples: Vec<f64> = xs.iter().map(|x| 5.0 + 3.0 * x + 7.0 * x * x).collect();
    let coefs = basis.project(&samples).expect("project");
    assert_close(&coefs, &[5.0, 3.0, 7.0], 1e-9);
}

#[test]
fn two_parameter_oracle_is_recovered() {
    let truth = [1.5, -2.0, 0.75, 3.0, -1.25, 0.5];
    let basis = basis_for(&[(1.0, 0.0), (1.0, 0.0)]);
    let coefs = basis.project(&sample_oracle(&basis, &truth)).expect("project");
    assert_close(&coefs, &truth, 1e-9);
}

#[test]
fn four_parameter_oracle_is_recovered_with_offsets() {
    let truth: Vec<f64> = (0..sample_count(4)).map(|k| (k as f64 * 0.37).sin() * 4.0).collect();
    let basis = basis_for(&[(0.5, 0.1), (2.0, -1.0), (1.0, 0.0), (0.25, 3.0)]);
    let coefs = basis.project(&sample_oracle(&basis, &truth)).expect("project");
    assert_close(&coefs, &truth, 1e-7);
}

#[test]
fn surrogate_matches_oracle_off_the_sample_points() {
    let truth = [0.2, 1.0, -3.0, 0.5, 0.125, 2.0];
    let basis = basis_for(&[(1.5, 0.0), (0.5, 0.2)]);
    let coefs = basis.project(&sample_oracle(&basis, &truth)).expect("project");
    let point = [0.37, -1.9];
    let direct = weight_at(&truth, &point).expect("truth");
    let surrogate = weight_at(&coefs, &point).expect("surrogate");
    assert!((direct - surrogate).abs() < 1e-9);
}

#[test]
fn projection_rejects_wrong_length() {
    let basis = basis_for(&[(1.0, 0.0)]);
    let err = basis.project(&[1.0, 2.0]).unwrap_err();
    assert_eq!(err.code(), "sample-length");
}

fn transform() -> impl Strategy<Value = (f64, f64)> {
    (0.75f64..2.0, any::<bool>(), -1.0f64..1.0)
        .prop_map(|(scale, negative, offset)| (if negative { -scale } else { scale }, offset))
}

proptest! {
    #[test]
    fn generic_transforms_give_invertible_designs(
        transforms in prop::collection::vec(transform(), 1..=6),
        seed in 0u32..1000,
    ) {
        let basis = basis_for(&transforms);
        prop_assert!(basis.min_relative_pivot() >= f64::EPSILON);

        let m = basis.sample_count();
        let truth: Vec<f64> = (0..m)
            .map(|k| ((k as f64 + 1.0) * (seed as f64 + 0.5) * 0.113).cos())
            .collect();
        let coefs = basis.project(&sample_oracle(&basis, &truth)).expect("project");
        for (a, b) in coefs.iter().zip(&truth) {
            prop_assert!((a - b).abs() < 1e-6, "{} vs {}", a, b);
        }
    }
}
