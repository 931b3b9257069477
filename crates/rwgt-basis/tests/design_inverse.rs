use rwgt_basis::{coefficient_names, design_matrix, BilinearBasis, DenseMatrix};
use rwgt_core::{ParameterSet, ReweightParameter, RwgtError};

fn unit_parameters(names: &[&str]) -> ParameterSet {
    ParameterSet::new(names.iter().map(|name| ReweightParameter::new(*name)).collect())
        .expect("valid parameters")
}

fn assert_identity(matrix: &DenseMatrix, tolerance: f64) {
    for r in 0..matrix.nrows() {
        for c in 0..matrix.ncols() {
            let expected = if r == c { 1.0 } else { 0.0 };
            assert!(
                (matrix[(r, c)] - expected).abs() < tolerance,
                "entry ({r},{c}) = {}",
                matrix[(r, c)]
            );
        }
    }
}

#[test]
fn design_times_inverse_is_identity() {
    let basis = BilinearBasis::build(&unit_parameters(&["x", "y"])).expect("basis");
    let design = design_matrix(basis.evaluation_matrix()).expect("design");
    let product = design.mul(basis.inverse_design()).expect("product");
    assert_identity(&product, 1e-9);
    assert!((basis.determinant().abs() - 4.0).abs() < 1e-9);
}

#[test]
fn shifted_and_scaled_design_is_invertible() {
    let params = ParameterSet::new(vec![
        ReweightParameter::new("cW").with_transform(0.3, 1.0),
        ReweightParameter::new("cHB").with_transform(-2.0, 0.5),
        ReweightParameter::new("cHWB").with_transform(10.0, -3.0),
    ])
    .expect("params");
    let basis = BilinearBasis::build(&params).expect("basis");
    let design = design_matrix(basis.evaluation_matrix()).expect("design");
    assert_identity(&design.mul(basis.inverse_design()).expect("product"), 1e-8);
}

#[test]
fn degenerate_parameters_raise_singular_matrix() {
    let params = ParameterSet::new(vec![
        ReweightParameter::new("x").with_transform(0.0, 0.0),
        ReweightParameter::new("y").with_transform(0.0, 0.0),
    ])
    .expect("params");
    match BilinearBasis::build(&params) {
        Err(RwgtError::Matrix(info)) => {
            assert_eq!(info.code, "singular-design");
            assert!(info.context.contains_key("determinant"));
        }
        other => panic!("expected singular design, got {other:?}"),
    }
}

#[test]
fn single_degenerate_column_is_also_rejected() {
    let params = ParameterSet::new(vec![
        ReweightParameter::new("x"),
        ReweightParameter::new("y").with_transform(0.0, 3.0),
    ])
    .expect("params");
    let err = BilinearBasis::build(&params).unwrap_err();
    assert_eq!(err.code(), "singular-design");
}

#[test]
fn small_scales_are_not_mistaken_for_singular() {
    let names: Vec<String> = (0..7).map(|i| format!("c{i}")).collect();
    let params = ParameterSet::new(
        names
            .iter()
            .map(|name| ReweightParameter::new(name.as_str()).with_transform(0.5, 0.0))
            .collect(),
    )
    .expect("params");
    let basis = BilinearBasis::build(&params).expect("basis");
    assert_eq!(basis.sample_count(), 36);
    assert!(basis.determinant().abs() < f64::EPSILON);
}

#[test]
fn coefficient_names_follow_monomial_order() {
    let names = coefficient_names(&unit_parameters(&["cW", "cHB"]));
    assert_eq!(
        names,
        vec![
            "F_0_0",
            "F_0_1_cW",
            "F_0_2_cHB",
            "F_1_1_cW",
            "F_1_2_cW_cHB",
            "F_2_2_cHB",
        ]
    );
}

#[test]
fn assignments_expose_scaled_rows() {
    let params = ParameterSet::new(vec![ReweightParameter::new("x").with_transform(2.0, 0.0)])
        .expect("params");
    let basis = BilinearBasis::build(&params).expect("basis");
    let values: Vec<f64> = basis
        .assignments()
        .iter()
        .map(|assignment| assignment.value_of("x").expect("x"))
        .collect();
    assert_eq!(values, vec![0.0, 2.0, -2.0]);
    assert!(basis.assignment(3).is_none());
}

#[test]
fn fingerprint_is_stable() {
    let params = unit_parameters(&["a", "b", "c"]);
    let first = BilinearBasis::build(&params).expect("basis");
    let second = BilinearBasis::build(&params).expect("basis");
    assert_eq!(first.fingerprint().expect("hash"), second.fingerprint().expect("hash"));
}

#[test]
fn basis_serializes_for_inspection() {
    let params = unit_parameters(&["a"]);
    let basis = BilinearBasis::build(&params).expect("basis");
    let value = serde_json::to_value(&basis).expect("json");
    assert_eq!(value["parameters"][0]["name"], "a");
    assert_eq!(value["evaluation"]["rows"], 3);
    assert_eq!(value["evaluation"]["data"][1], 1.0);
    assert_eq!(value["coefficient_names"][2], "F_1_1_a");
}

#[test]
fn matrix_round_trips_through_json_with_validation() {
    let matrix = DenseMatrix::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0]]).expect("matrix");
    let json = serde_json::to_string(&matrix).expect("encode");
    let back: DenseMatrix = serde_json::from_str(&json).expect("decode");
    assert_eq!(back, matrix);
    let broken = r#"{"rows":2,"cols":2,"data":[1.0,2.0,3.0]}"#;
    assert!(serde_json::from_str::<DenseMatrix>(broken).is_err());
}

#[test]
fn unit_designs_are_invertible_up_to_eight_parameters() {
    let names = ["a", "b", "c", "d", "e", "f", "g", "h"];
    for n in 1..=names.len() {
        let basis = BilinearBasis::build(&unit_parameters(&names[..n])).expect("basis");
        let design = design_matrix(basis.evaluation_matrix()).expect("design");
        let product = design.mul(basis.inverse_design()).expect("product");
        assert_identity(&product, 1e-8);
    }
}

#[test]
fn large_scales_are_not_mistaken_for_singular() {
    for scale in [1e6, 1e8, 1e9] {
        let params =
            ParameterSet::new(vec![ReweightParameter::new("x").with_transform(scale, 0.0)])
                .expect("params");
        let basis = BilinearBasis::build(&params).expect("basis");
        assert!(basis.min_relative_pivot() > 0.5, "scale {scale:e}");
        assert!((basis.determinant() / (2.0 * scale.powi(3)) - 1.0).abs() < 1e-12);

        let samples: Vec<f64> = basis
            .evaluation_matrix()
            .row_iter()
            .map(|row| 5.0 + 3.0 * row[0] + 7.0 * row[0] * row[0])
            .collect();
        let coefs = basis.project(&samples).expect("project");
        assert!((coefs[0] - 5.0).abs() < 1e-9, "scale {scale:e}: {}", coefs[0]);
        assert!((coefs[1] - 3.0).abs() < 1e-5, "scale {scale:e}: {}", coefs[1]);
        assert!((coefs[2] - 7.0).abs() < 1e-9, "scale {scale:e}: {}", coefs[2]);
    }
}
