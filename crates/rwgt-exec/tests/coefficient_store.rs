use proptest::prelude::*;
use rwgt_basis::BilinearBasis;
use rwgt_core::{ParameterSet, ReweightParameter};
use rwgt_exec::{DroppedEvent, EventCoefficientStore};

fn two_parameter_basis() -> BilinearBasis {
    let params = ParameterSet::new(vec![ReweightParameter::new("a"), ReweightParameter::new("b")])
        .unwrap();
    BilinearBasis::build(&params).unwrap()
}

fn fill(store: &mut EventCoefficientStore, basis: &BilinearBasis, event_id: i32, rows: usize) {
    for row in 0..rows {
        let point = basis.evaluation_matrix().row(row);
        store.append(event_id, 1.0 + point[0] - 2.0 * point[1] + point[0] * point[1]);
    }
}

#[test]
fn incomplete_events_are_dropped_and_complete_ones_kept() {
    let basis = two_parameter_basis();
    let mut store = EventCoefficientStore::for_basis(&basis);
    fill(&mut store, &basis, 10, 6);
    fill(&mut store, &basis, 11, 5);
    fill(&mut store, &basis, 12, 6);

    let dropped = store.retain_complete();
    assert_eq!(
        dropped,
        vec![DroppedEvent {
            event_id: 11,
            observed: 5,
            required: 6
        }]
    );
    assert!(!store.contains(11));
    assert!(store.coefficient_values(11).is_empty());
    assert_eq!(store.event_ids().collect::<Vec<_>>(), vec![10, 12]);
    assert_eq!(store.coefficient_values(12).len(), 6);
}

#[test]
fn duplicated_weights_make_an_event_incomplete() {
    let basis = two_parameter_basis();
    let mut store = EventCoefficientStore::for_basis(&basis);
    fill(&mut store, &basis, 4, 6);
    store.append(4, 0.5);
    assert_eq!(store.matrix_elements(4).len(), 7);
    assert!(store.coefficient_values(4).is_empty());
    assert_eq!(store.retain_complete()[0].observed, 7);
    assert!(store.is_empty());
}

#[test]
fn unknown_events_yield_empty_results() {
    let basis = two_parameter_basis();
    let store = EventCoefficientStore::for_basis(&basis);
    assert!(store.matrix_elements(99).is_empty());
    assert!(store.coefficient_values(99).is_empty());
}

#[test]
fn projected_coefficients_match_the_oracle() {
    let basis = two_parameter_basis();
    let mut store = EventCoefficientStore::for_basis(&basis);
    fill(&mut store, &basis, 1, 6);
    let coefs = store.coefficient_values(1);
    // 1 + a - 2b + ab  ->  [1, a, b, aa, ab, bb]
    let expected = [1.0, 1.0, -2.0, 0.0, 1.0, 0.0];
    for (got, want) in coefs.iter().zip(expected) {
        assert!((got - want).abs() < 1e-9, "{coefs:?}");
    }
}

#[test]
fn clear_discards_everything() {
    let basis = two_parameter_basis();
    let mut store = EventCoefficientStore::for_basis(&basis);
    fill(&mut store, &basis, 1, 3);
    store.clear();
    assert_eq!(store.len(), 0);
    assert_eq!(store.required(), 6);
}

proptest! {
    #[test]
    fn only_fully_sampled_events_survive(counts in proptest::collection::vec(0usize..9, 1..24)) {
        let basis = two_parameter_basis();
        let mut store = EventCoefficientStore::for_basis(&basis);
        for (event_id, count) in counts.iter().enumerate() {
            for row in 0..*count {
                store.append(event_id as i32, row as f64);
            }
        }
        let dropped = store.retain_complete();
        for (event_id, count) in counts.iter().enumerate() {
            let event_id = event_id as i32;
            let complete = *count == 6;
            prop_assert_eq!(store.contains(event_id), complete);
            prop_assert_eq!(store.coefficient_values(event_id).len(), if complete { 6 } else { 0 });
            let reported = dropped.iter().any(|drop| drop.event_id == event_id);
            prop_assert_eq!(reported, *count != 6 && *count != 0);
        }
    }
}
