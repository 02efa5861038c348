use super::*;
use crate::dna::sampler::Gene;

fn dna(ids: &[u32], bypass: bool) -> Dna {
    Dna::from_genes(
        ids.iter()
            .map(|&id| Gene {
                option_id: id,
                file_name: format!("{id}.png"),
                modifiers: bypass.then(|| "bypassDNA=true".to_string()),
            })
            .collect(),
    )
}

#[test]
fn accepted_dna_is_no_longer_unique() {
    let mut t = UniquenessTracker::new(10);
    let a = dna(&[0, 1], false);
    assert!(t.is_unique(&a));
    assert!(t.accept(&a));
    assert!(!t.is_unique(&a));
    assert!(t.is_unique(&dna(&[1, 0], false)));
    assert!(!t.accept(&a));
}

#[test]
fn bypass_modifier_does_not_change_identity() {
    let mut t = UniquenessTracker::new(10);
    t.accept(&dna(&[0, 1], false));
    assert!(!t.is_unique(&dna(&[0, 1], true)));
    assert!(!t.accept(&dna(&[0, 1], true)));
}

#[test]
fn is_unique_does_not_consume() {
    let mut t = UniquenessTracker::new(10);
    let a = dna(&[2], false);
    assert!(t.is_unique(&a));
    assert!(t.is_unique(&a));
    assert!(t.accept(&a));
}

#[test]
fn duplicates_exhaust_at_tolerance() {
    let mut t = UniquenessTracker::new(3);
    assert_eq!(t.record_duplicate(), DuplicateVerdict::Retry);
    assert_eq!(t.record_duplicate(), DuplicateVerdict::Retry);
    assert_eq!(t.record_duplicate(), DuplicateVerdict::Exhausted);
    assert_eq!(t.failures(), 3);
}
