use std::path::PathBuf;

use super::*;
use crate::catalog::loader::{TraitCategory, TraitOption};

fn category(id: u32, name: &str, weights: &[u32], bypass_dna: bool) -> TraitCategory {
    TraitCategory {
        id,
        name: name.to_string(),
        bypass_dna,
        options: weights
            .iter()
            .enumerate()
            .map(|(i, &weight)| TraitOption {
                id: i as u32,
                display_name: format!("{name}{i}"),
                file_name: format!("{name}{i}.png"),
                asset_path: PathBuf::from(format!("{name}/{name}{i}.png")),
                weight,
            })
            .collect(),
    }
}

#[test]
fn weighted_pick_matches_expected_frequencies() {
    let mut rng = StdRng::seed_from_u64(42);
    let weights = [1u32, 1, 8];
    let mut counts = [0u32; 3];
    let draws = 100_000;
    for _ in 0..draws {
        counts[pick_weighted_index(&weights, &mut rng).unwrap()] += 1;
    }
    let expected = [0.1, 0.1, 0.8];
    for (count, exp) in counts.iter().zip(expected) {
        let freq = f64::from(*count) / f64::from(draws);
        assert!((freq - exp).abs() < 0.01, "freq {freq} vs {exp}");
    }
}

#[test]
fn weighted_pick_handles_single_and_empty() {
    let mut rng = StdRng::seed_from_u64(1);
    assert_eq!(pick_weighted_index(&[5], &mut rng), Some(0));
    assert_eq!(pick_weighted_index(&[], &mut rng), None);
    assert_eq!(pick_weighted_index(&[0, 0], &mut rng), None);
    for _ in 0..100 {
        assert_eq!(pick_weighted_index(&[0, 3, 0], &mut rng), Some(1));
    }
}

#[test]
fn sample_emits_one_gene_per_category_in_order() {
    let catalog = LayerCatalog::from_categories(vec![
        category(0, "Background", &[1, 1], false),
        category(1, "Body", &[1, 1, 1], false),
    ])
    .unwrap();
    let mut sampler = DnaSampler::from_seed(Some(9));
    let dna = sampler.sample(&catalog).unwrap();

    assert_eq!(dna.genes().len(), 2);
    assert!(dna.genes()[0].file_name.starts_with("Background"));
    assert!(dna.genes()[1].file_name.starts_with("Body"));
    let encoded = dna.encoded();
    let first = &dna.genes()[0];
    assert!(encoded.starts_with(&format!("{}:{}-", first.option_id, first.file_name)));
}

#[test]
fn seeded_samplers_are_reproducible() {
    let catalog =
        LayerCatalog::from_categories(vec![category(0, "Eyes", &[3, 2, 9, 1], false)]).unwrap();
    let mut a = DnaSampler::from_seed(Some(77));
    let mut b = DnaSampler::from_seed(Some(77));
    for _ in 0..50 {
        assert_eq!(a.sample(&catalog).unwrap(), b.sample(&catalog).unwrap());
    }
}

#[test]
fn bypass_categories_carry_modifier() {
    let catalog = LayerCatalog::from_categories(vec![
        category(0, "Background", &[1], true),
        category(1, "Body", &[1], false),
    ])
    .unwrap();
    let dna = DnaSampler::from_seed(Some(1)).sample(&catalog).unwrap();
    assert_eq!(
        dna.encoded(),
        "0:Background0.png?bypassDNA=true-0:Body0.png"
    );
    assert_eq!(dna.canonical(), "0:Background0.png-0:Body0.png");
}

#[test]
fn canonicalize_ignores_bypass_modifier() {
    let x = "0:Red.png-2:Tall.png";
    assert_eq!(canonicalize(&format!("{x}?bypassDNA=true")), canonicalize(x));
    assert_eq!(
        canonicalize("0:Red.png?bypassDNA=true&foo=1-2:Tall.png"),
        "0:Red.png-2:Tall.png"
    );
    assert_eq!(canonicalize(x), x);
}

#[test]
fn gene_display_includes_modifiers() {
    let g = Gene {
        option_id: 3,
        file_name: "Hat.png".to_string(),
        modifiers: Some(BYPASS_DNA_MODIFIER.to_string()),
    };
    assert_eq!(g.to_string(), "3:Hat.png?bypassDNA=true");
}
