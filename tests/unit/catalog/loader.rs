use super::*;

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "layermint_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn touch(dir: &Path, name: &str) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(name), b"x").unwrap();
}

#[test]
fn clean_name_strips_extension_and_rarity() {
    assert_eq!(clean_name("Red Eyes#20.png", "#"), "Red Eyes");
    assert_eq!(clean_name("Blue.png", "#"), "Blue");
    assert_eq!(clean_name("noext", "#"), "noext");
    assert_eq!(clean_name("a.b.png", "#"), "a.b");
}

#[test]
fn rarity_weight_defaults_to_one() {
    assert_eq!(rarity_weight("Red#20.png", "#"), 20);
    assert_eq!(rarity_weight("Red.png", "#"), 1);
    assert_eq!(rarity_weight("Red#rare.png", "#"), 1);
    assert_eq!(rarity_weight("Red#0.png", "#"), 0);
}

#[test]
fn load_assigns_dense_sorted_ids_and_skips_hidden() {
    let root = temp_dir("catalog_load");
    let bg = root.join("Background");
    touch(&bg, "b.png");
    touch(&bg, "a.png");
    touch(&bg, ".DS_Store");
    std::fs::create_dir_all(bg.join("nested")).unwrap();
    touch(&root.join("Body"), "Body#3.png");

    let catalog = LayerCatalog::load(
        &root,
        &[LayerSpec::new("Background"), LayerSpec::new("Body")],
        &WeightPolicy::Uniform { weight: 10 },
        "#",
    )
    .unwrap();

    let cats = catalog.categories();
    assert_eq!(cats.len(), 2);
    assert_eq!(cats[0].id, 0);
    assert_eq!(cats[1].id, 1);
    let names: Vec<_> = cats[0].options.iter().map(|o| o.file_name.as_str()).collect();
    assert_eq!(names, ["a.png", "b.png"]);
    assert_eq!(cats[0].options[1].id, 1);
    assert!(cats[0].options.iter().all(|o| o.weight == 10));
    assert_eq!(cats[1].options[0].display_name, "Body");
    assert_eq!(catalog.combination_count(), 2);

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn load_file_name_weights() {
    let root = temp_dir("catalog_weights");
    touch(&root.join("Eyes"), "Common#8.png");
    touch(&root.join("Eyes"), "Rare#1.png");
    touch(&root.join("Eyes"), "Plain.png");

    let catalog =
        LayerCatalog::load(&root, &[LayerSpec::new("Eyes")], &WeightPolicy::FileName, "#")
            .unwrap();
    let weights: Vec<_> = catalog.categories()[0]
        .options
        .iter()
        .map(|o| (o.display_name.as_str(), o.weight))
        .collect();
    assert_eq!(weights, [("Common", 8), ("Plain", 1), ("Rare", 1)]);

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn load_rejects_zero_file_name_weight() {
    let root = temp_dir("catalog_zero_weight");
    touch(&root.join("Eyes"), "Never#0.png");
    let err = LayerCatalog::load(&root, &[LayerSpec::new("Eyes")], &WeightPolicy::FileName, "#")
        .unwrap_err();
    assert!(matches!(err, MintError::Configuration(_)));
    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn load_rejects_missing_or_empty_directory() {
    let root = temp_dir("catalog_missing");
    std::fs::create_dir_all(root.join("Empty")).unwrap();
    touch(&root.join("Empty"), ".hidden");

    let missing = LayerCatalog::load(
        &root,
        &[LayerSpec::new("Nope")],
        &WeightPolicy::default(),
        "#",
    )
    .unwrap_err();
    assert!(missing.to_string().contains("does not exist"));

    let empty = LayerCatalog::load(
        &root,
        &[LayerSpec::new("Empty")],
        &WeightPolicy::default(),
        "#",
    )
    .unwrap_err();
    assert!(empty.to_string().contains("no usable files"));

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn from_categories_checks_invariants() {
    let opt = |id: u32, weight: u32| TraitOption {
        id,
        display_name: format!("o{id}"),
        file_name: format!("o{id}.png"),
        asset_path: PathBuf::from(format!("o{id}.png")),
        weight,
    };
    let cat = |id: u32, options: Vec<TraitOption>| TraitCategory {
        id,
        name: format!("c{id}"),
        bypass_dna: false,
        options,
    };

    assert!(LayerCatalog::from_categories(vec![cat(0, vec![opt(0, 1)])]).is_ok());
    assert!(LayerCatalog::from_categories(vec![]).is_err());
    assert!(LayerCatalog::from_categories(vec![cat(1, vec![opt(0, 1)])]).is_err());
    assert!(LayerCatalog::from_categories(vec![cat(0, vec![opt(1, 1)])]).is_err());
    assert!(LayerCatalog::from_categories(vec![cat(0, vec![opt(0, 0)])]).is_err());
    assert!(LayerCatalog::from_categories(vec![cat(0, vec![])]).is_err());
}
