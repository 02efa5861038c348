use std::collections::BTreeMap;

use super::*;
use crate::dna::sampler::Gene;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "layermint_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn template(prefix: &str, uri: &str) -> MetadataTemplate {
    MetadataTemplate {
        name_prefix: prefix.to_string(),
        description: format!("{prefix} description"),
        base_uri: uri.to_string(),
        extra: BTreeMap::new(),
    }
}

fn sample_dna() -> Dna {
    Dna::from_genes(vec![
        Gene {
            option_id: 0,
            file_name: "Blue.png".to_string(),
            modifiers: None,
        },
        Gene {
            option_id: 1,
            file_name: "Tall.png".to_string(),
            modifiers: None,
        },
    ])
}

fn read_json(path: &Path) -> serde_json::Value {
    serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

#[test]
fn build_record_fills_every_field() {
    let emitter = MetadataEmitter::new("unused", template("Dogs", "ipfs://base"));
    let attrs = vec![
        Attribute::new("Background", "Blue"),
        Attribute::new("Body", "Tall"),
    ];
    let rec = emitter.build_record(&sample_dna(), attrs.clone(), 5);
    assert_eq!(rec.name, "Dogs #5");
    assert_eq!(rec.description, "Dogs description");
    assert_eq!(rec.image, "ipfs://base/5.png");
    assert_eq!(rec.dna, dna_hash("0:Blue.png-1:Tall.png"));
    assert_eq!(rec.edition, 5);
    assert!(rec.date > 0);
    assert_eq!(rec.attributes, attrs);
}

#[test]
fn emit_writes_single_files_and_index() {
    let dir = temp_dir("emitter_emit");
    let mut emitter = MetadataEmitter::new(&dir, template("Dogs", "ipfs://base"));

    for edition in [2, 1] {
        let rec = emitter.build_record(&sample_dna(), vec![], edition);
        let path = emitter.emit(rec).unwrap();
        assert_eq!(path, dir.join(format!("{edition}.json")));
    }

    let single = read_json(&dir.join("2.json"));
    assert_eq!(single["edition"], 2);
    assert_eq!(single["name"], "Dogs #2");

    let index_path = emitter.write_index().unwrap();
    assert_eq!(index_path, dir.join(METADATA_INDEX_FILE));
    let index = read_json(&index_path);
    let editions: Vec<_> = index
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["edition"].as_u64().unwrap())
        .collect();
    assert_eq!(editions, [2, 1]);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn failed_emit_is_left_out_of_the_index() {
    let root = temp_dir("emitter_missing_dir");
    let json_dir = root.join("json");
    let mut emitter = MetadataEmitter::new(&json_dir, template("Dogs", "u"));
    let rec = emitter.build_record(&sample_dna(), vec![], 1);
    assert!(emitter.emit(rec).is_err());

    std::fs::create_dir_all(&json_dir).unwrap();
    let index = read_json(&emitter.write_index().unwrap());
    assert_eq!(index, serde_json::json!([]));

    std::fs::remove_dir_all(&root).ok();
}

#[test]
fn refresh_rewrites_template_fields_only() {
    let dir = temp_dir("emitter_refresh");
    let mut emitter = MetadataEmitter::new(&dir, template("Old", "ipfs://old"));
    let rec = emitter.build_record(&sample_dna(), vec![Attribute::new("Body", "Tall")], 1);
    let original_hash = rec.dna.clone();
    let original_date = rec.date;
    emitter.emit(rec).unwrap();
    emitter.write_index().unwrap();

    let mut fresh = template("New", "ipfs://new");
    fresh
        .extra
        .insert("compiler".to_string(), serde_json::json!("layermint"));
    let records = refresh_metadata(&dir, &fresh).unwrap();
    assert_eq!(records.len(), 1);

    let index = read_json(&dir.join(METADATA_INDEX_FILE));
    for value in [read_json(&dir.join("1.json")), index[0].clone()] {
        assert_eq!(value["name"], "New #1");
        assert_eq!(value["description"], "New description");
        assert_eq!(value["image"], "ipfs://new/1.png");
        assert_eq!(value["compiler"], "layermint");
        assert_eq!(value["dna"], original_hash.as_str());
        assert_eq!(value["date"], original_date);
        assert_eq!(value["attributes"][0]["value"], "Tall");
    }

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn refresh_requires_index() {
    let dir = temp_dir("emitter_refresh_missing");
    assert!(refresh_metadata(&dir, &template("X", "u")).is_err());
    std::fs::remove_dir_all(&dir).ok();
}
