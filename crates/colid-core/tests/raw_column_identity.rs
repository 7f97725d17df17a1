//! End-to-end identity derivation through the TOML loader.
//!
//! Covers the reference scenario: run `env-42`, an `age` integer column with
//! allowed values authored as `[5, 1, 3]`, and the edits that must (or must
//! not) move its identifiers.

use colid_core::column::{ColumnEntry, FloatColumn, IntegerColumn, StringColumn};
use colid_core::identity::{CONTENT_ID_LEN, ContentId, ResourceType};
use colid_core::{
    ConfigError, IdentityConfig, IdentityError, RawColumns, RunDiscriminator, derive_raw_columns,
};

fn derive_toml(doc: &str) -> RawColumns {
    IdentityConfig::from_toml(doc).unwrap().derive().unwrap()
}

fn age_doc(values: &str, max: i64, owner: &str) -> String {
    format!(
        r#"
run_id = "env-42"

[[raw_column]]
name = "age"
type = "INT_COLUMN"
required = true
min = 0
max = {max}
values = {values}
tags = {{ owner = "{owner}" }}
"#
    )
}

#[test]
fn test_reordered_values_share_base_id() {
    let a = derive_toml(&age_doc("[5, 1, 3]", 120, "teamA"));
    let b = derive_toml(&age_doc("[1, 3, 5]", 120, "teamA"));
    assert_eq!(a.get("age").unwrap().base_id, b.get("age").unwrap().base_id);
    assert_eq!(
        a.get("age").unwrap().id_with_tags,
        b.get("age").unwrap().id_with_tags
    );
}

#[test]
fn test_changed_max_moves_base_id() {
    let a = derive_toml(&age_doc("[5, 1, 3]", 120, "teamA"));
    let b = derive_toml(&age_doc("[5, 1, 3]", 121, "teamA"));
    assert_ne!(a.get("age").unwrap().base_id, b.get("age").unwrap().base_id);
}

#[test]
fn test_changed_tags_move_only_id_with_tags() {
    let a = derive_toml(&age_doc("[5, 1, 3]", 120, "teamA"));
    let b = derive_toml(&age_doc("[5, 1, 3]", 120, "teamB"));
    let (a, b) = (a.get("age").unwrap(), b.get("age").unwrap());
    assert_eq!(a.base_id, b.base_id);
    assert_ne!(a.id_with_tags, b.id_with_tags);
}

#[test]
fn test_loader_and_typed_api_agree() {
    let loaded = derive_toml(&age_doc("[5, 1, 3]", 120, "teamA"));

    let run = RunDiscriminator::new("env-42").unwrap();
    let typed = IntegerColumn {
        required: true,
        min: Some(0),
        max: Some(120),
        values: vec![5, 1, 3],
        tags: [("owner", "teamA")].into_iter().collect(),
        ..IntegerColumn::new("age")
    };
    let derived = derive_raw_columns(&run, &[ColumnEntry::from(typed)]).unwrap();

    assert_eq!(loaded, derived);
}

#[test]
fn test_ids_are_well_formed() {
    let columns = derive_toml(&age_doc("[5, 1, 3]", 120, "teamA"));
    let record = columns.get("age").unwrap();
    assert_eq!(record.resource_type, ResourceType::RawColumn);
    for id in [&record.base_id, &record.id_with_tags] {
        assert_eq!(id.as_str().len(), CONTENT_ID_LEN);
        assert_eq!(&ContentId::parse(id.as_str()).unwrap(), id);
    }
}

#[test]
fn test_every_field_is_identity_bearing() {
    let run = RunDiscriminator::new("env-42").unwrap();
    let base = IntegerColumn {
        required: true,
        min: Some(0),
        max: Some(120),
        values: vec![1, 3, 5],
        ..IntegerColumn::new("age")
    };
    let variants = [
        IntegerColumn {
            name: "years".to_string(),
            ..base.clone()
        },
        IntegerColumn {
            required: false,
            ..base.clone()
        },
        IntegerColumn {
            min: Some(1),
            ..base.clone()
        },
        IntegerColumn {
            min: None,
            ..base.clone()
        },
        IntegerColumn {
            max: Some(121),
            ..base.clone()
        },
        IntegerColumn {
            max: None,
            ..base.clone()
        },
        IntegerColumn {
            values: vec![1, 3, 6],
            ..base.clone()
        },
        IntegerColumn {
            values: vec![1, 3],
            ..base.clone()
        },
        IntegerColumn {
            values: Vec::new(),
            ..base.clone()
        },
    ];

    let mut seen = vec![colid_core::identity::base_id(&run, &base.clone().into())];
    for variant in variants {
        let id = colid_core::identity::base_id(&run, &variant.into());
        assert!(!seen.contains(&id), "collision for {id}");
        seen.push(id);
    }
}

#[test]
fn test_every_float_field_is_identity_bearing() {
    let run = RunDiscriminator::new("env-42").unwrap();
    let base = FloatColumn {
        required: false,
        min: Some(0.0),
        max: Some(1.0),
        values: vec![0.5],
        ..FloatColumn::new("ratio")
    };
    let variants = [
        FloatColumn {
            name: "share".to_string(),
            ..base.clone()
        },
        FloatColumn {
            required: true,
            ..base.clone()
        },
        FloatColumn {
            min: Some(0.25),
            ..base.clone()
        },
        FloatColumn {
            min: None,
            ..base.clone()
        },
        FloatColumn {
            max: Some(2.0),
            ..base.clone()
        },
        FloatColumn {
            max: None,
            ..base.clone()
        },
        FloatColumn {
            min: Some(1.0),
            max: Some(0.0),
            ..base.clone()
        },
        FloatColumn {
            values: vec![0.25],
            ..base.clone()
        },
        FloatColumn {
            values: vec![0.25, 0.5],
            ..base.clone()
        },
        FloatColumn {
            values: Vec::new(),
            ..base.clone()
        },
    ];

    let mut seen = vec![colid_core::identity::base_id(&run, &base.clone().into())];
    for variant in variants {
        let id = colid_core::identity::base_id(&run, &variant.into());
        assert!(!seen.contains(&id), "collision for {id}");
        seen.push(id);
    }
}

#[test]
fn test_every_string_field_is_identity_bearing() {
    let run = RunDiscriminator::new("env-42").unwrap();
    let base = StringColumn {
        required: false,
        values: vec!["paris".to_string(), "oslo".to_string()],
        ..StringColumn::new("city")
    };
    let variants = [
        StringColumn {
            name: "town".to_string(),
            ..base.clone()
        },
        StringColumn {
            required: true,
            ..base.clone()
        },
        StringColumn {
            values: vec!["paris".to_string()],
            ..base.clone()
        },
        StringColumn {
            values: vec!["paris".to_string(), "rome".to_string()],
            ..base.clone()
        },
        StringColumn {
            values: vec!["parisoslo".to_string()],
            ..base.clone()
        },
        StringColumn {
            values: Vec::new(),
            ..base.clone()
        },
    ];

    let mut seen = vec![colid_core::identity::base_id(&run, &base.clone().into())];
    for variant in variants {
        let id = colid_core::identity::base_id(&run, &variant.into());
        assert!(!seen.contains(&id), "collision for {id}");
        seen.push(id);
    }
}

#[test]
fn test_out_of_range_float_bound_is_rejected() {
    let err = IdentityConfig::from_toml(
        r#"
run_id = "env-42"

[[raw_column]]
name = "ratio"
type = "FLOAT_COLUMN"
max = 1e39
"#,
    )
    .unwrap_err();

    assert!(matches!(
        err,
        ConfigError::InvalidValue {
            key: "max",
            expected: "a value in f32 range",
            ..
        }
    ));
}

#[test]
fn test_declared_type_is_identity_bearing() {
    let run = RunDiscriminator::new("env-42").unwrap();
    let batch_int = [ColumnEntry::from(IntegerColumn::new("c"))];
    let batch_float = [ColumnEntry::from(FloatColumn::new("c"))];
    let batch_str = [ColumnEntry::from(StringColumn::new("c"))];

    let ids: Vec<_> = [&batch_int[..], &batch_float[..], &batch_str[..]]
        .into_iter()
        .map(|batch| {
            derive_raw_columns(&run, batch)
                .unwrap()
                .get("c")
                .unwrap()
                .base_id
                .clone()
        })
        .collect();

    assert_ne!(ids[0], ids[1]);
    assert_ne!(ids[1], ids[2]);
    assert_ne!(ids[0], ids[2]);
}

#[test]
fn test_unsupported_type_rejects_whole_batch() {
    let err = IdentityConfig::from_toml(
        r#"
run_id = "env-42"

[[raw_column]]
name = "age"
type = "INT_COLUMN"

[[raw_column]]
name = "born"
type = "DATE_COLUMN"
"#,
    )
    .unwrap()
    .derive()
    .unwrap_err();

    assert_eq!(
        err,
        IdentityError::UnsupportedVariant {
            name: "born".to_string(),
            declared_type: "DATE_COLUMN".to_string(),
            supported: vec!["INT_COLUMN", "FLOAT_COLUMN", "STRING_COLUMN"],
        }
    );
    assert!(err.to_string().contains("INT_COLUMN, FLOAT_COLUMN, STRING_COLUMN"));
}

#[test]
fn test_duplicate_names_reject_whole_batch() {
    let err = IdentityConfig::from_toml(
        r#"
run_id = "env-42"

[[raw_column]]
name = "age"
type = "INT_COLUMN"

[[raw_column]]
name = "age"
type = "STRING_COLUMN"
"#,
    )
    .unwrap()
    .derive()
    .unwrap_err();

    assert!(matches!(
        err,
        IdentityError::DuplicateName {
            first_index: 0,
            duplicate_index: 1,
            ..
        }
    ));
}

#[test]
fn test_records_survive_json_round_trip() {
    let columns = derive_toml(&age_doc("[5, 1, 3]", 120, "teamA"));
    let json = serde_json::to_string(&columns).unwrap();
    let back: RawColumns = serde_json::from_str(&json).unwrap();
    assert_eq!(back, columns);
}
