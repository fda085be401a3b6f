use tablekit_core::{
    decode, encode, format_field, parse_line, ColumnType, Error, FromRow, Row, Table, TableAsset,
    Value,
};

const DOCUMENT: &str = "#MyTable
#,Name,Age
#,String,Int
,Alice,30
,Bob,notanumber
";

#[derive(Debug, PartialEq)]
struct Person {
    name: String,
    age: i32,
}

impl FromRow for Person {
    fn from_row(row: &Row) -> Option<Self> {
        Some(Self {
            name: row.get_str("Name")?.to_string(),
            age: row.get_int("Age")?,
        })
    }
}

fn inventory() -> Table {
    let mut table = Table::new("Inventory");
    table.add_column("Item", ColumnType::String).unwrap();
    table.add_column("Count", ColumnType::Int).unwrap();
    table.add_column("Weight", ColumnType::Float).unwrap();

    for (item, count, weight) in [
        ("Sword", 1, 3.5f32),
        ("Arrows, bundle", 20, 0.05),
        ("Note \"urgent\"", 0, 0.0),
        ("Map\nof the north", -1, 1e-3),
    ] {
        let row: Row = [
            ("Item", Value::String(item.to_string())),
            ("Count", Value::Int(count)),
            ("Weight", Value::Float(weight)),
        ]
        .into_iter()
        .collect();
        table.push_row(row).unwrap();
    }
    table
}

#[test]
fn decodes_document_into_records() {
    let table = decode(DOCUMENT).unwrap();
    let people: Vec<Person> = table.to_list();

    assert_eq!(
        people,
        vec![
            Person {
                name: "Alice".to_string(),
                age: 30
            },
            Person {
                name: "Bob".to_string(),
                age: 0
            },
        ]
    );
}

#[test]
fn encode_matches_document_up_to_trailing_newline() {
    let table = decode(DOCUMENT).unwrap();
    assert_eq!(
        encode(&table),
        "#MyTable\n#,Name,Age\n#,String,Int\n,Alice,30\n,Bob,0"
    );
}

#[test]
fn decode_encode_round_trip() {
    let table = inventory();
    let decoded = decode(&encode(&table)).unwrap();

    assert_eq!(decoded.name, table.name);
    let names = |t: &Table| -> Vec<(String, ColumnType)> {
        t.columns().map(|c| (c.name.clone(), c.ty)).collect()
    };
    assert_eq!(names(&decoded), names(&table));
    assert_eq!(decoded.rows(), table.rows());
}

#[test]
fn asset_projection_survives_csv_round_trip() {
    let asset = TableAsset::from_table(&inventory());
    let csv = encode(&asset.to_table().unwrap());
    let back = TableAsset::from_table(&decode(&csv).unwrap());
    assert_eq!(back, asset);
}

#[test]
fn single_field_round_trip() {
    for s in ["a,b", "quote\"inside", "multi\nline", "\"", ",,,", "\r\n"] {
        assert_eq!(parse_line(&format_field(s)), vec![s.to_string()]);
    }
}

#[test]
fn unknown_type_label_is_fatal() {
    for label in ["bool", "double", "Integer", "FLOAT"] {
        let text = format!("#T\n#,A\n#,{}\n,1", label);
        assert!(
            matches!(decode(&text), Err(Error::UnknownColumnType { .. })),
            "label {}",
            label
        );
    }
}
