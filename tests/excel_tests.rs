//! Record export/import tests against the in-memory store and real .xlsx files

use pretty_assertions::assert_eq;
use sheetbind::excel::{
    export, export_to_bytes, import, import_from_bytes, import_with, ExcelExporter,
    ExcelImporter, ImportOptions, MemoryWorkbook, SheetSource, UnsupportedPolicy, XlsxSink,
    XlsxSource,
};
use sheetbind::{resolve_schema, ColumnSchema, SheetError};
use tempfile::TempDir;

sheetbind::sheet_record! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct Person {
        #[column = "Name"]
        pub name: String,
        #[column = "Age"]
        pub age: i64,
    }
}

sheetbind::sheet_record! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct Measurement {
        #[column = "Station"]
        pub station: String,
        #[column = "Reading"]
        pub reading: f64,
        #[column = "Count"]
        pub count: u32,
        #[column = "Delta"]
        pub delta: i16,
        pub note: String,
    }
}

sheetbind::sheet_record! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct Extremes {
        #[column = "Signed"]
        pub signed: i64,
        #[column = "Unsigned"]
        pub unsigned: u64,
        #[column = "Size"]
        pub size: usize,
        #[column = "Tiny"]
        pub tiny: i8,
        #[column = "Wide"]
        pub wide: f64,
        #[column = "Narrow"]
        pub narrow: f32,
    }
}

sheetbind::sheet_record! {
    #[derive(Debug, Clone, PartialEq, Default)]
    pub struct Flagged {
        #[column = "Name"]
        pub name: String,
        #[column = "Active"]
        pub active: bool,
    }
}

fn people() -> Vec<Person> {
    vec![
        Person {
            name: "Ann".to_string(),
            age: 30,
        },
        Person {
            name: "Bo".to_string(),
            age: 41,
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
// CONCRETE SCENARIO
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_people_sheet_layout_in_memory() {
    let mut book = MemoryWorkbook::new();
    export(&mut book, "People", &people()).unwrap();

    let rows = book.rows("People").unwrap();
    assert_eq!(
        rows,
        vec![
            vec!["Name".to_string(), "Age".to_string()],
            vec!["Ann".to_string(), "30".to_string()],
            vec!["Bo".to_string(), "41".to_string()],
        ]
    );

    let back: Vec<Person> = import(&mut book, "People").unwrap();
    assert_eq!(back, people());
}

#[test]
fn test_people_sheet_layout_in_xlsx() {
    let bytes = export_to_bytes("People", &people()).unwrap();

    let mut source = XlsxSource::from_bytes(bytes.clone()).unwrap();
    let rows = source.rows("People").unwrap();
    assert_eq!(rows[0], vec!["Name", "Age"]);
    assert_eq!(rows[1], vec!["Ann", "30"]);
    assert_eq!(rows[2], vec!["Bo", "41"]);

    let back: Vec<Person> = import_from_bytes(bytes, "People").unwrap();
    assert_eq!(back, people());
}

#[test]
fn test_single_cell_reads() {
    let bytes = export_to_bytes("People", &people()).unwrap();
    let mut source = XlsxSource::from_bytes(bytes).unwrap();

    assert_eq!(source.cell("People", 1, 1).unwrap().as_deref(), Some("Name"));
    assert_eq!(source.cell("People", 2, 3).unwrap().as_deref(), Some("41"));
    assert_eq!(source.cell("People", 5, 9).unwrap(), None);
}

// ═══════════════════════════════════════════════════════════════════════════
// ROUND TRIP
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_round_trip_mixed_kinds_through_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("readings.xlsx");
    let readings = vec![
        Measurement {
            station: "North".to_string(),
            reading: 12.75,
            count: 3,
            delta: -4,
            note: "lost on import".to_string(),
        },
        Measurement {
            station: "".to_string(),
            reading: 0.1,
            count: 0,
            delta: 0,
            note: String::new(),
        },
        Measurement {
            station: "South, \"east\"".to_string(),
            reading: -1e6,
            count: u32::MAX,
            delta: i16::MIN,
            note: String::new(),
        },
    ];

    ExcelExporter::new(&path).export("Readings", &readings).unwrap();
    let back: Vec<Measurement> = ExcelImporter::new(&path).import("Readings").unwrap();

    let expected: Vec<Measurement> = readings
        .into_iter()
        .map(|m| Measurement {
            note: String::new(),
            ..m
        })
        .collect();
    assert_eq!(back, expected);
}

#[test]
fn test_round_trip_in_memory_preserves_order() {
    let records: Vec<Person> = (0..50)
        .map(|i| Person {
            name: format!("person-{i}"),
            age: i * 7 - 100,
        })
        .collect();

    let mut book = MemoryWorkbook::new();
    export(&mut book, "S", &records).unwrap();
    let back: Vec<Person> = import(&mut book, "S").unwrap();
    assert_eq!(back, records);
}

fn extremes() -> Vec<Extremes> {
    vec![
        Extremes {
            signed: i64::MIN,
            unsigned: u64::MAX,
            size: usize::MAX,
            tiny: i8::MIN,
            wide: f64::MAX,
            narrow: f32::MAX,
        },
        Extremes {
            signed: i64::MAX,
            unsigned: i64::MAX as u64 + 1,
            size: 0,
            tiny: i8::MAX,
            wide: f64::MIN_POSITIVE,
            narrow: f32::MIN_POSITIVE,
        },
        Extremes {
            signed: 9_007_199_254_740_993,
            unsigned: 9_007_199_254_740_993,
            size: 1 << 53,
            tiny: 0,
            wide: 0.1 + 0.2,
            narrow: 0.1,
        },
        Extremes {
            signed: -9_007_199_254_740_993,
            unsigned: 0,
            size: 42,
            tiny: -1,
            wide: -f64::MAX,
            narrow: -1.5e-7,
        },
    ]
}

#[test]
fn test_round_trip_numeric_limits_in_memory() {
    let mut book = MemoryWorkbook::new();
    export(&mut book, "Limits", &extremes()).unwrap();
    let back: Vec<Extremes> = import(&mut book, "Limits").unwrap();
    assert_eq!(back, extremes());
}

#[test]
fn test_round_trip_numeric_limits_in_xlsx() {
    let bytes = export_to_bytes("Limits", &extremes()).unwrap();
    let back: Vec<Extremes> = import_from_bytes(bytes, "Limits").unwrap();
    assert_eq!(back, extremes());
}

#[test]
fn test_integer_beyond_f64_precision_survives_xlsx() {
    let records = vec![Person {
        name: "Big".to_string(),
        age: 9_007_199_254_740_993,
    }];
    let bytes = export_to_bytes("People", &records).unwrap();

    let mut source = XlsxSource::from_bytes(bytes.clone()).unwrap();
    assert_eq!(
        source.cell("People", 2, 2).unwrap().as_deref(),
        Some("9007199254740993")
    );

    let back: Vec<Person> = import_from_bytes(bytes, "People").unwrap();
    assert_eq!(back, records);
}

// ═══════════════════════════════════════════════════════════════════════════
// CONCURRENCY
// ═══════════════════════════════════════════════════════════════════════════

fn assert_send<T: Send>() {}

#[test]
fn test_stores_and_errors_are_send() {
    assert_send::<MemoryWorkbook>();
    assert_send::<XlsxSink<Vec<u8>>>();
    assert_send::<SheetError>();
}

#[test]
fn test_parallel_exports_to_distinct_workbooks() {
    let results: Vec<(MemoryWorkbook, Vec<Person>)> = std::thread::scope(|scope| {
        let workers: Vec<_> = (0..8i64)
            .map(|worker| {
                scope.spawn(move || {
                    let records: Vec<Person> = (0..100)
                        .map(|i| Person {
                            name: format!("w{worker}-{i}"),
                            age: worker * 1000 + i,
                        })
                        .collect();
                    let mut book = MemoryWorkbook::new();
                    export(&mut book, "S", &records).unwrap();
                    let back: Vec<Person> = import(&mut book, "S").unwrap();
                    assert_eq!(back, records);

                    let bytes = export_to_bytes("S", &records).unwrap();
                    let from_xlsx: Vec<Person> = import_from_bytes(bytes, "S").unwrap();
                    assert_eq!(from_xlsx, records);
                    (book, back)
                })
            })
            .collect();
        workers.into_iter().map(|w| w.join().unwrap()).collect()
    });

    assert_eq!(results.len(), 8);
    for (worker, (mut book, back)) in results.into_iter().enumerate() {
        assert_eq!(back[0].name, format!("w{worker}-0"));
        assert_eq!(book.rows("S").unwrap().len(), 101);
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// HEADERS AND EMPTY COLLECTIONS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_header_determinism() {
    let first = resolve_schema(&people()[0]);
    let second = resolve_schema(&Person::default());
    assert_eq!(first, second);
    assert_eq!(first, ColumnSchema::of::<Person>());

    let schema = ColumnSchema::of::<Measurement>();
    let labels: Vec<&str> = schema.labels().collect();
    assert_eq!(labels, vec!["Station", "Reading", "Count", "Delta", ""]);
}

#[test]
fn test_empty_collection_writes_header_only() {
    let empty: Vec<Person> = Vec::new();

    let mut book = MemoryWorkbook::new();
    export(&mut book, "Empty", &empty).unwrap();
    assert_eq!(book.rows("Empty").unwrap(), vec![vec!["Name", "Age"]]);
    let back: Vec<Person> = import(&mut book, "Empty").unwrap();
    assert!(back.is_empty());

    let bytes = export_to_bytes("Empty", &empty).unwrap();
    let back: Vec<Person> = import_from_bytes(bytes, "Empty").unwrap();
    assert!(back.is_empty());
}

#[test]
fn test_sheet_without_header_imports_nothing() {
    let mut book = MemoryWorkbook::new();
    sheetbind::excel::SheetSink::ensure_sheet(&mut book, "Blank").unwrap();
    let back: Vec<Person> = import(&mut book, "Blank").unwrap();
    assert!(back.is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// IMPORT BINDING RULES
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_conversion_failure_aborts_import() {
    let mut book = MemoryWorkbook::from_rows(
        "S",
        &[
            vec!["Name", "Age"],
            vec!["Ann", "30"],
            vec!["Bo", "forty-one"],
            vec!["Cy", "52"],
        ],
    );

    let err = import::<Person, _>(&mut book, "S").unwrap_err();
    match err {
        SheetError::FieldConversion {
            field,
            column,
            row,
            text,
            ..
        } => {
            assert_eq!(field, "age");
            assert_eq!(column, "Age");
            assert_eq!(row, 3);
            assert_eq!(text, "forty-one");
        }
        other => panic!("expected FieldConversion, got {other:?}"),
    }
}

#[test]
fn test_unknown_columns_and_reordering() {
    let mut book = MemoryWorkbook::from_rows(
        "S",
        &[
            vec!["Comment", "Age", "Extra", "Name"],
            vec!["hi", "30", "x", "Ann"],
            vec!["", "41", "", "Bo"],
        ],
    );

    let back: Vec<Person> = import(&mut book, "S").unwrap();
    assert_eq!(back, people());
}

#[test]
fn test_untagged_field_is_never_populated() {
    let mut book = MemoryWorkbook::from_rows(
        "S",
        &[
            vec!["Station", "note", "Reading", "Count", "Delta"],
            vec!["West", "should be ignored", "1.5", "2", "3"],
        ],
    );

    let back: Vec<Measurement> = import(&mut book, "S").unwrap();
    assert_eq!(back.len(), 1);
    assert_eq!(back[0].station, "West");
    assert_eq!(back[0].note, "");
}

#[test]
fn test_short_rows_read_missing_cells_as_empty_text() {
    let mut book = MemoryWorkbook::from_rows(
        "S",
        &[vec!["Age", "Name"], vec!["30"], vec!["41", "Bo"]],
    );

    let back: Vec<Person> = import(&mut book, "S").unwrap();
    assert_eq!(back[0], Person { name: String::new(), age: 30 });
    assert_eq!(back[1], Person { name: "Bo".into(), age: 41 });

    // An empty cell is not a number
    let mut missing_age = MemoryWorkbook::from_rows("S", &[vec!["Name", "Age"], vec!["Ann"]]);
    let err = import::<Person, _>(&mut missing_age, "S").unwrap_err();
    assert!(matches!(err, SheetError::FieldConversion { row: 2, ref text, .. } if text.is_empty()));
}

#[test]
fn test_missing_columns_leave_zero_values() {
    let mut names_only = MemoryWorkbook::from_rows("S", &[vec!["Name"], vec!["Cy"]]);
    let back: Vec<Person> = import(&mut names_only, "S").unwrap();
    assert_eq!(back, vec![Person { name: "Cy".into(), age: 0 }]);

    let back: Vec<Measurement> = import(&mut names_only, "S").unwrap();
    assert_eq!(back, vec![Measurement::default()]);
}

#[test]
fn test_duplicate_header_last_column_wins() {
    let mut book = MemoryWorkbook::from_rows(
        "S",
        &[vec!["Name", "Age", "Name"], vec!["first", "1", "second"]],
    );

    let back: Vec<Person> = import(&mut book, "S").unwrap();
    assert_eq!(back[0].name, "second");
}

#[test]
fn test_unsupported_kind_policies() {
    let records = vec![Flagged {
        name: "Ann".into(),
        active: true,
    }];
    let mut book = MemoryWorkbook::new();
    export(&mut book, "S", &records).unwrap();

    let lenient: Vec<Flagged> = import(&mut book, "S").unwrap();
    assert_eq!(
        lenient,
        vec![Flagged {
            name: "Ann".into(),
            active: false,
        }]
    );

    let strict = ImportOptions::new().with_unsupported(UnsupportedPolicy::Reject);
    let err = import_with::<Flagged, _>(&mut book, "S", &strict).unwrap_err();
    assert!(matches!(err, SheetError::UnsupportedField { ref column, row: 2, .. } if column == "Active"));
}

// ═══════════════════════════════════════════════════════════════════════════
// STORE ERRORS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_missing_sheet_is_read_error() {
    let bytes = export_to_bytes("People", &people()).unwrap();
    let err = import_from_bytes::<Person>(bytes, "Nope").unwrap_err();
    assert!(matches!(err, SheetError::SheetRead { ref sheet, .. } if sheet == "Nope"));

    let mut book = MemoryWorkbook::new();
    let err = import::<Person, _>(&mut book, "Nope").unwrap_err();
    assert!(matches!(err, SheetError::SheetRead { .. }));
}

#[test]
fn test_corrupt_workbook_is_rejected() {
    let err = import_from_bytes::<Person>(b"not a zip archive".to_vec(), "People").unwrap_err();
    assert!(matches!(err, SheetError::Workbook(_)));

    let dir = TempDir::new().unwrap();
    let err = ExcelImporter::new(dir.path().join("missing.xlsx"))
        .import::<Person>("People")
        .unwrap_err();
    assert!(matches!(err, SheetError::Workbook(ref reason) if reason.contains("missing.xlsx")));
}

#[test]
fn test_sink_row_limit_fails_whole_export() {
    let mut book = MemoryWorkbook::new().with_max_rows(2);
    let err = export(&mut book, "S", &people()).unwrap_err();
    assert!(matches!(err, SheetError::Sink(_)));
    assert_eq!(book.flush_count(), 0);
}
