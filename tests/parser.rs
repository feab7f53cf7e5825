use tracer::config::TracerConfig;
use tracer::parser::{LineKind, RecordParser};
use tracer::SeriesLayout;

fn parser(cfg: TracerConfig) -> RecordParser {
    RecordParser::new(&cfg)
}

#[test]
fn infers_every_numeric_field() {
    let mut p = parser(TracerConfig::default());
    let line = p.parse("t 1.5 x -2\n");
    assert_eq!(line.kind, LineKind::Data);
    assert_eq!(line.values, vec![1.5, -2.0]);
    assert_eq!(p.layout().unwrap().groups(), &[vec![2, 4]]);

    // later lines must provide the inferred columns
    assert_eq!(p.parse("u 3 y 4\n").values, vec![3.0, 4.0]);
    assert_eq!(p.parse("u 3\n").kind, LineKind::PassThrough);
    assert_eq!(p.parse("u 3 y four\n").kind, LineKind::Malformed);
}

#[test]
fn inference_retries_until_enough_columns() {
    let mut p = parser(TracerConfig {
        abscissa: true,
        ..Default::default()
    });
    assert_eq!(p.parse("header only\n").kind, LineKind::PassThrough);
    assert_eq!(p.parse("1 text\n").kind, LineKind::PassThrough);
    assert!(p.layout().is_none());
    let line = p.parse("1 2\n");
    assert!(line.is_data());
    assert_eq!(p.layout().unwrap().column_count(), 2);
}

#[test]
fn offset_lines_pass_through_first() {
    let mut p = parser(TracerConfig {
        offset: Some(2),
        ..Default::default()
    });
    assert_eq!(p.parse("1 2\n").kind, LineKind::PassThrough);
    assert_eq!(p.parse("3 4\n").kind, LineKind::PassThrough);
    assert_eq!(p.parse("5 6\n").values, vec![5.0, 6.0]);
}

#[test]
fn ncolumns_filters_field_count() {
    let mut p = parser(TracerConfig {
        ncolumns: Some(3),
        ..Default::default()
    });
    assert_eq!(p.parse("1 2\n").kind, LineKind::PassThrough);
    assert_eq!(p.parse("1 2 3 4\n").kind, LineKind::PassThrough);
    assert_eq!(p.parse("1 2 3\n").values, vec![1.0, 2.0, 3.0]);
}

#[test]
fn explicit_columns_in_subplot_order() {
    let mut p = parser(TracerConfig {
        columns: Some("3/1".parse::<SeriesLayout>().unwrap()),
        ..Default::default()
    });
    assert_eq!(p.parse("10 20 30\n").values, vec![30.0, 10.0]);
    // only the selected fields have to be numeric
    assert_eq!(p.parse("10 nope 30\n").values, vec![30.0, 10.0]);
    assert_eq!(p.parse("10 20\n").kind, LineKind::PassThrough);
    assert_eq!(p.parse("ten 20 30\n").kind, LineKind::Malformed);
}

#[test]
fn exact_separator_keeps_empty_fields() {
    let mut p = parser(TracerConfig {
        sep: Some(",".to_string()),
        ..Default::default()
    });
    let line = p.parse("1,,3\r\n");
    assert_eq!(line.values, vec![1.0, 3.0]);
    assert_eq!(p.layout().unwrap().groups(), &[vec![1, 3]]);
    assert_eq!(p.parse("4, 5 ,6\n").values, vec![4.0, 6.0]);
}

#[test]
fn blank_line_is_pass_through() {
    let mut p = parser(TracerConfig::default());
    assert_eq!(p.parse("\n").kind, LineKind::PassThrough);
    assert!(p.layout().is_none());
}
