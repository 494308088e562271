// Batch sheet with a title row, a blank spacer and a real header, run through
// locate -> materialize -> assemble for every event.

use chrono::NaiveDate;

use lotegen_engine::{
    materialize, Assembler, CellValue, Diagnostic, Event, FieldMapping, HeaderLocator, LocatedBy,
    MatchStage, RawMatrix, TemplateColumns,
};

fn batch_matrix() -> RawMatrix {
    let text = |s: &str| CellValue::Text(s.to_string());
    let num = CellValue::Number;
    RawMatrix::new(vec![
        vec![text("LOTE 99 - PAGAMENTOS AGOSTO/2025")],
        vec![],
        vec![
            text("Número do Processo"),
            text("Autor"),
            text("Contratual - 30%"),
            text("Contratual CHM"),
            text("Agosto.2025 - SUCUMBENCIA"),
            text("Sucumb.\u{00A0}Preço"),
            text("Agosto.2025 - PRINCIPAL"),
            CellValue::Empty,
        ],
        vec![text("0001234-56.2020.8.26.0100"), text("Ana"), num(300.0), num(10.0), num(1.5), num(20.0), num(1000.0)],
        vec![text("0001235-56.2020.8.26.0100"), text("Bruno"), num(301.0), num(11.0), num(2.5), num(21.0), num(1001.0)],
        vec![text("0001236-56.2020.8.26.0100"), text("Carla"), num(302.0), num(12.0), num(3.5), num(22.0), num(1002.0)],
        vec![],
        vec![text("0001237-56.2020.8.26.0100"), text("Davi"), num(303.0), num(13.0), num(4.5), num(23.0), num(1003.0)],
        vec![text("0001238-56.2020.8.26.0100"), text("Eva"), num(304.0), num(14.0), num(5.5), num(24.0), num(1004.0)],
    ])
}

fn mapping() -> FieldMapping {
    FieldMapping::new("Número do Processo")
        .with_event(Event::Hc30, "Contratual - 30%")
        .with_event(Event::Hcp, "Contratual CHM")
        .with_event(Event::Calcs, "Agosto.2025 - SUCUMBENCIA")
        .with_event(Event::Hsp, "Sucumb. Preço")
        .with_event(Event::Calcp, "Agosto.2025 - PRINCIPAL")
}

#[test]
fn five_outputs_of_five_rows() {
    let matrix = batch_matrix();
    let loc = HeaderLocator::new(Some("Número do Processo")).locate(&matrix).unwrap();
    assert_eq!(loc.row, 2);
    assert_eq!(loc.located_by, LocatedBy::LabelAnchor);

    let source = materialize(&matrix, loc.row).unwrap();
    assert_eq!(source.row_count(), 5);
    assert_eq!(source.columns().len(), 7);
    assert_eq!(source.columns()[5], "Sucumb. Preço");

    let template = TemplateColumns::new([
        "PROCESSO",
        "EVENTO",
        "DATA",
        "RESULT",
        "SOLICITADO_POR",
        "EVENTO_INTEGRACAO",
    ]);
    let mapping = mapping();
    let today = NaiveDate::from_ymd_opt(2025, 8, 29).unwrap();

    let outputs = Assembler::new(&source, &template, &mapping, today).assemble_all();
    assert_eq!(outputs.len(), 5);

    let expected_first_amount = [300.0, 10.0, 1.5, 20.0, 1000.0];
    for (out, (event, amount)) in outputs.iter().zip(Event::ALL.iter().zip(expected_first_amount)) {
        assert!(out.diagnostics.is_empty(), "{event}: {:?}", out.diagnostics);
        let t = &out.table;
        assert_eq!(t.event, *event);
        assert_eq!(t.row_count, 5);
        assert_eq!(t.column_names().collect::<Vec<_>>(), template.names());
        for column in &t.columns {
            assert_eq!(column.values.len(), 5, "{event}/{}", column.name);
        }
        assert!(t.values("RESULT").unwrap().iter().all(|v| v.raw_display() == "OK"));
        assert!(t.values("DATA").unwrap().iter().all(|v| v.raw_display() == "29/08/2025"));
        assert!(t.values("SOLICITADO_POR").unwrap().iter().all(|v| v.raw_display() == "45270"));
        assert!(t
            .values("EVENTO_INTEGRACAO")
            .unwrap()
            .iter()
            .all(|v| v.raw_display() == event.id()));
        assert_eq!(t.values("PROCESSO").unwrap()[4].raw_display(), "0001238-56.2020.8.26.0100");
        assert_eq!(t.values("EVENTO").unwrap()[0], CellValue::Number(amount));
    }

    let hsp = outputs[3].table.column("EVENTO").unwrap();
    assert_eq!(hsp.binding.as_ref().unwrap().stage, MatchStage::Exact);
}

#[test]
fn typo_in_one_event_column_only_affects_that_event() {
    let matrix = batch_matrix();
    let source = materialize(&matrix, 2).unwrap();
    let template = TemplateColumns::new(["PROCESSO", "EVENTO", "EVENTO_INTEGRACAO"]);
    let mut mapping = mapping();
    mapping.event_columns.insert(Event::Hcp, "Honorários Periciais".into());
    let today = NaiveDate::from_ymd_opt(2025, 8, 29).unwrap();

    let outputs = Assembler::new(&source, &template, &mapping, today).assemble_all();
    let failing: Vec<_> = outputs.iter().filter(|o| !o.diagnostics.is_empty()).collect();
    assert_eq!(failing.len(), 1);
    assert_eq!(failing[0].table.event, Event::Hcp);
    assert!(matches!(
        failing[0].diagnostics[0],
        Diagnostic::ColumnUnresolved { event: Event::Hcp, .. }
    ));
    assert!(!failing[0].table.column("EVENTO").unwrap().is_populated());
    assert!(failing[0].table.column("PROCESSO").unwrap().is_populated());
}
