//! Classification is a pure function of one cell and the policy.
//!
//! Shuffling the rows of a table and classifying again must give every
//! original row the same status. Shuffles use a seeded PCG stream so a
//! failure reproduces exactly.

use opsheet_core::{
    classify::{classify, classify_column, ClassificationPolicy, RecordStatus},
    table::{CellValue, Table},
};
use rand::{seq::SliceRandom, SeedableRng};
use rand_pcg::Pcg64Mcg;

fn closing_cells() -> Vec<CellValue> {
    vec![
        CellValue::text("0"),
        CellValue::text("0,0"),
        CellValue::text("0,00"),
        CellValue::text("0.0"),
        CellValue::text("0.00"),
        CellValue::Number(0.0),
        CellValue::text(""),
        CellValue::text("nan"),
        CellValue::text("None"),
        CellValue::text("NaT"),
        CellValue::Blank,
        CellValue::text("15/03/2024"),
        CellValue::text("1.250,75"),
        CellValue::Number(3.5),
        CellValue::text("pendente"),
        CellValue::Number(f64::NAN),
    ]
}

fn table_from(cells: &[CellValue]) -> Table {
    let rows = cells
        .iter()
        .enumerate()
        .map(|(i, c)| vec![CellValue::Number(i as f64), c.clone()])
        .collect();
    Table::new(vec!["Id".into(), "Data Fecho".into()], rows).expect("table")
}

#[test]
fn shuffled_rows_keep_their_status() {
    for policy in [ClassificationPolicy::default(), ClassificationPolicy::conservative()] {
        let cells = closing_cells();
        let baseline =
            classify_column(&table_from(&cells), "Data Fecho", &policy).expect("classify");

        for seed in 0..32u64 {
            let mut order: Vec<usize> = (0..cells.len()).collect();
            order.shuffle(&mut Pcg64Mcg::seed_from_u64(seed));

            let shuffled: Vec<CellValue> = order.iter().map(|&i| cells[i].clone()).collect();
            let statuses =
                classify_column(&table_from(&shuffled), "Data Fecho", &policy).expect("classify");

            for (pos, &original) in order.iter().enumerate() {
                assert_eq!(
                    statuses[pos], baseline[original],
                    "seed {seed}: row {original} ({:?}) changed status",
                    cells[original]
                );
            }
        }
    }
}

#[test]
fn column_pass_matches_single_cell_calls() {
    let cells = closing_cells();
    let policy = ClassificationPolicy::default();
    let statuses = classify_column(&table_from(&cells), "Data Fecho", &policy).expect("classify");
    let single: Vec<RecordStatus> = cells.iter().map(|c| classify(c, &policy)).collect();
    assert_eq!(statuses, single);
    assert_eq!(
        statuses.iter().filter(|s| **s == RecordStatus::Open).count(),
        12
    );
}
