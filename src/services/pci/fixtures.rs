//! In-memory workbooks shaped like field survey exports: a title block,
//! a header row on line 5 and PCI scores in column D.

use rust_xlsxwriter::Workbook;

#[derive(Debug, Clone, Copy)]
pub enum PciCell {
    Number(f64),
    Text(&'static str),
    Blank,
}

pub fn survey_workbook(values: &[PciCell]) -> Vec<u8> {
    workbook_with_sheet("PCI", values)
}

pub fn workbook_with_sheet(sheet_name: &str, values: &[PciCell]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet.set_name(sheet_name).unwrap();

    worksheet.write_string(0, 0, "Pavement Condition Survey").unwrap();
    worksheet.write_string(1, 0, "Network: District 4").unwrap();
    worksheet.write_string(2, 0, "Inspector: field crew B").unwrap();
    for (col, header) in ["Section", "From", "To", "PCI"].iter().enumerate() {
        worksheet.write_string(4, col as u16, *header).unwrap();
    }

    for (idx, value) in values.iter().enumerate() {
        let row = 5 + idx as u32;
        worksheet.write_string(row, 0, format!("S-{:03}", idx + 1)).unwrap();
        worksheet.write_number(row, 1, (idx * 100) as f64).unwrap();
        worksheet.write_number(row, 2, ((idx + 1) * 100) as f64).unwrap();
        match value {
            PciCell::Number(n) => {
                worksheet.write_number(row, 3, *n).unwrap();
            }
            PciCell::Text(s) => {
                worksheet.write_string(row, 3, *s).unwrap();
            }
            PciCell::Blank => {}
        }
    }

    workbook.save_to_buffer().unwrap()
}

pub fn numbers(values: &[f64]) -> Vec<PciCell> {
    values.iter().map(|v| PciCell::Number(*v)).collect()
}
