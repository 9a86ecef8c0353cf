//! PDF rendering with genpdf: attendance reports and student ID cards.
//!
//! Fonts are read from the configured directory at render time. Arial is
//! preferred; LiberationSans is the fallback shipped alongside it.

use crate::error::AppError;
use common::model::attendance::{AttendanceRow, AttendanceStatus, AttendanceSummary};
use common::model::student::Student;
use genpdf::elements::{Break, FrameCellDecorator, LinearLayout, Paragraph, TableLayout};
use genpdf::style::{Style, StyledString};
use genpdf::{Document, Element};
use std::path::Path;

const FONT_SIZE_PT: u8 = 10;

fn load_font(
    fonts_dir: &Path,
) -> Result<genpdf::fonts::FontFamily<genpdf::fonts::FontData>, AppError> {
    if let Ok(family) = genpdf::fonts::from_files(fonts_dir, "Arial", None) {
        return Ok(family);
    }
    Ok(genpdf::fonts::from_files(fonts_dir, "LiberationSans", None)?)
}

fn configure_document(fonts_dir: &Path, title: &str) -> Result<Document, AppError> {
    let mut doc = Document::new(load_font(fonts_dir)?);
    doc.set_title(title);
    doc.set_font_size(FONT_SIZE_PT);
    doc.set_line_spacing(1.25);

    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);
    Ok(doc)
}

fn bold(text: impl Into<String>) -> Paragraph {
    let mut p = Paragraph::default();
    p.push(StyledString::new(text.into(), Style::new().bold()));
    p
}

fn render(doc: Document) -> Result<Vec<u8>, AppError> {
    let mut bytes = Vec::new();
    doc.render(&mut bytes)?;
    Ok(bytes)
}

/// Attendance report for one event: summary line followed by a table of rows.
pub fn render_attendance_pdf(
    rows: &[AttendanceRow],
    event_id: &str,
    fonts_dir: &Path,
) -> Result<Vec<u8>, AppError> {
    let mut doc = configure_document(fonts_dir, &format!("Attendance {}", event_id))?;

    let present = rows
        .iter()
        .filter(|r| r.status == AttendanceStatus::Present)
        .count() as u32;
    let summary = AttendanceSummary {
        total: rows.len() as u32,
        present,
        absent: rows.len() as u32 - present,
    };

    doc.push(bold(format!("Attendance report: {}", event_id)));
    doc.push(Paragraph::new(format!(
        "Marked: {}   Present: {}   Absent: {}",
        summary.total, summary.present, summary.absent
    )));
    doc.push(Break::new(1));

    let mut table = TableLayout::new(vec![2, 4, 1]);
    table.set_cell_decorator(FrameCellDecorator::new(true, true, false));
    table
        .row()
        .element(bold("Student ID").padded(1))
        .element(bold("Name").padded(1))
        .element(bold("Status").padded(1))
        .push()?;
    for row in rows {
        table
            .row()
            .element(Paragraph::new(row.student_id.as_str()).padded(1))
            .element(Paragraph::new(row.name.as_str()).padded(1))
            .element(Paragraph::new(row.status.as_str()).padded(1))
            .push()?;
    }
    doc.push(table);

    render(doc)
}

/// Printable ID card carrying the student's details and QR payload.
pub fn render_id_card(student: &Student, fonts_dir: &Path) -> Result<Vec<u8>, AppError> {
    let mut doc = configure_document(fonts_dir, &format!("ID card {}", student.id))?;

    let mut card = LinearLayout::vertical();
    card.push(bold("Student ID Card"));
    card.push(Break::new(1));
    for (label, value) in [
        ("Name", &student.name),
        ("ID", &student.id),
        ("Domain", &student.domain),
        ("Category", &student.category),
        ("Joined", &student.join_date),
    ] {
        let mut line = Paragraph::default();
        line.push(StyledString::new(format!("{}: ", label), Style::new().bold()));
        line.push(value.as_str());
        card.push(line);
    }
    card.push(Break::new(1));
    card.push(Paragraph::new("Scan to check in:"));
    card.push(Paragraph::new(student.qr_payload.as_str()));

    doc.push(card.padded(4).framed());
    render(doc)
}
