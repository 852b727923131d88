use chrono::{DateTime, Local};
use color_eyre::eyre::eyre;
use color_eyre::Result;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference};

use crate::dataview::format::group_indian;
use crate::directory::Employee;

pub const PDF_TITLE: &str = "Employee Directory";

const PDF_HEADERS: [&str; 6] = ["Name", "Email", "Department", "City", "Salary", "Experience"];

// A4 portrait
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 14.0;
const ROW_HEIGHT: f32 = 6.0;
const BODY_SIZE: f32 = 8.0;

/// Column x offsets from the left margin, in mm
const COLUMN_X: [f32; 6] = [0.0, 38.0, 92.0, 120.0, 146.0, 168.0];
/// Characters that fit in each column at body size
const COLUMN_CHARS: [usize; 6] = [22, 32, 16, 15, 13, 10];

/// One row of cell text, in `PDF_HEADERS` order
fn row_cells(e: &Employee) -> [String; 6] {
  [
    e.name.clone(),
    e.email.clone(),
    e.department.clone(),
    e.city.clone(),
    // Builtin fonts have no rupee glyph
    format!("INR {}", group_indian(e.salary)),
    format!("{}y", e.experience),
  ]
}

fn clip(text: &str, max: usize) -> String {
  if text.chars().count() <= max {
    text.to_string()
  } else {
    let kept: String = text.chars().take(max.saturating_sub(2)).collect();
    format!("{}..", kept)
  }
}

fn write_row(layer: &PdfLayerReference, cells: &[String], y: f32, font: &IndirectFontRef) {
  for (i, cell) in cells.iter().enumerate() {
    layer.use_text(
      clip(cell, COLUMN_CHARS[i]),
      BODY_SIZE,
      Mm(MARGIN + COLUMN_X[i]),
      Mm(y),
      font,
    );
  }
}

/// Render the records as a paged A4 table with a title and generation time.
pub fn to_pdf(records: &[Employee], generated_at: DateTime<Local>) -> Result<Vec<u8>> {
  let (doc, page, layer) = PdfDocument::new(
    PDF_TITLE,
    Mm(PAGE_WIDTH),
    Mm(PAGE_HEIGHT),
    "Layer 1",
  );
  let regular = doc
    .add_builtin_font(BuiltinFont::Helvetica)
    .map_err(|e| eyre!("Failed to load PDF font: {:?}", e))?;
  let bold = doc
    .add_builtin_font(BuiltinFont::HelveticaBold)
    .map_err(|e| eyre!("Failed to load PDF font: {:?}", e))?;

  let headers: Vec<String> = PDF_HEADERS.iter().map(|h| h.to_string()).collect();

  let mut layer_ref = doc.get_page(page).get_layer(layer);
  layer_ref.use_text(PDF_TITLE, 20.0, Mm(MARGIN), Mm(PAGE_HEIGHT - 22.0), &bold);
  layer_ref.use_text(
    format!("Generated on: {}", generated_at.format("%d/%m/%Y %H:%M")),
    10.0,
    Mm(MARGIN),
    Mm(PAGE_HEIGHT - 32.0),
    &regular,
  );

  let mut y = PAGE_HEIGHT - 42.0;
  write_row(&layer_ref, &headers, y, &bold);
  y -= ROW_HEIGHT;

  for e in records {
    if y < MARGIN {
      let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
      layer_ref = doc.get_page(page).get_layer(layer);
      y = PAGE_HEIGHT - MARGIN - ROW_HEIGHT;
      write_row(&layer_ref, &headers, y, &bold);
      y -= ROW_HEIGHT;
    }
    write_row(&layer_ref, &row_cells(e), y, &regular);
    y -= ROW_HEIGHT;
  }

  doc
    .save_to_bytes()
    .map_err(|e| eyre!("Failed to serialize PDF: {:?}", e))
}
