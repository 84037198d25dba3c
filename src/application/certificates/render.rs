//! Certificate PDF rendering.
//!
//! Pure layout: identifying fields in, one self-contained PDF document out.
//! Rendering is deterministic for a given input and never fails on the data
//! content itself; empty strings simply render as empty text. The only
//! failure path is a template defect such as an unformattable date, which is
//! surfaced as [`RenderError`] and treated as fatal by callers.

use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};
use thiserror::Error;
use time::{Date, format_description::FormatItem, macros::format_description};

use crate::domain::certificates::CertificateInput;

/// A4 landscape, in points.
const PAGE_WIDTH: f32 = 842.0;
const PAGE_HEIGHT: f32 = 595.0;
const BORDER_MARGIN: f32 = 28.0;

const REGULAR_FONT: Name<'static> = Name(b"F1");
const BOLD_FONT: Name<'static> = Name(b"F2");

const ISSUE_DATE_FORMAT: &[FormatItem<'static>] =
    format_description!("[month repr:long] [day padding:none], [year]");

// Average glyph advance as a fraction of the font size, close enough to
// Helvetica's metrics for centering a single line.
const REGULAR_ADVANCE: f32 = 0.50;
const BOLD_ADVANCE: f32 = 0.54;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("failed to format issue date: {0}")]
    DateFormat(#[from] time::error::Format),
}

/// Lay out one certificate onto the fixed template and return the document
/// bytes. Guaranteed non-empty on success.
pub fn render_certificate(
    input: &CertificateInput,
    issued_on: Date,
) -> Result<Vec<u8>, RenderError> {
    let date_line = format!("Date: {}", issued_on.format(ISSUE_DATE_FORMAT)?);
    let instructor_line = format!("Instructor: {}", input.instructor_name);

    let mut pdf = Pdf::new();
    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let page_id = Ref::new(3);
    let regular_id = Ref::new(4);
    let bold_id = Ref::new(5);
    let content_id = Ref::new(6);

    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id).kids([page_id]).count(1);

    let mut page = pdf.page(page_id);
    page.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
    page.parent(page_tree_id);
    page.contents(content_id);
    let mut resources = page.resources();
    let mut fonts = resources.fonts();
    fonts.pair(REGULAR_FONT, regular_id);
    fonts.pair(BOLD_FONT, bold_id);
    fonts.finish();
    resources.finish();
    page.finish();

    pdf.type1_font(regular_id).base_font(Name(b"Helvetica"));
    pdf.type1_font(bold_id).base_font(Name(b"Helvetica-Bold"));

    let mut content = Content::new();

    content.set_line_width(2.0);
    content.rect(
        BORDER_MARGIN,
        BORDER_MARGIN,
        PAGE_WIDTH - 2.0 * BORDER_MARGIN,
        PAGE_HEIGHT - 2.0 * BORDER_MARGIN,
    );
    content.stroke();

    centered_line(
        &mut content,
        BOLD_FONT,
        30.0,
        BOLD_ADVANCE,
        460.0,
        "Certificate of Completion",
    );
    centered_line(
        &mut content,
        REGULAR_FONT,
        13.0,
        REGULAR_ADVANCE,
        400.0,
        "This certificate is proudly presented to",
    );
    centered_line(
        &mut content,
        BOLD_FONT,
        26.0,
        BOLD_ADVANCE,
        348.0,
        &input.student_name,
    );
    centered_line(
        &mut content,
        REGULAR_FONT,
        13.0,
        REGULAR_ADVANCE,
        300.0,
        "for successfully completing the course",
    );
    centered_line(
        &mut content,
        BOLD_FONT,
        20.0,
        BOLD_ADVANCE,
        258.0,
        &input.course_title,
    );
    centered_line(
        &mut content,
        REGULAR_FONT,
        13.0,
        REGULAR_ADVANCE,
        170.0,
        &instructor_line,
    );
    centered_line(&mut content, REGULAR_FONT, 13.0, REGULAR_ADVANCE, 140.0, &date_line);

    pdf.stream(content_id, &content.finish());

    Ok(pdf.finish())
}

fn centered_line(
    content: &mut Content,
    font: Name<'static>,
    size: f32,
    advance: f32,
    baseline: f32,
    text: &str,
) {
    let encoded = latin1_bytes(text);
    let estimated_width = encoded.len() as f32 * size * advance;
    let x = ((PAGE_WIDTH - estimated_width) / 2.0).max(BORDER_MARGIN);

    content.begin_text();
    content.set_font(font, size);
    content.next_line(x, baseline);
    content.show(Str(&encoded));
    content.end_text();
}

// The standard Type1 fonts only cover single-byte encodings; anything outside
// Latin-1 is substituted so rendering never rejects input text.
fn latin1_bytes(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let code = c as u32;
            if code <= 0xFF { code as u8 } else { b'?' }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    fn input(student: &str, course: &str, instructor: &str) -> CertificateInput {
        CertificateInput {
            enrollment_id: "E1".to_string(),
            student_name: student.to_string(),
            course_title: course.to_string(),
            instructor_name: instructor.to_string(),
        }
    }

    #[test]
    fn renders_non_empty_pdf() {
        let bytes = render_certificate(
            &input("Jane Doe", "IELTS Prep", "John Smith"),
            date!(2024 - 05 - 01),
        )
        .expect("render succeeds");

        assert!(!bytes.is_empty());
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn empty_strings_render_instead_of_failing() {
        let bytes =
            render_certificate(&input("", "", ""), date!(2024 - 05 - 01)).expect("render succeeds");
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn rendering_is_deterministic_per_input() {
        let a = render_certificate(
            &input("Jane Doe", "IELTS Prep", "John Smith"),
            date!(2024 - 05 - 01),
        )
        .expect("render succeeds");
        let b = render_certificate(
            &input("Jane Doe", "IELTS Prep", "John Smith"),
            date!(2024 - 05 - 01),
        )
        .expect("render succeeds");
        assert_eq!(a, b);
    }

    #[test]
    fn non_latin_text_is_substituted_not_rejected() {
        let bytes = render_certificate(
            &input("试学生", "Course 日本語", "Ms. Ünal"),
            date!(2024 - 05 - 01),
        )
        .expect("render succeeds");
        assert!(bytes.starts_with(b"%PDF-"));
    }
}
