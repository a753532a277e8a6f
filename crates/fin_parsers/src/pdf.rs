use fin_core::{ExtractedContent, ParseError, SourceFormat};
use lopdf::Document as PdfDocument;
use tracing::debug;
use crate::DocumentParser;

/// Page-ordered PDF text. Each page's text items are joined with a single
/// space and pages are separated by a newline.
#[derive(Debug, Clone, Default)]
pub struct PdfParser;

impl PdfParser {
    pub fn new() -> Self {
        Self
    }
}

impl DocumentParser for PdfParser {
    fn format(&self) -> SourceFormat {
        SourceFormat::Pdf
    }

    fn parse(&self, bytes: &[u8]) -> Result<ExtractedContent, ParseError> {
        let pdf = PdfDocument::load_mem(bytes)
            .map_err(|e| ParseError::Unreadable(format!("Not a readable PDF: {}", e)))?;

        // BTreeMap, so keys come out in page-number order.
        let pages = pdf.get_pages();
        if pages.is_empty() {
            return Err(ParseError::Malformed("PDF has no pages".to_string()));
        }

        let mut page_texts = Vec::with_capacity(pages.len());
        for page_number in pages.keys() {
            let raw = pdf.extract_text(&[*page_number]).map_err(|e| {
                ParseError::Malformed(format!(
                    "Failed to extract text from page {}: {}",
                    page_number, e
                ))
            })?;
            page_texts.push(join_items(&raw));
        }
        debug!("Extracted text from {} PDF pages", page_texts.len());

        let text = page_texts.join("\n").trim().to_string();
        if text.is_empty() {
            return Err(ParseError::Malformed("PDF contains no extractable text".to_string()));
        }

        Ok(ExtractedContent::Text {
            format: SourceFormat::Pdf,
            text,
        })
    }
}

fn join_items(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    fn build_pdf(pages: &[&[&str]]) -> Vec<u8> {
        let mut doc = PdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for items in pages {
            let mut operations = vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
            ];
            for (line, item) in items.iter().enumerate() {
                let y = 700 - 20 * line as i64;
                operations.push(Operation::new("Td", vec![72.into(), y.into()]));
                operations.push(Operation::new("Tj", vec![Object::string_literal(*item)]));
            }
            operations.push(Operation::new("ET", vec![]));
            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    fn text(bytes: &[u8]) -> String {
        match PdfParser::new().parse(bytes).unwrap() {
            ExtractedContent::Text { text, .. } => text,
            other => panic!("expected text, got {:?}", other),
        }
    }

    #[test]
    fn test_pages_are_newline_separated_in_order() {
        let bytes = build_pdf(&[&["Revenue", "Q1"], &["Expenses", "Q1"], &["Net", "income"]]);
        let text = text(&bytes);
        let segments: Vec<&str> = text.split('\n').collect();
        assert_eq!(segments.len(), 3);
        assert!(segments[0].contains("Revenue"));
        assert!(segments[1].contains("Expenses"));
        assert!(segments[2].contains("Net"));
    }

    #[test]
    fn test_items_on_a_page_are_space_joined() {
        let bytes = build_pdf(&[&["Cash", "flow", "statement"]]);
        let text = text(&bytes);
        assert!(!text.contains('\n'));
        assert!(!text.contains("  "));
        assert_eq!(text, text.trim());
        assert!(text.contains("Cash"));
        assert!(text.contains("statement"));
    }

    #[test]
    fn test_not_a_pdf_is_unreadable() {
        let err = PdfParser::new().parse(b"%PDF-garbage").unwrap_err();
        assert!(matches!(err, ParseError::Unreadable(_)));
    }

    #[test]
    fn test_pdf_without_text_is_rejected() {
        let bytes = build_pdf(&[&[]]);
        let err = PdfParser::new().parse(&bytes).unwrap_err();
        assert!(matches!(err, ParseError::Malformed(_)));
    }

    #[test]
    fn test_join_items_collapses_whitespace() {
        assert_eq!(join_items("  Total\n assets \t 100\n"), "Total assets 100");
    }
}
