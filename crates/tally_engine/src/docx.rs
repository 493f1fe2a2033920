use docx_rs::{
    DocumentChild, InsertChild, ParagraphChild, Run, RunChild, StructuredDataTag,
    StructuredDataTagChild, TableCellContent, TableChild, TableRowChild,
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot parse document: {0}")]
pub struct ParseError(pub String);

/// Turns an in-memory document into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ParseError>;
}

/// Plain-text view of a `.docx` body:
/// - run text concatenated per paragraph, one paragraph per line
/// - hyperlink, tracked-insertion and inline content-control text kept inline
/// - block content controls walked like the body
/// - tabs and breaks become whitespace
/// - every table cell on its own line, nested tables included.
#[derive(Debug, Default, Clone, Copy)]
pub struct DocxTextExtractor;

impl TextExtractor for DocxTextExtractor {
    fn extract_text(&self, bytes: &[u8]) -> Result<String, ParseError> {
        let docx = docx_rs::read_docx(bytes).map_err(|err| ParseError(err.to_string()))?;
        let mut text = String::new();
        for child in &docx.document.children {
            match child {
                DocumentChild::Paragraph(para) => push_paragraph(&para.children, &mut text),
                DocumentChild::Table(table) => push_table(&table.rows, &mut text),
                DocumentChild::StructuredDataTag(sdt) => push_block_sdt(sdt, &mut text),
                _ => {}
            }
        }
        Ok(text)
    }
}

fn push_paragraph(children: &[ParagraphChild], out: &mut String) {
    push_paragraph_children(children, out);
    out.push('\n');
}

fn push_paragraph_children(children: &[ParagraphChild], out: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run(run, out),
            ParagraphChild::Hyperlink(link) => push_paragraph_children(&link.children, out),
            ParagraphChild::Insert(insert) => {
                for insert_child in &insert.children {
                    if let InsertChild::Run(run) = insert_child {
                        push_run(run, out);
                    }
                }
            }
            ParagraphChild::StructuredDataTag(sdt) => push_sdt_children(sdt, out),
            _ => {}
        }
    }
}

fn push_run(run: &Run, out: &mut String) {
    for run_child in &run.children {
        match run_child {
            RunChild::Text(text) => out.push_str(&text.text),
            RunChild::Tab(_) => out.push('\t'),
            RunChild::Break(_) => out.push('\n'),
            _ => {}
        }
    }
}

/// A body-level content control ends like a paragraph.
fn push_block_sdt(sdt: &StructuredDataTag, out: &mut String) {
    push_sdt_children(sdt, out);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn push_sdt_children(sdt: &StructuredDataTag, out: &mut String) {
    for child in &sdt.children {
        match child {
            StructuredDataTagChild::Run(run) => push_run(run, out),
            StructuredDataTagChild::Paragraph(para) => push_paragraph(&para.children, out),
            StructuredDataTagChild::Table(table) => push_table(&table.rows, out),
            StructuredDataTagChild::StructuredDataTag(inner) => push_sdt_children(inner, out),
            _ => {}
        }
    }
}

fn push_table(rows: &[TableChild], out: &mut String) {
    for row in rows {
        let TableChild::TableRow(tr) = row;
        for cell in &tr.cells {
            let TableRowChild::TableCell(tc) = cell;
            for content in &tc.children {
                match content {
                    TableCellContent::Paragraph(para) => push_paragraph(&para.children, out),
                    TableCellContent::Table(inner) => push_table(&inner.rows, out),
                    TableCellContent::StructuredDataTag(sdt) => push_block_sdt(sdt, out),
                    _ => {}
                }
            }
        }
    }
}
