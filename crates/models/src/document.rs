//! Single-page PDF rendering for completion certificates.
//!
//! The document only uses the base-14 Helvetica fonts with WinAnsi encoding,
//! so no font data has to be embedded.

use chrono::NaiveDate;
use std::fmt::Write as _;

const PAGE_WIDTH: f32 = 842.0;
const PAGE_HEIGHT: f32 = 595.0;

/// Snapshot of what gets printed on a certificate
#[derive(Debug, Clone)]
pub struct CertificateDocument {
    pub student_name: String,
    pub formation_title: String,
    pub issued_on: NaiveDate,
    pub verification_code: String,
    pub verification_url: Option<String>,
}

impl CertificateDocument {
    pub fn render_pdf(&self) -> Vec<u8> {
        let mut content = String::new();
        let _ = write!(
            content,
            "0.2 0.3 0.6 RG 4 w 30 30 {} {} re S\n",
            PAGE_WIDTH - 60.0,
            PAGE_HEIGHT - 60.0
        );

        let issued = self.issued_on.format("%d/%m/%Y").to_string();
        let issued_line = format!("Délivré le {issued}");
        let code_line = format!("Code de vérification : {}", self.verification_code);
        let mut lines = vec![
            (Font::Bold, 34.0, 440.0, "CERTIFICAT DE RÉUSSITE"),
            (Font::Regular, 16.0, 380.0, "Ce certificat est décerné à"),
            (Font::Bold, 28.0, 330.0, self.student_name.as_str()),
            (
                Font::Regular,
                16.0,
                280.0,
                "pour avoir suivi avec succès l'intégralité de la formation",
            ),
            (Font::Bold, 22.0, 240.0, self.formation_title.as_str()),
            (Font::Regular, 14.0, 190.0, issued_line.as_str()),
            (Font::Regular, 12.0, 150.0, code_line.as_str()),
        ];
        if let Some(url) = self.verification_url.as_deref() {
            lines.push((Font::Regular, 10.0, 130.0, url));
        }

        let mut stream = content.into_bytes();
        for (font, size, y, text) in lines {
            centered_text(&mut stream, font, size, y, text);
        }

        assemble(&stream)
    }
}

#[derive(Debug, Clone, Copy)]
enum Font {
    Regular,
    Bold,
}

impl Font {
    fn resource(self) -> &'static str {
        match self {
            Self::Regular => "F1",
            Self::Bold => "F2",
        }
    }
}

fn centered_text(out: &mut Vec<u8>, font: Font, size: f32, y: f32, text: &str) {
    let encoded = encode_win_ansi(text);
    // Helvetica averages a little over half an em per glyph
    let width = encoded.len() as f32 * size * 0.52;
    let x = ((PAGE_WIDTH - width) / 2.0).max(40.0);

    out.extend_from_slice(
        format!(
            "BT /{} {size} Tf {x:.1} {y:.1} Td (",
            font.resource()
        )
        .as_bytes(),
    );
    out.extend_from_slice(&encoded);
    out.extend_from_slice(b") Tj ET\n");
}

/// Escapes a string for a PDF literal, mapping Latin-1 directly and
/// replacing anything else with `?`
fn encode_win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push(b'\\');
                out.push(c as u8);
            }
            '\u{2019}' => out.push(0x92),
            c if (c as u32) < 0x80 && !c.is_control() => out.push(c as u8),
            c if (0xA0..=0xFF).contains(&(c as u32)) => out.push(c as u32 as u8),
            _ => out.push(b'?'),
        }
    }
    out
}

fn assemble(stream: &[u8]) -> Vec<u8> {
    let mut pdf: Vec<u8> = b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n".to_vec();
    let mut offsets = Vec::new();

    let objects: [Vec<u8>; 5] = [
        b"<< /Type /Catalog /Pages 2 0 R >>".to_vec(),
        b"<< /Type /Pages /Kids [3 0 R] /Count 1 >>".to_vec(),
        format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {PAGE_WIDTH} {PAGE_HEIGHT}] \
             /Resources << /Font << /F1 4 0 R /F2 5 0 R >> >> /Contents 6 0 R >>"
        )
        .into_bytes(),
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_vec(),
        b"<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
            .to_vec(),
    ];

    for (index, body) in objects.iter().enumerate() {
        offsets.push(pdf.len());
        pdf.extend_from_slice(format!("{} 0 obj\n", index + 1).as_bytes());
        pdf.extend_from_slice(body);
        pdf.extend_from_slice(b"\nendobj\n");
    }

    offsets.push(pdf.len());
    pdf.extend_from_slice(format!("6 0 obj\n<< /Length {} >>\nstream\n", stream.len()).as_bytes());
    pdf.extend_from_slice(stream);
    pdf.extend_from_slice(b"\nendstream\nendobj\n");

    let xref_offset = pdf.len();
    let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", offsets.len() + 1);
    for offset in &offsets {
        let _ = write!(xref, "{offset:010} 00000 n \n");
    }
    let _ = write!(
        xref,
        "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
        offsets.len() + 1
    );
    pdf.extend_from_slice(xref.as_bytes());

    pdf
}
