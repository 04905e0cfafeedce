//! Light markup for assistant replies: `**bold**` spans and line breaks.

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text { text: String, bold: bool },
    LineBreak,
}

/// Split `text` into styled runs. An unpaired `**` is kept literally.
pub fn segments(text: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            out.push(Segment::LineBreak);
        }
        let line = line.strip_suffix('\r').unwrap_or(line);
        let parts: Vec<&str> = line.split("**").collect();
        let paired = parts.len() % 2 == 1;
        let last = parts.len() - 1;

        for (j, part) in parts.iter().enumerate() {
            if !paired && j == last {
                push_text(&mut out, &format!("**{}", part), false);
            } else {
                push_text(&mut out, part, j % 2 == 1);
            }
        }
    }
    out
}

fn push_text(out: &mut Vec<Segment>, text: &str, bold: bool) {
    if text.is_empty() {
        return;
    }
    if let Some(Segment::Text { text: prev, bold: prev_bold }) = out.last_mut() {
        if *prev_bold == bold {
            prev.push_str(text);
            return;
        }
    }
    out.push(Segment::Text {
        text: text.to_string(),
        bold,
    });
}
