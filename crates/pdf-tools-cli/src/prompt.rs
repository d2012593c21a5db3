//! Interactive value and image prompts

use pdf_template::layout::ImageRef;
use pdf_template::{ImageDecision, ImageSource, ValueSource};
use std::io::{self, Stdin, Stdout, Write};
use std::path::PathBuf;

/// Line-oriented input
pub trait ReadLine {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize>;
}

impl ReadLine for Stdin {
    fn read_line(&mut self, buf: &mut String) -> io::Result<usize> {
        // Locks per call, so several prompts can share stdin
        Stdin::read_line(self, buf)
    }
}

/// Asks for values and image decisions line by line.
///
/// End of input is treated as an empty answer for values and as "keep"
/// for images, so a closed stdin finishes the run with defaults.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompt<Stdin, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin(), io::stdout())
    }
}

impl<R: ReadLine, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// One line of input, without the line ending. `None` at end of input.
    fn ask(&mut self, question: &str) -> Option<String> {
        if let Err(e) = write!(self.output, "{}", question).and_then(|_| self.output.flush()) {
            log::debug!("Could not write prompt: {}", e);
        }

        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim_end_matches(['\r', '\n']).to_string()),
            Err(e) => {
                log::warn!("Could not read answer: {}", e);
                None
            }
        }
    }
}

impl<R: ReadLine, W: Write> ValueSource for TerminalPrompt<R, W> {
    fn value_for(&mut self, marker: &str) -> Option<String> {
        self.ask(&format!("Enter the value for {}: ", marker))
            .filter(|value| !value.is_empty())
    }
}

impl<R: ReadLine, W: Write> ImageSource for TerminalPrompt<R, W> {
    fn decide(&mut self, ordinal: usize, image: &ImageRef) -> ImageDecision {
        let question = format!(
            "Replace image {} on page {}? (y/n) ",
            ordinal + 1,
            image.page_index + 1
        );
        loop {
            let Some(answer) = self.ask(&question) else {
                return ImageDecision::Keep;
            };
            match answer.trim().to_ascii_lowercase().as_str() {
                "y" | "yes" => break,
                "n" | "no" | "" => return ImageDecision::Keep,
                _ => continue,
            }
        }

        match self.ask(&format!(
            "Enter the path to the new image for image {}: ",
            ordinal + 1
        )) {
            Some(path) if !path.trim().is_empty() => ImageDecision::Replace(PathBuf::from(path.trim())),
            _ => ImageDecision::Keep,
        }
    }
}
