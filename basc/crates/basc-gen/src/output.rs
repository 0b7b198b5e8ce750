//! The emission buffer: an ordered sequence of target-assembly text
//! lines.

/// Output buffer the generator appends to.
#[derive(Debug, Default)]
pub struct AsmOutput {
    /// Finished assembly lines, in emission order.
    pub lines: Vec<String>,
}

impl AsmOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one assembly line.
    pub fn add_line(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    /// Append a comment line.
    pub fn add_comment(&mut self, text: impl AsRef<str>) {
        self.lines.push(format!("; {}", text.as_ref()));
    }

    /// The whole buffer as file text, with a trailing newline.
    pub fn text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_and_comments() {
        let mut output = AsmOutput::new();
        output.add_line("\tCLR\tR0");
        output.add_comment("a remark");
        assert_eq!(output.lines, vec!["\tCLR\tR0", "; a remark"]);
        assert_eq!(output.text(), "\tCLR\tR0\n; a remark\n");
    }
}
