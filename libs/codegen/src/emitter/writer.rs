//! Indentation-aware Solidity source builder

const INDENT: &str = "    ";

#[derive(Debug, Default)]
pub struct SolidityWriter {
    buf: String,
    depth: usize,
}

impl SolidityWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one line at the current indentation
    pub fn line(&mut self, text: impl AsRef<str>) -> &mut Self {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.buf.push_str(INDENT);
            }
            self.buf.push_str(text);
        }
        self.buf.push('\n');
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.line("")
    }

    /// `header {` and indent
    pub fn open(&mut self, header: impl AsRef<str>) -> &mut Self {
        self.line(format!("{} {{", header.as_ref()));
        self.depth += 1;
        self
    }

    /// `} header {` at the enclosing level, e.g. `} else if (...) {`
    pub fn reopen(&mut self, header: impl AsRef<str>) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self.line(format!("}} {} {{", header.as_ref()));
        self.depth += 1;
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self.line("}")
    }

    /// Append pre-indented text unchanged
    pub fn raw(&mut self, text: &str) -> &mut Self {
        self.buf.push_str(text);
        if !text.is_empty() && !text.ends_with('\n') {
            self.buf.push('\n');
        }
        self
    }

    pub fn finish(self) -> String {
        self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_blocks() {
        let mut w = SolidityWriter::new();
        w.open("contract A")
            .open("function f(uint8 x) internal pure")
            .open("if (x == 1)")
            .line("return;")
            .reopen("else")
            .line("revert();")
            .close()
            .close()
            .close();

        let expected = "\
contract A {
    function f(uint8 x) internal pure {
        if (x == 1) {
            return;
        } else {
            revert();
        }
    }
}
";
        assert_eq!(w.finish(), expected);
    }

    #[test]
    fn test_blank_lines_carry_no_indent() {
        let mut w = SolidityWriter::new();
        w.open("library L").blank().close();
        assert_eq!(w.finish(), "library L {\n\n}\n");
    }
}
