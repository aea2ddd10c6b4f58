use anyhow::{Context, Result, anyhow};
use std::io::BufRead;

pub struct LineReader<'a> {
    reader: &'a mut dyn BufRead,
    line_no: usize,
    line: String,
}

impl<'a> LineReader<'a> {
    pub fn new(reader: &'a mut (dyn BufRead + 'a)) -> Self {
        LineReader::<'a> {
            reader,
            line_no: 0,
            line: String::new(),
        }
    }

    pub fn get_last_line_number(&self) -> usize {
        self.line_no
    }

    pub fn get_last_line(&self) -> &str {
        &self.line
    }

    pub fn next_line_raw(&mut self) -> Result<()> {
        self.line.clear();

        match self.reader.read_line(&mut self.line) {
            Ok(0) => Err(anyhow!("premature end of file")),
            Ok(_n) => {
                if self.line.ends_with('\n') {
                    self.line.pop();
                    if self.line.ends_with('\r') {
                        self.line.pop();
                    }
                }
                self.line_no += 1;
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn next_line_string(&mut self) -> Result<String> {
        self.next_line()?;
        Ok(self.get_last_line().to_string())
    }

    pub fn next_line_index(&mut self) -> Result<usize> {
        self.next_line()?;
        self.get_last_line()
            .trim()
            .parse::<usize>()
            .with_context(|| {
                format!(
                    "failed to read integer at line {}; found `{}`",
                    self.get_last_line_number(),
                    self.get_last_line()
                )
            })
    }

    pub fn next_line_natural(&mut self) -> Result<u64> {
        self.next_line()?;
        self.get_last_line().trim().parse::<u64>().with_context(|| {
            format!(
                "failed to read integer at line {}; found `{}`",
                self.get_last_line_number(),
                self.get_last_line()
            )
        })
    }

    pub fn next_line(&mut self) -> Result<()> {
        //read line and unpack
        self.next_line_raw()?;
        while self.get_last_line().trim_start().starts_with('#') {
            self.next_line_raw()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::LineReader;

    #[test]
    fn line_reader_skips_comments() {
        let mut cursor = Cursor::new("# comment\n3\r\n# another\nlabel a\n");
        let mut reader = LineReader::new(&mut cursor);

        assert_eq!(reader.next_line_index().unwrap(), 3);
        assert_eq!(reader.get_last_line_number(), 2);
        assert_eq!(reader.next_line_string().unwrap(), "label a");
        assert!(reader.next_line().is_err());
    }

    #[test]
    fn line_reader_rejects_non_numbers() {
        let mut cursor = Cursor::new("three\n");
        let mut reader = LineReader::new(&mut cursor);

        assert!(reader.next_line_natural().is_err());
    }
}
